use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cotchain::llm::EXAMPLE_QUESTION;
use cotchain::{OllamaClient, OllamaConfig, iterative_cot_report, iterative_cot_response};

#[derive(Parser)]
#[command(name = "cotchain")]
#[command(author, version, about = "Chain-of-thought answering with refinement and verification", long_about = None)]
struct Cli {
    /// Question to answer
    #[arg(short, long, default_value = EXAMPLE_QUESTION)]
    question: String,

    /// Model name (overrides OLLAMA_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Ollama server address (overrides OLLAMA_BASE_URL / OLLAMA_HOST)
    #[arg(long)]
    base_url: Option<String>,

    /// Sampling temperature
    #[arg(long)]
    temperature: Option<f64>,

    /// Per-request timeout in seconds (default: wait indefinitely)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Write a JSON report of every stage to this file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = build_config(&cli);
    info!("Using model {} at {}", config.model, config.base_url);
    let model = config.model.clone();
    let client = OllamaClient::new(config).context("Failed to create Ollama client")?;

    let answer = match &cli.report {
        Some(path) => {
            let report = iterative_cot_report(&client, &model, &cli.question)
                .await
                .context("Chain of thought failed")?;
            report
                .write_json(path)
                .with_context(|| format!("Failed to write report to {:?}", path))?;
            info!("Report written to {:?}", path);
            report.verified_answer
        }
        None => iterative_cot_response(&client, &cli.question)
            .await
            .context("Chain of thought failed")?,
    };

    println!("Iterative Chain of Thought Response:");
    println!("{}", answer);

    Ok(())
}

fn build_config(cli: &Cli) -> OllamaConfig {
    let mut config = OllamaConfig::from_env();
    if let Some(base_url) = &cli.base_url {
        config = OllamaConfig::new(base_url.clone(), config.model);
    }
    if let Some(model) = &cli.model {
        config.model = model.clone();
    }
    if let Some(temperature) = cli.temperature {
        config = config.with_temperature(temperature);
    }
    if let Some(secs) = cli.timeout_secs {
        config = config.with_timeout_secs(secs);
    }
    config
}

/// Level used when RUST_LOG is unset
fn default_filter(verbose: bool) -> EnvFilter {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    EnvFilter::new(level.as_str().to_lowercase())
}

fn setup_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(verbose));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}
