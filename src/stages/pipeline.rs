use std::collections::{HashMap, HashSet};
use std::time::Instant;

use tracing::{info, warn};

use crate::error::{PipelineError, Result};
use crate::io::StageRecord;
use crate::llm::ModelClient;
use crate::models::PipelineState;
use crate::stages::Stage;

/// Outputs of a run together with the per-stage trace
#[derive(Debug, Clone)]
pub struct PipelineRun {
    /// Declared output variables only
    pub outputs: HashMap<String, String>,
    /// One record per executed stage, in order
    pub stages: Vec<StageRecord>,
}

/// Fixed-order chain of stages where each stage's output feeds the next
///
/// The wiring is checked when the pipeline is built: every template variable
/// must come from an input or an earlier stage, and no output key may be
/// declared twice.
#[derive(Debug, Clone)]
pub struct SequentialPipeline {
    input_variables: Vec<String>,
    stages: Vec<Stage>,
    output_variables: Vec<String>,
}

impl SequentialPipeline {
    pub fn new(
        input_variables: Vec<String>,
        stages: Vec<Stage>,
        output_variables: Vec<String>,
    ) -> Result<Self> {
        validate_wiring(&input_variables, &stages, &output_variables)?;

        Ok(Self {
            input_variables,
            stages,
            output_variables,
        })
    }

    pub fn input_variables(&self) -> &[String] {
        &self.input_variables
    }

    pub fn output_variables(&self) -> &[String] {
        &self.output_variables
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Run every stage in order, returning only the declared outputs
    pub async fn run(
        &self,
        client: &dyn ModelClient,
        inputs: &HashMap<String, String>,
    ) -> Result<HashMap<String, String>> {
        Ok(self.run_traced(client, inputs).await?.outputs)
    }

    /// Run a pipeline that declares exactly one output and return its value
    pub async fn run_single(
        &self,
        client: &dyn ModelClient,
        inputs: &HashMap<String, String>,
    ) -> Result<String> {
        let [key] = self.output_variables.as_slice() else {
            return Err(PipelineError::NotSingleOutput(self.output_variables.clone()));
        };
        let mut outputs = self.run(client, inputs).await?;
        outputs
            .remove(key)
            .ok_or_else(|| PipelineError::UnknownOutput(key.clone()))
    }

    /// Run every stage in order, also returning what each stage sent and received
    pub async fn run_traced(
        &self,
        client: &dyn ModelClient,
        inputs: &HashMap<String, String>,
    ) -> Result<PipelineRun> {
        let mut state = PipelineState::new();
        for name in &self.input_variables {
            let value = inputs
                .get(name)
                .ok_or_else(|| PipelineError::missing(name.as_str()))?;
            state.insert(name.as_str(), value.as_str())?;
        }

        let total = self.stages.len();
        let mut records = Vec::with_capacity(total);

        for (i, stage) in self.stages.iter().enumerate() {
            info!("Stage {}/{}: {}", i + 1, total, stage.name());

            let prompt = stage.render(&state)?;
            let started = Instant::now();
            let response = match stage.call(client, &prompt).await {
                Ok(response) => response,
                Err(e) => {
                    warn!("Stage {} failed: {}", stage.name(), e);
                    return Err(e);
                }
            };
            let elapsed_ms = started.elapsed().as_millis() as u64;

            info!(
                "Stage {}: {} chars in {}ms -> {}",
                stage.name(),
                response.len(),
                elapsed_ms,
                stage.output_key()
            );

            records.push(StageRecord {
                stage: stage.name().to_string(),
                output_key: stage.output_key().to_string(),
                prompt,
                response: response.clone(),
                elapsed_ms,
            });
            state.insert(stage.output_key(), response)?;
        }

        let outputs = state.take(&self.output_variables)?;
        Ok(PipelineRun {
            outputs,
            stages: records,
        })
    }
}

fn validate_wiring(inputs: &[String], stages: &[Stage], outputs: &[String]) -> Result<()> {
    if stages.is_empty() {
        return Err(PipelineError::EmptyPipeline);
    }

    let mut known: HashSet<&str> = inputs.iter().map(String::as_str).collect();
    for stage in stages {
        for variable in stage.input_keys() {
            if !known.contains(variable.as_str()) {
                return Err(PipelineError::UnresolvedVariable {
                    stage: stage.name().to_string(),
                    variable: variable.clone(),
                });
            }
        }
        // Inputs and earlier outputs are both in `known`, so this catches either collision
        if !known.insert(stage.output_key()) {
            return Err(PipelineError::DuplicateOutputKey(stage.output_key().to_string()));
        }
    }

    let produced: HashSet<&str> = stages.iter().map(Stage::output_key).collect();
    let mut declared: HashSet<&str> = HashSet::with_capacity(outputs.len());
    for output in outputs {
        if !produced.contains(output.as_str()) {
            return Err(PipelineError::UnknownOutput(output.clone()));
        }
        if !declared.insert(output.as_str()) {
            return Err(PipelineError::DuplicateOutputKey(output.clone()));
        }
    }
    Ok(())
}
