pub mod error;
pub mod io;
pub mod llm;
pub mod models;
pub mod stages;

pub use error::{PipelineError, Result};
pub use io::{RunReport, StageRecord};
pub use llm::{ModelClient, OllamaClient, OllamaConfig};
pub use models::{PipelineState, PromptTemplate};
pub use stages::{
    chain_of_thought_pipeline, iterative_cot_report, iterative_cot_response, PipelineRun,
    SequentialPipeline, Stage,
};
