use thiserror::Error;

/// Errors raised while building or running a pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("missing variable '{variable}' required by template")]
    MissingVariable { variable: String },

    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("model error: {0}")]
    ModelError(String),

    #[error("invalid template: {0}")]
    InvalidTemplate(String),

    #[error("output key '{0}' is declared more than once")]
    DuplicateOutputKey(String),

    #[error("stage '{stage}' needs variable '{variable}' which no input or earlier stage provides")]
    UnresolvedVariable { stage: String, variable: String },

    #[error("output variable '{0}' is not produced by any stage")]
    UnknownOutput(String),

    #[error("expected exactly one output variable, pipeline declares {0:?}")]
    NotSingleOutput(Vec<String>),

    #[error("pipeline has no stages")]
    EmptyPipeline,

    #[error("failed to write run report: {0}")]
    Report(String),
}

impl PipelineError {
    pub fn missing(variable: impl Into<String>) -> Self {
        Self::MissingVariable {
            variable: variable.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
