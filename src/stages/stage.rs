use tracing::debug;

use crate::error::Result;
use crate::llm::ModelClient;
use crate::models::{PipelineState, PromptTemplate};

/// One model call: render a template, send it, store the reply under `output_key`
#[derive(Debug, Clone)]
pub struct Stage {
    name: String,
    template: PromptTemplate,
    output_key: String,
}

impl Stage {
    pub fn new(name: impl Into<String>, template: PromptTemplate, output_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template,
            output_key: output_key.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn output_key(&self) -> &str {
        &self.output_key
    }

    /// Variables this stage reads from the state
    pub fn input_keys(&self) -> &[String] {
        self.template.variables()
    }

    pub fn render(&self, state: &PipelineState) -> Result<String> {
        self.template.render(state)
    }

    /// Render against the state and make a single model call
    pub async fn execute(&self, client: &dyn ModelClient, state: &PipelineState) -> Result<String> {
        let prompt = self.render(state)?;
        self.call(client, &prompt).await
    }

    pub(crate) async fn call(&self, client: &dyn ModelClient, prompt: &str) -> Result<String> {
        debug!("{}: sending {} chars", self.name, prompt.len());
        let response = client.generate(prompt).await?;
        debug!("{}: received {} chars", self.name, response.len());
        Ok(response)
    }
}
