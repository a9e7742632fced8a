//! Deterministic model clients for unit tests

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::ModelClient;
use crate::error::{PipelineError, Result};

/// One scripted reply
#[derive(Debug, Clone)]
pub enum Scripted {
    Reply(String),
    Unavailable(String),
    Fail(String),
}

/// Returns predefined replies in order and records every prompt it sees
pub struct MockModel {
    script: Vec<Scripted>,
    index: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockModel {
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            script,
            index: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn replies(replies: &[&str]) -> Self {
        Self::new(replies.iter().map(|r| Scripted::Reply(r.to_string())).collect())
    }

    /// Number of generate calls made so far
    pub fn calls(&self) -> usize {
        self.index.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for MockModel {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let i = self.index.fetch_add(1, Ordering::SeqCst);
        match self.script.get(i) {
            Some(Scripted::Reply(text)) => Ok(text.clone()),
            Some(Scripted::Unavailable(msg)) => Err(PipelineError::ModelUnavailable(msg.clone())),
            Some(Scripted::Fail(msg)) => Err(PipelineError::ModelError(msg.clone())),
            None => Err(PipelineError::ModelError(format!("no scripted reply for call {}", i + 1))),
        }
    }
}

/// Answers each distinct prompt with the same text derived from it
pub struct EchoModel;

#[async_trait]
impl ModelClient for EchoModel {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let first_line = prompt.lines().next().unwrap_or_default();
        Ok(format!("echo({}): {}", prompt.len(), first_line))
    }
}
