use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PipelineError, Result};

/// What one stage sent and received
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageRecord {
    pub stage: String,
    pub output_key: String,
    pub prompt: String,
    pub response: String,
    pub elapsed_ms: u64,
}

/// Machine-readable record of a full chain-of-thought run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub model: String,
    pub question: String,
    pub stages: Vec<StageRecord>,
    pub verified_answer: String,
}

impl RunReport {
    /// Total time spent waiting on the model
    pub fn model_time_ms(&self) -> u64 {
        self.stages.iter().map(|s| s.elapsed_ms).sum()
    }

    /// Write to a JSON file
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .map_err(|e| PipelineError::Report(format!("failed to create {:?}: {}", path, e)))?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| PipelineError::Report(format!("failed to write JSON: {}", e)))?;
        Ok(())
    }
}
