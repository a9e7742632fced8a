use std::collections::HashMap;

use crate::error::{PipelineError, Result};

/// Variables accumulated over one pipeline run
///
/// Append-only: a key, once set, cannot be overwritten. Iteration follows
/// insertion order.
#[derive(Debug, Clone, Default)]
pub struct PipelineState {
    entries: Vec<(String, String)>,
}

impl PipelineState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable, rejecting keys that are already present
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let key = key.into();
        if self.contains(&key) {
            return Err(PipelineError::DuplicateOutputKey(key));
        }
        self.entries.push((key, value.into()));
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Remove and return the named variables, failing on the first absent one
    pub fn take(mut self, keys: &[String]) -> Result<HashMap<String, String>> {
        let mut out = HashMap::with_capacity(keys.len());
        for key in keys {
            let idx = self
                .entries
                .iter()
                .position(|(k, _)| k == key)
                .ok_or_else(|| PipelineError::UnknownOutput(key.clone()))?;
            let (k, v) = self.entries.swap_remove(idx);
            out.insert(k, v);
        }
        Ok(out)
    }
}
