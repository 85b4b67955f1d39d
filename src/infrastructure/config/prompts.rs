use serde::Deserialize;
use std::path::Path;

use crate::domain::PipelineError;

/// Prompt templates file (YAML)
#[derive(Debug, Clone, Deserialize)]
pub struct PromptTemplates {
    /// Prompt sent to the context agent on every sampling iteration
    pub context_agent_prompt: String,
}

impl PromptTemplates {
    /// Read and parse the templates file.
    ///
    /// A missing file, invalid YAML, a missing key or a blank prompt are
    /// configuration errors.
    pub async fn load(path: &Path) -> Result<Self, PipelineError> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            PipelineError::Config(format!(
                "Failed to read prompt templates {}: {e}",
                path.display()
            ))
        })?;
        Self::parse(&raw).map_err(|reason| {
            PipelineError::Config(format!("Invalid prompt templates {}: {reason}", path.display()))
        })
    }

    fn parse(raw: &str) -> Result<Self, String> {
        let templates: Self = serde_yaml::from_str(raw).map_err(|e| e.to_string())?;
        if templates.context_agent_prompt.trim().is_empty() {
            return Err("context_agent_prompt is empty".to_string());
        }
        Ok(templates)
    }
}
