//! Context sampling service.
//!
//! Asks the context agent, once per iteration, for a process overview and a
//! list of operating-constraint ranges, and persists both as text artifacts.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::domain::ports::ChatClient;
use crate::domain::{PipelineError, PipelineResult};
use crate::infrastructure::store::ConstraintFileStore;

/// Strict shape of one context-agent reply.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AgentPayload {
    pub process_overview: String,
    pub constraints: Vec<AgentConstraint>,
}

/// One variable range proposed by the context agent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AgentConstraint {
    pub variable: String,
    pub range: [f64; 2],
    pub unit: String,
}

impl AgentPayload {
    /// Parse agent output. Surrounding whitespace is the only tolerated noise.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw.trim())
    }

    /// Constraint artifact text: one `name: [low unit, high unit]` line each.
    pub fn constraint_text(&self) -> String {
        self.constraints
            .iter()
            .map(|c| {
                format!(
                    "{}: [{} {}, {} {}]\n",
                    c.variable.trim(),
                    c.range[0],
                    c.unit,
                    c.range[1],
                    c.unit
                )
            })
            .collect()
    }
}

/// Paths written by a sampling run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SamplingReport {
    pub overview_path: PathBuf,
    pub constraint_paths: Vec<PathBuf>,
}

pub struct ContextSampler {
    client: Arc<dyn ChatClient>,
    store: ConstraintFileStore,
}

impl ContextSampler {
    pub fn new(client: Arc<dyn ChatClient>, store: ConstraintFileStore) -> Self {
        Self { client, store }
    }

    /// Run one sampling iteration and return the constraint artifact path.
    ///
    /// Nothing is written when the agent reply cannot be parsed.
    #[instrument(skip(self, prompt))]
    pub async fn sample_once(&self, iteration: u32, prompt: &str) -> PipelineResult<PathBuf> {
        let reply = self
            .client
            .complete(prompt)
            .await
            .map_err(|source| PipelineError::Llm { iteration, source })?;

        let payload = AgentPayload::parse(&reply).map_err(|e| {
            debug!(reply_len = reply.len(), "rejecting context agent reply");
            PipelineError::InvalidAgentOutput {
                iteration,
                reason: e.to_string(),
            }
        })?;

        self.store.write_overview(&payload.process_overview).await?;
        let path = self
            .store
            .write_constraints(iteration, &payload.constraint_text())
            .await?;

        info!(
            iteration,
            path = %path.display(),
            constraints = payload.constraints.len(),
            "context sample written"
        );
        Ok(path)
    }

    /// Run iterations `1..=iterations` one after another.
    ///
    /// `on_iteration` is called after each completed iteration.
    pub async fn run<F>(
        &self,
        iterations: u32,
        prompt: &str,
        mut on_iteration: F,
    ) -> PipelineResult<SamplingReport>
    where
        F: FnMut(u32),
    {
        let mut report = SamplingReport {
            overview_path: self.store.overview_path().to_path_buf(),
            constraint_paths: Vec::with_capacity(iterations as usize),
        };

        for iteration in 1..=iterations {
            let path = self.sample_once(iteration, prompt).await?;
            report.constraint_paths.push(path);
            on_iteration(iteration);
        }

        info!(samples = report.constraint_paths.len(), "context sampling complete");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::ContextAgentConfig;
    use crate::domain::ports::ChatError;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct ScriptedClient {
        replies: Mutex<Vec<Result<String, ChatError>>>,
    }

    impl ScriptedClient {
        fn new(replies: Vec<Result<String, ChatError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into_iter().rev().collect()),
            })
        }
    }

    #[async_trait]
    impl ChatClient for ScriptedClient {
        async fn complete(&self, _prompt: &str) -> Result<String, ChatError> {
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(ChatError::UnknownError(0, "no reply".to_string())))
        }
    }

    fn store_in(dir: &Path) -> ConstraintFileStore {
        ConstraintFileStore::new(&ContextAgentConfig {
            context_sampling_iterations: 2,
            context_agent_prompt_path: dir.join("prompts.yaml"),
            llm_process_overview_save_path: dir.join("process_overview.txt"),
            llm_constraint_save_path: dir.join("generated_constraints.txt"),
            llm_constraint_avg_save_path: dir.join("generated_constraints_avg.txt"),
        })
    }

    const REPLY: &str = r#"
        {"process_overview": "Toluene hydrodealkylation.",
         "constraints": [
            {"variable": "H101 temperature", "range": [500, 600.5], "unit": "°C"},
            {"variable": "F102 deltaP", "range": [-200, 0], "unit": "kPa"}
         ]}
    "#;

    #[test]
    fn test_constraint_text_format() {
        let payload = AgentPayload::parse(REPLY).unwrap();
        assert_eq!(
            payload.constraint_text(),
            "H101 temperature: [500 °C, 600.5 °C]\nF102 deltaP: [-200 kPa, 0 kPa]\n"
        );
    }

    #[test]
    fn test_parse_rejects_wrong_shapes() {
        assert!(AgentPayload::parse("Sure! Here is the JSON: {}").is_err());
        assert!(AgentPayload::parse(
            r#"{"process_overview": "x", "constraints": [{"variable": "t", "range": [1], "unit": "K"}]}"#
        )
        .is_err());
        assert!(AgentPayload::parse(r#"{"process_overview": "x"}"#).is_err());
    }

    #[tokio::test]
    async fn test_run_writes_numbered_artifacts() {
        let tmp = TempDir::new().unwrap();
        let client = ScriptedClient::new(vec![Ok(REPLY.to_string()), Ok(REPLY.to_string())]);
        let sampler = ContextSampler::new(client, store_in(tmp.path()));

        let mut seen = Vec::new();
        let report = sampler.run(2, "prompt", |i| seen.push(i)).await.unwrap();

        assert_eq!(seen, vec![1, 2]);
        assert_eq!(report.constraint_paths.len(), 2);
        assert!(tmp.path().join("generated_constraints_1.txt").is_file());
        assert!(tmp.path().join("generated_constraints_2.txt").is_file());
        assert_eq!(
            std::fs::read_to_string(tmp.path().join("process_overview.txt")).unwrap(),
            "Toluene hydrodealkylation.\n"
        );
    }

    #[tokio::test]
    async fn test_malformed_reply_is_fatal_and_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let client = ScriptedClient::new(vec![
            Ok(REPLY.to_string()),
            Ok("not json at all".to_string()),
        ]);
        let sampler = ContextSampler::new(client, store_in(tmp.path()));

        let err = sampler.run(3, "prompt", |_| {}).await.unwrap_err();
        assert!(matches!(err, PipelineError::InvalidAgentOutput { iteration: 2, .. }));
        assert!(tmp.path().join("generated_constraints_1.txt").is_file());
        assert!(!tmp.path().join("generated_constraints_2.txt").exists());
    }

    #[tokio::test]
    async fn test_llm_failure_names_iteration() {
        let tmp = TempDir::new().unwrap();
        let client = ScriptedClient::new(vec![Err(ChatError::InvalidApiKey)]);
        let sampler = ContextSampler::new(client, store_in(tmp.path()));

        let err = sampler.run(1, "prompt", |_| {}).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Llm {
                iteration: 1,
                source: ChatError::InvalidApiKey
            }
        ));
    }
}
