use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::models::{AggregatedConstraintSet, ModelConfig, OptimizationConfig};

/// Everything the external optimization driver needs for one run.
///
/// Serialized as the JSON document handed to the driver.
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationRequest {
    /// Process overview text
    pub context: String,

    /// Aggregated constraint artifact text
    pub constraint_text: String,

    /// Aggregated constraints as `{name: [low, high]}`
    pub constraints: AggregatedConstraintSet,

    /// Model connection options for the driver's agents
    pub llm_config: ModelConfig,

    /// Optimization options, including the metric and trace path
    pub optimization_config: OptimizationConfig,
}

impl OptimizationRequest {
    /// Where the driver must leave the conversation trace
    pub fn trace_path(&self) -> &PathBuf {
        &self.optimization_config.optimization_save_path
    }
}

/// Driver invocation failures
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Optimization driver not configured: {0}")]
    NotConfigured(String),

    #[error("Failed to launch optimization driver: {0}")]
    SpawnFailed(String),

    #[error("Optimization driver exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("Optimization driver timed out after {0}s")]
    Timeout(u64),

    #[error("Optimization driver finished without writing a trace at {0}")]
    MissingTrace(PathBuf),

    #[error("Failed to encode driver request: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Port for the external search loop that proposes and evaluates candidates.
#[async_trait]
pub trait OptimizationDriver: Send + Sync {
    /// Run to completion, leaving a conversation trace at `request.trace_path()`.
    async fn run(&self, request: &OptimizationRequest) -> Result<(), DriverError>;
}
