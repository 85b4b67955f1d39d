//! opsearch - LLM-guided search for process operating conditions
//!
//! opsearch samples operating-constraint ranges from a language-model agent,
//! averages them into a consensus set, hands that set to an external
//! optimization driver, and reads the driver's conversation trace back to
//! find the best evaluated operating conditions.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Data model, errors and port traits
//! - **Service Layer** (`services`): One service per pipeline stage, plus the pipeline
//! - **Infrastructure Layer** (`infrastructure`): Config, logging, HTTP client, driver process, file store
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use opsearch::{ConfigLoader, Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load("config.yaml")?;
//!     let report = Pipeline::from_config(config)?.run().await?;
//!     println!("{}", report.best.metric_value);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    AggregatedConstraintSet, CandidateResult, Config, ConversationTrace, ExtractionOutcome,
    ExtractionStats, OptimizationMetric,
};
pub use domain::ports::{ChatClient, OptimizationDriver, OptimizationRequest};
pub use domain::{ErrorKind, PipelineError, PipelineResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{Pipeline, PipelineReport};
