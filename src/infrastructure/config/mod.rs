//! Configuration management infrastructure
//!
//! Hierarchical configuration using figment:
//! - YAML file loading
//! - Environment variable overrides
//! - Configuration validation
//! - Prompt template loading

pub mod loader;
pub mod prompts;

pub use loader::{ConfigError, ConfigLoader};
pub use prompts::PromptTemplates;
