use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::models::config::Config;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "OPSEARCH_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to load configuration: {0}")]
    Extract(#[from] Box<figment::Error>),

    #[error("Invalid context_sampling_iterations: {0}. Must be at least 1")]
    InvalidIterations(u32),

    #[error("Configuration option cannot be empty: {0}")]
    EmptyOption(&'static str),

    #[error("Constraint save path must name a file: {0}")]
    InvalidConstraintPath(PathBuf),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must not exceed max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file, then apply environment overrides
    ///
    /// Precedence (lowest to highest):
    /// 1. The YAML file at `path`
    /// 2. Environment variables (`OPSEARCH_*`, `__` separates nested keys)
    ///
    /// Required options have no defaults; leaving one out is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let config: Config = Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a YAML string (no environment overrides)
    pub fn load_from_str(yaml: &str) -> Result<Config, ConfigError> {
        let config: Config = Figment::new()
            .merge(Yaml::string(yaml))
            .extract()
            .map_err(Box::new)?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let context = &config.context_agent;
        if context.context_sampling_iterations == 0 {
            return Err(ConfigError::InvalidIterations(
                context.context_sampling_iterations,
            ));
        }

        let required_paths = [
            ("context_agent.context_agent_prompt_path", &context.context_agent_prompt_path),
            (
                "context_agent.llm_process_overview_save_path",
                &context.llm_process_overview_save_path,
            ),
            ("context_agent.llm_constraint_save_path", &context.llm_constraint_save_path),
            (
                "context_agent.llm_constraint_avg_save_path",
                &context.llm_constraint_avg_save_path,
            ),
            (
                "optimization.optimization_save_path",
                &config.optimization.optimization_save_path,
            ),
        ];
        for (name, path) in required_paths {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::EmptyOption(name));
            }
        }

        if context.llm_constraint_save_path.file_stem().is_none() {
            return Err(ConfigError::InvalidConstraintPath(
                context.llm_constraint_save_path.clone(),
            ));
        }

        // Validate model config
        let model = &config.model;
        if model.model.trim().is_empty() {
            return Err(ConfigError::EmptyOption("model.model"));
        }
        if model.base_url.trim().is_empty() {
            return Err(ConfigError::EmptyOption("model.base_url"));
        }
        if model.initial_backoff_ms > model.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                model.initial_backoff_ms,
                model.max_backoff_ms,
            ));
        }

        // Validate logging config
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::OptimizationMetric;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const VALID_YAML: &str = r"
context_agent:
  context_sampling_iterations: 3
  context_agent_prompt_path: prompts/context_agent.yaml
  llm_process_overview_save_path: Results/process_overview.txt
  llm_constraint_save_path: Results/generated_constraints.txt
  llm_constraint_avg_save_path: Results/avg_constraints.txt
optimization:
  optimization_metric: cost
  optimization_save_path: Results/optimization.json
  driver:
    command: python
    args: [optimization.py]
model:
  api_key: sk-test
  model: gpt-4o
  base_url: https://api.openai.com/v1
  model_info:
    vision: false
    function_calling: true
    json_output: true
    family: gpt-4o
";

    #[test]
    fn test_yaml_parsing() {
        let config = ConfigLoader::load_from_str(VALID_YAML).expect("YAML should load");

        assert_eq!(config.context_agent.context_sampling_iterations, 3);
        assert_eq!(config.optimization.optimization_metric, OptimizationMetric::Cost);
        assert_eq!(config.optimization.driver.command.as_deref(), Some("python"));
        assert_eq!(config.model.model, "gpt-4o");
        assert!(config.model.model_info.json_output);
        assert!(!config.model.model_info.structured_output);
        assert_eq!(config.model.timeout_secs, 300);
        assert_eq!(config.model.max_retries, 2);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_missing_required_option_fails() {
        let yaml = VALID_YAML.replace("  api_key: sk-test\n", "");
        let result = ConfigLoader::load_from_str(&yaml);
        match result {
            Err(ConfigError::Extract(err)) => assert!(err.to_string().contains("api_key")),
            other => panic!("Expected Extract error, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_metric_fails() {
        let yaml = VALID_YAML.replace("optimization_metric: cost", "optimization_metric: profit");
        assert!(matches!(
            ConfigLoader::load_from_str(&yaml),
            Err(ConfigError::Extract(_))
        ));
    }

    #[test]
    fn test_validate_zero_iterations() {
        let yaml = VALID_YAML.replace(
            "context_sampling_iterations: 3",
            "context_sampling_iterations: 0",
        );
        assert!(matches!(
            ConfigLoader::load_from_str(&yaml),
            Err(ConfigError::InvalidIterations(0))
        ));
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = ConfigLoader::load_from_str(VALID_YAML).unwrap();
        config.logging.level = "verbose".to_string();

        match ConfigLoader::validate(&config).unwrap_err() {
            ConfigError::InvalidLogLevel(level) => assert_eq!(level, "verbose"),
            other => panic!("Expected InvalidLogLevel error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_invalid_backoff() {
        let mut config = ConfigLoader::load_from_str(VALID_YAML).unwrap();
        config.model.initial_backoff_ms = 30_000;
        config.model.max_backoff_ms = 10_000;

        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidBackoff(30_000, 10_000))
        ));
    }

    #[test]
    fn test_validate_empty_model_name() {
        let mut config = ConfigLoader::load_from_str(VALID_YAML).unwrap();
        config.model.model = "  ".to_string();

        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::EmptyOption("model.model"))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            ConfigLoader::load("does/not/exist.yaml"),
            Err(ConfigError::NotFound(_))
        ));
    }

    #[test]
    fn test_env_override() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(VALID_YAML.as_bytes()).unwrap();
        file.flush().unwrap();

        temp_env::with_vars(
            [
                ("OPSEARCH_MODEL__API_KEY", Some("sk-from-env")),
                ("OPSEARCH_LOGGING__LEVEL", Some("debug")),
            ],
            || {
                let config = ConfigLoader::load(file.path()).expect("config should load");
                assert_eq!(config.model.api_key, "sk-from-env");
                assert_eq!(config.logging.level, "debug");
                assert_eq!(config.model.model, "gpt-4o", "file value should persist");
            },
        );
    }
}
