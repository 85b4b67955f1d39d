use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Main configuration structure for opsearch
///
/// The `context_agent`, `optimization` and `model` sections carry no
/// defaults for their required keys: a missing key fails extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Context sampling options
    pub context_agent: ContextAgentConfig,

    /// Optimization driver and extraction options
    pub optimization: OptimizationConfig,

    /// LLM connection options
    pub model: ModelConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Context sampling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ContextAgentConfig {
    /// Number of independent agent samples to draw (>= 1)
    pub context_sampling_iterations: u32,

    /// YAML file holding the `context_agent_prompt` template
    pub context_agent_prompt_path: PathBuf,

    /// Where the process overview is written (overwritten every iteration)
    pub llm_process_overview_save_path: PathBuf,

    /// Base path for sampled constraints; `_<i>` is inserted before the extension
    pub llm_constraint_save_path: PathBuf,

    /// Where the averaged constraint set is written
    pub llm_constraint_avg_save_path: PathBuf,
}

/// Optimization configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OptimizationConfig {
    /// Objective the driver optimizes; decides the comparison direction
    pub optimization_metric: OptimizationMetric,

    /// Path the driver writes the conversation trace to
    pub optimization_save_path: PathBuf,

    /// External driver process
    #[serde(default)]
    pub driver: DriverConfig,

    /// Message tags used to recognize trace entries
    #[serde(default)]
    pub trace: TraceTagsConfig,

    /// Driver-specific options, forwarded verbatim
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// External optimization driver configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DriverConfig {
    /// Executable to run (required by the optimize stage)
    #[serde(default)]
    pub command: Option<String>,

    /// Arguments passed to the executable
    #[serde(default)]
    pub args: Vec<String>,

    /// Working directory for the driver
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,

    /// Kill the driver after this many seconds (no limit when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Type/source tags identifying metric and validator messages in a trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TraceTagsConfig {
    /// Message type of a tool-call result
    #[serde(default = "default_tool_result_type")]
    pub tool_result_type: String,

    /// Source name of the metric-calculation agent
    #[serde(default = "default_metric_source")]
    pub metric_source: String,

    /// Source name of the validator agent
    #[serde(default = "default_validator_source")]
    pub validator_source: String,
}

fn default_tool_result_type() -> String {
    "ToolCallSummaryMessage".to_string()
}

fn default_metric_source() -> String {
    "MetricCalculationAgent".to_string()
}

fn default_validator_source() -> String {
    "ValidatorAgent".to_string()
}

impl Default for TraceTagsConfig {
    fn default() -> Self {
        Self {
            tool_result_type: default_tool_result_type(),
            metric_source: default_metric_source(),
            validator_source: default_validator_source(),
        }
    }
}

/// Objective evaluated by the simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptimizationMetric {
    /// Operating cost, minimized
    #[serde(rename = "cost")]
    Cost,

    /// Product yield, maximized
    #[serde(rename = "yield")]
    Yield,

    /// Yield per unit cost, maximized
    #[serde(rename = "yield/cost")]
    YieldPerCost,
}

/// Which way a metric improves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricDirection {
    Minimize,
    Maximize,
}

impl OptimizationMetric {
    pub const fn direction(self) -> MetricDirection {
        match self {
            Self::Cost => MetricDirection::Minimize,
            Self::Yield | Self::YieldPerCost => MetricDirection::Maximize,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cost => "cost",
            Self::Yield => "yield",
            Self::YieldPerCost => "yield/cost",
        }
    }
}

impl fmt::Display for OptimizationMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptimizationMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cost" => Ok(Self::Cost),
            "yield" => Ok(Self::Yield),
            "yield/cost" => Ok(Self::YieldPerCost),
            other => Err(format!(
                "Unknown optimization metric: {other}. Must be one of: cost, yield, yield/cost"
            )),
        }
    }
}

/// LLM connection configuration (OpenAI-compatible endpoint)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ModelConfig {
    /// API key sent as a bearer token
    pub api_key: String,

    /// Model identifier
    pub model: String,

    /// Base URL of the chat-completions API (without `/chat/completions`)
    pub base_url: String,

    /// Capability descriptor of the model
    pub model_info: ModelInfo,

    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries for transient transport errors within one call
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff delay in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

const fn default_timeout_secs() -> u64 {
    300
}

const fn default_max_retries() -> u32 {
    2
}

const fn default_initial_backoff_ms() -> u64 {
    1000
}

const fn default_max_backoff_ms() -> u64 {
    30_000
}

/// What the configured model supports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ModelInfo {
    pub vision: bool,
    pub function_calling: bool,
    pub json_output: bool,
    pub family: String,
    #[serde(default)]
    pub structured_output: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files (stderr only when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    /// Rotation policy for file logs: daily, hourly, never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}
