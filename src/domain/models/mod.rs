//! Domain models

pub mod candidate;
pub mod config;
pub mod constraint;
pub mod trace;

pub use candidate::{CandidateResult, ExtractionOutcome, ExtractionStats};
pub use config::{
    Config, ContextAgentConfig, DriverConfig, LoggingConfig, MetricDirection, ModelConfig,
    ModelInfo, OptimizationConfig, OptimizationMetric, TraceTagsConfig,
};
pub use constraint::{
    normalize_variable_name, round_one_decimal, AggregatedConstraintSet, ConstraintRange,
    ConstraintSet,
};
pub use trace::{ConditionsPayload, ConversationTrace, PayloadError, TraceMessage};
