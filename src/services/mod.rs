//! Application services: one per pipeline stage, plus the pipeline itself.

pub mod constraint_aggregator;
pub mod context_sampler;
pub mod optimization_invoker;
pub mod pipeline;
pub mod result_extractor;

pub use constraint_aggregator::{
    aggregate, parse_constraint_text, AggregationReport, ConstraintAccumulator,
    ConstraintAggregator,
};
pub use context_sampler::{AgentConstraint, AgentPayload, ContextSampler, SamplingReport};
pub use optimization_invoker::OptimizationInvoker;
pub use pipeline::{Pipeline, PipelineReport, Stage};
pub use result_extractor::{load_trace, ResultExtractor};
