//! Best-result extraction from the optimization conversation trace.
//!
//! The trace is scanned forward once. Validator messages refresh a "latest
//! conditions" slot; each metric reading is paired with whatever the slot
//! holds at that point, which is the nearest preceding validator output.
//! An unparseable validator payload empties the slot, so the readings that
//! follow it stay unpaired until the next good payload.

use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

use crate::domain::models::{
    CandidateResult, ConversationTrace, ExtractionOutcome, ExtractionStats, MetricDirection,
    OptimizationMetric, TraceMessage, TraceTagsConfig,
};
use crate::domain::{PipelineError, PipelineResult};

/// Read and decode a trace file.
pub async fn load_trace(path: &Path) -> PipelineResult<ConversationTrace> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| PipelineError::TraceUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
    serde_json::from_str(&raw).map_err(|source| PipelineError::TraceMalformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Whether `candidate` replaces `best` for the given direction. Ties keep `best`.
fn is_better(direction: MetricDirection, candidate: f64, best: f64) -> bool {
    match direction {
        MetricDirection::Minimize => candidate < best,
        MetricDirection::Maximize => candidate > best,
    }
}

pub struct ResultExtractor<'a> {
    metric: OptimizationMetric,
    tags: &'a TraceTagsConfig,
}

impl<'a> ResultExtractor<'a> {
    pub const fn new(metric: OptimizationMetric, tags: &'a TraceTagsConfig) -> Self {
        Self { metric, tags }
    }

    fn is_tool_result(&self, msg: &TraceMessage) -> bool {
        msg.kind == self.tags.tool_result_type
    }

    fn is_validator(&self, msg: &TraceMessage) -> bool {
        self.is_tool_result(msg)
            && msg.source == self.tags.validator_source
            && msg.mentions_conditions()
    }

    fn is_metric(&self, msg: &TraceMessage) -> bool {
        self.is_tool_result(msg) && msg.source == self.tags.metric_source
    }

    /// Select the best candidate in `trace`.
    pub fn extract(&self, trace: &ConversationTrace) -> ExtractionOutcome {
        let direction = self.metric.direction();
        let mut stats = ExtractionStats::default();
        let mut latest_conditions: Option<BTreeMap<String, f64>> = None;
        let mut best: Option<CandidateResult> = None;

        for (index, msg) in trace.messages.iter().enumerate() {
            if self.is_validator(msg) {
                match msg.conditions_payload() {
                    Ok(payload) => latest_conditions = Some(payload.conditions),
                    Err(e) => {
                        stats.unparseable_payloads += 1;
                        latest_conditions = None;
                        debug!(index, error = %e, "discarding validator payload");
                    }
                }
                continue;
            }

            if !self.is_metric(msg) {
                continue;
            }
            stats.metric_messages += 1;

            let Some(value) = msg.metric_value() else {
                stats.non_numeric += 1;
                continue;
            };
            if !value.is_finite() || value < 0.0 {
                stats.invalid_values += 1;
                continue;
            }
            let Some(conditions) = latest_conditions.as_ref() else {
                stats.unpaired += 1;
                continue;
            };

            stats.candidates += 1;
            let replace = best
                .as_ref()
                .is_none_or(|b| is_better(direction, value, b.metric_value));
            if replace {
                best = Some(CandidateResult {
                    metric_value: value,
                    conditions: conditions.clone(),
                });
            }
        }

        let skipped = stats.non_numeric + stats.invalid_values + stats.unpaired;
        if skipped > 0 || stats.unparseable_payloads > 0 {
            warn!(
                non_numeric = stats.non_numeric,
                invalid_values = stats.invalid_values,
                unpaired = stats.unpaired,
                unparseable_payloads = stats.unparseable_payloads,
                "some trace entries were skipped"
            );
        }

        ExtractionOutcome { best, stats }
    }

    /// Load the trace at `path` and return its best candidate.
    #[instrument(skip(self), fields(metric = %self.metric))]
    pub async fn extract_from_file(&self, path: &Path) -> PipelineResult<ExtractionOutcome> {
        let trace = load_trace(path).await?;
        let outcome = self.extract(&trace);
        info!(
            messages = trace.messages.len(),
            candidates = outcome.stats.candidates,
            best = ?outcome.best.as_ref().map(|b| b.metric_value),
            "trace scanned"
        );
        Ok(outcome)
    }
}
