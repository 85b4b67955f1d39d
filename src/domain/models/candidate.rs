use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::errors::{PipelineError, PipelineResult};

/// An evaluated metric reading paired with the conditions that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateResult {
    pub metric_value: f64,
    pub conditions: BTreeMap<String, f64>,
}

/// Counters for trace entries the extractor skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionStats {
    /// Messages recognized as metric readings
    pub metric_messages: usize,
    /// Metric readings whose content was not a number
    pub non_numeric: usize,
    /// Metric readings that were negative or not finite
    pub invalid_values: usize,
    /// Metric readings with no earlier validator conditions
    pub unpaired: usize,
    /// Validator messages whose payload failed to parse
    pub unparseable_payloads: usize,
    /// Readings that were compared against the running best
    pub candidates: usize,
}

/// Result of scanning a trace: the best candidate, if any, and skip counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionOutcome {
    pub best: Option<CandidateResult>,
    pub stats: ExtractionStats,
}

impl ExtractionOutcome {
    /// The best candidate, or `NoValidCandidate` when none qualified.
    pub fn into_best(self) -> PipelineResult<CandidateResult> {
        self.best.ok_or(PipelineError::NoValidCandidate {
            metric_messages: self.stats.metric_messages,
        })
    }
}
