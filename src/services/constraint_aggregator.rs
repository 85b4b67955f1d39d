//! Constraint aggregation service.
//!
//! Parses every sampled constraint artifact and averages each variable's
//! bounds over the samples that reported it.

use regex::Regex;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::LazyLock;
use tracing::{debug, info, instrument, warn};

use crate::domain::models::{
    round_one_decimal, AggregatedConstraintSet, ConstraintRange, ConstraintSet,
};
use crate::domain::{PipelineError, PipelineResult};
use crate::infrastructure::store::ConstraintFileStore;

const NUMBER: &str = r"[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?";
const UNIT: &str = r"[^\s,\]]*";

/// `<name>: [<low> <unit>, <high> <unit>]`
static CONSTRAINT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^\s*(?P<name>.+?)\s*:\s*\[\s*(?P<low>{NUMBER})\s*(?P<low_unit>{UNIT})\s*,\s*(?P<high>{NUMBER})\s*(?P<high_unit>{UNIT})\s*\]"
    ))
    .expect("constraint line pattern compiles")
});

/// Parse one artifact. Lines that do not match the grammar, and ranges
/// with `low > high`, are skipped.
pub fn parse_constraint_text(text: &str) -> ConstraintSet {
    let mut set = ConstraintSet::new();
    let mut skipped = 0usize;

    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        let Some(caps) = CONSTRAINT_LINE.captures(line) else {
            skipped += 1;
            continue;
        };
        let (Ok(low), Ok(high)) = (caps["low"].parse::<f64>(), caps["high"].parse::<f64>()) else {
            skipped += 1;
            continue;
        };
        let unit = if caps["low_unit"].is_empty() {
            caps["high_unit"].to_string()
        } else {
            caps["low_unit"].to_string()
        };
        if !set.insert(&caps["name"], ConstraintRange { low, high, unit }) {
            skipped += 1;
        }
    }

    if skipped > 0 {
        debug!(skipped, parsed = set.len(), "skipped malformed constraint lines");
    }
    set
}

#[derive(Debug, Clone)]
struct Accumulated {
    sum_low: f64,
    sum_high: f64,
    count_low: u32,
    count_high: u32,
    unit: String,
}

/// Running per-variable sums, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct ConstraintAccumulator {
    entries: Vec<(String, Accumulated)>,
}

impl ConstraintAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one sample into the running sums.
    pub fn add(&mut self, sample: &ConstraintSet) {
        for (name, range) in sample.iter() {
            match self.entries.iter_mut().find(|(k, _)| k == name) {
                Some((_, acc)) => {
                    if acc.unit != range.unit {
                        warn!(
                            variable = name,
                            expected = %acc.unit,
                            found = %range.unit,
                            "unit mismatch across samples"
                        );
                    }
                    acc.sum_low += range.low;
                    acc.sum_high += range.high;
                    acc.count_low += 1;
                    acc.count_high += 1;
                }
                None => self.entries.push((
                    name.to_string(),
                    Accumulated {
                        sum_low: range.low,
                        sum_high: range.high,
                        count_low: 1,
                        count_high: 1,
                        unit: range.unit.clone(),
                    },
                )),
            }
        }
    }

    /// Means rounded to one decimal place.
    pub fn finish(self) -> AggregatedConstraintSet {
        AggregatedConstraintSet::from_entries(
            self.entries
                .into_iter()
                .map(|(name, acc)| {
                    let low = round_one_decimal(acc.sum_low / f64::from(acc.count_low));
                    let high = round_one_decimal(acc.sum_high / f64::from(acc.count_high));
                    (name, [low, high])
                })
                .collect(),
        )
    }
}

/// Average a batch of samples.
pub fn aggregate<'a, I>(samples: I) -> AggregatedConstraintSet
where
    I: IntoIterator<Item = &'a ConstraintSet>,
{
    let mut acc = ConstraintAccumulator::new();
    for sample in samples {
        acc.add(sample);
    }
    acc.finish()
}

/// Output of an aggregation run.
#[derive(Debug, Clone, Serialize)]
pub struct AggregationReport {
    pub overview: String,
    pub constraints: AggregatedConstraintSet,
    pub artifacts: Vec<PathBuf>,
    pub output_path: PathBuf,
}

impl AggregationReport {
    /// Aggregated artifact text, as written to disk.
    pub fn constraint_text(&self) -> String {
        self.constraints.to_artifact_text()
    }
}

pub struct ConstraintAggregator {
    store: ConstraintFileStore,
}

impl ConstraintAggregator {
    pub const fn new(store: ConstraintFileStore) -> Self {
        Self { store }
    }

    /// Discover, parse and average every constraint artifact, read the process
    /// overview, then write the consensus artifact.
    #[instrument(skip(self))]
    pub async fn run(&self) -> PipelineResult<AggregationReport> {
        let artifacts = self.store.discover_constraint_artifacts().await?;

        let mut acc = ConstraintAccumulator::new();
        for path in &artifacts {
            let text = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| PipelineError::io(path, e))?;
            let sample = parse_constraint_text(&text);
            debug!(path = %path.display(), variables = sample.len(), "parsed constraint artifact");
            acc.add(&sample);
        }

        let constraints = acc.finish();
        if constraints.is_empty() {
            return Err(PipelineError::EmptyAggregation {
                files: artifacts.len(),
            });
        }

        let overview = self.store.read_overview().await?;
        self.store
            .write_aggregated(&constraints.to_artifact_text())
            .await?;

        info!(
            samples = artifacts.len(),
            variables = constraints.len(),
            path = %self.store.aggregated_path().display(),
            "constraints aggregated"
        );

        Ok(AggregationReport {
            overview,
            constraints,
            artifacts,
            output_path: self.store.aggregated_path().to_path_buf(),
        })
    }
}
