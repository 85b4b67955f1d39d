//! Implementation of the `opsearch extract` command.

use anyhow::Result;
use serde::Serialize;

use super::{finish_spinner, pipeline_with_spinner};
use crate::cli::output::{format_best, output, CommandOutput};
use crate::cli::types::ExtractArgs;
use crate::domain::models::{CandidateResult, Config, ExtractionStats, OptimizationMetric};

#[derive(Debug, Serialize)]
pub struct ExtractOutput {
    pub metric: OptimizationMetric,
    pub best: CandidateResult,
    pub stats: ExtractionStats,
}

impl CommandOutput for ExtractOutput {
    fn to_human(&self) -> String {
        format_best(self.metric, &self.best)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: ExtractArgs, config: Config, json_mode: bool) -> Result<()> {
    let metric = config.optimization.optimization_metric;
    let (pipeline, spinner) = pipeline_with_spinner(config, "Extracting best result")?;
    let result = pipeline
        .extract(args.trace.as_deref())
        .await
        .and_then(|outcome| {
            let stats = outcome.stats;
            outcome.into_best().map(|best| (best, stats))
        });
    finish_spinner(&spinner, &result, "Best result extracted");
    let (best, stats) = result?;

    output(&ExtractOutput { metric, best, stats }, json_mode);
    Ok(())
}
