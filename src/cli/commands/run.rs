//! Implementation of the `opsearch run` command.

use anyhow::Result;
use serde::Serialize;

use super::{finish_spinner, pipeline_with_spinner};
use crate::cli::output::{format_best, format_constraints, output, CommandOutput};
use crate::domain::models::Config;
use crate::services::PipelineReport;

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct RunOutput {
    pub report: PipelineReport,
}

// The averaged constraints are printed as soon as aggregation finishes, so
// the human form only carries the best result.
impl CommandOutput for RunOutput {
    fn to_human(&self) -> String {
        format_best(self.report.metric, &self.report.best)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(config: Config, json_mode: bool) -> Result<()> {
    let (pipeline, spinner) = pipeline_with_spinner(config, "Starting pipeline")?;
    let result = pipeline
        .run_with(|constraints| {
            if !json_mode {
                spinner.suspend(|| println!("{}", format_constraints(constraints)));
            }
        })
        .await;
    finish_spinner(&spinner, &result, "Pipeline finished");

    output(&RunOutput { report: result? }, json_mode);
    Ok(())
}
