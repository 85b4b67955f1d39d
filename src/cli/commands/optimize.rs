//! Implementation of the `opsearch optimize` command.

use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

use super::{finish_spinner, pipeline_with_spinner};
use crate::cli::output::{format_constraints, output, CommandOutput};
use crate::domain::models::{AggregatedConstraintSet, Config};

#[derive(Debug, Serialize)]
pub struct OptimizeOutput {
    pub constraints: AggregatedConstraintSet,
    pub trace_path: PathBuf,
}

impl CommandOutput for OptimizeOutput {
    fn to_human(&self) -> String {
        format!(
            "{}\nTrace written to {}",
            format_constraints(&self.constraints),
            self.trace_path.display()
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(config: Config, json_mode: bool) -> Result<()> {
    let (pipeline, spinner) = pipeline_with_spinner(config, "Aggregating constraints")?;
    let result = pipeline.optimize().await;
    finish_spinner(&spinner, &result, "Optimization finished");
    let (aggregation, trace_path) = result?;

    output(
        &OptimizeOutput {
            constraints: aggregation.constraints,
            trace_path,
        },
        json_mode,
    );
    Ok(())
}
