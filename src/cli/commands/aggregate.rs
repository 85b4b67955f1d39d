//! Implementation of the `opsearch aggregate` command.

use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

use super::{finish_spinner, pipeline_with_spinner};
use crate::cli::output::{format_constraints, output, CommandOutput};
use crate::domain::models::{AggregatedConstraintSet, Config};

#[derive(Debug, Serialize)]
pub struct AggregateOutput {
    pub samples: usize,
    pub output_path: PathBuf,
    pub constraints: AggregatedConstraintSet,
}

impl CommandOutput for AggregateOutput {
    fn to_human(&self) -> String {
        format_constraints(&self.constraints)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(config: Config, json_mode: bool) -> Result<()> {
    let (pipeline, spinner) = pipeline_with_spinner(config, "Aggregating constraints")?;
    let result = pipeline.aggregate().await;
    finish_spinner(&spinner, &result, "Constraints aggregated");
    let report = result?;

    output(
        &AggregateOutput {
            samples: report.artifacts.len(),
            output_path: report.output_path,
            constraints: report.constraints,
        },
        json_mode,
    );
    Ok(())
}
