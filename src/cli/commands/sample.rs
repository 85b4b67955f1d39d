//! Implementation of the `opsearch sample` command.

use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

use super::{finish_spinner, pipeline_with_spinner};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;

#[derive(Debug, Serialize)]
pub struct SampleOutput {
    pub overview_path: PathBuf,
    pub constraint_paths: Vec<PathBuf>,
}

impl CommandOutput for SampleOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![format!("Overview    -> {}", self.overview_path.display())];
        lines.extend(
            self.constraint_paths
                .iter()
                .map(|p| format!("Constraints -> {}", p.display())),
        );
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(config: Config, json_mode: bool) -> Result<()> {
    let (pipeline, spinner) = pipeline_with_spinner(config, "Sampling context")?;
    let result = pipeline.sample().await;
    finish_spinner(&spinner, &result, "Context sampled");
    let report = result?;

    output(
        &SampleOutput {
            overview_path: report.overview_path,
            constraint_paths: report.constraint_paths,
        },
        json_mode,
    );
    Ok(())
}
