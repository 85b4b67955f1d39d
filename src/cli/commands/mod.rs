//! CLI command implementations.

pub mod aggregate;
pub mod extract;
pub mod optimize;
pub mod run;
pub mod sample;

use anyhow::{Context, Result};
use indicatif::ProgressBar;

use crate::cli::output::progress::{create_spinner_with_message, stage_reporter, ProgressBarExt};
use crate::domain::models::Config;
use crate::domain::PipelineResult;
use crate::services::Pipeline;

/// Build a pipeline whose stage changes drive a stderr spinner.
fn pipeline_with_spinner(config: Config, message: &str) -> Result<(Pipeline, ProgressBar)> {
    let spinner = create_spinner_with_message(message);
    let pipeline = Pipeline::from_config(config)
        .context("Failed to initialize pipeline")?
        .with_progress(stage_reporter(spinner.clone()));
    Ok((pipeline, spinner))
}

fn finish_spinner<T>(spinner: &ProgressBar, result: &PipelineResult<T>, done: &str) {
    match result {
        Ok(_) => spinner.finish_success(done),
        Err(e) => spinner.finish_error(e.to_string()),
    }
}
