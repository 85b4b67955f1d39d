//! Spinner utilities using indicatif for stage progress on stderr

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::services::Stage;

const SPINNER_TEMPLATE: &str = "[{elapsed_precise}] {spinner:.green} {msg}";
const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Create a spinner for indeterminate operations
pub fn create_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    // The template is a constant; fall back to the default style if it is ever rejected.
    let style = ProgressStyle::default_spinner()
        .template(SPINNER_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars(SPINNER_CHARS);
    spinner.set_style(style);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Create a spinner with a custom message
pub fn create_spinner_with_message(message: impl Into<String>) -> ProgressBar {
    let spinner = create_spinner();
    spinner.set_message(message.into());
    spinner
}

/// Extension trait for ProgressBar to add common utility methods
pub trait ProgressBarExt {
    /// Finish with a success message (green checkmark)
    fn finish_success(&self, message: impl Into<String>);

    /// Finish with an error message (red X)
    fn finish_error(&self, message: impl Into<String>);
}

impl ProgressBarExt for ProgressBar {
    fn finish_success(&self, message: impl Into<String>) {
        self.finish_with_message(format!("✓ {}", message.into()));
    }

    fn finish_error(&self, message: impl Into<String>) {
        self.finish_with_message(format!("✗ {}", message.into()));
    }
}

/// Spinner message for a pipeline stage
pub fn stage_message(stage: Stage) -> String {
    match stage {
        Stage::Sampling { iteration, total } => format!("Sampling context ({iteration}/{total})"),
        Stage::Aggregating => "Aggregating constraints".to_string(),
        Stage::Optimizing => "Running optimization driver".to_string(),
        Stage::Extracting => "Extracting best result".to_string(),
    }
}

/// Callback that mirrors pipeline stages onto `spinner`
pub fn stage_reporter(spinner: ProgressBar) -> impl Fn(Stage) + Send + Sync + 'static {
    move |stage| spinner.set_message(stage_message(stage))
}
