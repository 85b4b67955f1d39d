//! Command-line interface.

pub mod commands;
pub mod output;
pub mod types;

pub use types::{Cli, Commands, ExtractArgs};

use crate::domain::models::Config;
use crate::domain::PipelineError;

/// Run the selected command against a loaded configuration.
pub async fn dispatch(command: Commands, config: Config, json_mode: bool) -> anyhow::Result<()> {
    match command {
        Commands::Run => commands::run::execute(config, json_mode).await,
        Commands::Sample => commands::sample::execute(config, json_mode).await,
        Commands::Aggregate => commands::aggregate::execute(config, json_mode).await,
        Commands::Optimize => commands::optimize::execute(config, json_mode).await,
        Commands::Extract(args) => commands::extract::execute(args, config, json_mode).await,
    }
}

/// Process exit code for a failed command.
///
/// `NoValidCandidate` maps to 2; every other failure maps to 1.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<PipelineError>()
        .map_or(1, PipelineError::exit_code)
}

/// Report a fatal error on stderr.
pub fn report_error(err: &anyhow::Error, json_mode: bool) {
    if json_mode {
        let kind = err
            .downcast_ref::<PipelineError>()
            .map(|e| format!("{:?}", e.kind()));
        let body = serde_json::json!({
            "error": format!("{err:#}"),
            "kind": kind,
            "exit_code": exit_code(err),
        });
        eprintln!("{body}");
    } else {
        eprintln!("Error: {err:#}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_exit_code_sees_through_context() {
        let err = anyhow::Error::new(PipelineError::NoValidCandidate { metric_messages: 4 })
            .context("extract failed");
        assert_eq!(exit_code(&err), 2);

        let err = anyhow::Error::new(PipelineError::MissingOverview(PathBuf::from("x")));
        assert_eq!(exit_code(&err), 1);

        assert_eq!(exit_code(&anyhow::anyhow!("anything else")), 1);
    }
}
