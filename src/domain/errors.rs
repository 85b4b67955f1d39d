//! Domain errors for the opsearch pipeline.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::ports::{ChatError, DriverError};

/// Coarse failure category, stable for callers that branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Configuration missing or invalid
    Config,
    /// The LLM agent failed or returned unusable output
    UpstreamResponse,
    /// Artifacts a stage depends on are absent or empty
    MissingData,
    /// The optimization driver did not complete
    Driver,
    /// The conversation trace could not be read
    Trace,
    /// The trace produced no usable candidate
    NoValidCandidate,
    /// Filesystem failure
    Io,
}

/// Pipeline-level errors. Each variant is fatal to the run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid agent output on iteration {iteration}: {reason}")]
    InvalidAgentOutput { iteration: u32, reason: String },

    #[error("LLM request failed on iteration {iteration}: {source}")]
    Llm {
        iteration: u32,
        #[source]
        source: ChatError,
    },

    #[error("No constraint artifacts found in {0}")]
    NoConstraintArtifacts(PathBuf),

    #[error("Process overview not found at {0}")]
    MissingOverview(PathBuf),

    #[error("No parsable constraint lines in {files} constraint artifact(s)")]
    EmptyAggregation { files: usize },

    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error("Failed to read conversation trace {path}: {source}")]
    TraceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed conversation trace {path}: {source}")]
    TraceMalformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No valid candidate found in trace ({metric_messages} metric message(s) seen)")]
    NoValidCandidate { metric_messages: usize },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::InvalidAgentOutput { .. } | Self::Llm { .. } => ErrorKind::UpstreamResponse,
            Self::NoConstraintArtifacts(_)
            | Self::MissingOverview(_)
            | Self::EmptyAggregation { .. } => ErrorKind::MissingData,
            Self::Driver(_) => ErrorKind::Driver,
            Self::TraceUnreadable { .. } | Self::TraceMalformed { .. } => ErrorKind::Trace,
            Self::NoValidCandidate { .. } => ErrorKind::NoValidCandidate,
            Self::Io { .. } => ErrorKind::Io,
        }
    }

    /// Process exit code for this failure
    pub const fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::NoValidCandidate => 2,
            _ => 1,
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
