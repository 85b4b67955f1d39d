//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "opsearch")]
#[command(about = "LLM-guided search for process operating conditions", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the YAML configuration file
    #[arg(short, long, global = true, default_value = "config.yaml")]
    pub config: PathBuf,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the whole pipeline: sample, aggregate, optimize, extract
    Run,

    /// Sample process overviews and constraint ranges from the context agent
    Sample,

    /// Average the sampled constraint artifacts into one consensus set
    Aggregate,

    /// Aggregate, then hand the consensus to the optimization driver
    Optimize,

    /// Report the best candidate recorded in a conversation trace
    Extract(ExtractArgs),
}

#[derive(Args, Debug, Default, PartialEq, Eq)]
pub struct ExtractArgs {
    /// Trace file to read (defaults to optimization.optimization_save_path)
    #[arg(short, long)]
    pub trace: Option<PathBuf>,
}
