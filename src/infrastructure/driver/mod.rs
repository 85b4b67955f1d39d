//! Optimization driver adapters for the [`OptimizationDriver`] port.
//!
//! [`OptimizationDriver`]: crate::domain::ports::OptimizationDriver

pub mod subprocess;

pub use subprocess::{SubprocessDriver, TRACE_PATH_ENV};
