//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that infrastructure adapters must implement:
//! - ChatClient: single-turn LLM agent requests
//! - OptimizationDriver: the external candidate search loop
//!
//! These traits keep the pipeline services independent of the HTTP client
//! and of how the driver process is launched.

pub mod chat_client;
pub mod optimization_driver;

pub use chat_client::{ChatClient, ChatError};
pub use optimization_driver::{DriverError, OptimizationDriver, OptimizationRequest};
