//! Infrastructure layer module
//!
//! This module contains all infrastructure adapters and external integrations:
//! - Configuration management
//! - Logging infrastructure
//! - OpenAI-compatible chat client
//! - Optimization driver process management
//! - Constraint file store
//!
//! Infrastructure implementations satisfy the port traits defined in the domain layer.

pub mod config;
pub mod driver;
pub mod llm;
pub mod logging;
pub mod store;
