//! Constraint File Store: plain-text artifacts shared between stages.

pub mod constraint_store;

pub use constraint_store::{append_suffix_to_path, artifact_prefix, write_durable, ConstraintFileStore};
