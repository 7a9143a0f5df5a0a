//! CLI command implementations.

pub mod append;
pub mod delete;
pub mod query;
pub mod stats;
