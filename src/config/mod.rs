//! Runtime configuration for kubegate.
//!
//! This module defines the Config struct that represents `kubegate.yaml`.
//! It supports forward-compatible YAML parsing (unknown fields are kept),
//! defaults for every field, and validation of config values.

mod model;
mod operations;
pub mod types;

#[cfg(test)]
mod tests;

pub use model::Config;
pub use operations::DEFAULT_CONFIG_FILE;
pub use types::{ExecutionSettings, GeneratorSettings, RetrievalSettings};
