//! Command validation for kubegate.
//!
//! This module decides whether a planned command may run:
//! - Prefix check: only the cluster CLI, the GitOps CLI and passthrough
//!   utilities are considered at all
//! - Allow-lists: the normalized verb and resource must be permitted
//! - Namespace scoping: namespaced resources need an explicit namespace
//! - Forbidden combinations and guardrail rewrites

mod parse;
mod types;
mod validator;

#[cfg(test)]
mod tests;

pub use parse::{extract_shape, normalize_resource};
pub use types::{CommandShape, ValidationResult};
pub use validator::{CommandValidator, GUARDRAILS, Guardrail};
