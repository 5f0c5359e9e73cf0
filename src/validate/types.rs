//! Core types for command validation verdicts.

use serde::{Deserialize, Serialize};

/// Verdict returned by the validator for one candidate command.
///
/// `valid` is derived from `reasons`: a command is valid exactly when no
/// reason was accumulated. `modified_command` is only present when a
/// guardrail substituted an inert suggestion for a dangerous command; it is
/// informational and never executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub valid: bool,
    pub reasons: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_command: Option<String>,
}

impl ValidationResult {
    /// Create a passing result.
    pub fn pass() -> Self {
        Self::from_reasons(Vec::new(), None)
    }

    /// Create a failing result with a single reason.
    pub fn reject(reason: impl Into<String>) -> Self {
        Self::from_reasons(vec![reason.into()], None)
    }

    /// Build a verdict from accumulated reasons.
    pub fn from_reasons(reasons: Vec<String>, modified_command: Option<String>) -> Self {
        Self {
            valid: reasons.is_empty(),
            reasons,
            modified_command,
        }
    }

    /// Format the reasons as a single line for audit records and errors.
    pub fn joined_reasons(&self) -> String {
        self.reasons.join(", ")
    }
}

/// Verb and resource extracted from a command string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandShape {
    /// Normalized verb (`get`, `rollout restart`, ...).
    pub verb: Option<String>,
    /// Singular resource nouns, in command order. A kind list such as
    /// `pod,secret` yields one entry per kind; empty if none was identified.
    pub resources: Vec<String>,
    /// Value of the last namespace flag, if present. The cluster CLI lets the
    /// last flag win.
    pub namespace: Option<String>,
    /// Whether a namespace flag was present at all.
    pub has_namespace_flag: bool,
    /// Number of namespace flags in the command.
    pub namespace_flags: usize,
    /// Whether `-A` / `--all-namespaces` was given.
    pub all_namespaces: bool,
}
