//! Audit record schema.

use crate::exec::ExecutionResult;
use crate::planner::Plan;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::digest::{DEFAULT_DIGEST_CHARS, digest};

/// Severity of an audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditLevel {
    Info,
    Warning,
    Error,
}

impl AuditLevel {
    /// INFO for a clean exit, ERROR otherwise.
    pub fn for_result(result: &ExecutionResult) -> Self {
        if result.is_success() {
            AuditLevel::Info
        } else {
            AuditLevel::Error
        }
    }
}

impl std::fmt::Display for AuditLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditLevel::Info => write!(f, "INFO"),
            AuditLevel::Warning => write!(f, "WARNING"),
            AuditLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// One line of the audit log.
///
/// Records are serialized as single-line JSON objects. Output is stored as
/// head/tail digests, never in full.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    /// UTC timestamp (RFC 3339 / ISO-8601).
    pub timestamp: DateTime<Utc>,
    pub level: AuditLevel,
    pub operation_id: String,
    pub intent: String,
    pub namespace: String,
    pub target: Option<String>,
    pub command: String,
    pub exit_code: i32,
    /// Wall-clock seconds.
    pub duration: f64,
    pub stdout_digest: String,
    pub stderr_digest: String,
    pub truncated: bool,
    pub timeout: bool,
    /// `user@host` of the process that ran the pipeline.
    pub actor: String,
}

impl AuditRecord {
    /// Build a record for one executed or rejected operation.
    pub fn new(
        operation_id: &str,
        plan: &Plan,
        command: &str,
        result: &ExecutionResult,
        level: AuditLevel,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            operation_id: operation_id.to_string(),
            intent: plan.intent.clone(),
            namespace: plan.namespace.clone(),
            target: plan.target.clone(),
            command: command.to_string(),
            exit_code: result.exit_code,
            duration: result.duration_seconds,
            stdout_digest: digest(&result.stdout, DEFAULT_DIGEST_CHARS),
            stderr_digest: digest(&result.stderr, DEFAULT_DIGEST_CHARS),
            truncated: result.truncated,
            timeout: result.timed_out,
            actor: actor_string(),
        }
    }

    /// Serialize the record to a single-line JSON string.
    pub fn to_ndjson_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Get the actor string for audit metadata.
fn actor_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}
