//! Append-only audit log for kubegate operations.
//!
//! Every executed, simulated or rejected operation produces exactly one
//! NDJSON record (one JSON object per line) in the audit log file, keyed by
//! a unique operation id. The log is never truncated, rotated or rewritten
//! here.
//!
//! # Concurrency
//!
//! Pipeline invocations on different threads share one [`AuditLog`]. Each
//! record is written with a single `write_all` of the complete line while
//! holding the log's mutex, and the file is opened in append mode, so
//! records never interleave.

mod digest;
mod record;

pub use digest::{DEFAULT_DIGEST_CHARS, DIGEST_MARKER, digest};
pub use record::{AuditLevel, AuditRecord};

use crate::error::{KubegateError, Result};
use crate::exec::ExecutionResult;
use crate::planner::Plan;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Generate a unique operation identifier.
pub fn generate_operation_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Handle to the process-wide audit log file.
#[derive(Debug)]
pub struct AuditLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl AuditLog {
    /// Open (or create) the audit log at `path`, creating parent directories.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| {
                KubegateError::ConfigError(format!(
                    "failed to create audit log directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                KubegateError::ConfigError(format!(
                    "failed to open audit log '{}': {}",
                    path.display(),
                    e
                ))
            })?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Path to the audit log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a record to the log.
    pub fn append(&self, record: &AuditRecord) -> Result<()> {
        let mut line = record.to_ndjson_line().map_err(|e| {
            KubegateError::UserError(format!("failed to serialize audit record: {}", e))
        })?;
        line.push('\n');

        let mut file = self.file.lock().unwrap_or_else(|poison| poison.into_inner());

        file.write_all(line.as_bytes()).map_err(|e| {
            KubegateError::UserError(format!(
                "failed to write audit record to '{}': {}",
                self.path.display(),
                e
            ))
        })?;

        file.sync_data().map_err(|e| {
            KubegateError::UserError(format!(
                "failed to sync audit log '{}': {}",
                self.path.display(),
                e
            ))
        })
    }

    /// Record one action. Fire-and-forget: write failures are logged and
    /// swallowed so they never change the operation's outcome.
    pub fn log_action(
        &self,
        operation_id: &str,
        plan: &Plan,
        command: &str,
        result: &ExecutionResult,
        level: AuditLevel,
    ) {
        let record = AuditRecord::new(operation_id, plan, command, result, level);
        if let Err(e) = self.append(&record) {
            warn!(operation_id, error = %e, "failed to append audit record");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn sample_plan() -> Plan {
        Plan {
            intent: "restart".to_string(),
            namespace: "prod".to_string(),
            target: Some("deployment/api".to_string()),
            selector: None,
            command: "kubectl rollout restart deployment/api -n prod".to_string(),
            summary: "Restart api deployment in prod".to_string(),
            error: None,
            extra: Default::default(),
        }
    }

    fn sample_result(stdout: &str) -> ExecutionResult {
        ExecutionResult {
            exit_code: 0,
            stdout: stdout.to_string(),
            stderr: String::new(),
            duration_seconds: 1.23,
            truncated: false,
            timed_out: false,
        }
    }

    fn read_lines(path: &Path) -> Vec<serde_json::Value> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_operation_ids_are_unique() {
        let ids: HashSet<String> = (0..1000).map(|_| generate_operation_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_open_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("logs/nested/agent.log");

        let log = AuditLog::open(&path).unwrap();

        assert!(path.exists());
        assert_eq!(log.path(), path.as_path());
    }

    #[test]
    fn test_log_action_writes_one_line() {
        let temp_dir = TempDir::new().unwrap();
        let log = AuditLog::open(temp_dir.path().join("agent.log")).unwrap();
        let plan = sample_plan();

        log.log_action(
            "op-1",
            &plan,
            &plan.command,
            &sample_result("deployment.apps/api restarted"),
            AuditLevel::Info,
        );

        let content = fs::read_to_string(log.path()).unwrap();
        assert!(content.ends_with('\n'));

        let lines = read_lines(log.path());
        assert_eq!(lines.len(), 1);
        let record = &lines[0];
        assert_eq!(record["level"], "INFO");
        assert_eq!(record["operation_id"], "op-1");
        assert_eq!(record["intent"], "restart");
        assert_eq!(record["namespace"], "prod");
        assert_eq!(record["target"], "deployment/api");
        assert_eq!(record["exit_code"], 0);
        assert_eq!(record["duration"], 1.23);
        assert_eq!(record["stdout_digest"], "deployment.apps/api restarted");
        assert_eq!(record["timeout"], false);
        assert!(record["timestamp"].as_str().unwrap().ends_with('Z'));
        assert!(record["actor"].as_str().unwrap().contains('@'));
    }

    #[test]
    fn test_records_are_appended_not_replaced() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("agent.log");
        let plan = sample_plan();

        {
            let log = AuditLog::open(&path).unwrap();
            log.log_action("op-1", &plan, &plan.command, &sample_result(""), AuditLevel::Info);
        }
        // Reopening must not truncate existing records
        let log = AuditLog::open(&path).unwrap();
        log.log_action("op-2", &plan, &plan.command, &sample_result(""), AuditLevel::Error);

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["operation_id"], "op-1");
        assert_eq!(lines[1]["operation_id"], "op-2");
        assert_eq!(lines[1]["level"], "ERROR");
    }

    #[test]
    fn test_large_output_is_digested() {
        let temp_dir = TempDir::new().unwrap();
        let log = AuditLog::open(temp_dir.path().join("agent.log")).unwrap();
        let plan = sample_plan();
        let big = "x".repeat(5000);

        log.log_action("op-1", &plan, &plan.command, &sample_result(&big), AuditLevel::Info);

        let lines = read_lines(log.path());
        let stored = lines[0]["stdout_digest"].as_str().unwrap();
        assert_eq!(stored, digest(&big, DEFAULT_DIGEST_CHARS));
    }

    #[test]
    fn test_concurrent_appends_do_not_interleave() {
        let temp_dir = TempDir::new().unwrap();
        let log = Arc::new(AuditLog::open(temp_dir.path().join("agent.log")).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let log = Arc::clone(&log);
                std::thread::spawn(move || {
                    let plan = sample_plan();
                    for i in 0..25 {
                        let result = sample_result(&"y".repeat(500));
                        log.log_action(
                            &format!("op-{}-{}", t, i),
                            &plan,
                            &plan.command,
                            &result,
                            AuditLevel::Info,
                        );
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Every line parses on its own and every id appears exactly once
        let lines = read_lines(log.path());
        assert_eq!(lines.len(), 200);
        let ids: HashSet<String> = lines
            .iter()
            .map(|l| l["operation_id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids.len(), 200);
    }

    #[test]
    fn test_audit_level_display_and_serialization() {
        assert_eq!(AuditLevel::Info.to_string(), "INFO");
        assert_eq!(AuditLevel::Warning.to_string(), "WARNING");
        assert_eq!(
            serde_json::to_string(&AuditLevel::Error).unwrap(),
            "\"ERROR\""
        );
    }

    #[test]
    fn test_level_for_result() {
        let mut result = sample_result("");
        assert_eq!(AuditLevel::for_result(&result), AuditLevel::Info);

        result.exit_code = 1;
        assert_eq!(AuditLevel::for_result(&result), AuditLevel::Error);
    }
}
