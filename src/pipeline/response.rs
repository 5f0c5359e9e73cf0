//! Response payloads returned by the pipeline.

use crate::audit::{DEFAULT_DIGEST_CHARS, digest};
use crate::error::KubegateError;
use crate::exec::ExecutionResult;
use crate::exit_codes;
use crate::planner::Plan;
use crate::validate::ValidationResult;
use serde::{Deserialize, Serialize};

/// Message attached to responses halted at the confirmation gate.
pub const CONFIRMATION_MESSAGE: &str = "Command requires explicit confirmation before execution";

pub const INVALID_INPUT: &str = "Invalid input schema";
pub const INTERNAL_ERROR: &str = "Internal error";

/// Where an operation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Rejected,
    AwaitingConfirmation,
    DryRun,
    Executed,
}

/// Bounded execution summary. Output is only ever reported as digests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummary {
    pub exit_code: i32,
    pub stdout_digest: String,
    pub stderr_digest: String,
    pub duration_seconds: f64,
    pub truncated: bool,
    pub timed_out: bool,
    pub dry_run: bool,
}

impl ResultSummary {
    pub fn new(result: &ExecutionResult, dry_run: bool) -> Self {
        Self {
            exit_code: result.exit_code,
            stdout_digest: digest(&result.stdout, DEFAULT_DIGEST_CHARS),
            stderr_digest: digest(&result.stderr, DEFAULT_DIGEST_CHARS),
            duration_seconds: result.duration_seconds,
            truncated: result.truncated,
            timed_out: result.timed_out,
            dry_run,
        }
    }
}

/// Response for a request that got an operation id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResponse {
    pub operation_id: String,
    pub plan: Plan,
    pub validation: ValidationResult,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Null unless the command ran (or was simulated).
    pub result: Option<ResultSummary>,
}

/// Response for a request that failed before or outside the state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureResponse {
    pub error: String,
    pub details: String,
}

/// Either an operation outcome or an error payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PipelineResponse {
    Operation(OperationResponse),
    Failure(FailureResponse),
}

impl PipelineResponse {
    pub fn invalid_input(error: &KubegateError) -> Self {
        Self::failure(INVALID_INPUT, error)
    }

    pub fn internal_error(error: &KubegateError) -> Self {
        Self::failure(INTERNAL_ERROR, error)
    }

    fn failure(kind: &str, error: &KubegateError) -> Self {
        let details = match error {
            KubegateError::InputSchema(details)
            | KubegateError::UserError(details)
            | KubegateError::ConfigError(details)
            | KubegateError::ValidationRejected(details)
            | KubegateError::ExecutionFailed(details)
            | KubegateError::Collaborator(details) => details.clone(),
        };
        PipelineResponse::Failure(FailureResponse {
            error: kind.to_string(),
            details,
        })
    }

    pub fn operation(&self) -> Option<&OperationResponse> {
        match self {
            PipelineResponse::Operation(op) => Some(op),
            PipelineResponse::Failure(_) => None,
        }
    }

    /// The error a CLI front-end should report for this response, if any.
    ///
    /// Rejections, failed executions and error payloads map onto the crate
    /// error variants so they carry the matching exit codes.
    pub fn to_error(&self) -> Option<KubegateError> {
        match self {
            PipelineResponse::Failure(failure) if failure.error == INVALID_INPUT => {
                Some(KubegateError::InputSchema(failure.details.clone()))
            }
            PipelineResponse::Failure(failure) => {
                Some(KubegateError::Collaborator(failure.details.clone()))
            }
            PipelineResponse::Operation(op) => match (op.status, &op.result) {
                (Status::Rejected, _) => Some(KubegateError::ValidationRejected(
                    op.validation.joined_reasons(),
                )),
                (Status::Executed, Some(result)) if result.timed_out => Some(
                    KubegateError::ExecutionFailed(format!("'{}' timed out", op.plan.command)),
                ),
                (Status::Executed, Some(result)) if result.exit_code != 0 => {
                    Some(KubegateError::ExecutionFailed(format!(
                        "'{}' exited with code {}",
                        op.plan.command, result.exit_code
                    )))
                }
                _ => None,
            },
        }
    }

    /// Process exit code for this response.
    pub fn exit_code(&self) -> i32 {
        self.to_error()
            .map_or(exit_codes::SUCCESS, |error| error.exit_code())
    }
}
