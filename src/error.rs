//! Error types for kubegate.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for kubegate operations.
///
/// Each variant maps to a specific process exit code. Planning failures have
/// no variant: the planner absorbs them into a fallback plan.
#[derive(Error, Debug)]
pub enum KubegateError {
    /// The request does not match the operation request schema.
    #[error("Invalid input schema: {0}")]
    InputSchema(String),

    /// User provided invalid arguments or an unreadable file.
    #[error("{0}")]
    UserError(String),

    /// Policy documents or runtime config are missing or malformed.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The planned command was rejected by the validator.
    #[error("Validation rejected: {0}")]
    ValidationRejected(String),

    /// The command ran but did not succeed.
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    /// A generation or retrieval backend failed.
    #[error("Collaborator failed: {0}")]
    Collaborator(String),
}

impl KubegateError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            KubegateError::InputSchema(_) => exit_codes::USER_ERROR,
            KubegateError::UserError(_) => exit_codes::USER_ERROR,
            KubegateError::ConfigError(_) => exit_codes::CONFIG_FAILURE,
            KubegateError::ValidationRejected(_) => exit_codes::VALIDATION_FAILURE,
            KubegateError::ExecutionFailed(_) => exit_codes::EXECUTION_FAILURE,
            KubegateError::Collaborator(_) => exit_codes::INTERNAL_ERROR,
        }
    }
}

/// Result type alias for kubegate operations.
pub type Result<T> = std::result::Result<T, KubegateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_schema_error_has_correct_exit_code() {
        let err = KubegateError::InputSchema("missing field `intent`".to_string());
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    }

    #[test]
    fn config_error_has_correct_exit_code() {
        let err = KubegateError::ConfigError("rbac-allowlist.yaml missing".to_string());
        assert_eq!(err.exit_code(), exit_codes::CONFIG_FAILURE);
    }

    #[test]
    fn validation_rejected_has_correct_exit_code() {
        let err = KubegateError::ValidationRejected("verb not allowed".to_string());
        assert_eq!(err.exit_code(), exit_codes::VALIDATION_FAILURE);
    }

    #[test]
    fn execution_failed_has_correct_exit_code() {
        let err = KubegateError::ExecutionFailed("exit code 1".to_string());
        assert_eq!(err.exit_code(), exit_codes::EXECUTION_FAILURE);
    }

    #[test]
    fn collaborator_error_has_correct_exit_code() {
        let err = KubegateError::Collaborator("generator exited 1".to_string());
        assert_eq!(err.exit_code(), exit_codes::INTERNAL_ERROR);
    }

    #[test]
    fn error_messages_are_descriptive() {
        let err = KubegateError::InputSchema("unknown variant `reboot`".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid input schema: unknown variant `reboot`"
        );

        let err = KubegateError::ConfigError("bad yaml".to_string());
        assert_eq!(err.to_string(), "Configuration error: bad yaml");
    }
}
