//! Bounded command execution.
//!
//! This module runs a single command with:
//!
//! - A hard wall-clock timeout with process termination
//! - Captured stdout/stderr, truncated to configured caps
//! - Duration and truncation/timeout reporting
//!
//! The executor never inspects command semantics. Whether a command may run
//! at all is decided by [`crate::validate`] before it gets here.

mod executor;

pub use executor::{
    DEFAULT_MAX_STDERR_CHARS, DEFAULT_MAX_STDOUT_CHARS, DEFAULT_TIMEOUT_SECONDS, ExecLimits,
    ExecutionResult, TRUNCATION_MARKER, execute, run_process, truncate_output,
};
pub(crate) use executor::format_timeout;
