//! Exit code constants for the kubegate CLI.
//!
//! - 0: Success (executed, dry run, or awaiting confirmation)
//! - 1: User error (bad args, malformed request)
//! - 2: Validation rejection (policy violation)
//! - 3: Execution failure (non-zero exit or timeout)
//! - 4: Configuration failure (missing or malformed policy/config)
//! - 5: Internal error (generation or retrieval backend failed)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments or a request that does not match the schema.
pub const USER_ERROR: i32 = 1;

/// The planned command was rejected by the validator.
pub const VALIDATION_FAILURE: i32 = 2;

/// The command ran but exited non-zero, timed out, or could not be spawned.
pub const EXECUTION_FAILURE: i32 = 3;

/// Policy or runtime configuration could not be loaded.
pub const CONFIG_FAILURE: i32 = 4;

/// A collaborator (generator or search backend) failed.
pub const INTERNAL_ERROR: i32 = 5;
