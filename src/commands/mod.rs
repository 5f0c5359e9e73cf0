//! Command implementations for kubegate.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations. Commands write machine-readable output to stdout;
//! diagnostics go through `tracing` to stderr.

mod plan;
mod policy;
mod run;
mod serve;
mod validate_cmd;


pub use run::payload_from_flags;
pub use serve::serve_lines;

use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::error::{KubegateError, Result};
use serde::Serialize;
use std::io::Write;
use tracing::debug;

/// Dispatch a command to its implementation.
///
/// Loads the runtime config first; every command needs it.
pub fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::load_or_default(&cli.config)?;
    debug!(config = %cli.config.display(), policy_dir = %config.policy_dir, "config loaded");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Run(args) => run::cmd_run(&config, args, &mut out),
        Command::Serve(args) => {
            drop(out);
            serve::cmd_serve(&config, args)
        }
        Command::Plan(args) => plan::cmd_plan(&config, args, &mut out),
        Command::Validate(args) => validate_cmd::cmd_validate(&config, args, &mut out),
        Command::Policy => policy::cmd_policy(&config, &mut out),
    }
}

/// Write `value` as JSON followed by a newline and flush.
pub(crate) fn write_json<W: Write + ?Sized, T: Serialize + ?Sized>(
    out: &mut W,
    value: &T,
    pretty: bool,
) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| KubegateError::UserError(format!("failed to serialize output: {}", e)))?;

    writeln!(out, "{}", json)
        .and_then(|_| out.flush())
        .map_err(|e| KubegateError::UserError(format!("failed to write output: {}", e)))
}
