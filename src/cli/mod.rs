//! CLI argument parsing for kubegate.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Kubegate: plan, validate, gate, execute and audit cluster operations.
///
/// An operator intent is turned into a cluster command by a language model,
/// checked against a declarative allow-list policy, optionally held for
/// confirmation or simulated, executed under a hard timeout, and recorded in
/// an append-only audit log.
#[derive(Parser, Debug)]
#[command(name = "kubegate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the runtime config file (defaults apply if it does not exist).
    #[arg(long, global = true, default_value = "kubegate.yaml")]
    pub config: PathBuf,

    /// Enable debug logging on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for kubegate.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one operation request through the full pipeline.
    ///
    /// The request comes from a JSON file (`--payload`) or from flags.
    /// Prints the response JSON on stdout.
    Run(RunArgs),

    /// Serve NDJSON requests from stdin, one response line per request.
    ///
    /// Requests are processed on a pool of worker threads sharing one
    /// generator and one audit log.
    Serve(ServeArgs),

    /// Generate a plan without validating or executing it.
    Plan(PlanArgs),

    /// Validate a command against the policy without planning or executing.
    Validate(ValidateArgs),

    /// Load and print the effective policy.
    Policy,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// JSON request file ('-' reads stdin). Conflicts with request flags.
    #[arg(long, conflicts_with_all = ["intent", "resource", "namespace", "name", "selector", "confirm", "dry_run"])]
    pub payload: Option<PathBuf>,

    #[command(flatten)]
    pub request: RequestArgs,

    /// Halt before execution and ask for explicit confirmation.
    #[arg(long)]
    pub confirm: bool,

    /// Simulate execution without running the command.
    #[arg(long)]
    pub dry_run: bool,
}

/// Request fields shared by `run` and `plan`.
#[derive(Args, Debug, Default)]
pub struct RequestArgs {
    /// Operation kind (restart, scale, logs, status, ...).
    #[arg(long)]
    pub intent: Option<String>,

    /// Resource type (deployment, pod, node, ...).
    #[arg(long)]
    pub resource: Option<String>,

    /// Target namespace.
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Target object name.
    #[arg(long)]
    pub name: Option<String>,

    /// Label selector.
    #[arg(long)]
    pub selector: Option<String>,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Number of worker threads.
    #[arg(long, default_value_t = 4)]
    pub workers: usize,
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// File whose contents are used as retrieval context instead of the
    /// configured search backend.
    #[arg(long)]
    pub context_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// The candidate command.
    pub command: String,

    /// Namespace the command is expected to target.
    #[arg(short, long)]
    pub namespace: Option<String>,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
