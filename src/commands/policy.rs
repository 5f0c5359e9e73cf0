//! `kubegate policy`: print the effective policy.

use crate::config::Config;
use crate::error::{KubegateError, Result};
use crate::policy::Policy;
use std::io::Write;

/// Load the policy (failing exactly as startup would) and print it as YAML.
pub fn cmd_policy(config: &Config, out: &mut dyn Write) -> Result<()> {
    let policy = Policy::load(&config.policy_dir)?;
    let yaml = serde_yaml::to_string(&policy)
        .map_err(|e| KubegateError::UserError(format!("failed to serialize policy: {}", e)))?;

    writeln!(out, "# policy loaded from {}", config.policy_dir)
        .and_then(|_| out.write_all(yaml.as_bytes()))
        .map_err(|e| KubegateError::UserError(format!("failed to write output: {}", e)))
}
