//! `kubegate validate`: check one command against the policy.

use crate::cli::ValidateArgs;
use crate::config::Config;
use crate::error::{KubegateError, Result};
use crate::policy::Policy;
use crate::validate::CommandValidator;
use std::io::Write;

use super::write_json;

/// Print the verdict for a command; an invalid command is an error.
pub fn cmd_validate(config: &Config, args: ValidateArgs, out: &mut dyn Write) -> Result<()> {
    let validator = CommandValidator::new(Policy::load(&config.policy_dir)?)?;
    let verdict = validator.validate(&args.command, args.namespace.as_deref());
    write_json(out, &verdict, true)?;

    if verdict.valid {
        Ok(())
    } else {
        Err(KubegateError::ValidationRejected(verdict.joined_reasons()))
    }
}
