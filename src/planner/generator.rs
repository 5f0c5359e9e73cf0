//! Text-generation backends.
//!
//! The planner only needs "prompt in, text out". [`CommandGenerator`] drives
//! an external inference program; tests substitute a scripted fake.

use crate::error::{KubegateError, Result};
use crate::exec::{ExecLimits, format_timeout, run_process};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tracing::debug;

use super::template::{TemplateError, render_command};

/// Generator stdout cap; far above what 256 tokens can produce.
const MAX_GENERATION_CHARS: usize = 64 * 1024;

/// Decoding parameters passed to the backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodingConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    pub repetition_penalty: f32,
}

impl DecodingConfig {
    /// Greedy decoding: the same prompt always yields the same text.
    pub const fn deterministic() -> Self {
        Self {
            temperature: 0.0,
            top_p: 1.0,
            max_tokens: 256,
            repetition_penalty: 1.05,
        }
    }
}

/// A text-generation backend.
///
/// Implementations need not be reentrant; the planner serializes calls.
pub trait Generator: Send + Sync {
    fn generate(&mut self, prompt: &str, decoding: &DecodingConfig) -> Result<String>;
}

/// Runs an external program per generation.
///
/// The command template receives the decoding values as `{max_tokens}`,
/// `{temperature}`, `{top_p}` and `{repetition_penalty}`; the prompt is
/// written to the program's stdin and its stdout is the generated text.
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    command: String,
    timeout: Duration,
    environment: HashMap<String, String>,
}

impl CommandGenerator {
    pub fn new(
        command: impl Into<String>,
        timeout: Duration,
        environment: HashMap<String, String>,
    ) -> Self {
        Self {
            command: command.into(),
            timeout,
            environment,
        }
    }

    /// Render the configured template for one call.
    pub fn render(&self, decoding: &DecodingConfig) -> Result<Vec<String>> {
        let variables: BTreeMap<&str, String> = [
            ("max_tokens", decoding.max_tokens.to_string()),
            ("temperature", decoding.temperature.to_string()),
            ("top_p", decoding.top_p.to_string()),
            ("repetition_penalty", decoding.repetition_penalty.to_string()),
        ]
        .into_iter()
        .collect();

        let rendered = render_command(&self.command, &variables)
            .map_err(|e| template_error(&self.command, e))?;

        let args = shell_words::split(&rendered).map_err(|e| {
            KubegateError::ConfigError(format!(
                "generator command '{}' is not a valid command line: {}",
                self.command, e
            ))
        })?;

        if args.is_empty() {
            return Err(KubegateError::ConfigError(
                "generator command is empty".to_string(),
            ));
        }

        Ok(args)
    }
}

impl Generator for CommandGenerator {
    fn generate(&mut self, prompt: &str, decoding: &DecodingConfig) -> Result<String> {
        let args = self.render(decoding)?;
        let limits = ExecLimits {
            timeout: self.timeout,
            max_stdout_chars: MAX_GENERATION_CHARS,
            max_stderr_chars: 2000,
        };

        debug!(program = %args[0], prompt_chars = prompt.chars().count(), "invoking generator");
        let result = run_process(&args, Some(prompt), &self.environment, &limits);

        if result.timed_out {
            return Err(KubegateError::Collaborator(format!(
                "generator '{}' timed out after {}",
                args[0],
                format_timeout(self.timeout)
            )));
        }
        if !result.is_success() {
            return Err(KubegateError::Collaborator(format!(
                "generator '{}' exited with code {}: {}",
                args[0],
                result.exit_code,
                result.stderr.trim()
            )));
        }

        Ok(result.stdout)
    }
}

fn template_error(template: &str, error: TemplateError) -> KubegateError {
    KubegateError::ConfigError(format!(
        "generator command template '{}' is invalid: {}",
        template, error
    ))
}
