//! Search backend driven by an external program.

use crate::error::{KubegateError, Result};
use crate::exec::{ExecLimits, run_process};
use crate::planner::render_command;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use super::snippet::{Snippet, SnippetIndex};

/// Search output cap in characters.
const MAX_SEARCH_OUTPUT_CHARS: usize = 1024 * 1024;

/// Runs a configured search command per query.
///
/// The template receives `{query}` and `{k}` (shell-quoted). The program must
/// print a JSON array of hits on stdout, best first.
#[derive(Debug, Clone)]
pub struct CommandIndex {
    command: String,
    timeout: Duration,
}

impl CommandIndex {
    pub fn new(command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            timeout,
        }
    }

    fn render(&self, query: &str, k: usize) -> Result<Vec<String>> {
        let variables: BTreeMap<&str, String> =
            [("query", query.to_string()), ("k", k.to_string())]
                .into_iter()
                .collect();

        let rendered = render_command(&self.command, &variables).map_err(|e| {
            KubegateError::ConfigError(format!(
                "retrieval command template '{}' is invalid: {}",
                self.command, e
            ))
        })?;

        shell_words::split(&rendered).map_err(|e| {
            KubegateError::ConfigError(format!(
                "retrieval command '{}' is not a valid command line: {}",
                self.command, e
            ))
        })
    }
}

impl SnippetIndex for CommandIndex {
    fn semantic_search(&self, query: &str, k: usize) -> Result<Vec<Snippet>> {
        let args = self.render(query, k)?;
        let limits = ExecLimits {
            timeout: self.timeout,
            max_stdout_chars: MAX_SEARCH_OUTPUT_CHARS,
            max_stderr_chars: 2000,
        };

        let result = run_process(&args, None, &HashMap::new(), &limits);
        if !result.is_success() {
            return Err(KubegateError::Collaborator(format!(
                "retrieval command exited with code {}: {}",
                result.exit_code,
                result.stderr.trim()
            )));
        }
        if result.truncated {
            return Err(KubegateError::Collaborator(
                "retrieval command output exceeded the size limit".to_string(),
            ));
        }

        let mut hits: Vec<Snippet> = serde_json::from_str(result.stdout.trim()).map_err(|e| {
            KubegateError::Collaborator(format!(
                "retrieval command printed invalid hits JSON: {}",
                e
            ))
        })?;
        hits.truncate(k);
        Ok(hits)
    }
}
