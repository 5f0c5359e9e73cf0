//! Configuration sections and defaults.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Bounds applied to every executed cluster command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionSettings {
    /// Hard wall-clock timeout per command.
    pub timeout_seconds: u64,

    /// Stdout cap in characters.
    pub max_stdout_chars: usize,

    /// Stderr cap in characters.
    pub max_stderr_chars: usize,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: default_exec_timeout_seconds(),
            max_stdout_chars: default_max_stdout_chars(),
            max_stderr_chars: default_max_stderr_chars(),
        }
    }
}

/// External search backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Snippets handed to the planner.
    pub k: usize,

    /// Below this many filtered hits, unfiltered hits are used.
    pub min_filtered_hits: usize,

    /// Search command template with `{query}` and `{k}` placeholders.
    /// When unset, no retrieval is performed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Timeout for one search command.
    pub timeout_seconds: u64,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            k: default_retrieval_k(),
            min_filtered_hits: default_min_filtered_hits(),
            command: None,
            timeout_seconds: default_retrieval_timeout_seconds(),
            extra: BTreeMap::new(),
        }
    }
}

/// External generation backend settings.
///
/// Decoding parameters are fixed by the planner and are deliberately absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    /// Generation command template. Placeholders: `{max_tokens}`,
    /// `{temperature}`, `{top_p}`, `{repetition_penalty}`. The prompt is
    /// written to stdin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Timeout for one generation call.
    pub timeout_seconds: u64,

    /// Extra environment variables for the generator process.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub environment: HashMap<String, String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            command: None,
            timeout_seconds: default_generator_timeout_seconds(),
            environment: HashMap::new(),
            extra: BTreeMap::new(),
        }
    }
}

// Default value functions for serde
pub(crate) fn default_policy_dir() -> String {
    "org".to_string()
}
pub(crate) fn default_audit_log() -> String {
    "logs/agent.log".to_string()
}
pub(crate) fn default_exec_timeout_seconds() -> u64 {
    15
}
pub(crate) fn default_max_stdout_chars() -> usize {
    4000
}
pub(crate) fn default_max_stderr_chars() -> usize {
    2000
}
pub(crate) fn default_retrieval_k() -> usize {
    4
}
pub(crate) fn default_min_filtered_hits() -> usize {
    2
}
pub(crate) fn default_retrieval_timeout_seconds() -> u64 {
    30
}
pub(crate) fn default_generator_timeout_seconds() -> u64 {
    120
}
