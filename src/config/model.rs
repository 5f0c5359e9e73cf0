//! Config struct definition and default implementation.

use super::types::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Runtime configuration, the contents of `kubegate.yaml`.
///
/// Every field has a default, so an empty or absent file is valid. Relative
/// paths are resolved against the working directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding `rbac-allowlist.yaml` and `namespaces.yaml`.
    #[serde(default = "default_policy_dir")]
    pub policy_dir: String,

    /// Append-only audit log (NDJSON).
    #[serde(default = "default_audit_log")]
    pub audit_log: String,

    pub execution: ExecutionSettings,

    pub retrieval: RetrievalSettings,

    pub generator: GeneratorSettings,

    /// Unknown fields preserved for forward compatibility.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            policy_dir: default_policy_dir(),
            audit_log: default_audit_log(),
            execution: ExecutionSettings::default(),
            retrieval: RetrievalSettings::default(),
            generator: GeneratorSettings::default(),
            extra: BTreeMap::new(),
        }
    }
}
