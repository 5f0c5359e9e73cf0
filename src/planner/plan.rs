//! The structured plan produced by the generator.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Keys a generated plan must carry to be accepted.
pub const REQUIRED_KEYS: [&str; 4] = ["intent", "namespace", "command", "summary"];

pub const FALLBACK_INTENT: &str = "unknown";
pub const FALLBACK_NAMESPACE: &str = "default";
pub const FALLBACK_COMMAND: &str = "# Failed to generate valid command";
pub const FALLBACK_SUMMARY: &str = "JSON generation failed";
pub const FALLBACK_ERROR: &str = "Could not parse valid JSON from model output";

/// A candidate command plus metadata, as emitted by the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub intent: String,
    pub namespace: String,

    #[serde(default)]
    pub target: Option<String>,

    #[serde(default)]
    pub selector: Option<String>,

    pub command: String,
    pub summary: String,

    /// Set only on the fallback plan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Extra keys the generator emitted (preserved in responses).
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Plan {
    /// The deterministic plan returned when generation fails twice.
    ///
    /// Its command is a shell comment, so it can never match a permitted
    /// prefix and is always rejected by the validator.
    pub fn fallback() -> Self {
        Self {
            intent: FALLBACK_INTENT.to_string(),
            namespace: FALLBACK_NAMESPACE.to_string(),
            target: None,
            selector: None,
            command: FALLBACK_COMMAND.to_string(),
            summary: FALLBACK_SUMMARY.to_string(),
            error: Some(FALLBACK_ERROR.to_string()),
            extra: BTreeMap::new(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.error.is_some()
    }

    /// Build a plan from an extracted JSON object.
    ///
    /// Returns `None` if a required key is missing or not a string, or if
    /// the command is blank. `target` and `selector` tolerate `null` and
    /// non-string scalars.
    pub fn from_object(object: &serde_json::Map<String, serde_json::Value>) -> Option<Self> {
        let mut required = REQUIRED_KEYS
            .iter()
            .map(|key| object.get(*key).and_then(|v| v.as_str()).map(str::to_string));

        let intent = required.next()??;
        let namespace = required.next()??;
        let command = required.next()??;
        let summary = required.next()??;

        if command.trim().is_empty() {
            return None;
        }

        let extra = object
            .iter()
            .filter(|(key, _)| {
                !matches!(
                    key.as_str(),
                    "intent" | "namespace" | "target" | "selector" | "command" | "summary" | "error"
                )
            })
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Some(Self {
            intent,
            namespace,
            target: optional_text(object.get("target")),
            selector: optional_text(object.get("selector")),
            command: command.trim().to_string(),
            summary,
            error: None,
            extra,
        })
    }
}

fn optional_text(value: Option<&serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) if s.is_empty() => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
