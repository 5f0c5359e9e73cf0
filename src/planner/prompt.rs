//! Deterministic prompt assembly.

use serde::{Deserialize, Serialize};

/// Fixed preamble naming the output keys and the permitted verbs.
pub const SYSTEM_PROMPT: &str = r#"You are a Kubernetes command generator. Output ONLY valid JSON.

Required keys: intent, namespace, target, selector, command, summary
Allowed verbs: get, describe, logs, scale, rollout restart, cordon, drain, uncordon
Always include -n <namespace> for namespaced resources.

Example:
{"intent": "restart", "namespace": "prod", "target": "api", "selector": null, "command": "kubectl rollout restart deployment/api -n prod", "summary": "Restart deployment api in prod"}"#;

/// Placeholder used when retrieval produced nothing.
pub const NO_CONTEXT: &str = "(no context)";

/// Correction appended to the prompt for the single retry.
pub const RETRY_SUFFIX: &str = "\n\nYour last output was invalid. Output ONLY this JSON structure:\n{\"intent\": \"...\", \"namespace\": \"...\", \"target\": \"...\", \"selector\": null, \"command\": \"...\", \"summary\": \"...\"}";

/// What the operator asked for, in the vocabulary of the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanGoal {
    pub intent: String,
    pub resource: String,
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub selector: Option<String>,
}

impl PlanGoal {
    /// One-sentence goal line of the prompt.
    pub fn sentence(&self) -> String {
        let mut line = format!(
            "User goal: {} {} '{}' in namespace '{}'",
            self.intent, self.resource, self.name, self.namespace
        );
        if let Some(selector) = self.selector.as_deref().filter(|s| !s.is_empty()) {
            line.push_str(&format!(" with selector '{selector}'"));
        }
        line
    }
}

/// Build the first-attempt prompt.
///
/// # Arguments
///
/// * `goal` - The requested operation
/// * `context` - Rendered retrieval snippets; blank means none
pub fn build_prompt(goal: &PlanGoal, context: &str) -> String {
    let context = if context.trim().is_empty() {
        NO_CONTEXT
    } else {
        context
    };

    [
        SYSTEM_PROMPT,
        "",
        "Context:",
        context,
        "",
        &goal.sentence(),
        "",
        "JSON:",
    ]
    .join("\n")
}

/// Build the corrective prompt for the retry.
pub fn build_retry_prompt(goal: &PlanGoal, context: &str) -> String {
    build_prompt(goal, context) + RETRY_SUFFIX
}
