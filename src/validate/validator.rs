//! Rule-based command validator and guardrail engine.

use super::parse::extract_shape;
use super::types::{CommandShape, ValidationResult};
use crate::error::Result;
use crate::policy::Policy;
use globset::GlobSet;
use tracing::debug;

/// A dangerous verb+resource pair that is rewritten into an inert suggestion
/// instead of being executed.
#[derive(Debug, Clone, Copy)]
pub struct Guardrail {
    pub verb: &'static str,
    pub resource: &'static str,
    pub suggestion: &'static str,
}

/// Deleting a single pod only triggers an uncontrolled reschedule; a rolling
/// restart of the owning workload is the safe equivalent.
pub const GUARDRAILS: &[Guardrail] = &[Guardrail {
    verb: "delete",
    resource: "pod",
    suggestion: "rollout restart deployment",
}];

/// Validates candidate commands against the loaded policy.
///
/// The policy is loaded once at construction and is immutable afterwards;
/// reloading means building a new validator.
#[derive(Debug)]
pub struct CommandValidator {
    policy: Policy,
    registry: GlobSet,
}

impl CommandValidator {
    /// Create a validator that owns the given policy.
    pub fn new(policy: Policy) -> Result<Self> {
        let registry = policy.registry.globset()?;
        Ok(Self { policy, registry })
    }

    /// The policy this validator enforces.
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Validate a command.
    ///
    /// Checks accumulate rather than short-circuit (except for an unknown
    /// command prefix), so one pass may report several reasons. Reasons are
    /// returned in a fixed order: verb, resource, namespace scope, repeated
    /// or all-namespaces flags, namespace mismatch, namespace registry,
    /// forbidden combinations, guardrail.
    ///
    /// # Arguments
    ///
    /// * `command` - The candidate command
    /// * `namespace` - Namespace the request targets, if known
    pub fn validate(&self, command: &str, namespace: Option<&str>) -> ValidationResult {
        let rbac = &self.policy.rbac;
        let command = command.trim();
        let prefix = command.split_whitespace().next().unwrap_or_default();

        if rbac.passthrough_prefixes.iter().any(|p| p == prefix) {
            debug!(prefix, "passthrough command accepted without analysis");
            return ValidationResult::pass();
        }

        if !rbac.command_prefixes.iter().any(|p| p == prefix) {
            let allowed: Vec<String> = rbac
                .command_prefixes
                .iter()
                .chain(rbac.passthrough_prefixes.iter())
                .map(|p| format!("'{}'", p))
                .collect();
            return ValidationResult::reject(format!(
                "Command must start with one of the allowed prefixes: {}",
                allowed.join(", ")
            ));
        }

        let shape = extract_shape(command, &rbac.compound_verbs);
        debug!(verb = ?shape.verb, resources = ?shape.resources, "extracted command shape");

        let mut reasons = Vec::new();

        if let Some(verb) = &shape.verb
            && !rbac.allowed_verbs.contains(verb)
        {
            reasons.push(format!(
                "Verb '{}' not in allowlist: [{}]",
                verb,
                rbac.allowed_verbs.join(", ")
            ));
        }

        for resource in &shape.resources {
            if !rbac.allowed_resources.contains(resource) {
                reasons.push(format!(
                    "Resource '{}' not in allowlist: [{}]",
                    resource,
                    rbac.allowed_resources.join(", ")
                ));
            }
        }

        self.check_namespace(&shape, namespace, &mut reasons);

        if let Some(verb) = &shape.verb {
            for forbidden in &rbac.forbidden_combinations {
                if &forbidden.verb == verb && shape.resources.contains(&forbidden.resource) {
                    reasons.push(format!("Forbidden: {}", forbidden.reason));
                }
            }
        }

        let modified_command = apply_guardrails(command, &shape, &mut reasons);

        ValidationResult::from_reasons(reasons, modified_command)
    }

    fn check_namespace(
        &self,
        shape: &CommandShape,
        expected: Option<&str>,
        reasons: &mut Vec<String>,
    ) {
        let rbac = &self.policy.rbac;
        // Every listed kind must be cluster-scoped for the exemption to apply
        let cluster_scoped = !shape.resources.is_empty()
            && shape
                .resources
                .iter()
                .all(|r| rbac.cluster_scoped_resources.contains(r));

        if rbac.namespace_scoped && !shape.has_namespace_flag && !cluster_scoped {
            reasons.push("Command must include namespace (-n or --namespace)".to_string());
        }

        if shape.namespace_flags > 1 {
            reasons.push(format!(
                "Command must not repeat the namespace flag ({} given)",
                shape.namespace_flags
            ));
        }

        if shape.all_namespaces && (shape.has_namespace_flag || !cluster_scoped) {
            reasons.push(
                "Command must not target all namespaces (-A or --all-namespaces)".to_string(),
            );
        }

        if let (Some(actual), Some(expected)) = (shape.namespace.as_deref(), expected)
            && actual != expected
        {
            reasons.push(format!(
                "Command targets namespace '{}' but the request is scoped to '{}'",
                actual, expected
            ));
        }

        if !self.policy.registry.is_empty()
            && let Some(ns) = shape.namespace.as_deref()
            && !self.registry.is_match(ns)
        {
            reasons.push(format!(
                "Namespace '{}' is not registered in namespaces.yaml",
                ns
            ));
        }
    }
}

/// Rewrite guarded commands into an inert comment. The reason is always
/// recorded so the command is never considered valid.
fn apply_guardrails(
    command: &str,
    shape: &CommandShape,
    reasons: &mut Vec<String>,
) -> Option<String> {
    let verb = shape.verb.as_deref()?;
    let guard = GUARDRAILS
        .iter()
        .find(|g| g.verb == verb && shape.resources.iter().any(|r| r == g.resource))?;

    reasons.push(format!(
        "Replaced '{} {}' with safer alternative suggestion",
        guard.verb, guard.resource
    ));
    Some(format!(
        "# BLOCKED: Use '{}' instead of: {}",
        guard.suggestion, command
    ))
}
