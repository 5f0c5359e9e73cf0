//! Policy document types and defaults.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Contents of `rbac-allowlist.yaml`.
///
/// Unknown fields are preserved for forward compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RbacAllowlist {
    /// Normalized verbs the validator accepts. Compound verbs are written as
    /// two tokens (`rollout restart`).
    pub allowed_verbs: Vec<String>,

    /// Singular resource nouns the validator accepts.
    #[serde(default)]
    pub allowed_resources: Vec<String>,

    /// Verb+resource pairs that are always rejected.
    #[serde(default)]
    pub forbidden_combinations: Vec<ForbiddenCombination>,

    /// Whether namespaced resources must carry an explicit namespace flag.
    #[serde(default = "default_true")]
    pub namespace_scoped: bool,

    /// Resources exempt from the namespace requirement.
    #[serde(default = "default_cluster_scoped_resources")]
    pub cluster_scoped_resources: Vec<String>,

    /// CLIs whose commands are analysed (cluster CLI, GitOps CLI).
    #[serde(default = "default_command_prefixes")]
    pub command_prefixes: Vec<String>,

    /// Host utility CLIs accepted without verb/resource analysis.
    #[serde(default = "default_passthrough_prefixes")]
    pub passthrough_prefixes: Vec<String>,

    /// Verbs that take a sub-verb and are normalized as a two-token unit.
    #[serde(default = "default_compound_verbs")]
    pub compound_verbs: Vec<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// A verb+resource pair with the justification reported on rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForbiddenCombination {
    pub verb: String,
    pub resource: String,
    pub reason: String,
}

/// Contents of `namespaces.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NamespaceRegistry {
    /// Registered namespaces. Names may be glob patterns (`team-*`).
    pub namespaces: Vec<NamespaceEntry>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// A single namespace registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceEntry {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The loaded, immutable policy owned by the validator.
#[derive(Debug, Clone, Serialize)]
pub struct Policy {
    pub rbac: RbacAllowlist,
    pub registry: NamespaceRegistry,
}

impl Default for RbacAllowlist {
    fn default() -> Self {
        Self {
            allowed_verbs: [
                "get",
                "describe",
                "logs",
                "top",
                "scale",
                "rollout restart",
                "rollout status",
                "cordon",
                "uncordon",
                "drain",
                "reconcile",
                "suspend",
                "resume",
                "config view",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            allowed_resources: [
                "deployment",
                "pod",
                "statefulset",
                "daemonset",
                "node",
                "service",
                "namespace",
                "event",
                "kustomization",
                "job",
                "configmap",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            forbidden_combinations: vec![ForbiddenCombination {
                verb: "delete".to_string(),
                resource: "namespace".to_string(),
                reason: "deleting a namespace destroys every workload inside it".to_string(),
            }],
            namespace_scoped: true,
            cluster_scoped_resources: default_cluster_scoped_resources(),
            command_prefixes: default_command_prefixes(),
            passthrough_prefixes: default_passthrough_prefixes(),
            compound_verbs: default_compound_verbs(),
            extra: BTreeMap::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

pub(crate) fn default_cluster_scoped_resources() -> Vec<String> {
    [
        "node",
        "namespace",
        "persistentvolume",
        "storageclass",
        "clusterrole",
        "clusterrolebinding",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

pub(crate) fn default_command_prefixes() -> Vec<String> {
    vec!["kubectl".to_string(), "flux".to_string()]
}

pub(crate) fn default_passthrough_prefixes() -> Vec<String> {
    vec!["gh".to_string()]
}

pub(crate) fn default_compound_verbs() -> Vec<String> {
    vec!["rollout".to_string(), "config".to_string()]
}
