//! Operation request schema.

use crate::error::{KubegateError, Result};
use crate::planner::PlanGoal;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Closed vocabulary of operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Intent {
    Diagnose,
    Restart,
    Scale,
    Logs,
    Status,
    Describe,
    Events,
    Top,
    Cordon,
    Uncordon,
    Drain,
    FluxReconcile,
    FluxSuspend,
    FluxResume,
    FluxStatus,
    JobRestart,
    ConfigView,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Diagnose => "diagnose",
            Intent::Restart => "restart",
            Intent::Scale => "scale",
            Intent::Logs => "logs",
            Intent::Status => "status",
            Intent::Describe => "describe",
            Intent::Events => "events",
            Intent::Top => "top",
            Intent::Cordon => "cordon",
            Intent::Uncordon => "uncordon",
            Intent::Drain => "drain",
            Intent::FluxReconcile => "flux-reconcile",
            Intent::FluxSuspend => "flux-suspend",
            Intent::FluxResume => "flux-resume",
            Intent::FluxStatus => "flux-status",
            Intent::JobRestart => "job-restart",
            Intent::ConfigView => "config-view",
        }
    }
}

/// Closed vocabulary of resource types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Deployment,
    Pod,
    StatefulSet,
    Node,
    Service,
    Namespace,
    Kustomization,
    Job,
    ConfigMap,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Deployment => "deployment",
            ResourceType::Pod => "pod",
            ResourceType::StatefulSet => "statefulset",
            ResourceType::Node => "node",
            ResourceType::Service => "service",
            ResourceType::Namespace => "namespace",
            ResourceType::Kustomization => "kustomization",
            ResourceType::Job => "job",
            ResourceType::ConfigMap => "configmap",
        }
    }

    /// Whether the resource lives outside any namespace.
    pub fn is_cluster_scoped(&self) -> bool {
        matches!(self, ResourceType::Node | ResourceType::Namespace)
    }
}

/// Execution gates requested by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
    #[serde(default)]
    pub confirm: bool,
    #[serde(default)]
    pub dry_run: bool,
}

/// One operator request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRequest {
    pub intent: Intent,

    #[serde(alias = "resourceType")]
    pub resource: ResourceType,

    pub namespace: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,

    #[serde(default)]
    pub constraints: Constraints,
}

// DNS-1123 label (namespaces) and subdomain (object names).
static NAMESPACE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$")
        .unwrap_or_else(|e| panic!("invalid namespace regex: {e}"))
});
static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9.]*[a-z0-9])?$")
        .unwrap_or_else(|e| panic!("invalid name regex: {e}"))
});
static SELECTOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_./=!,() -]+$")
        .unwrap_or_else(|e| panic!("invalid selector regex: {e}"))
});

const MAX_NAMESPACE_LEN: usize = 63;
const MAX_NAME_LEN: usize = 253;

impl OperationRequest {
    /// Parse and validate a request payload.
    ///
    /// # Errors
    ///
    /// Returns `InputSchema` when the payload does not match the schema or a
    /// field fails validation.
    pub fn from_value(payload: &serde_json::Value) -> Result<Self> {
        let request: Self = serde_json::from_value(payload.clone())
            .map_err(|e| KubegateError::InputSchema(e.to_string()))?;
        request.validate()?;
        Ok(request)
    }

    /// Check field contents beyond what the schema types express.
    ///
    /// Namespaced resources need a namespace and a name. Values that are
    /// present must be valid Kubernetes identifiers; the selector is limited
    /// to label-selector characters.
    pub fn validate(&self) -> Result<()> {
        let namespaced = !self.resource.is_cluster_scoped();

        if namespaced && self.namespace.is_empty() {
            return Err(KubegateError::InputSchema(format!(
                "'namespace' must be non-empty for resource '{}'",
                self.resource.as_str()
            )));
        }
        if namespaced && self.name.is_empty() {
            return Err(KubegateError::InputSchema(format!(
                "'name' must be non-empty for resource '{}'",
                self.resource.as_str()
            )));
        }

        if !self.namespace.is_empty()
            && (self.namespace.len() > MAX_NAMESPACE_LEN || !NAMESPACE_RE.is_match(&self.namespace))
        {
            return Err(KubegateError::InputSchema(format!(
                "'namespace' value '{}' is not a valid namespace name",
                self.namespace
            )));
        }

        if !self.name.is_empty() && (self.name.len() > MAX_NAME_LEN || !NAME_RE.is_match(&self.name))
        {
            return Err(KubegateError::InputSchema(format!(
                "'name' value '{}' is not a valid resource name",
                self.name
            )));
        }

        if let Some(selector) = &self.selector
            && !selector.is_empty()
            && !SELECTOR_RE.is_match(selector)
        {
            return Err(KubegateError::InputSchema(format!(
                "'selector' value '{}' contains characters not allowed in a label selector",
                selector
            )));
        }

        Ok(())
    }

    /// Namespace to scope validation to, if any.
    pub fn scoped_namespace(&self) -> Option<&str> {
        Some(self.namespace.as_str()).filter(|ns| !ns.is_empty())
    }

    pub fn selector(&self) -> Option<&str> {
        self.selector.as_deref().filter(|s| !s.is_empty())
    }

    /// Planner goal for this request.
    pub fn goal(&self) -> PlanGoal {
        PlanGoal {
            intent: self.intent.as_str().to_string(),
            resource: self.resource.as_str().to_string(),
            namespace: self.namespace.clone(),
            name: self.name.clone(),
            selector: self.selector().map(str::to_string),
        }
    }
}
