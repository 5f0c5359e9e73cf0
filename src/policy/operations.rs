//! Policy loading and validation.

use super::model::{NamespaceRegistry, Policy, RbacAllowlist};
use crate::error::{KubegateError, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::de::DeserializeOwned;
use std::path::Path;

/// File name of the RBAC allow-list inside the policy directory.
pub const RBAC_ALLOWLIST_FILE: &str = "rbac-allowlist.yaml";

/// File name of the namespace registry inside the policy directory.
pub const NAMESPACES_FILE: &str = "namespaces.yaml";

impl Policy {
    /// Load both policy documents from a directory.
    ///
    /// # Returns
    ///
    /// * `Ok(Policy)` - Both documents parsed and validated
    /// * `Err(KubegateError::ConfigError)` - A document is missing, unreadable,
    ///   malformed, or fails validation
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let rbac: RbacAllowlist = read_yaml(&dir.join(RBAC_ALLOWLIST_FILE))?;
        let registry: NamespaceRegistry = read_yaml(&dir.join(NAMESPACES_FILE))?;
        Self::new(rbac, registry)
    }

    /// Parse a policy from the two YAML documents.
    pub fn from_yaml(rbac_yaml: &str, namespaces_yaml: &str) -> Result<Self> {
        let rbac: RbacAllowlist = serde_yaml::from_str(rbac_yaml).map_err(|e| {
            KubegateError::ConfigError(format!("failed to parse {}: {}", RBAC_ALLOWLIST_FILE, e))
        })?;
        let registry: NamespaceRegistry = serde_yaml::from_str(namespaces_yaml).map_err(|e| {
            KubegateError::ConfigError(format!("failed to parse {}: {}", NAMESPACES_FILE, e))
        })?;
        Self::new(rbac, registry)
    }

    /// Build a policy from already-parsed documents, validating both.
    pub fn new(rbac: RbacAllowlist, registry: NamespaceRegistry) -> Result<Self> {
        let policy = Self { rbac, registry };
        policy.validate()?;
        Ok(policy)
    }

    /// Validate policy values.
    ///
    /// Validation rules:
    /// - `allowed_verbs` and `command_prefixes` must be non-empty
    /// - Forbidden combinations must name a verb, a resource and a reason
    /// - Namespace registry names must be valid glob patterns
    pub fn validate(&self) -> Result<()> {
        if self.rbac.allowed_verbs.is_empty() {
            return Err(KubegateError::ConfigError(format!(
                "{} validation failed: allowed_verbs must not be empty",
                RBAC_ALLOWLIST_FILE
            )));
        }

        if self.rbac.command_prefixes.iter().all(|p| p.trim().is_empty()) {
            return Err(KubegateError::ConfigError(format!(
                "{} validation failed: command_prefixes must list at least one CLI",
                RBAC_ALLOWLIST_FILE
            )));
        }

        for (i, combo) in self.rbac.forbidden_combinations.iter().enumerate() {
            if combo.verb.trim().is_empty()
                || combo.resource.trim().is_empty()
                || combo.reason.trim().is_empty()
            {
                return Err(KubegateError::ConfigError(format!(
                    "{} validation failed: forbidden_combinations[{}] needs verb, resource and reason",
                    RBAC_ALLOWLIST_FILE, i
                )));
            }
        }

        self.registry.globset()?;
        Ok(())
    }
}

impl NamespaceRegistry {
    /// Whether the registry constrains namespaces at all.
    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }

    /// Compile the registered names into a glob set.
    pub fn globset(&self) -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for entry in &self.namespaces {
            let glob = Glob::new(&entry.name).map_err(|e| {
                KubegateError::ConfigError(format!(
                    "{} validation failed: invalid namespace pattern '{}': {}",
                    NAMESPACES_FILE, entry.name, e
                ))
            })?;
            builder.add(glob);
        }
        builder.build().map_err(|e| {
            KubegateError::ConfigError(format!(
                "{} validation failed: failed to build namespace patterns: {}",
                NAMESPACES_FILE, e
            ))
        })
    }
}

fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        KubegateError::ConfigError(format!(
            "failed to read policy file '{}': {}",
            path.display(),
            e
        ))
    })?;

    serde_yaml::from_str(&content).map_err(|e| {
        KubegateError::ConfigError(format!(
            "failed to parse policy file '{}': {}",
            path.display(),
            e
        ))
    })
}
