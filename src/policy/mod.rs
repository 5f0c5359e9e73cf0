//! Declarative policy data for the command validator.
//!
//! Two documents live in the policy directory (`org/` by default):
//!
//! - `rbac-allowlist.yaml`: allowed verbs and resources, forbidden verb+resource
//!   combinations, namespace scoping rules and permitted command prefixes
//! - `namespaces.yaml`: the namespace registry
//!
//! Both are loaded once at startup. A missing or malformed document is a
//! configuration error; the process must not run with an undefined policy.

mod model;
mod operations;


pub use model::{ForbiddenCombination, NamespaceEntry, NamespaceRegistry, Policy, RbacAllowlist};
pub use operations::{NAMESPACES_FILE, RBAC_ALLOWLIST_FILE};
