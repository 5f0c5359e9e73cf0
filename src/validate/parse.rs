//! Best-effort normalization of cluster CLI commands.
//!
//! This is not a full command-line parser. It recognizes the documented
//! command shapes:
//!
//! ```text
//! kubectl <verb> <resource>[/<name>] [<name>] [flags]
//! kubectl rollout <sub-verb> <resource>/<name> [flags]
//! flux <verb> <resource> <name> [flags]
//! ```

use super::types::CommandShape;
use regex::Regex;
use std::sync::LazyLock;

/// Matches `-n`, `-nNS`, `-n=NS`, `--namespace`, `--namespace=NS`.
static NAMESPACE_FLAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:--namespace(?:=(?P<long>.*))?|-n(?:=?(?P<short>.+))?)$")
        .unwrap_or_else(|e| panic!("namespace flag regex is invalid: {}", e))
});

/// Flags that widen a command to every namespace.
const ALL_NAMESPACES_FLAGS: &[&str] = &["-A", "--all-namespaces"];

/// Flags whose separate value token must not be read as a resource.
const VALUE_FLAGS: &[&str] = &[
    "-n",
    "--namespace",
    "-l",
    "--selector",
    "-o",
    "--output",
    "-c",
    "--container",
];

/// Resource nouns recognized outside of `resource/name` tokens.
const RESOURCE_NOUNS: &[&str] = &[
    "pod",
    "deployment",
    "statefulset",
    "daemonset",
    "replicaset",
    "node",
    "namespace",
    "service",
    "ingress",
    "configmap",
    "secret",
    "event",
    "job",
    "cronjob",
    "kustomization",
    "helmrelease",
    "gitrepository",
    "persistentvolume",
    "persistentvolumeclaim",
    "storageclass",
    "clusterrole",
    "clusterrolebinding",
];

/// Short names accepted by the cluster CLI.
const RESOURCE_ALIASES: &[(&str, &str)] = &[
    ("po", "pod"),
    ("deploy", "deployment"),
    ("sts", "statefulset"),
    ("ds", "daemonset"),
    ("rs", "replicaset"),
    ("no", "node"),
    ("ns", "namespace"),
    ("svc", "service"),
    ("ing", "ingress"),
    ("cm", "configmap"),
    ("ev", "event"),
    ("cj", "cronjob"),
    ("ks", "kustomization"),
    ("hr", "helmrelease"),
    ("pv", "persistentvolume"),
    ("pvc", "persistentvolumeclaim"),
    ("sc", "storageclass"),
];

/// Verbs that only ever act on one resource type, so the bare object name
/// (`kubectl cordon worker-1`) still identifies the resource.
const IMPLIED_RESOURCES: &[(&str, &str)] = &[
    ("cordon", "node"),
    ("uncordon", "node"),
    ("drain", "node"),
];

/// Return the singular resource noun for a token, if it names one.
pub fn normalize_resource(token: &str) -> Option<String> {
    let token = token.to_lowercase();
    // `deployment.apps` style qualified names
    let token = token.split('.').next().unwrap_or_default();

    if RESOURCE_NOUNS.contains(&token) {
        return Some(token.to_string());
    }

    if let Some((_, noun)) = RESOURCE_ALIASES.iter().find(|(alias, _)| *alias == token) {
        return Some((*noun).to_string());
    }

    for suffix in ["es", "s"] {
        if let Some(stem) = token.strip_suffix(suffix)
            && RESOURCE_NOUNS.contains(&stem)
        {
            return Some(stem.to_string());
        }
    }

    None
}

/// Extract the normalized shape of a command whose prefix has already been
/// recognized.
///
/// `compound_verbs` lists verbs that take a sub-verb; for those the verb is
/// the two-token unit (`rollout restart`).
pub fn extract_shape(command: &str, compound_verbs: &[String]) -> CommandShape {
    let tokens: Vec<&str> = command.split_whitespace().collect();
    let mut shape = CommandShape::default();

    // Skip the CLI name itself
    let rest = tokens.get(1..).unwrap_or_default();
    scan_namespace_flags(rest, &mut shape);

    let Some(first) = rest.first() else {
        return shape;
    };

    let verb_tokens = if compound_verbs.iter().any(|v| v == first)
        && rest.get(1).is_some_and(|t| !t.starts_with('-'))
    {
        2
    } else {
        1
    };

    let verb = rest[..verb_tokens].join(" ").to_lowercase();
    shape.resources = extract_resources(&rest[verb_tokens..]);
    if shape.resources.is_empty()
        && let Some((_, resource)) = IMPLIED_RESOURCES.iter().find(|(v, _)| *v == verb)
    {
        shape.resources.push((*resource).to_string());
    }
    shape.verb = Some(verb);
    shape
}

/// Find the resource types among the non-flag tokens.
///
/// The first token naming a kind wins. A token containing `/` or `,` is a
/// kind list (`pod,secret`, `deploy,svc/web`): every element is reported,
/// and elements that are not known nouns are kept verbatim so the
/// allow-list still sees them.
fn extract_resources(parts: &[&str]) -> Vec<String> {
    let mut skip_value = false;
    for part in parts {
        if skip_value {
            skip_value = false;
            continue;
        }
        if part.starts_with('-') {
            skip_value = VALUE_FLAGS.contains(part);
            continue;
        }
        // Selector terms (`app=web,tier=db`) are never kinds
        if part.contains('=') {
            continue;
        }
        let kinds = part.split_once('/').map_or(*part, |(kinds, _)| kinds);
        if kinds.len() != part.len() || kinds.contains(',') {
            return kinds
                .split(',')
                .filter(|kind| !kind.is_empty())
                .map(|kind| normalize_resource(kind).unwrap_or_else(|| kind.to_lowercase()))
                .collect();
        }
        if let Some(resource) = normalize_resource(part) {
            return vec![resource];
        }
    }
    Vec::new()
}

/// Record every namespace flag and any all-namespaces flag.
///
/// The namespace value is taken from the last flag, matching how the cluster
/// CLI resolves repeated flags.
fn scan_namespace_flags(parts: &[&str], shape: &mut CommandShape) {
    for (i, part) in parts.iter().enumerate() {
        if ALL_NAMESPACES_FLAGS.contains(part) || part.starts_with("--all-namespaces=") {
            shape.all_namespaces = true;
            continue;
        }
        let Some(caps) = NAMESPACE_FLAG.captures(part) else {
            continue;
        };

        let inline = caps
            .name("long")
            .or_else(|| caps.name("short"))
            .map(|m| m.as_str().to_string())
            .filter(|v| !v.is_empty());

        shape.namespace = inline.or_else(|| {
            parts
                .get(i + 1)
                .filter(|next| !next.starts_with('-'))
                .map(|next| next.to_string())
        });
        shape.has_namespace_flag = true;
        shape.namespace_flags += 1;
    }
}
