//! Tests for command validation.

use super::validator::CommandValidator;
use crate::policy::{NamespaceRegistry, Policy, RbacAllowlist};
use crate::test_support::default_policy;

fn validator() -> CommandValidator {
    CommandValidator::new(default_policy()).unwrap()
}

// =========================================================================
// Prefix handling
// =========================================================================

#[test]
fn test_valid_command_passes() {
    let result = validator().validate("kubectl rollout restart deployment/api -n prod", None);

    assert!(result.valid, "{:?}", result.reasons);
    assert!(result.reasons.is_empty());
    assert!(result.modified_command.is_none());
}

#[test]
fn test_non_cluster_command_fails_with_single_reason() {
    for cmd in ["rm -rf /tmp", "curl http://example.com", "kubectlx get pods -n prod", ""] {
        let result = validator().validate(cmd, None);

        assert!(!result.valid, "{}", cmd);
        assert_eq!(result.reasons.len(), 1, "{}", cmd);
        assert!(result.reasons[0].contains("allowed prefixes"));
        assert!(result.reasons[0].contains("kubectl"));
        assert!(result.reasons[0].contains("flux"));
    }
}

#[test]
fn test_passthrough_prefix_is_accepted() {
    let result = validator().validate("gh pr list --repo org/infra", None);
    assert!(result.valid);
}

#[test]
fn test_fallback_plan_command_is_rejected() {
    let result = validator().validate("# Failed to generate valid command", Some("default"));
    assert!(!result.valid);
}

// =========================================================================
// Allow-lists
// =========================================================================

#[test]
fn test_verb_not_in_allowlist_fails() {
    let result = validator().validate("kubectl apply -f manifest.yaml -n prod", None);

    assert!(!result.valid);
    assert!(result.reasons[0].contains("Verb 'apply'"));
}

#[test]
fn test_resource_not_in_allowlist_fails() {
    let result = validator().validate("kubectl get ingress web -n prod", None);

    assert!(!result.valid);
    assert_eq!(result.reasons.len(), 1);
    assert!(result.reasons[0].contains("Resource 'ingress'"));
}

#[test]
fn test_reasons_accumulate_in_order() {
    // Unknown verb, unknown resource and no namespace in one command
    let result = validator().validate("kubectl patch ingress web", None);

    assert!(!result.valid);
    assert_eq!(result.reasons.len(), 3);
    assert!(result.reasons[0].starts_with("Verb"));
    assert!(result.reasons[1].starts_with("Resource"));
    assert!(result.reasons[2].contains("namespace"));
}

#[test]
fn test_rollout_undo_is_not_allowed() {
    let result = validator().validate("kubectl rollout undo deployment/api -n prod", None);

    assert!(!result.valid);
    assert!(result.reasons[0].contains("rollout undo"));
}

// =========================================================================
// Namespace rules
// =========================================================================

#[test]
fn test_missing_namespace_fails() {
    let result = validator().validate("kubectl get pods", None);

    assert!(!result.valid);
    assert!(
        result
            .reasons
            .iter()
            .any(|r| r.to_lowercase().contains("namespace"))
    );
}

#[test]
fn test_cluster_scoped_resource_is_exempt() {
    let result = validator().validate("kubectl cordon node/worker-1", None);
    assert!(result.valid, "{:?}", result.reasons);

    let result = validator().validate("kubectl get nodes", None);
    assert!(result.valid, "{:?}", result.reasons);
}

#[test]
fn test_namespace_scoping_can_be_disabled() {
    let rbac = RbacAllowlist {
        namespace_scoped: false,
        ..RbacAllowlist::default()
    };
    let policy = Policy::new(rbac, NamespaceRegistry::default()).unwrap();
    let validator = CommandValidator::new(policy).unwrap();

    let result = validator.validate("kubectl get pods", None);
    assert!(result.valid, "{:?}", result.reasons);
}

#[test]
fn test_namespace_mismatch_fails() {
    let result = validator().validate("kubectl get pods -n staging", Some("prod"));

    assert!(!result.valid);
    assert_eq!(result.reasons.len(), 1);
    assert!(result.reasons[0].contains("'staging'"));
    assert!(result.reasons[0].contains("'prod'"));
}

#[test]
fn test_unregistered_namespace_fails() {
    let result = validator().validate("kubectl get pods -n sandbox-42", None);

    assert!(!result.valid);
    assert!(result.reasons[0].contains("not registered"));
}

#[test]
fn test_registry_glob_patterns_match() {
    let result = validator().validate("kubectl get pods -n team-payments", None);
    assert!(result.valid, "{:?}", result.reasons);
}

#[test]
fn test_empty_registry_allows_any_namespace() {
    let policy = Policy::new(RbacAllowlist::default(), NamespaceRegistry::default()).unwrap();
    let validator = CommandValidator::new(policy).unwrap();

    let result = validator.validate("kubectl get pods -n sandbox-42", None);
    assert!(result.valid, "{:?}", result.reasons);
}

// =========================================================================
// Forbidden combinations and guardrails
// =========================================================================

#[test]
fn test_forbidden_combination_reports_configured_reason() {
    let result = validator().validate("kubectl scale node/worker-1 --replicas=0", None);

    assert!(!result.valid);
    assert!(
        result
            .reasons
            .iter()
            .any(|r| r == "Forbidden: nodes are not scalable resources")
    );
}

#[test]
fn test_delete_pod_is_rewritten_and_invalid() {
    let result = validator().validate("kubectl delete pod my-pod -n prod", Some("prod"));

    assert!(!result.valid);
    assert!(result.reasons.iter().any(|r| r.contains("delete")));
    assert!(result.reasons.last().unwrap().contains("safer alternative"));

    let modified = result.modified_command.unwrap();
    assert!(modified.starts_with('#'));
    assert!(modified.contains("rollout restart"));
}

#[test]
fn test_delete_pod_guardrail_regardless_of_namespace() {
    for cmd in [
        "kubectl delete pod my-pod -n prod",
        "kubectl delete pods my-pod",
        "kubectl delete pod/my-pod -n staging",
    ] {
        let result = validator().validate(cmd, None);
        assert!(!result.valid, "{}", cmd);
        assert!(result.modified_command.is_some(), "{}", cmd);
    }
}

#[test]
fn test_valid_is_derived_from_reasons() {
    for cmd in [
        "kubectl get pods -n prod",
        "kubectl get pods",
        "kubectl delete pod x -n prod",
        "ls",
    ] {
        let result = validator().validate(cmd, None);
        assert_eq!(result.valid, result.reasons.is_empty(), "{}", cmd);
    }
}

#[test]
fn test_flux_reconcile_passes() {
    let result = validator().validate(
        "flux reconcile kustomization apps -n flux-system",
        Some("flux-system"),
    );
    assert!(result.valid, "{:?}", result.reasons);
}

// =========================================================================
// Kind lists and namespace flag shapes
// =========================================================================

#[test]
fn test_kind_list_with_forbidden_kind_fails() {
    let result = validator().validate("kubectl get pod,secret -n prod -o yaml", Some("prod"));

    assert!(!result.valid);
    assert!(
        result
            .reasons
            .iter()
            .any(|r| r == "Forbidden: secret values must not be read through the agent")
    );
}

#[test]
fn test_kind_list_with_unlisted_kinds_fails() {
    let result = validator().validate("kubectl get all,secret -n prod", Some("prod"));

    assert!(!result.valid);
    assert!(result.reasons.iter().any(|r| r.contains("Resource 'all'")));
    assert!(result.reasons.iter().any(|r| r.contains("Resource 'secret'")));
    assert!(result.reasons.iter().any(|r| r.starts_with("Forbidden")));
}

#[test]
fn test_kind_list_with_name_is_checked_per_kind() {
    let result = validator().validate("kubectl get deploy,secret/api -n prod", Some("prod"));
    assert!(!result.valid);

    let result = validator().validate("kubectl get deploy,svc -n prod", Some("prod"));
    assert!(result.valid, "{:?}", result.reasons);
}

#[test]
fn test_mixed_scope_kind_list_needs_namespace() {
    let result = validator().validate("kubectl get nodes,pods", None);

    assert!(!result.valid);
    assert!(result.reasons.iter().any(|r| r.contains("must include namespace")));
}

#[test]
fn test_repeated_namespace_flag_fails() {
    let result = validator().validate(
        "kubectl rollout restart deployment/api -n prod -n kube-system",
        Some("prod"),
    );

    assert!(!result.valid);
    assert!(result.reasons.iter().any(|r| r.contains("repeat the namespace flag")));
    // The effective (last) namespace is the one compared with the request
    assert!(result.reasons.iter().any(|r| r.contains("'kube-system'")));
}

#[test]
fn test_namespace_flag_with_all_namespaces_fails() {
    for cmd in [
        "kubectl get pods -n prod --all-namespaces",
        "kubectl get pods -A -n prod",
    ] {
        let result = validator().validate(cmd, Some("prod"));

        assert!(!result.valid, "{}", cmd);
        assert!(
            result.reasons.iter().any(|r| r.contains("all namespaces")),
            "{}",
            cmd
        );
    }
}

#[test]
fn test_all_namespaces_on_cluster_scoped_kind_passes() {
    let result = validator().validate("kubectl get nodes -A", None);
    assert!(result.valid, "{:?}", result.reasons);
}
