//! Tests for config functionality.

use crate::config::{Config, DEFAULT_CONFIG_FILE};
use crate::error::KubegateError;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.policy_dir, "org");
    assert_eq!(config.audit_log, "logs/agent.log");
    assert_eq!(config.execution.timeout_seconds, 15);
    assert_eq!(config.execution.max_stdout_chars, 4000);
    assert_eq!(config.execution.max_stderr_chars, 2000);
    assert_eq!(config.retrieval.k, 4);
    assert_eq!(config.retrieval.min_filtered_hits, 2);
    assert!(config.retrieval.command.is_none());
    assert!(config.generator.command.is_none());
    assert_eq!(config.generator.timeout_seconds, 120);
}

#[test]
fn test_parse_empty_yaml() {
    let config = Config::from_yaml("").unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_parse_partial_yaml() {
    let yaml = r#"
execution:
  timeout_seconds: 30
generator:
  command: "llm --max-tokens {max_tokens}"
  environment:
    MODEL_PATH: /models/k8s
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.execution.timeout_seconds, 30);
    assert_eq!(config.execution.max_stdout_chars, 4000);
    assert_eq!(
        config.generator.command.as_deref(),
        Some("llm --max-tokens {max_tokens}")
    );
    assert_eq!(
        config.generator.environment.get("MODEL_PATH").map(String::as_str),
        Some("/models/k8s")
    );
    assert_eq!(config.policy_dir, "org");
}

#[test]
fn test_unknown_fields_preserved() {
    let yaml = "future_option: 3\nretrieval:\n  rerank: true\n";
    let config = Config::from_yaml(yaml).unwrap();
    assert!(config.extra.contains_key("future_option"));
    assert!(config.retrieval.extra.contains_key("rerank"));
}

#[test]
fn test_zero_values_rejected() {
    for yaml in [
        "execution:\n  timeout_seconds: 0\n",
        "execution:\n  max_stdout_chars: 0\n",
        "execution:\n  max_stderr_chars: 0\n",
        "retrieval:\n  k: 0\n",
        "generator:\n  timeout_seconds: 0\n",
    ] {
        let err = Config::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, KubegateError::ConfigError(_)), "{yaml}");
        assert!(err.to_string().contains("must be greater than 0"));
    }
}

#[test]
fn test_blank_values_rejected() {
    let err = Config::from_yaml("policy_dir: \"\"\n").unwrap_err();
    assert!(err.to_string().contains("policy_dir"));

    let err = Config::from_yaml("generator:\n  command: \"  \"\n").unwrap_err();
    assert!(err.to_string().contains("generator.command"));
}

#[test]
fn test_invalid_yaml() {
    let err = Config::from_yaml("execution: [unclosed").unwrap_err();
    assert!(err.to_string().contains("failed to parse config YAML"));
}

#[test]
fn test_load_or_default_without_file() {
    let temp = TempDir::new().unwrap();
    let config = Config::load_or_default(temp.path().join(DEFAULT_CONFIG_FILE)).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_load_reads_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(DEFAULT_CONFIG_FILE);
    std::fs::write(&path, "audit_log: /var/log/kubegate.log\n").unwrap();

    let config = Config::load_or_default(&path).unwrap();
    assert_eq!(config.audit_log, "/var/log/kubegate.log");
}

#[test]
fn test_load_missing_file_errors() {
    let temp = TempDir::new().unwrap();
    let err = Config::load(temp.path().join("nope.yaml")).unwrap_err();
    assert!(err.to_string().contains("nope.yaml"));
}

#[test]
fn test_shipped_config_parses() {
    let config = Config::from_yaml(include_str!("../../kubegate.yaml")).unwrap();
    assert!(config.generator.command.is_some());
    assert_eq!(config.retrieval.timeout_seconds, 30);
}

#[test]
fn test_runtime_conversions() {
    let config = Config::from_yaml("execution:\n  timeout_seconds: 3\nretrieval:\n  k: 6\n").unwrap();

    let limits = config.exec_limits();
    assert_eq!(limits.timeout, Duration::from_secs(3));
    assert_eq!(limits.max_stdout_chars, 4000);

    let options = config.retrieval_options();
    assert_eq!(options.k, 6);
    assert_eq!(options.min_filtered_hits, 2);
}

#[test]
fn test_to_yaml_round_trips() {
    let config = Config::default();
    let yaml = config.to_yaml().unwrap();
    assert_eq!(Config::from_yaml(&yaml).unwrap(), config);
}
