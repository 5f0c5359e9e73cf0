//! Config loading, validation, and conversions into runtime settings.

use super::model::Config;
use crate::error::{KubegateError, Result};
use crate::exec::ExecLimits;
use crate::retrieve::RetrievalOptions;
use std::path::Path;
use std::time::Duration;

/// Config file used when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "kubegate.yaml";

impl Config {
    /// Load config from a YAML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the config file
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(KubegateError::ConfigError)` - Read error, parse error or
    ///   validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            KubegateError::ConfigError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Load config from `path`, or return defaults if the file does not
    /// exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml).map_err(|e| {
            KubegateError::ConfigError(format!("failed to parse config YAML: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            KubegateError::ConfigError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validate config values.
    ///
    /// Validation rules:
    /// - Timeouts, output caps and `retrieval.k` must be positive
    /// - `policy_dir` and `audit_log` must be non-empty
    /// - Backend commands, when set, must be non-empty
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("execution.timeout_seconds", self.execution.timeout_seconds as usize),
            ("execution.max_stdout_chars", self.execution.max_stdout_chars),
            ("execution.max_stderr_chars", self.execution.max_stderr_chars),
            ("retrieval.k", self.retrieval.k),
            ("retrieval.timeout_seconds", self.retrieval.timeout_seconds as usize),
            ("generator.timeout_seconds", self.generator.timeout_seconds as usize),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(KubegateError::ConfigError(format!(
                    "config validation failed: {} must be greater than 0",
                    name
                )));
            }
        }

        for (name, value) in [("policy_dir", &self.policy_dir), ("audit_log", &self.audit_log)] {
            if value.trim().is_empty() {
                return Err(KubegateError::ConfigError(format!(
                    "config validation failed: {} must not be empty",
                    name
                )));
            }
        }

        for (name, command) in [
            ("retrieval.command", &self.retrieval.command),
            ("generator.command", &self.generator.command),
        ] {
            if command.as_ref().is_some_and(|c| c.trim().is_empty()) {
                return Err(KubegateError::ConfigError(format!(
                    "config validation failed: {} must not be empty when set",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Executor limits for cluster commands.
    pub fn exec_limits(&self) -> ExecLimits {
        ExecLimits {
            timeout: Duration::from_secs(self.execution.timeout_seconds),
            max_stdout_chars: self.execution.max_stdout_chars,
            max_stderr_chars: self.execution.max_stderr_chars,
        }
    }

    /// Retrieval tuning for the pipeline.
    pub fn retrieval_options(&self) -> RetrievalOptions {
        RetrievalOptions {
            k: self.retrieval.k,
            min_filtered_hits: self.retrieval.min_filtered_hits,
        }
    }
}
