use crate::audit::AuditLog;
use crate::error::{KubegateError, Result};
use crate::pipeline::Pipeline;
use crate::planner::{DecodingConfig, Generator, Planner};
use crate::policy::{NAMESPACES_FILE, Policy, RBAC_ALLOWLIST_FILE};
use crate::retrieve::{Snippet, SnippetIndex};
use crate::validate::CommandValidator;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex, MutexGuard};

pub(crate) const SHIPPED_RBAC: &str = include_str!("../org/rbac-allowlist.yaml");
pub(crate) const SHIPPED_NAMESPACES: &str = include_str!("../org/namespaces.yaml");

static CWD_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub(crate) struct DirGuard {
    original: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl DirGuard {
    pub(crate) fn new(new_dir: &Path) -> Self {
        // The working directory is process-global; hold the lock while it is changed.
        let lock = CWD_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(new_dir).unwrap();
        Self {
            original,
            _lock: lock,
        }
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original);
    }
}

/// The policy shipped in `org/`.
pub(crate) fn default_policy() -> Policy {
    Policy::from_yaml(SHIPPED_RBAC, SHIPPED_NAMESPACES).unwrap()
}

/// Write the shipped policy documents into `dir`.
pub(crate) fn write_policy_dir(dir: &Path) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join(RBAC_ALLOWLIST_FILE), SHIPPED_RBAC).unwrap();
    std::fs::write(dir.join(NAMESPACES_FILE), SHIPPED_NAMESPACES).unwrap();
}

/// A well-formed plan object as a generator would print it.
pub(crate) fn plan_json(intent: &str, namespace: &str, command: &str) -> String {
    serde_json::json!({
        "intent": intent,
        "namespace": namespace,
        "target": "api",
        "selector": null,
        "command": command,
        "summary": format!("{intent} in {namespace}"),
    })
    .to_string()
}

/// A search hit with a templated command.
pub(crate) fn card(id: &str, intent: &str, resource: &str) -> Snippet {
    Snippet {
        id: id.to_string(),
        title: format!("{intent} {resource}"),
        intent: intent.to_string(),
        resource: resource.to_string(),
        risk_level: "low".to_string(),
        command_template: format!("kubectl get {resource} {{name}} -n {{namespace}}"),
        examples: Vec::new(),
        notes: Vec::new(),
        score: 1.0,
    }
}

/// Generator that replays canned outputs in order and records every prompt.
pub(crate) struct ScriptedGenerator {
    responses: VecDeque<String>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedGenerator {
    pub(crate) fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: responses.into_iter().map(Into::into).collect(),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared view of the prompts received so far.
    pub(crate) fn prompt_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.prompts)
    }
}

impl Generator for ScriptedGenerator {
    fn generate(&mut self, prompt: &str, _decoding: &DecodingConfig) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .pop_front()
            .ok_or_else(|| KubegateError::Collaborator("scripted generator exhausted".to_string()))
    }
}

/// Generator whose backend is always down.
pub(crate) struct FailingGenerator;

impl Generator for FailingGenerator {
    fn generate(&mut self, _prompt: &str, _decoding: &DecodingConfig) -> Result<String> {
        Err(KubegateError::Collaborator(
            "inference backend unavailable".to_string(),
        ))
    }
}

/// In-memory index returning its cards in stored order.
pub(crate) struct StaticIndex {
    cards: Vec<Snippet>,
    queries: Arc<Mutex<Vec<(String, usize)>>>,
}

impl StaticIndex {
    pub(crate) fn new(cards: Vec<Snippet>) -> Self {
        Self {
            cards,
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn query_log(&self) -> Arc<Mutex<Vec<(String, usize)>>> {
        Arc::clone(&self.queries)
    }
}

impl SnippetIndex for StaticIndex {
    fn semantic_search(&self, query: &str, k: usize) -> Result<Vec<Snippet>> {
        self.queries.lock().unwrap().push((query.to_string(), k));
        Ok(self.cards.iter().take(k).cloned().collect())
    }
}

/// Index whose backend is always down.
pub(crate) struct FailingIndex;

impl SnippetIndex for FailingIndex {
    fn semantic_search(&self, _query: &str, _k: usize) -> Result<Vec<Snippet>> {
        Err(KubegateError::Collaborator(
            "search backend unavailable".to_string(),
        ))
    }
}

/// A pipeline over the shipped policy, auditing into `dir/logs/agent.log`.
pub(crate) fn test_pipeline(
    dir: &Path,
    generator: impl Generator + 'static,
    index: impl SnippetIndex + 'static,
) -> Pipeline {
    pipeline_with_policy(dir, default_policy(), generator, index)
}

pub(crate) fn pipeline_with_policy(
    dir: &Path,
    policy: Policy,
    generator: impl Generator + 'static,
    index: impl SnippetIndex + 'static,
) -> Pipeline {
    let validator = CommandValidator::new(policy).unwrap();
    let audit = AuditLog::open(audit_path(dir)).unwrap();
    Pipeline::new(
        Box::new(index),
        Planner::new(Box::new(generator)),
        validator,
        audit,
    )
}

pub(crate) fn audit_path(dir: &Path) -> PathBuf {
    dir.join("logs").join("agent.log")
}

/// Parsed audit records from the log at `path`; empty if it does not exist.
pub(crate) fn read_audit_lines(path: &Path) -> Vec<serde_json::Value> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}
