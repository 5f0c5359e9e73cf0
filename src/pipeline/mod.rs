//! The plan → validate → gate → execute → audit pipeline.
//!
//! One call to [`Pipeline::run`] takes a request payload through
//!
//! ```text
//! RECEIVED → RETRIEVED → PLANNED → {REJECTED | AWAITING_CONFIRMATION | DRY_RUN | EXECUTED} → LOGGED → RESPONDED
//! ```
//!
//! A command reaches the executor only after the validator accepted it and
//! neither gate (confirm, dry run) stopped it. Every rejected, simulated or
//! executed operation is audited exactly once; requests halted at the
//! confirmation gate are not.
//!
//! The pipeline holds no per-request state, so one instance can be shared
//! across worker threads. Generation is serialized inside the planner and
//! audit appends are serialized inside the audit log.

mod request;
mod response;


pub use request::{Constraints, Intent, OperationRequest, ResourceType};
pub use response::{
    CONFIRMATION_MESSAGE, FailureResponse, INTERNAL_ERROR, INVALID_INPUT, OperationResponse,
    PipelineResponse, ResultSummary, Status,
};

use crate::audit::{AuditLevel, AuditLog, generate_operation_id};
use crate::config::Config;
use crate::error::{KubegateError, Result};
use crate::exec::{ExecLimits, ExecutionResult, execute};
use crate::planner::{CommandGenerator, Planner};
use crate::policy::Policy;
use crate::retrieve::{
    CommandIndex, NoIndex, RetrievalOptions, SnippetIndex, build_query, retrieve_context,
};
use crate::validate::CommandValidator;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Prefix of the simulated stdout for dry runs.
pub const DRY_RUN_PREFIX: &str = "[DRY RUN] Command would execute: ";

#[derive(Debug, Clone, Copy)]
enum Stage {
    Received,
    Retrieved,
    Planned,
    Rejected,
    AwaitingConfirmation,
    DryRun,
    Executed,
    Logged,
}

/// Composes retrieval, planning, validation, execution and audit.
pub struct Pipeline {
    index: Box<dyn SnippetIndex>,
    planner: Planner,
    validator: CommandValidator,
    audit: AuditLog,
    limits: ExecLimits,
    retrieval: RetrievalOptions,
}

impl Pipeline {
    pub fn new(
        index: Box<dyn SnippetIndex>,
        planner: Planner,
        validator: CommandValidator,
        audit: AuditLog,
    ) -> Self {
        Self {
            index,
            planner,
            validator,
            audit,
            limits: ExecLimits::default(),
            retrieval: RetrievalOptions::default(),
        }
    }

    pub fn with_limits(mut self, limits: ExecLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_retrieval(mut self, retrieval: RetrievalOptions) -> Self {
        self.retrieval = retrieval;
        self
    }

    /// Build a pipeline from runtime config.
    ///
    /// Loads the policy, opens the audit log and wires the configured
    /// backends. Without a retrieval command, planning runs without context.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the policy is missing or malformed, the audit
    /// log cannot be opened, or no generator command is configured.
    pub fn from_config(config: &Config) -> Result<Self> {
        let policy = Policy::load(&config.policy_dir)?;
        let validator = CommandValidator::new(policy)?;
        let planner = build_planner(config)?;
        let index = build_index(config);
        let audit = AuditLog::open(&config.audit_log)?;

        Ok(Self::new(index, planner, validator, audit)
            .with_limits(config.exec_limits())
            .with_retrieval(config.retrieval_options()))
    }

    pub fn validator(&self) -> &CommandValidator {
        &self.validator
    }

    pub fn planner(&self) -> &Planner {
        &self.planner
    }

    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    /// Run one request payload to completion.
    ///
    /// Never fails: malformed input yields an "Invalid input schema" response
    /// (no operation id, no audit write) and collaborator failures yield an
    /// "Internal error" response.
    pub fn run(&self, payload: &serde_json::Value) -> PipelineResponse {
        let request = match OperationRequest::from_value(payload) {
            Ok(request) => request,
            Err(e) => {
                debug!(error = %e, "rejecting malformed request");
                return PipelineResponse::invalid_input(&e);
            }
        };

        self.run_request(&request)
    }

    /// Run an already-parsed request.
    pub fn run_request(&self, request: &OperationRequest) -> PipelineResponse {
        if let Err(e) = request.validate() {
            return PipelineResponse::invalid_input(&e);
        }

        let operation_id = generate_operation_id();
        match self.process(&operation_id, request) {
            Ok(response) => PipelineResponse::Operation(response),
            Err(e) => {
                warn!(operation_id = %operation_id, error = %e, "pipeline failed");
                PipelineResponse::internal_error(&e)
            }
        }
    }

    fn process(&self, operation_id: &str, request: &OperationRequest) -> Result<OperationResponse> {
        trace_stage(operation_id, Stage::Received);

        let intent = request.intent.as_str();
        let resource = request.resource.as_str();
        let query = build_query(intent, resource, &request.name, request.selector());
        let context =
            retrieve_context(self.index.as_ref(), intent, resource, &query, &self.retrieval)?;
        trace_stage(operation_id, Stage::Retrieved);

        let plan = self.planner.plan(&request.goal(), &context)?;
        trace_stage(operation_id, Stage::Planned);

        let validation = self
            .validator
            .validate(&plan.command, request.scoped_namespace());

        if !validation.valid {
            trace_stage(operation_id, Stage::Rejected);
            let result = rejected_result(&validation.joined_reasons());
            self.audit
                .log_action(operation_id, &plan, &plan.command, &result, AuditLevel::Error);
            trace_stage(operation_id, Stage::Logged);

            info!(operation_id, reasons = %validation.joined_reasons(), "command rejected");
            return Ok(OperationResponse {
                operation_id: operation_id.to_string(),
                plan,
                validation,
                status: Status::Rejected,
                message: None,
                result: None,
            });
        }

        if request.constraints.confirm {
            trace_stage(operation_id, Stage::AwaitingConfirmation);
            return Ok(OperationResponse {
                operation_id: operation_id.to_string(),
                plan,
                validation,
                status: Status::AwaitingConfirmation,
                message: Some(CONFIRMATION_MESSAGE.to_string()),
                result: None,
            });
        }

        let (status, result, dry_run) = if request.constraints.dry_run {
            trace_stage(operation_id, Stage::DryRun);
            (Status::DryRun, dry_run_result(&plan.command), true)
        } else {
            let result = execute(&plan.command, &self.limits);
            trace_stage(operation_id, Stage::Executed);
            (Status::Executed, result, false)
        };

        let level = AuditLevel::for_result(&result);
        self.audit
            .log_action(operation_id, &plan, &plan.command, &result, level);
        trace_stage(operation_id, Stage::Logged);

        info!(
            operation_id,
            exit_code = result.exit_code,
            dry_run,
            "operation completed"
        );
        Ok(OperationResponse {
            operation_id: operation_id.to_string(),
            plan,
            validation,
            status,
            message: None,
            result: Some(ResultSummary::new(&result, dry_run)),
        })
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("planner", &self.planner)
            .field("audit", &self.audit.path())
            .field("limits", &self.limits)
            .field("retrieval", &self.retrieval)
            .finish_non_exhaustive()
    }
}

/// Planner over the configured generation backend.
///
/// # Errors
///
/// Returns `ConfigError` if no generator command is configured.
pub fn build_planner(config: &Config) -> Result<Planner> {
    let command = config.generator.command.as_deref().ok_or_else(|| {
        KubegateError::ConfigError(
            "no generator command configured (set generator.command in the config file)"
                .to_string(),
        )
    })?;

    let generator = CommandGenerator::new(
        command,
        Duration::from_secs(config.generator.timeout_seconds),
        config.generator.environment.clone(),
    );
    Ok(Planner::new(Box::new(generator)))
}

/// Search backend for the configured retrieval command, or [`NoIndex`].
pub fn build_index(config: &Config) -> Box<dyn SnippetIndex> {
    match &config.retrieval.command {
        Some(command) => Box::new(CommandIndex::new(
            command.as_str(),
            Duration::from_secs(config.retrieval.timeout_seconds),
        )),
        None => Box::new(NoIndex),
    }
}

fn trace_stage(operation_id: &str, stage: Stage) {
    debug!(operation_id, stage = ?stage, "pipeline stage");
}

/// Audit payload for a command the validator refused.
fn rejected_result(reasons: &str) -> ExecutionResult {
    ExecutionResult {
        exit_code: -1,
        stdout: String::new(),
        stderr: format!("Validation failed: {reasons}"),
        duration_seconds: 0.0,
        truncated: false,
        timed_out: false,
    }
}

/// Synthetic result for a simulated run. No process is spawned.
fn dry_run_result(command: &str) -> ExecutionResult {
    ExecutionResult {
        exit_code: 0,
        stdout: format!("{DRY_RUN_PREFIX}{command}"),
        stderr: String::new(),
        duration_seconds: 0.0,
        truncated: false,
        timed_out: false,
    }
}
