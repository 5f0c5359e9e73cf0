//! Planning: prompt assembly, generation and plan extraction.

mod engine;
mod extract;
mod generator;
mod plan;
mod prompt;
mod template;

pub use engine::Planner;
pub use extract::extract_json_object;
pub use generator::{CommandGenerator, DecodingConfig, Generator};
pub use plan::{
    FALLBACK_COMMAND, FALLBACK_ERROR, FALLBACK_INTENT, FALLBACK_NAMESPACE, FALLBACK_SUMMARY, Plan,
    REQUIRED_KEYS,
};
pub use prompt::{NO_CONTEXT, PlanGoal, RETRY_SUFFIX, SYSTEM_PROMPT, build_prompt, build_retry_prompt};
pub use template::{TemplateError, render_command, render_template};
