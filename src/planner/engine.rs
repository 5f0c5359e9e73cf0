//! Plan generation with one corrective retry.

use crate::error::{KubegateError, Result};
use std::sync::Mutex;
use tracing::{debug, warn};

use super::extract::extract_json_object;
use super::generator::{DecodingConfig, Generator};
use super::plan::Plan;
use super::prompt::{PlanGoal, build_prompt, build_retry_prompt};

/// Turns a goal plus retrieved context into a [`Plan`].
///
/// Owns the generation backend for the life of the process. Calls are
/// serialized on an internal lock, so concurrent callers queue rather than
/// re-entering the backend.
pub struct Planner {
    generator: Mutex<Box<dyn Generator>>,
    decoding: DecodingConfig,
}

impl Planner {
    pub fn new(generator: Box<dyn Generator>) -> Self {
        Self {
            generator: Mutex::new(generator),
            decoding: DecodingConfig::deterministic(),
        }
    }

    pub fn decoding(&self) -> &DecodingConfig {
        &self.decoding
    }

    /// Produce a plan for `goal`.
    ///
    /// Output that does not contain a complete plan object triggers exactly
    /// one retry with a corrective prompt; a second failure yields
    /// [`Plan::fallback`]. Malformed output is never an error.
    ///
    /// # Errors
    ///
    /// Returns `Collaborator` if the generation backend itself fails.
    pub fn plan(&self, goal: &PlanGoal, context: &str) -> Result<Plan> {
        let mut generator = self.generator.lock().map_err(|_| {
            KubegateError::Collaborator("generator lock poisoned by an earlier panic".to_string())
        })?;

        let prompt = build_prompt(goal, context);
        let raw = generator.generate(&prompt, &self.decoding)?;
        if let Some(plan) = parse_plan(&raw) {
            debug!(intent = %plan.intent, "plan generated on first attempt");
            return Ok(plan);
        }

        warn!("invalid JSON from generator, retrying");
        let retry = build_retry_prompt(goal, context);
        let raw = generator.generate(&retry, &self.decoding)?;
        if let Some(plan) = parse_plan(&raw) {
            debug!(intent = %plan.intent, "plan generated on retry");
            return Ok(plan);
        }

        warn!(output_chars = raw.chars().count(), "generator output still invalid, using fallback plan");
        Ok(Plan::fallback())
    }
}

impl std::fmt::Debug for Planner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Planner")
            .field("decoding", &self.decoding)
            .finish_non_exhaustive()
    }
}

fn parse_plan(raw: &str) -> Option<Plan> {
    extract_json_object(raw).and_then(|object| Plan::from_object(&object))
}
