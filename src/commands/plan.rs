//! `kubegate plan`: planner only.

use crate::cli::PlanArgs;
use crate::config::Config;
use crate::error::{KubegateError, Result};
use crate::pipeline::{OperationRequest, build_index, build_planner};
use crate::retrieve::{build_query, retrieve_context};
use std::io::Write;

use super::run::payload_from_flags;
use super::write_json;

/// Generate and print a plan. Nothing is validated, executed or audited.
pub fn cmd_plan(config: &Config, args: PlanArgs, out: &mut dyn Write) -> Result<()> {
    let payload = payload_from_flags(&args.request, false, false);
    let request = OperationRequest::from_value(&payload)?;

    let context = match &args.context_file {
        Some(path) => std::fs::read_to_string(path).map_err(|e| {
            KubegateError::UserError(format!(
                "failed to read context file '{}': {}",
                path.display(),
                e
            ))
        })?,
        None => {
            let intent = request.intent.as_str();
            let resource = request.resource.as_str();
            let query = build_query(intent, resource, &request.name, request.selector());
            let index = build_index(config);
            retrieve_context(
                index.as_ref(),
                intent,
                resource,
                &query,
                &config.retrieval_options(),
            )?
        }
    };

    let planner = build_planner(config)?;
    let plan = planner.plan(&request.goal(), &context)?;
    write_json(out, &plan, true)
}
