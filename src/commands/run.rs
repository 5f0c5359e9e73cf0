//! `kubegate run`: one request through the full pipeline.

use crate::cli::{RequestArgs, RunArgs};
use crate::config::Config;
use crate::error::{KubegateError, Result};
use crate::pipeline::Pipeline;
use serde_json::{Map, Value, json};
use std::io::{Read, Write};
use std::path::Path;

use super::write_json;

/// Run one request and print the response JSON.
///
/// The response is always printed. Rejections, failed executions and error
/// payloads are then returned as errors so the process exits with the
/// matching code.
pub fn cmd_run(config: &Config, args: RunArgs, out: &mut dyn Write) -> Result<()> {
    let payload = match &args.payload {
        Some(path) => read_payload(path)?,
        None => payload_from_flags(&args.request, args.confirm, args.dry_run),
    };

    let pipeline = Pipeline::from_config(config)?;
    let response = pipeline.run(&payload);
    write_json(out, &response, true)?;

    match response.to_error() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

/// Build a request payload from CLI flags.
///
/// Missing flags are left out so schema validation reports them.
pub fn payload_from_flags(request: &RequestArgs, confirm: bool, dry_run: bool) -> Value {
    let mut payload = Map::new();
    let fields = [
        ("intent", &request.intent),
        ("resource", &request.resource),
        ("namespace", &request.namespace),
        ("name", &request.name),
        ("selector", &request.selector),
    ];
    for (key, value) in fields {
        if let Some(value) = value {
            payload.insert(key.to_string(), Value::String(value.clone()));
        }
    }
    payload.insert(
        "constraints".to_string(),
        json!({"confirm": confirm, "dryRun": dry_run}),
    );
    Value::Object(payload)
}

fn read_payload(path: &Path) -> Result<Value> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| KubegateError::UserError(format!("failed to read stdin: {}", e)))?;
        buf
    } else {
        std::fs::read_to_string(path).map_err(|e| {
            KubegateError::UserError(format!(
                "failed to read payload file '{}': {}",
                path.display(),
                e
            ))
        })?
    };

    serde_json::from_str(&content).map_err(|e| {
        KubegateError::InputSchema(format!(
            "payload '{}' is not valid JSON: {}",
            path.display(),
            e
        ))
    })
}
