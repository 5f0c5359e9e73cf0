//! `kubegate serve`: NDJSON requests on stdin, responses on stdout.

use crate::cli::ServeArgs;
use crate::config::Config;
use crate::error::{KubegateError, Result};
use crate::pipeline::{Pipeline, PipelineResponse};
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::write_json;

/// How often idle workers check whether serving was stopped.
const JOB_POLL_INTERVAL: Duration = Duration::from_millis(50);

pub fn cmd_serve(config: &Config, args: ServeArgs) -> Result<()> {
    if args.workers == 0 {
        return Err(KubegateError::UserError(
            "--workers must be at least 1".to_string(),
        ));
    }

    let pipeline = Pipeline::from_config(config)?;
    info!(workers = args.workers, audit_log = %pipeline.audit_log().path().display(), "serving NDJSON requests on stdin");

    let stdin = std::io::BufReader::new(std::io::stdin());
    let mut stdout = std::io::stdout();
    let served = serve_lines(&pipeline, stdin, &mut stdout, args.workers)?;

    info!(requests = served, "input closed, shutting down");
    Ok(())
}

/// Process request lines on `workers` threads sharing `pipeline`.
///
/// Each non-blank input line yields exactly one output line, written in
/// input order as soon as it is ready. A line that is not valid JSON gets an
/// "Invalid input schema" response. Returns the number of requests served.
///
/// Input is read on a detached thread, so a failed write returns at once
/// instead of waiting for the input to close. Workers finish the request in
/// hand and stop picking up new ones.
pub fn serve_lines<R, W>(
    pipeline: &Pipeline,
    input: R,
    output: &mut W,
    workers: usize,
) -> Result<usize>
where
    R: BufRead + Send + 'static,
    W: Write,
{
    let (job_tx, job_rx) = mpsc::channel::<(usize, String)>();
    let (done_tx, done_rx) = mpsc::channel::<(usize, PipelineResponse)>();
    let job_rx = Mutex::new(job_rx);
    let stop = Arc::new(AtomicBool::new(false));

    let reader = spawn_reader(input, job_tx, Arc::clone(&stop));

    let served = std::thread::scope(|scope| {
        for worker in 0..workers.max(1) {
            let job_rx = &job_rx;
            let stop = &stop;
            let done_tx = done_tx.clone();
            scope.spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    let job = match job_rx.lock() {
                        Ok(rx) => rx.recv_timeout(JOB_POLL_INTERVAL),
                        Err(_) => break,
                    };
                    let (seq, line) = match job {
                        Ok(job) => job,
                        Err(RecvTimeoutError::Timeout) => continue,
                        Err(RecvTimeoutError::Disconnected) => break,
                    };
                    debug!(worker, seq, "handling request");
                    if done_tx.send((seq, handle_line(pipeline, &line))).is_err() {
                        break;
                    }
                }
            });
        }
        drop(done_tx);

        // Responses arrive in completion order; release them in input order.
        let mut pending = BTreeMap::new();
        let mut next = 0usize;
        for (seq, response) in done_rx.iter() {
            pending.insert(seq, response);
            while let Some(response) = pending.remove(&next) {
                if let Err(e) = write_json(&mut *output, &response, false) {
                    stop.store(true, Ordering::Relaxed);
                    warn!(error = %e, "output closed, stopping");
                    return Err(e);
                }
                next += 1;
            }
        }
        Ok(next)
    })?;

    // Every worker has exited, so the reader already hit end of input.
    reader
        .join()
        .map_err(|_| KubegateError::UserError("request reader thread panicked".to_string()))??;
    Ok(served)
}

fn spawn_reader<R>(
    input: R,
    jobs: mpsc::Sender<(usize, String)>,
    stop: Arc<AtomicBool>,
) -> JoinHandle<Result<()>>
where
    R: BufRead + Send + 'static,
{
    std::thread::spawn(move || {
        let mut seq = 0usize;
        for line in input.lines() {
            if stop.load(Ordering::Relaxed) {
                break;
            }
            let line = line.map_err(|e| {
                KubegateError::UserError(format!("failed to read request line: {}", e))
            })?;
            if line.trim().is_empty() {
                continue;
            }
            if jobs.send((seq, line)).is_err() {
                break;
            }
            seq += 1;
        }
        Ok(())
    })
}

fn handle_line(pipeline: &Pipeline, line: &str) -> PipelineResponse {
    match serde_json::from_str(line) {
        Ok(payload) => pipeline.run(&payload),
        Err(e) => PipelineResponse::invalid_input(&KubegateError::InputSchema(format!(
            "request line is not valid JSON: {}",
            e
        ))),
    }
}
