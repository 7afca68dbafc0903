//! # Script Driver
//!
//! Reads JSON-lines calls and writes one JSON-lines result per call:
//!
//! ```text
//! in : {"function": "RespondToMessage", "args": ["RDSO_ValidationMessage", "{...}", "{...}"]}
//! out: {"function": "RespondToMessage", "ok": true, "result": "Valid", "elapsed_us": 42}
//! out: {"function": "ReadData", "ok": false, "error": "NotFound: ReadData: X does not exist", "elapsed_us": 7}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. A failing call never
//! stops the script.

use crate::router::ContractRouter;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

/// One input line.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ScriptCall {
    pub function: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// One output line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CallOutcome {
    pub function: String,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub elapsed_us: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScriptSummary {
    pub succeeded: u64,
    pub failed: u64,
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("script I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot encode outcome: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Route one call and time it.
pub fn execute(router: &ContractRouter, call: &ScriptCall) -> CallOutcome {
    let started = Instant::now();
    let outcome = router.invoke(&call.function, &call.args);
    let elapsed_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    match outcome {
        Ok(invocation) => CallOutcome {
            function: call.function.clone(),
            ok: true,
            result: Some(invocation.result),
            error: None,
            elapsed_us,
        },
        Err(err) => CallOutcome {
            function: call.function.clone(),
            ok: false,
            result: None,
            error: Some(format!("{}: {err}", err.label())),
            elapsed_us,
        },
    }
}

/// Run every call in `input`, writing outcomes to `output` as they finish.
pub async fn run_script<R, W>(
    router: &ContractRouter,
    input: R,
    output: &mut W,
) -> Result<ScriptSummary, DriverError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut summary = ScriptSummary::default();
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let outcome = match serde_json::from_str::<ScriptCall>(trimmed) {
            Ok(call) => execute(router, &call),
            Err(e) => {
                warn!(line = line_no, error = %e, "Malformed script line");
                CallOutcome {
                    function: String::new(),
                    ok: false,
                    result: None,
                    error: Some(format!("BadArguments: line {line_no}: {e}")),
                    elapsed_us: 0,
                }
            }
        };

        if outcome.ok {
            summary.succeeded += 1;
        } else {
            summary.failed += 1;
        }

        let mut encoded = serde_json::to_vec(&outcome)?;
        encoded.push(b'\n');
        output.write_all(&encoded).await?;
        output.flush().await?;
    }

    debug!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        "Script finished"
    );
    Ok(summary)
}
