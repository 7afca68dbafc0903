//! # GOOSE Ledger Node Runtime
//!
//! Hosts one chaincode (validation or bookkeeping) on an in-memory ledger and
//! drives it from a JSON-lines script, the way the REST gateway drives the
//! deployed contract.
//!
//! ```text
//! node-runtime --script calls.jsonl
//! echo '{"function":"GetAllData"}' | node-runtime
//! GL_CONTRACT=bookkeeping node-runtime --config node.json --script -
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufRead, BufReader};
use tracing::{info, warn};

use node_runtime::logging::init_logging;
use node_runtime::{run_script, NodeConfig, NodeRuntime};

/// Runs contract calls from a JSON-lines script against an in-memory ledger.
#[derive(Parser, Debug)]
#[command(name = "node-runtime")]
#[command(about = "GOOSE ledger node: message exchange and bookkeeping contracts")]
struct Args {
    /// JSON configuration file; `GL_*` environment variables override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Script of calls, one JSON object per line; `-` reads stdin
    #[arg(short, long, default_value = "-")]
    script: String,
}

async fn open_script(script: &str) -> Result<Box<dyn AsyncBufRead + Unpin + Send>> {
    if script == "-" {
        return Ok(Box::new(BufReader::new(tokio::io::stdin())));
    }
    let file = tokio::fs::File::open(script)
        .await
        .with_context(|| format!("opening script {script}"))?;
    Ok(Box::new(BufReader::new(file)))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = NodeConfig::load(args.config.as_deref()).context("loading configuration")?;
    init_logging(&config.logging)?;

    let runtime = NodeRuntime::start(&config)?;
    let input = open_script(&args.script).await?;
    let mut stdout = tokio::io::stdout();

    tokio::select! {
        summary = run_script(runtime.router(), input, &mut stdout) => {
            let summary = summary?;
            info!(
                succeeded = summary.succeeded,
                failed = summary.failed,
                "Script complete"
            );
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, remaining calls skipped");
        }
    }

    runtime.shutdown().await;
    Ok(())
}
