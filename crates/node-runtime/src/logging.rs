//! # Logging Bootstrap
//!
//! One global `tracing` subscriber for the process. Call results go to
//! stdout, so every log line goes to stderr.

use crate::config::LoggingConfig;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter {directive:?}: {reason}")]
    InvalidFilter { directive: String, reason: String },

    #[error("logging already initialised: {0}")]
    AlreadyInitialised(String),
}

/// Install the global subscriber.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = build_filter(&config.level)?;

    if config.json {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_writer(std::io::stderr);
        tracing_subscriber::registry()
            .with(filter)
            .with(json_layer)
            .try_init()
            .map_err(|e| LoggingError::AlreadyInitialised(e.to_string()))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_writer(std::io::stderr);
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| LoggingError::AlreadyInitialised(e.to_string()))?;
    }

    tracing::debug!(level = %config.level, json = config.json, "Logging initialised");
    Ok(())
}

fn build_filter(directive: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(directive).map_err(|e| LoggingError::InvalidFilter {
        directive: directive.to_string(),
        reason: e.to_string(),
    })
}
