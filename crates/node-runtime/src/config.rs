//! # Node Configuration
//!
//! Defaults, then an optional JSON file, then environment overrides.
//!
//! | Variable | Field |
//! |----------|-------|
//! | `GL_CONTRACT` | `contract` (`validation` \| `bookkeeping`) |
//! | `GL_MATCH_POLICY` | `match_policy` (`coverage` \| `canonical`) |
//! | `GL_INIT_ON_START` | `init_on_start` |
//! | `GL_LOG_LEVEL`, else `RUST_LOG` | `logging.level` |
//! | `GL_JSON_LOGS` | `logging.json` |
//! | `GL_EVENT_CAPACITY` | `events.channel_capacity` |

use gl_02_message_exchange::MatchPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Which chaincode the node hosts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractKind {
    /// Message exchange with cross-validation.
    #[default]
    Validation,
    /// Identifier set plus bookkeeping records.
    Bookkeeping,
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => f.write_str("validation"),
            Self::Bookkeeping => f.write_str("bookkeeping"),
        }
    }
}

impl FromStr for ContractKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "validation" => Ok(Self::Validation),
            "bookkeeping" => Ok(Self::Bookkeeping),
            other => Err(format!("unknown contract {other}")),
        }
    }
}

/// Complete node configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub contract: ContractKind,
    /// Only read by the validation contract.
    pub match_policy: MatchPolicy,
    /// Run `InitLedger` before the first scripted call.
    pub init_on_start: bool,
    pub logging: LoggingConfig,
    pub events: EventsConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            contract: ContractKind::default(),
            match_policy: MatchPolicy::default(),
            init_on_start: true,
            logging: LoggingConfig::default(),
            events: EventsConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `gl_02_message_exchange=debug`.
    pub level: String,
    /// JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Post-commit receipts buffered per subscriber.
    pub channel_capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("invalid value {value:?} for {var}: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("events.channel_capacity must be greater than zero")]
    ZeroChannelCapacity,
}

impl NodeConfig {
    /// Build the effective configuration: file (if any), then environment,
    /// then validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Parse a JSON config file. Missing fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Apply `GL_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("GL_CONTRACT") {
            self.contract = value.parse().map_err(|reason| ConfigError::InvalidValue {
                var: "GL_CONTRACT",
                value: value.clone(),
                reason,
            })?;
        }

        if let Some(value) = lookup("GL_MATCH_POLICY") {
            self.match_policy = value
                .parse()
                .map_err(|e: gl_02_message_exchange::ExchangeError| ConfigError::InvalidValue {
                    var: "GL_MATCH_POLICY",
                    value: value.clone(),
                    reason: e.to_string(),
                })?;
        }

        if let Some(value) = lookup("GL_INIT_ON_START") {
            self.init_on_start = parse_flag("GL_INIT_ON_START", &value)?;
        }

        if let Some(level) = lookup("GL_LOG_LEVEL").or_else(|| lookup("RUST_LOG")) {
            self.logging.level = level;
        }

        if let Some(value) = lookup("GL_JSON_LOGS") {
            self.logging.json = parse_flag("GL_JSON_LOGS", &value)?;
        }

        if let Some(value) = lookup("GL_EVENT_CAPACITY") {
            self.events.channel_capacity =
                value.trim().parse().map_err(|e: std::num::ParseIntError| {
                    ConfigError::InvalidValue {
                        var: "GL_EVENT_CAPACITY",
                        value: value.clone(),
                        reason: e.to_string(),
                    }
                })?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.events.channel_capacity == 0 {
            return Err(ConfigError::ZeroChannelCapacity);
        }
        Ok(())
    }
}

fn parse_flag(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var,
            value: value.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}
