//! # Contract Router
//!
//! Gateway stand-in: maps a function name and string arguments onto one
//! contract operation, running it in a submitted (committed) or evaluated
//! (discarded) transaction the way a Fabric gateway client would.
//!
//! | Contract | Submit | Evaluate |
//! |----------|--------|----------|
//! | validation | `InitLedger`, `UpdateMessage`, `RespondToMessage` | `ValidateMessage`, `ReadData`, `GetAllData`, `GetTxnHistory`, `GetHistoryForID` |
//! | bookkeeping | `InitLedger`, `UpdateIDs`, `BookKeeping` | `Validate`, `Read`, `GetState`, `GetHistory` |
//!
//! Content arguments arrive JSON-encoded, as the gateway passes them.

use crate::config::{ContractKind, NodeConfig};
use gl_01_record_store::{CommitReceipt, InMemoryLedger, LedgerStub};
use gl_02_message_exchange::{
    ExchangeConfig, ExchangeError, ExchangeTopology, MessageExchangeApi, MessageExchangeService,
};
use gl_03_id_registry::{IdRegistryApi, IdRegistryService, RegistryLayout};
use serde::Serialize;
use serde_json::Value;
use shared_types::{Content, CoreError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, instrument, warn};

// =============================================================================
// ERRORS
// =============================================================================

/// Every failure carries the function it came from.
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("{contract} contract has no function {function}")]
    UnknownFunction {
        contract: ContractKind,
        function: String,
    },

    #[error("{function}: {reason}")]
    BadArguments { function: String, reason: String },

    #[error("{function}: {source}")]
    Failed {
        function: String,
        #[source]
        source: CoreError,
    },

    #[error("{function}: cannot encode result: {reason}")]
    Encode { function: String, reason: String },
}

impl InvocationError {
    /// Stable class label for gateway output.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::UnknownFunction { .. } => "UnknownFunction",
            Self::BadArguments { .. } => "BadArguments",
            Self::Failed { source, .. } => source.label(),
            Self::Encode { .. } => "Encode",
        }
    }

    #[must_use]
    pub fn function(&self) -> &str {
        match self {
            Self::UnknownFunction { function, .. }
            | Self::BadArguments { function, .. }
            | Self::Failed { function, .. }
            | Self::Encode { function, .. } => function,
        }
    }
}

// =============================================================================
// ROUTING
// =============================================================================

/// How a function's transaction ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxMode {
    Submit,
    Evaluate,
}

/// The chaincode a router serves.
#[derive(Clone)]
pub enum HostedContract {
    Validation(Arc<dyn MessageExchangeApi>),
    Bookkeeping(Arc<dyn IdRegistryApi>),
}

impl HostedContract {
    /// Build the configured contract on its reference layout.
    pub fn from_config(config: &NodeConfig) -> Result<Self, ExchangeError> {
        Ok(match config.contract {
            ContractKind::Validation => {
                let service = MessageExchangeService::new(
                    ExchangeTopology::reference(),
                    ExchangeConfig {
                        match_policy: config.match_policy,
                    },
                )?;
                Self::Validation(Arc::new(service))
            }
            ContractKind::Bookkeeping => {
                Self::Bookkeeping(Arc::new(IdRegistryService::new(RegistryLayout::reference())))
            }
        })
    }

    #[must_use]
    pub fn kind(&self) -> ContractKind {
        match self {
            Self::Validation(_) => ContractKind::Validation,
            Self::Bookkeeping(_) => ContractKind::Bookkeeping,
        }
    }
}

/// Transaction mode of `function` on `contract`, `None` if it does not exist.
#[must_use]
pub fn tx_mode(contract: ContractKind, function: &str) -> Option<TxMode> {
    use TxMode::{Evaluate, Submit};

    match (contract, function) {
        (_, "InitLedger") => Some(Submit),
        (ContractKind::Validation, "UpdateMessage" | "RespondToMessage") => Some(Submit),
        (
            ContractKind::Validation,
            "ValidateMessage" | "ReadData" | "GetAllData" | "GetTxnHistory" | "GetHistoryForID",
        ) => Some(Evaluate),
        (ContractKind::Bookkeeping, "UpdateIDs" | "BookKeeping") => Some(Submit),
        (ContractKind::Bookkeeping, "Validate" | "Read" | "GetState" | "GetHistory") => {
            Some(Evaluate)
        }
        _ => None,
    }
}

/// Outcome of one routed call.
#[derive(Clone, Debug, PartialEq)]
pub struct Invocation {
    pub result: Value,
    /// Present for submitted calls.
    pub receipt: Option<CommitReceipt>,
}

pub struct ContractRouter {
    ledger: Arc<InMemoryLedger>,
    contract: HostedContract,
}

impl ContractRouter {
    pub fn new(ledger: Arc<InMemoryLedger>, contract: HostedContract) -> Self {
        Self { ledger, contract }
    }

    #[must_use]
    pub fn contract(&self) -> ContractKind {
        self.contract.kind()
    }

    /// Route one call.
    #[instrument(skip(self, args), fields(contract = %self.contract.kind(), arg_count = args.len()))]
    pub fn invoke(&self, function: &str, args: &[String]) -> Result<Invocation, InvocationError> {
        let Some(mode) = tx_mode(self.contract.kind(), function) else {
            warn!(function, "Unknown function");
            return Err(InvocationError::UnknownFunction {
                contract: self.contract.kind(),
                function: function.to_string(),
            });
        };

        let result = match &self.contract {
            HostedContract::Validation(api) => {
                self.invoke_validation(api.as_ref(), function, mode, args)
            }
            HostedContract::Bookkeeping(api) => {
                self.invoke_bookkeeping(api.as_ref(), function, mode, args)
            }
        };
        if let Err(InvocationError::Failed {
            source: CoreError::HostFailure(host),
            ..
        }) = &result
        {
            error!(function, error = %host, "Ledger host failure");
        }
        result
    }

    fn invoke_validation(
        &self,
        api: &dyn MessageExchangeApi,
        function: &str,
        mode: TxMode,
        args: &[String],
    ) -> Result<Invocation, InvocationError> {
        match function {
            "InitLedger" => {
                expect_args::<0>(function, args)?;
                self.run(function, mode, |stub| api.init_ledger(stub))
            }
            "UpdateMessage" => {
                let [id, content, message_type] = expect_args(function, args)?;
                let content = parse_content(function, content)?;
                self.run(function, mode, |stub| {
                    api.update_message(stub, id, content, message_type)
                })
            }
            "RespondToMessage" => {
                let [id, subscribed, published] = expect_args(function, args)?;
                let subscribed = parse_content(function, subscribed)?;
                let published = parse_content(function, published)?;
                self.run(function, mode, |stub| {
                    api.respond_to_message(stub, id, subscribed, published)
                })
            }
            "ValidateMessage" => {
                let [id, subscribed] = expect_args(function, args)?;
                let subscribed = parse_content(function, subscribed)?;
                self.run(function, mode, |stub| api.validate_message(stub, id, &subscribed))
            }
            "ReadData" => {
                let [id] = expect_args(function, args)?;
                self.run(function, mode, |stub| api.read_data(stub, id))
            }
            "GetAllData" => {
                expect_args::<0>(function, args)?;
                self.run(function, mode, |stub| api.get_all_data(stub))
            }
            _ => {
                // GetTxnHistory | GetHistoryForID
                let [id] = expect_args(function, args)?;
                self.run(function, mode, |stub| api.get_history(stub, id))
            }
        }
    }

    fn invoke_bookkeeping(
        &self,
        api: &dyn IdRegistryApi,
        function: &str,
        mode: TxMode,
        args: &[String],
    ) -> Result<Invocation, InvocationError> {
        match function {
            "InitLedger" => {
                expect_args::<0>(function, args)?;
                self.run(function, mode, |stub| api.init_ledger(stub))
            }
            "Validate" => {
                let [id] = expect_args(function, args)?;
                self.run(function, mode, |stub| api.validate(stub, id))
            }
            "UpdateIDs" => {
                let [ids] = expect_args(function, args)?;
                let ids: Vec<String> =
                    serde_json::from_str(ids).map_err(|e| InvocationError::BadArguments {
                        function: function.to_string(),
                        reason: format!("IDs must be a JSON string array: {e}"),
                    })?;
                self.run(function, mode, |stub| api.update_ids(stub, ids))
            }
            "BookKeeping" => {
                let [id, content, status] = expect_args(function, args)?;
                let content = parse_content(function, content)?;
                self.run(function, mode, |stub| api.book_keeping(stub, id, content, status))
            }
            "Read" => {
                let [id] = expect_args(function, args)?;
                self.run(function, mode, |stub| api.read(stub, id))
            }
            "GetState" => {
                expect_args::<0>(function, args)?;
                self.run(function, mode, |stub| api.get_state(stub))
            }
            _ => {
                // GetHistory
                let [id] = expect_args(function, args)?;
                self.run(function, mode, |stub| api.get_history(stub, id))
            }
        }
    }

    fn run<T, F>(&self, function: &str, mode: TxMode, op: F) -> Result<Invocation, InvocationError>
    where
        T: Serialize,
        F: FnOnce(&mut dyn LedgerStub) -> Result<T, CoreError>,
    {
        let outcome = match mode {
            TxMode::Submit => self
                .ledger
                .submit(op)
                .map(|(output, receipt)| (output, Some(receipt))),
            TxMode::Evaluate => self.ledger.evaluate(op).map(|output| (output, None)),
        };
        let (output, receipt) = outcome.map_err(|source| InvocationError::Failed {
            function: function.to_string(),
            source,
        })?;

        let result = serde_json::to_value(&output).map_err(|e| InvocationError::Encode {
            function: function.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Invocation { result, receipt })
    }
}

fn expect_args<'a, const N: usize>(
    function: &str,
    args: &'a [String],
) -> Result<[&'a str; N], InvocationError> {
    if args.len() != N {
        return Err(InvocationError::BadArguments {
            function: function.to_string(),
            reason: format!("expected {N} argument(s), got {}", args.len()),
        });
    }
    Ok(std::array::from_fn(|i| args[i].as_str()))
}

fn parse_content(function: &str, text: &str) -> Result<Content, InvocationError> {
    Content::from_json_str(text).map_err(|e| InvocationError::BadArguments {
        function: function.to_string(),
        reason: e.to_string(),
    })
}
