//! # Typed Record Codec
//!
//! Get/put helpers over a [`LedgerStub`] that speak records instead of bytes.
//!
//! | Host result | Codec result |
//! |-------------|--------------|
//! | `Ok(None)` | `CoreError::NotFound { key }` |
//! | bytes that do not parse as `T` | `CoreError::Corrupt { key, .. }` |
//! | `Err(StoreError)` | `CoreError::HostFailure` |

use crate::ports::LedgerStub;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use shared_types::CoreError;

/// Read the raw bytes stored under `key`.
pub fn read_raw(stub: &mut dyn LedgerStub, key: &str) -> Result<Vec<u8>, CoreError> {
    stub.get_state(key)?.ok_or_else(|| CoreError::NotFound {
        key: key.to_string(),
    })
}

/// Read and deserialize the record stored under `key`.
pub fn read_record<T: DeserializeOwned>(
    stub: &mut dyn LedgerStub,
    key: &str,
) -> Result<T, CoreError> {
    let bytes = read_raw(stub, key)?;
    decode(key, &bytes)
}

/// Read the record stored under `key` as an untyped JSON value.
pub fn read_value(stub: &mut dyn LedgerStub, key: &str) -> Result<Value, CoreError> {
    read_record(stub, key)
}

/// Read a record, treating an absent key as `None` rather than `NotFound`.
pub fn read_optional<T: DeserializeOwned>(
    stub: &mut dyn LedgerStub,
    key: &str,
) -> Result<Option<T>, CoreError> {
    match stub.get_state(key)? {
        Some(bytes) => decode(key, &bytes).map(Some),
        None => Ok(None),
    }
}

/// Serialize `record` as JSON and queue it under `key`.
pub fn write_record<T: Serialize>(
    stub: &mut dyn LedgerStub,
    key: &str,
    record: &T,
) -> Result<(), CoreError> {
    let bytes = serde_json::to_vec(record).map_err(|e| CoreError::Encode {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    stub.put_state(key, bytes)?;
    Ok(())
}

pub(crate) fn decode<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> Result<T, CoreError> {
    serde_json::from_slice(bytes).map_err(|e| CoreError::Corrupt {
        key: key.to_string(),
        reason: e.to_string(),
    })
}
