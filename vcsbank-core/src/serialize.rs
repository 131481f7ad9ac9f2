use crate::bank::BankOutOfRange;
use crate::scheme::SchemeKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SaveStateError {
    #[error("error serializing/deserializing bank state: {source}")]
    Serialization {
        #[from]
        source: bincode::Error,
    },
    #[error("bank state was saved from a {actual} cartridge, this is a {expected} cartridge")]
    SchemeMismatch {
        expected: SchemeKind,
        actual: SchemeKind,
    },
    #[error("invalid bank state: {source}")]
    BankOutOfRange {
        #[from]
        source: BankOutOfRange,
    },
}

/// The part of a cartridge's state that changes while a game runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankSnapshot {
    pub scheme: SchemeKind,
    pub active_bank: u16,
}

pub fn snapshot_to_bytes(snapshot: &BankSnapshot) -> Result<Vec<u8>, SaveStateError> {
    let bytes = bincode::serialize(snapshot)?;

    log::debug!(
        "Serialized {} bank state (bank {}) into {} bytes",
        snapshot.scheme,
        snapshot.active_bank,
        bytes.len()
    );

    Ok(bytes)
}

pub fn snapshot_from_bytes(bytes: &[u8]) -> Result<BankSnapshot, SaveStateError> {
    let snapshot: BankSnapshot = bincode::deserialize(bytes)?;

    log::debug!(
        "Deserialized {} bank state (bank {})",
        snapshot.scheme,
        snapshot.active_bank
    );

    Ok(snapshot)
}
