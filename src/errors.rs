use thiserror::Error;

use crate::ledger::EntryId;

/// Rejection raised by ledger and shopping operations before any mutation.
///
/// Each variant names the offending input field so callers can surface it
/// directly; state is guaranteed untouched when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("{0} must be a number")]
    NotANumber(&'static str),
    #[error("{0} must be a positive number")]
    NotPositive(&'static str),
    #[error("no entry with id {0}")]
    UnknownEntry(EntryId),
}

/// Error type that captures persistence-gateway failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
