use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Identifier for ledger entries and shopping items, derived from the
/// creation timestamp in milliseconds.
///
/// Two creations landing on the same millisecond tick bump the later one into
/// the next tick, so ids stay unique and monotonic for the lifetime of the
/// process. Serializes as a plain number so existing snapshots round-trip
/// unchanged.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntryId(i64);

static LAST_ISSUED: AtomicI64 = AtomicI64::new(0);

impl EntryId {
    /// Allocates an id from the current wall-clock time.
    pub fn now() -> Self {
        let now = Utc::now().timestamp_millis();
        let mut last = LAST_ISSUED.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(last + 1);
            match LAST_ISSUED.compare_exchange_weak(
                last,
                candidate,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Self(candidate),
                Err(observed) => last = observed,
            }
        }
    }

    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntryId {
    type Err = std::num::ParseIntError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        raw.parse().map(Self)
    }
}

/// A single dated spend event with no recurrence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: EntryId,
    pub description: String,
    pub amount: f64,
    /// Creation date, pre-formatted in the configured display locale.
    pub date: String,
}

impl Expense {
    pub fn new(description: impl Into<String>, amount: f64, date: impl Into<String>) -> Self {
        Self {
            id: EntryId::now(),
            description: description.into(),
            amount,
            date: date.into(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_id(
        id: EntryId,
        description: impl Into<String>,
        amount: f64,
        date: impl Into<String>,
    ) -> Self {
        Self {
            id,
            description: description.into(),
            amount,
            date: date.into(),
        }
    }
}
