use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{EntryId, MonthKey};

/// A template charge (e.g. rent) whose paid/unpaid status is tracked per
/// month. The entry survives month resets; only its paid flags are cleared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringExpense {
    pub id: EntryId,
    pub description: String,
    pub amount: f64,
    /// Months already paid. Membership of the current month key is the sole
    /// source of truth for "paid this cycle"; it is never cached elsewhere.
    #[serde(rename = "paidMonths")]
    pub paid_months: BTreeSet<MonthKey>,
}

impl RecurringExpense {
    pub fn new(description: impl Into<String>, amount: f64) -> Self {
        Self {
            id: EntryId::now(),
            description: description.into(),
            amount,
            paid_months: BTreeSet::new(),
        }
    }

    pub fn is_paid(&self, month: &MonthKey) -> bool {
        self.paid_months.contains(month)
    }
}
