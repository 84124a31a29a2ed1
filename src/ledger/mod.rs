//! Budget ledger state, entry types, and the month-key billing cycle token.

pub mod expense;
#[allow(clippy::module_inception)]
pub mod ledger;
pub mod month;
pub mod recurring;

pub use expense::{EntryId, Expense};
pub use ledger::Ledger;
pub use month::{MonthKey, ParseMonthKeyError};
pub use recurring::RecurringExpense;
