use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// A `"YYYY-MM"` token identifying one billing cycle.
///
/// Paid-status lookups compare month keys textually; the zero-padded format
/// makes lexical order equal chronological order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthKey(String);

impl MonthKey {
    /// Month key for the month containing `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self(format!("{:04}-{:02}", date.year(), date.month()))
    }

    /// Month key for the wall-clock month at the call site.
    ///
    /// Ledger operations take the key as a parameter instead of calling this,
    /// so tests can pin a cycle; only the session layer reads the clock.
    pub fn current() -> Self {
        Self::from_date(Local::now().date_naive())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMonthKeyError;

impl fmt::Display for ParseMonthKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("month key must match YYYY-MM")
    }
}

impl std::error::Error for ParseMonthKeyError {}

impl FromStr for MonthKey {
    type Err = ParseMonthKeyError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (year, month) = raw.split_once('-').ok_or(ParseMonthKeyError)?;
        if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
            return Err(ParseMonthKeyError);
        }
        if month.len() != 2 || !month.chars().all(|c| c.is_ascii_digit()) {
            return Err(ParseMonthKeyError);
        }
        let month_number: u32 = month.parse().map_err(|_| ParseMonthKeyError)?;
        if !(1..=12).contains(&month_number) {
            return Err(ParseMonthKeyError);
        }
        Ok(Self(raw.to_string()))
    }
}
