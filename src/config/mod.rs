//! Display configuration persisted alongside the ledger blobs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub locale: String,
    pub currency: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "fr-FR".into(),
            currency: "EUR".into(),
        }
    }
}

impl Config {
    /// Decodes the stored configuration blob, falling back to defaults when
    /// the key is absent or the blob does not parse.
    pub fn from_blob(blob: Option<&str>) -> Self {
        match blob {
            None => Self::default(),
            Some(raw) => serde_json::from_str(raw).unwrap_or_else(|err| {
                tracing::warn!("unreadable config blob, using defaults: {}", err);
                Self::default()
            }),
        }
    }

    pub fn to_blob(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Date-label format for new expenses, matching the locale's short date
    /// order. Month-first for en-US, day-first everywhere else.
    pub fn date_format(&self) -> &'static str {
        if self.locale.eq_ignore_ascii_case("en-US") {
            "%m/%d/%Y"
        } else {
            "%d/%m/%Y"
        }
    }

    pub fn format_date(&self, date: NaiveDate) -> String {
        date.format(self.date_format()).to_string()
    }

    pub fn currency_symbol(&self) -> &str {
        match self.currency.as_str() {
            "EUR" => "\u{20ac}",
            "USD" => "$",
            "GBP" => "\u{a3}",
            other => other,
        }
    }

    pub fn format_amount(&self, value: f64) -> String {
        format!("{:.2}{}", value, self.currency_symbol())
    }
}
