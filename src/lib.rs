#![doc(test(attr(deny(warnings))))]

//! Pocket Budget keeps a monthly spending ledger and a shopping list on top of
//! a local key-value store: one-off expenses, recurring monthly charges with a
//! per-month paid flag, and a manually adjusted remaining budget.

pub mod cli;
pub mod config;
pub mod errors;
pub mod ledger;
pub mod session;
pub mod shopping;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Pocket Budget tracing initialized.");
    });
}
