//! A running application session: in-memory state loaded from the key-value
//! store at startup, mutated through the ledger and shopping operations, and
//! persisted after each mutation by a background writer.
//!
//! The in-memory state is the single source of truth for the whole session;
//! writes are fire-and-forget and a failed write never rolls anything back.

use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};

use chrono::Local;
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::errors::{StoreError, ValidationError};
use crate::ledger::{EntryId, Expense, Ledger, MonthKey, RecurringExpense};
use crate::shopping::{ShoppingItem, ShoppingList};
use crate::storage::{
    KeyValueStore, CONFIG_KEY, EXPENSES_KEY, RECURRING_EXPENSES_KEY, REMAINING_KEY,
    SHOPPING_LIST_KEY,
};

pub struct Session {
    ledger: Ledger,
    shopping: ShoppingList,
    config: Config,
    persister: Persister,
}

impl Session {
    /// Loads all blobs from the store and starts the persistence worker.
    ///
    /// Opening never fails: an absent or unreadable blob is logged and
    /// replaced by an empty list / zero scalar, exactly as on first launch.
    pub fn open(store: Arc<dyn KeyValueStore>) -> Self {
        let config = Config::from_blob(read_blob(store.as_ref(), CONFIG_KEY).as_deref());
        let ledger = Ledger {
            remaining: load_remaining(store.as_ref()),
            expenses: load_list::<Expense>(store.as_ref(), EXPENSES_KEY),
            recurring_expenses: load_list::<RecurringExpense>(
                store.as_ref(),
                RECURRING_EXPENSES_KEY,
            ),
        };
        let shopping =
            ShoppingList::from(load_list::<ShoppingItem>(store.as_ref(), SHOPPING_LIST_KEY));
        Self {
            ledger,
            shopping,
            config,
            persister: Persister::spawn(store),
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn shopping(&self) -> &ShoppingList {
        &self.shopping
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The billing cycle active right now; computed per call from the clock.
    pub fn current_month(&self) -> MonthKey {
        MonthKey::current()
    }

    /// Blocks until every queued write has been attempted. Mutations are
    /// fire-and-forget; this exists for shutdown paths and tests.
    pub fn flush(&self) {
        self.persister.flush();
    }

    // ── Budget ledger ─────────────────────────────────────────

    pub fn add_expense(
        &mut self,
        description: &str,
        amount_text: &str,
    ) -> Result<EntryId, ValidationError> {
        let date_label = self.config.format_date(Local::now().date_naive());
        let id = self.ledger.add_expense(description, amount_text, date_label)?;
        self.persist_expenses();
        self.persist_remaining();
        Ok(id)
    }

    pub fn delete_expense(&mut self, id: EntryId) -> Result<Expense, ValidationError> {
        let removed = self.ledger.delete_expense(id)?;
        self.persist_expenses();
        self.persist_remaining();
        Ok(removed)
    }

    pub fn edit_expense(
        &mut self,
        id: EntryId,
        description: &str,
        amount_text: &str,
    ) -> Result<(), ValidationError> {
        self.ledger.edit_expense(id, description, amount_text)?;
        self.persist_expenses();
        self.persist_remaining();
        Ok(())
    }

    pub fn add_recurring_expense(
        &mut self,
        description: &str,
        amount_text: &str,
    ) -> Result<EntryId, ValidationError> {
        let id = self.ledger.add_recurring_expense(description, amount_text)?;
        self.persist_recurring();
        Ok(id)
    }

    pub fn delete_recurring_expense(
        &mut self,
        id: EntryId,
    ) -> Result<RecurringExpense, ValidationError> {
        let month = self.current_month();
        let removed = self.ledger.delete_recurring_expense(id, &month)?;
        self.persist_recurring();
        self.persist_remaining();
        Ok(removed)
    }

    pub fn edit_recurring_expense(
        &mut self,
        id: EntryId,
        description: &str,
        amount_text: &str,
    ) -> Result<(), ValidationError> {
        let month = self.current_month();
        self.ledger
            .edit_recurring_expense(id, description, amount_text, &month)?;
        self.persist_recurring();
        self.persist_remaining();
        Ok(())
    }

    pub fn toggle_recurring_paid(&mut self, id: EntryId) -> Result<bool, ValidationError> {
        let month = self.current_month();
        let paid = self.ledger.toggle_recurring_paid(id, &month)?;
        self.persist_recurring();
        self.persist_remaining();
        Ok(paid)
    }

    pub fn reset_recurring_paid_status(&mut self) {
        self.ledger.reset_recurring_paid_status();
        self.persist_recurring();
    }

    pub fn full_month_reset(&mut self) {
        self.ledger.full_month_reset();
        self.persist_expenses();
        self.persist_recurring();
    }

    pub fn adjust_remaining(&mut self, delta_text: &str) -> Result<f64, ValidationError> {
        let remaining = self.ledger.adjust_remaining(delta_text)?;
        self.persist_remaining();
        Ok(remaining)
    }

    // ── Shopping list ─────────────────────────────────────────

    pub fn add_shopping_item(&mut self, name: &str) -> Result<EntryId, ValidationError> {
        let id = self.shopping.add_item(name)?;
        self.persist_shopping();
        Ok(id)
    }

    pub fn toggle_shopping_item(&mut self, id: EntryId) -> Result<bool, ValidationError> {
        let checked = self.shopping.toggle_item(id)?;
        self.persist_shopping();
        Ok(checked)
    }

    pub fn delete_shopping_item(&mut self, id: EntryId) -> Result<ShoppingItem, ValidationError> {
        let removed = self.shopping.delete_item(id)?;
        self.persist_shopping();
        Ok(removed)
    }

    pub fn move_shopping_item(
        &mut self,
        id: EntryId,
        position: usize,
    ) -> Result<(), ValidationError> {
        self.shopping.move_item(id, position)?;
        self.persist_shopping();
        Ok(())
    }

    pub fn clear_shopping_items(&mut self) {
        self.shopping.clear();
        self.persist_shopping();
    }

    // ── Configuration ─────────────────────────────────────────

    pub fn set_locale(&mut self, locale: &str) -> Result<(), ValidationError> {
        let trimmed = locale.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty("locale"));
        }
        self.config.locale = trimmed.to_string();
        self.persist_config();
        Ok(())
    }

    pub fn set_currency(&mut self, currency: &str) -> Result<(), ValidationError> {
        let trimmed = currency.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty("currency"));
        }
        self.config.currency = trimmed.to_string();
        self.persist_config();
        Ok(())
    }

    // ── Persistence requests ──────────────────────────────────

    fn persist_expenses(&self) {
        self.queue(
            EXPENSES_KEY,
            serde_json::to_string(&self.ledger.expenses).map_err(StoreError::from),
        );
    }

    fn persist_recurring(&self) {
        self.queue(
            RECURRING_EXPENSES_KEY,
            serde_json::to_string(&self.ledger.recurring_expenses).map_err(StoreError::from),
        );
    }

    fn persist_remaining(&self) {
        // The scalar is stored as plain decimal text, not JSON.
        self.queue(REMAINING_KEY, Ok(self.ledger.remaining.to_string()));
    }

    fn persist_shopping(&self) {
        self.queue(
            SHOPPING_LIST_KEY,
            serde_json::to_string(&self.shopping).map_err(StoreError::from),
        );
    }

    fn persist_config(&self) {
        self.queue(CONFIG_KEY, self.config.to_blob());
    }

    fn queue(&self, key: &'static str, encoded: Result<String, StoreError>) {
        match encoded {
            Ok(payload) => self.persister.queue(key, payload),
            Err(err) => tracing::error!("failed to encode `{}` snapshot: {}", key, err),
        }
    }
}

fn read_blob(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(blob) => blob,
        Err(err) => {
            tracing::warn!("failed to read `{}`, treating as absent: {}", key, err);
            None
        }
    }
}

fn load_list<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Vec<T> {
    let Some(raw) = read_blob(store, key) else {
        return Vec::new();
    };
    serde_json::from_str(&raw).unwrap_or_else(|err| {
        tracing::warn!("unreadable `{}` blob, starting empty: {}", key, err);
        Vec::new()
    })
}

fn load_remaining(store: &dyn KeyValueStore) -> f64 {
    let Some(raw) = read_blob(store, REMAINING_KEY) else {
        return 0.0;
    };
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => {
            tracing::warn!("unreadable `remaining` blob, starting at 0: {}", raw);
            0.0
        }
    }
}

enum WriteRequest {
    Put { key: &'static str, payload: String },
    Flush(mpsc::SyncSender<()>),
}

/// Background writer draining persistence requests in order. Failures are
/// logged and dropped; the queue is drained before the session goes away.
struct Persister {
    tx: Option<mpsc::Sender<WriteRequest>>,
    worker: Option<JoinHandle<()>>,
}

impl Persister {
    fn spawn(store: Arc<dyn KeyValueStore>) -> Self {
        let (tx, rx) = mpsc::channel::<WriteRequest>();
        let spawned = thread::Builder::new()
            .name("pocket-budget-persister".into())
            .spawn(move || {
                while let Ok(request) = rx.recv() {
                    match request {
                        WriteRequest::Put { key, payload } => {
                            if let Err(err) = store.set(key, &payload) {
                                tracing::error!("failed to persist `{}`: {}", key, err);
                            }
                        }
                        WriteRequest::Flush(ack) => {
                            let _ = ack.send(());
                        }
                    }
                }
            });
        match spawned {
            Ok(worker) => Self {
                tx: Some(tx),
                worker: Some(worker),
            },
            Err(err) => {
                tracing::error!("failed to start persistence worker: {}", err);
                Self {
                    tx: None,
                    worker: None,
                }
            }
        }
    }

    fn queue(&self, key: &'static str, payload: String) {
        let Some(tx) = &self.tx else {
            return;
        };
        if tx.send(WriteRequest::Put { key, payload }).is_err() {
            tracing::error!("persistence worker gone, dropping `{}` snapshot", key);
        }
    }

    fn flush(&self) {
        let Some(tx) = &self.tx else {
            return;
        };
        let (ack_tx, ack_rx) = mpsc::sync_channel(0);
        if tx.send(WriteRequest::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }
}

impl Drop for Persister {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain the queue and exit.
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
