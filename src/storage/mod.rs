//! Persistence gateway: a string key-value contract over serialized text
//! blobs, with a JSON-file backend and an in-memory store for tests.

pub mod json_backend;
pub mod memory;

use crate::errors::StoreError;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Storage key for the one-off expense list blob.
pub const EXPENSES_KEY: &str = "expenses";
/// Storage key for the recurring expense list blob.
pub const RECURRING_EXPENSES_KEY: &str = "recurringExpenses";
/// Storage key for the remaining-budget scalar, stored as plain decimal text.
pub const REMAINING_KEY: &str = "remaining";
/// Storage key for the shopping list blob.
pub const SHOPPING_LIST_KEY: &str = "shoppingList";
/// Storage key for the configuration blob.
pub const CONFIG_KEY: &str = "config";

/// Abstraction over key-value backends storing serialized text blobs.
///
/// An absent key is not an error; callers treat it as an empty list or zero
/// scalar. Write failures are reported but never roll back in-memory state.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

pub use json_backend::JsonStore;
pub use memory::MemoryStore;
