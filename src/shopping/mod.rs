//! Reorderable shopping list, independent of the budget ledger.

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::ledger::EntryId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingItem {
    pub id: EntryId,
    pub name: String,
    pub checked: bool,
}

impl ShoppingItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntryId::now(),
            name: name.into(),
            checked: false,
        }
    }
}

/// The shopping list is plain CRUD plus reorder; no derived totals, no
/// interaction with the remaining budget.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShoppingList {
    items: Vec<ShoppingItem>,
}

impl From<Vec<ShoppingItem>> for ShoppingList {
    fn from(items: Vec<ShoppingItem>) -> Self {
        Self { items }
    }
}

impl ShoppingList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[ShoppingItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Prepends a new unchecked item so the latest addition lists first.
    pub fn add_item(&mut self, name: &str) -> Result<EntryId, ValidationError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty("name"));
        }
        let item = ShoppingItem::new(trimmed);
        let id = item.id;
        self.items.insert(0, item);
        Ok(id)
    }

    /// Flips the checked flag, returning the new state.
    pub fn toggle_item(&mut self, id: EntryId) -> Result<bool, ValidationError> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(ValidationError::UnknownEntry(id))?;
        item.checked = !item.checked;
        Ok(item.checked)
    }

    pub fn delete_item(&mut self, id: EntryId) -> Result<ShoppingItem, ValidationError> {
        let position = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or(ValidationError::UnknownEntry(id))?;
        Ok(self.items.remove(position))
    }

    /// Moves an item to `position`, clamped to the end of the list.
    pub fn move_item(&mut self, id: EntryId, position: usize) -> Result<(), ValidationError> {
        let from = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or(ValidationError::UnknownEntry(id))?;
        let item = self.items.remove(from);
        let to = position.min(self.items.len());
        self.items.insert(to, item);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_with(names: &[&str]) -> (ShoppingList, Vec<EntryId>) {
        let mut list = ShoppingList::new();
        // add_item prepends, but the ids are collected in call order, which
        // already matches the input order.
        let ids: Vec<EntryId> = names
            .iter()
            .map(|name| list.add_item(name).unwrap())
            .collect();
        (list, ids)
    }

    #[test]
    fn add_item_prepends_and_trims() {
        let mut list = ShoppingList::new();
        list.add_item("Milk").unwrap();
        list.add_item("  Bread ").unwrap();
        assert_eq!(list.items()[0].name, "Bread");
        assert_eq!(list.items()[1].name, "Milk");
        assert!(!list.items()[0].checked);
    }

    #[test]
    fn add_item_rejects_blank_names() {
        let mut list = ShoppingList::new();
        assert_eq!(
            list.add_item("   ").unwrap_err(),
            ValidationError::Empty("name")
        );
        assert!(list.is_empty());
    }

    #[test]
    fn toggle_item_flips_and_reports_state() {
        let mut list = ShoppingList::new();
        let id = list.add_item("Eggs").unwrap();
        assert!(list.toggle_item(id).unwrap());
        assert!(!list.toggle_item(id).unwrap());
    }

    #[test]
    fn delete_item_removes_only_the_target() {
        let (mut list, ids) = list_with(&["Milk", "Bread", "Eggs"]);
        let removed = list.delete_item(ids[1]).unwrap();
        assert_eq!(removed.name, "Bread");
        let names: Vec<_> = list.items().iter().map(|item| item.name.as_str()).collect();
        assert_eq!(names, ["Eggs", "Milk"]);
    }

    #[test]
    fn move_item_reorders_and_clamps() {
        let (mut list, ids) = list_with(&["Milk", "Bread", "Eggs"]);
        // List currently reads Eggs, Bread, Milk.
        list.move_item(ids[0], 0).unwrap();
        let names: Vec<_> = list.items().iter().map(|item| item.name.as_str()).collect();
        assert_eq!(names, ["Milk", "Eggs", "Bread"]);

        list.move_item(ids[0], 99).unwrap();
        assert_eq!(list.items().last().unwrap().name, "Milk");
    }

    #[test]
    fn clear_empties_the_list() {
        let (mut list, _) = list_with(&["Milk", "Bread"]);
        list.clear();
        assert!(list.is_empty());
    }

    #[test]
    fn serializes_as_a_bare_array() {
        let mut list = ShoppingList::new();
        list.add_item("Milk").unwrap();
        let json = serde_json::to_value(&list).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["name"], "Milk");
        assert_eq!(json[0]["checked"], false);
    }
}
