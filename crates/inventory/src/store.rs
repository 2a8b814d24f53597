//! The inventory list and its persisted mirror.

use stocktally_core::DomainError;

use crate::confirm::{CLEAR_ALL_PROMPT, Confirm};
use crate::error::InventoryResult;
use crate::item::{Item, ItemDraft};
use crate::schema::Schema;
use crate::storage::{KeyValueStorage, StorageError};

/// Storage slot holding the serialized list.
pub const DEFAULT_SLOT: &str = "inventory";

/// Single source of truth for the tally.
///
/// Owns the ordered list of items and writes the whole list back to its
/// storage slot after every mutation. Built once per session with
/// [`InventoryStore::load`].
///
/// When a write fails the in-memory change is kept (the user already sees it)
/// and the failure is returned as [`InventoryError::Storage`](crate::InventoryError::Storage).
#[derive(Debug)]
pub struct InventoryStore<S> {
    storage: S,
    slot: String,
    schema: Schema,
    items: Vec<Item>,
}

impl<S: KeyValueStorage> InventoryStore<S> {
    /// Rehydrate from the default slot. Never fails: a missing, unreadable or
    /// malformed document yields an empty list.
    pub fn load(storage: S, schema: Schema) -> Self {
        Self::load_from_slot(storage, schema, DEFAULT_SLOT)
    }

    pub fn load_from_slot(storage: S, schema: Schema, slot: impl Into<String>) -> Self {
        let slot = slot.into();
        let items = read_items(&storage, &slot, &schema);
        tracing::debug!(slot = %slot, len = items.len(), variant = %schema.variant(), "inventory loaded");

        Self {
            storage,
            slot,
            schema,
            items,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Current items, in insertion order.
    pub fn list(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Validate `draft`, append it and persist.
    pub fn add(&mut self, draft: &ItemDraft) -> InventoryResult<&Item> {
        let item = Item::from_draft(&self.schema, draft)?;
        tracing::debug!(code = %item.code, index = self.items.len(), "item added");

        self.items.push(item);
        self.persist()?;

        let last = self.items.len() - 1;
        Ok(&self.items[last])
    }

    /// Remove the item at `index` and persist. Later items shift left by one.
    pub fn remove_at(&mut self, index: usize) -> InventoryResult<Item> {
        let len = self.items.len();
        if index >= len {
            return Err(DomainError::index_out_of_range(index, len).into());
        }

        let removed = self.items.remove(index);
        tracing::debug!(index, code = %removed.code, len = self.items.len(), "item removed");

        self.persist()?;
        Ok(removed)
    }

    /// Empty the list after an affirmative answer from `confirm`.
    ///
    /// Returns whether the list was cleared.
    pub fn clear(&mut self, confirm: &mut impl Confirm) -> InventoryResult<bool> {
        if !confirm.ask(CLEAR_ALL_PROMPT) {
            tracing::debug!("clear declined");
            return Ok(false);
        }

        let dropped = self.items.len();
        self.items.clear();
        tracing::debug!(dropped, "inventory cleared");

        self.persist()?;
        Ok(true)
    }

    fn persist(&self) -> InventoryResult<()> {
        let written = serde_json::to_string(&self.items)
            .map_err(|e| StorageError::write(&self.slot, format!("serialization failed: {e}")))
            .and_then(|document| self.storage.set(&self.slot, &document));

        written.map_err(|err| {
            tracing::error!(slot = %self.slot, error = %err, "failed to persist inventory");
            err.into()
        })
    }
}

fn read_items<S: KeyValueStorage>(storage: &S, slot: &str, schema: &Schema) -> Vec<Item> {
    let raw = match storage.get(slot) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(err) => {
            tracing::warn!(slot, error = %err, "failed to read inventory; starting empty");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Option<Vec<Item>>>(&raw) {
        Ok(items) => {
            let mut items = items.unwrap_or_default();
            for item in &mut items {
                item.conform_to(schema);
            }
            items
        }
        Err(err) => {
            tracing::warn!(slot, error = %err, "persisted inventory is malformed; starting empty");
            Vec::new()
        }
    }
}
