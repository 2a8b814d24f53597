//! Inventory tally module.
//!
//! This crate contains the tally rules: the declarative field schema, item
//! normalization, the list store with its persisted mirror, the table/CSV
//! projections and the entry form. IO happens only through the injected
//! [`KeyValueStorage`], [`Confirm`] and [`BarcodeScanner`] seams.

pub mod confirm;
pub mod error;
pub mod form;
pub mod item;
pub mod projection;
pub mod scanner;
pub mod schema;
pub mod storage;
pub mod store;

pub use confirm::{CLEAR_ALL_PROMPT, Confirm, FixedAnswer};
pub use error::{InventoryError, InventoryResult};
pub use form::{EnterOutcome, EntryForm, ScanOutcome};
pub use item::{Count, Item, ItemDraft};
pub use projection::{CsvDocument, EMPTY_EXPORT_MESSAGE, EXPORT_FILE_NAME, Row, ViewProjector};
pub use scanner::{BarcodeScanner, ScanError, ScanEvent, ScanSession};
pub use schema::{FieldKey, FieldSpec, RequiredRule, Schema, Variant};
pub use storage::{InMemoryStorage, KeyValueStorage, StorageError};
pub use store::{DEFAULT_SLOT, InventoryStore};
