//! Read-only views derived from an inventory snapshot.
//!
//! Both projections are generated from the active [`Schema`], so the table and
//! the CSV export always show the same columns in the same order.

use stocktally_core::{DomainError, DomainResult};

use crate::item::Item;
use crate::schema::Schema;

/// File name offered for the CSV download.
pub const EXPORT_FILE_NAME: &str = "contagem_estoque.csv";

/// Message shown when an export is requested on an empty list.
pub const EMPTY_EXPORT_MESSAGE: &str = "Não há itens para exportar.";

/// One table row: display values in schema order plus the removal token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Position of the item in the snapshot; pass it back to `remove_at`.
    pub index: usize,
    pub cells: Vec<String>,
}

/// A rendered CSV export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvDocument {
    pub file_name: &'static str,
    pub content: String,
}

impl CsvDocument {
    pub fn as_bytes(&self) -> &[u8] {
        self.content.as_bytes()
    }

    /// Number of data lines (header excluded).
    pub fn record_count(&self) -> usize {
        self.content.lines().count().saturating_sub(1)
    }
}

/// Stateless projector bound to a schema.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ViewProjector {
    schema: Schema,
}

impl ViewProjector {
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }

    pub fn headers(&self) -> Vec<&'static str> {
        self.schema.headers()
    }

    pub fn to_rows(&self, snapshot: &[Item]) -> Vec<Row> {
        snapshot
            .iter()
            .enumerate()
            .map(|(index, item)| Row {
                index,
                cells: self.cells(item),
            })
            .collect()
    }

    /// Render the snapshot as CSV.
    ///
    /// Values are joined with commas as-is; embedded commas are not quoted.
    pub fn to_csv(&self, snapshot: &[Item]) -> DomainResult<CsvDocument> {
        if snapshot.is_empty() {
            return Err(DomainError::empty_export(EMPTY_EXPORT_MESSAGE));
        }

        let mut content = self.headers().join(",");
        content.push('\n');
        for item in snapshot {
            content.push_str(&self.cells(item).join(","));
            content.push('\n');
        }

        Ok(CsvDocument {
            file_name: EXPORT_FILE_NAME,
            content,
        })
    }

    fn cells(&self, item: &Item) -> Vec<String> {
        self.schema
            .fields()
            .iter()
            .map(|field| item.display_value(field.key))
            .collect()
    }
}
