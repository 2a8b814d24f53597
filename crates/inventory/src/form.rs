//! Pending entry state: the input fields, the focus cursor and the status line.
//!
//! This is the host-independent half of the entry screen. A host feeds it
//! keystrokes and scanner reports; the form decides where focus goes, when an
//! add is submitted and what status message to show.

use crate::error::InventoryResult;
use crate::item::{Item, ItemDraft};
use crate::scanner::ScanEvent;
use crate::schema::{FieldKey, Schema};
use crate::storage::KeyValueStorage;
use crate::store::InventoryStore;

pub const SCANNER_WAITING: &str = "Aguardando leitura...";

/// What pressing Enter on the focused field leads to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EnterOutcome {
    /// Focus moved to the given field.
    Focus(FieldKey),
    /// Enter on the last field: the host should submit the form.
    Submit,
}

/// What a scanner report did to the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Transient noise, nothing changed.
    Ignored,
    /// The code field was filled; the host should stop the scanner.
    CodeCaptured(String),
    /// A real error was put on the status line; scanning continues.
    Failed,
}

#[derive(Debug, Clone)]
pub struct EntryForm {
    schema: Schema,
    inputs: Vec<FieldKey>,
    draft: ItemDraft,
    focus: usize,
    status: Option<String>,
}

impl EntryForm {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            inputs: schema.input_fields().map(|f| f.key).collect(),
            draft: ItemDraft::default(),
            focus: 0,
            status: None,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn draft(&self) -> &ItemDraft {
        &self.draft
    }

    pub fn inputs(&self) -> &[FieldKey] {
        &self.inputs
    }

    pub fn focused(&self) -> FieldKey {
        self.inputs[self.focus]
    }

    /// Move focus to `key`. Ignored if the schema has no such input.
    pub fn focus(&mut self, key: FieldKey) {
        if let Some(pos) = self.inputs.iter().position(|k| *k == key) {
            self.focus = pos;
        }
    }

    /// Replace the text of the focused field.
    pub fn input(&mut self, text: &str) {
        let key = self.focused();
        self.draft.set_field(key, text);
    }

    pub fn value(&self, key: FieldKey) -> &str {
        self.draft.field(key)
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn press_enter(&mut self) -> EnterOutcome {
        if self.focus + 1 < self.inputs.len() {
            self.focus += 1;
            EnterOutcome::Focus(self.focused())
        } else {
            EnterOutcome::Submit
        }
    }

    /// Add the pending draft to `store`.
    ///
    /// On success (or when only the save failed) the fields are emptied and
    /// focus returns to the first field. On a validation failure the fields
    /// are kept and the message goes to the status line.
    pub fn submit<S: KeyValueStorage>(
        &mut self,
        store: &mut InventoryStore<S>,
    ) -> InventoryResult<Item> {
        match store.add(&self.draft) {
            Ok(item) => {
                let item = item.clone();
                self.reset();
                Ok(item)
            }
            Err(err) => {
                if err.mutation_applied() {
                    self.reset();
                }
                self.status = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Apply a scanner report.
    pub fn apply_scan(&mut self, event: ScanEvent) -> ScanOutcome {
        match event {
            Ok(text) => {
                let code = text.trim().to_string();
                self.draft.set_field(FieldKey::Code, code.clone());
                self.status = Some(format!("Código lido: {code}"));
                self.focus(FieldKey::Pallets);
                ScanOutcome::CodeCaptured(code)
            }
            Err(err) if err.is_transient() => ScanOutcome::Ignored,
            Err(err) => {
                tracing::warn!(error = %err, "scanner error");
                self.status = Some(format!("Erro na leitura: {err}"));
                ScanOutcome::Failed
            }
        }
    }

    pub fn scanner_started(&mut self) {
        self.status = Some(SCANNER_WAITING.to_string());
    }

    /// Stopping the scanner always clears the scan status.
    pub fn scanner_stopped(&mut self) {
        self.status = None;
    }

    fn reset(&mut self) {
        self.draft.clear();
        self.focus = 0;
        self.status = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::ScanError;
    use crate::schema::{CODE_ONLY, DETAILED};
    use crate::storage::InMemoryStorage;

    fn fill(form: &mut EntryForm, values: &[&str]) -> EnterOutcome {
        let mut outcome = EnterOutcome::Submit;
        for value in values {
            form.input(value);
            outcome = form.press_enter();
        }
        outcome
    }

    #[test]
    fn enter_walks_input_fields_then_submits() {
        let mut form = EntryForm::new(CODE_ONLY);
        assert_eq!(form.focused(), FieldKey::Code);
        assert_eq!(form.press_enter(), EnterOutcome::Focus(FieldKey::Pallets));
        assert_eq!(form.press_enter(), EnterOutcome::Focus(FieldKey::BoxesPerPallet));
        assert_eq!(form.press_enter(), EnterOutcome::Focus(FieldKey::UnitsPerBox));
        assert_eq!(form.press_enter(), EnterOutcome::Submit);
    }

    #[test]
    fn detailed_form_never_focuses_total() {
        let form = EntryForm::new(DETAILED);
        assert!(!form.inputs().contains(&FieldKey::TotalUnits));
        assert_eq!(form.inputs().len(), 5);
    }

    #[test]
    fn submit_adds_item_and_resets_fields() {
        let mut store = InventoryStore::load(InMemoryStorage::new(), CODE_ONLY);
        let mut form = EntryForm::new(CODE_ONLY);

        assert_eq!(fill(&mut form, &["A1", "2", "3", "4"]), EnterOutcome::Submit);
        let item = form.submit(&mut store).unwrap();

        assert_eq!(item.code, "A1");
        assert_eq!(store.len(), 1);
        assert_eq!(form.value(FieldKey::Code), "");
        assert_eq!(form.value(FieldKey::Pallets), "");
        assert_eq!(form.focused(), FieldKey::Code);
    }

    #[test]
    fn failed_submit_keeps_fields_and_reports() {
        let mut store = InventoryStore::load(InMemoryStorage::new(), CODE_ONLY);
        let mut form = EntryForm::new(CODE_ONLY);
        fill(&mut form, &["", "5", "", ""]);

        assert!(form.submit(&mut store).is_err());
        assert!(store.is_empty());
        assert_eq!(form.value(FieldKey::Pallets), "5");
        assert_eq!(form.status(), Some(CODE_ONLY.missing_message()));
    }

    #[test]
    fn scan_fills_code_and_moves_to_pallets() {
        let mut form = EntryForm::new(CODE_ONLY);
        form.scanner_started();
        assert_eq!(form.status(), Some(SCANNER_WAITING));

        let outcome = form.apply_scan(Ok(" 7891000100103\n".to_string()));
        assert_eq!(outcome, ScanOutcome::CodeCaptured("7891000100103".to_string()));
        assert_eq!(form.value(FieldKey::Code), "7891000100103");
        assert_eq!(form.focused(), FieldKey::Pallets);
        assert_eq!(form.status(), Some("Código lido: 7891000100103"));

        form.scanner_stopped();
        assert_eq!(form.status(), None);
        assert_eq!(form.value(FieldKey::Code), "7891000100103");
    }

    #[test]
    fn scan_noise_is_ignored_and_errors_are_reported() {
        let mut form = EntryForm::new(CODE_ONLY);
        form.scanner_started();

        assert_eq!(form.apply_scan(Err(ScanError::NotFound)), ScanOutcome::Ignored);
        assert_eq!(form.status(), Some(SCANNER_WAITING));

        assert_eq!(
            form.apply_scan(Err(ScanError::device("permission denied"))),
            ScanOutcome::Failed
        );
        assert_eq!(form.status(), Some("Erro na leitura: permission denied"));
        assert_eq!(form.value(FieldKey::Code), "");
    }

    #[test]
    fn stopping_scanner_clears_any_scan_status() {
        let mut form = EntryForm::new(CODE_ONLY);
        form.scanner_started();
        form.scanner_stopped();
        assert_eq!(form.status(), None);

        form.scanner_started();
        form.apply_scan(Err(ScanError::device("lens dirty")));
        form.scanner_stopped();
        assert_eq!(form.status(), None);
    }
}
