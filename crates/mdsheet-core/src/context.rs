//! The host-facing operation surface (spec §5, §6.3, §6.4).
//!
//! `WorkbookContext` owns the single authoritative copy of both the raw file
//! text and the Workbook parsed out of it (spec §5: "an explicit value, not a
//! singleton or thread-local"). Every mutating method re-parses nothing beyond
//! what it has to: it transforms the in-memory [`Workbook`] (or, for Document
//! operations, the raw text directly), regenerates the Workbook region through
//! [`crate::generator`], and returns an [`OpOutcome`] describing what changed —
//! modeled on the same "every command reports what text range it touched"
//! contract spec §6.4 describes. There is no undo stack here; spec §5 treats
//! history as a host concern layered on top of `get_state`/`reset`.

use crate::cell_ops;
use crate::classifier::{self, ReorderAction};
use crate::codec::WorkbookCodec;
use crate::config::Config;
use crate::document_ops;
use crate::error::OpResultT;
use crate::executor;
use crate::generator::generate_and_get_range;
use crate::metadata::TableMetadata;
use crate::model::{Alignment, FileStructure, TabKind, TabOrderItem, Table, Workbook};
use crate::region::file_structure;
use crate::tab_order;
use crate::sheet_ops;
use serde_json::{Map, Value};

/// What a mutating operation changed: the file's full new text, and the line
/// range (if any) that was rewritten.
#[derive(Debug, Clone, PartialEq)]
pub struct OpOutcome {
    /// The full file text after the operation.
    pub text: String,
    /// `[start, end)` of the lines the operation rewrote, when the change is
    /// confined to a contiguous span (every Workbook-region change is; a
    /// Document move touches two disjoint spans and reports `None`).
    pub changed_range: Option<(usize, usize)>,
}

/// A read-only copy of the context's current state (spec §6.3 `getState`).
#[derive(Debug, Clone, PartialEq)]
pub struct StateSnapshot {
    /// The full file text.
    pub text: String,
    /// The parsed Workbook.
    pub workbook: Workbook,
}

/// The live, explicit-value session a host holds onto (spec §5).
pub struct WorkbookContext {
    config: Config,
    codec: Box<dyn WorkbookCodec>,
    text: String,
    workbook: Workbook,
}

impl WorkbookContext {
    /// Parse `text` with `config`/`codec` and start a new session.
    pub fn init(text: &str, config: Config, codec: Box<dyn WorkbookCodec>) -> OpResultT<Self> {
        let workbook = codec.parse(text, &config)?;
        Ok(Self {
            config,
            codec,
            text: text.to_string(),
            workbook,
        })
    }

    /// Reparse `text`, discarding any unsaved in-memory state (spec §6.3 `reset`).
    pub fn reset(&mut self, text: &str) -> OpResultT<()> {
        self.workbook = self.codec.parse(text, &self.config)?;
        self.text = text.to_string();
        Ok(())
    }

    /// The current file text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The current parsed Workbook.
    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }

    /// A read-only snapshot of `(text, workbook)` (spec §6.3 `getState`).
    pub fn get_state(&self) -> StateSnapshot {
        StateSnapshot {
            text: self.text.clone(),
            workbook: self.workbook.clone(),
        }
    }

    /// The file's physical region layout, derived fresh from current text.
    pub fn structure(&self) -> FileStructure {
        let root_marker = self.config.root_marker_for(Some(&self.workbook.name));
        file_structure(&self.text, &root_marker, self.workbook.sheet_count())
    }

    fn table(&self, sheet: usize, table: usize) -> OpResultT<&Table> {
        sheet_ops::read_table(&self.workbook, sheet, table)
    }

    /// Splice an updated Workbook back into the file and commit it as the new
    /// state, returning the resulting [`OpOutcome`].
    fn commit(&mut self, workbook: Workbook) -> OpOutcome {
        let (text, range) = generate_and_get_range(&self.text, &workbook, &self.config, self.codec.as_ref());
        self.text = text.clone();
        self.workbook = workbook;
        OpOutcome {
            text,
            changed_range: Some(range),
        }
    }

    fn commit_table(&mut self, sheet: usize, table: usize, new_table: Table) -> OpResultT<OpOutcome> {
        let workbook = sheet_ops::replace_table(&self.workbook, sheet, table, new_table)?;
        Ok(self.commit(workbook))
    }

    // -- Cells ---------------------------------------------------------

    /// Spec §4.4 `updateCell`.
    pub fn update_cell(&mut self, sheet: usize, table: usize, row: usize, col: usize, value: impl Into<String>) -> OpResultT<OpOutcome> {
        let updated = cell_ops::update_cell(self.table(sheet, table)?, row, col, value)?;
        self.commit_table(sheet, table, updated)
    }

    /// Spec §4.4 `insertRow`.
    pub fn insert_row(&mut self, sheet: usize, table: usize, at: usize, values: Option<Vec<String>>) -> OpResultT<OpOutcome> {
        let updated = cell_ops::insert_row(self.table(sheet, table)?, at, values)?;
        self.commit_table(sheet, table, updated)
    }

    /// Spec §4.4 `deleteRows`.
    pub fn delete_rows(&mut self, sheet: usize, table: usize, indices: &[usize]) -> OpResultT<OpOutcome> {
        let updated = cell_ops::delete_rows(self.table(sheet, table)?, indices)?;
        self.commit_table(sheet, table, updated)
    }

    /// Spec §4.4 `moveRows`.
    pub fn move_rows(&mut self, sheet: usize, table: usize, indices: &[usize], to: usize) -> OpResultT<OpOutcome> {
        let updated = cell_ops::move_rows(self.table(sheet, table)?, indices, to)?;
        self.commit_table(sheet, table, updated)
    }

    /// Spec §4.4 `sortRows`.
    pub fn sort_rows(&mut self, sheet: usize, table: usize, col: usize, ascending: bool) -> OpResultT<OpOutcome> {
        let updated = cell_ops::sort_rows(self.table(sheet, table)?, col, ascending)?;
        self.commit_table(sheet, table, updated)
    }

    /// Spec §4.4 `insertColumn`.
    pub fn insert_column(&mut self, sheet: usize, table: usize, at: usize, header: impl Into<String>) -> OpResultT<OpOutcome> {
        let updated = cell_ops::insert_column(self.table(sheet, table)?, at, header)?;
        self.commit_table(sheet, table, updated)
    }

    /// Spec §4.4 `deleteColumns`.
    pub fn delete_columns(&mut self, sheet: usize, table: usize, indices: &[usize]) -> OpResultT<OpOutcome> {
        let updated = cell_ops::delete_columns(self.table(sheet, table)?, indices)?;
        self.commit_table(sheet, table, updated)
    }

    /// Spec §4.4 `moveColumns`.
    pub fn move_columns(&mut self, sheet: usize, table: usize, indices: &[usize], to: usize) -> OpResultT<OpOutcome> {
        let updated = cell_ops::move_columns(self.table(sheet, table)?, indices, to)?;
        self.commit_table(sheet, table, updated)
    }

    /// Spec §4.4 `clearColumns`.
    pub fn clear_columns(&mut self, sheet: usize, table: usize, indices: &[usize]) -> OpResultT<OpOutcome> {
        let updated = cell_ops::clear_columns(self.table(sheet, table)?, indices)?;
        self.commit_table(sheet, table, updated)
    }

    /// Spec §4.6 `updateColumnWidth`.
    pub fn update_column_width(&mut self, sheet: usize, table: usize, col: usize, width: Option<f64>) -> OpResultT<OpOutcome> {
        let updated = cell_ops::update_column_width(self.table(sheet, table)?, col, width)?;
        self.commit_table(sheet, table, updated)
    }

    /// Spec §4.6 `updateColumnFormat`.
    pub fn update_column_format(&mut self, sheet: usize, table: usize, col: usize, format: Option<String>) -> OpResultT<OpOutcome> {
        let updated = cell_ops::update_column_format(self.table(sheet, table)?, col, format)?;
        self.commit_table(sheet, table, updated)
    }

    /// Spec §4.6 `updateColumnAlign`.
    pub fn update_column_align(&mut self, sheet: usize, table: usize, col: usize, align: Alignment) -> OpResultT<OpOutcome> {
        let updated = cell_ops::update_column_align(self.table(sheet, table)?, col, align)?;
        self.commit_table(sheet, table, updated)
    }

    /// Spec §4.6 `updateColumnFilter`.
    pub fn update_column_filter(&mut self, sheet: usize, table: usize, col: usize, hidden_values: Vec<String>) -> OpResultT<OpOutcome> {
        let updated = cell_ops::update_column_filter(self.table(sheet, table)?, col, hidden_values)?;
        self.commit_table(sheet, table, updated)
    }

    /// Spec §4.4 `pasteCells`.
    pub fn paste_cells(&mut self, sheet: usize, table: usize, top_row: usize, left_col: usize, values: &[Vec<String>]) -> OpResultT<OpOutcome> {
        let updated = cell_ops::paste_cells(self.table(sheet, table)?, top_row, left_col, values)?;
        self.commit_table(sheet, table, updated)
    }

    /// Spec §4.4 `moveCells`.
    #[allow(clippy::too_many_arguments)]
    pub fn move_cells(
        &mut self,
        sheet: usize,
        table: usize,
        from_row: usize,
        from_col: usize,
        height: usize,
        width: usize,
        to_row: usize,
        to_col: usize,
    ) -> OpResultT<OpOutcome> {
        let updated = cell_ops::move_cells(self.table(sheet, table)?, from_row, from_col, height, width, to_row, to_col)?;
        self.commit_table(sheet, table, updated)
    }

    // -- Sheets and tables ----------------------------------------------

    /// Spec §4.6 `addTable`.
    pub fn add_table(&mut self, sheet: usize, name: impl Into<String>, headers: Vec<String>) -> OpResultT<OpOutcome> {
        let workbook = sheet_ops::add_table(&self.workbook, sheet, name, headers)?;
        Ok(self.commit(workbook))
    }

    /// Spec §4.6 `deleteTable`.
    pub fn delete_table(&mut self, sheet: usize, table: usize) -> OpResultT<OpOutcome> {
        let workbook = sheet_ops::delete_table(&self.workbook, sheet, table)?;
        Ok(self.commit(workbook))
    }

    /// Spec §4.6 `renameTable`.
    pub fn rename_table(&mut self, sheet: usize, table: usize, name: impl Into<String>) -> OpResultT<OpOutcome> {
        let workbook = sheet_ops::rename_table(&self.workbook, sheet, table, name)?;
        Ok(self.commit(workbook))
    }

    /// Spec §4.6 `updateTableMetadata`.
    pub fn update_table_metadata(&mut self, sheet: usize, table: usize, metadata: TableMetadata) -> OpResultT<OpOutcome> {
        let workbook = sheet_ops::update_table_metadata(&self.workbook, sheet, table, metadata)?;
        Ok(self.commit(workbook))
    }

    /// Spec §4.6 `addSheet`. `after_idx = None` appends at the end of
    /// `Workbook.sheets`; `Some(i)` inserts right after sheet `i` when
    /// in-range. `target_tab_order_idx` places the new sheet's tab at that
    /// position in an explicit `tab_order`, if one is set; `None` leaves it
    /// appended at the end of the order.
    pub fn add_sheet(
        &mut self,
        name: Option<String>,
        columns: Vec<String>,
        after_idx: Option<usize>,
        target_tab_order_idx: Option<usize>,
    ) -> OpOutcome {
        let workbook = sheet_ops::add_sheet(&self.workbook, name, columns, after_idx, target_tab_order_idx);
        self.commit(workbook)
    }

    /// Spec §4.6 `deleteSheet`.
    pub fn delete_sheet(&mut self, sheet: usize) -> OpResultT<OpOutcome> {
        let workbook = sheet_ops::delete_sheet(&self.workbook, sheet)?;
        Ok(self.commit(workbook))
    }

    /// Spec §4.6 `renameSheet`.
    pub fn rename_sheet(&mut self, sheet: usize, name: impl Into<String>) -> OpResultT<OpOutcome> {
        let workbook = sheet_ops::rename_sheet(&self.workbook, sheet, name)?;
        Ok(self.commit(workbook))
    }

    /// Spec §4.6 `moveSheet`. `target_tab_order_idx`: `None` only re-keys an
    /// explicit `tab_order`'s indices for the move; `Some(None)` deletes it
    /// so it regenerates from natural order; `Some(Some(idx))` re-keys it and
    /// also relocates the moved tab to position `idx`.
    pub fn move_sheet(&mut self, from: usize, to: usize, target_tab_order_idx: Option<Option<usize>>) -> OpResultT<OpOutcome> {
        let workbook = sheet_ops::move_sheet(&self.workbook, from, to, target_tab_order_idx)?;
        Ok(self.commit(workbook))
    }

    /// Merge free-form keys into a Sheet's opaque metadata.
    pub fn update_sheet_metadata(&mut self, sheet: usize, patch: Map<String, Value>) -> OpResultT<OpOutcome> {
        let workbook = sheet_ops::update_sheet_metadata(&self.workbook, sheet, patch)?;
        Ok(self.commit(workbook))
    }

    // -- Documents --------------------------------------------------------

    fn root_marker(&self) -> String {
        self.config.root_marker_for(Some(&self.workbook.name))
    }

    /// Spec §4.7 `addDocument`. `after_doc_index = None` prepends at the start
    /// of the file; `Some(i)` inserts right after Document `i`. Repairs an
    /// explicit `tab_order`, if one is set, to include the new document (spec
    /// §8 Scenario F) and regenerates the Workbook region so the repaired
    /// metadata comment lands in the returned text.
    pub fn add_document(&mut self, title: &str, content: &str, after_doc_index: Option<usize>) -> OpOutcome {
        let (new_text, new_doc_index) = document_ops::add_document(&self.text, title, content, after_doc_index, &self.root_marker());
        self.text = new_text;
        self.workbook.metadata = tab_order::repair_for_insert(&self.workbook.metadata, TabKind::Document, new_doc_index);
        let (text, _) = generate_and_get_range(&self.text, &self.workbook, &self.config, self.codec.as_ref());
        self.text = text.clone();
        OpOutcome {
            text,
            changed_range: None,
        }
    }

    /// Spec §4.7 `renameDocument`.
    pub fn rename_document(&mut self, index: usize, new_title: &str) -> OpResultT<OpOutcome> {
        self.text = document_ops::rename_document(&self.text, index, new_title, &self.root_marker())?;
        Ok(OpOutcome {
            text: self.text.clone(),
            changed_range: None,
        })
    }

    /// Spec §4.7 `deleteDocument`. Repairs an explicit `tab_order`, if one is
    /// set, to drop the removed document's entry and shift later ones down.
    pub fn delete_document(&mut self, index: usize) -> OpResultT<OpOutcome> {
        self.text = document_ops::delete_document(&self.text, index, &self.root_marker())?;
        self.workbook.metadata = tab_order::repair_for_delete(&self.workbook.metadata, TabKind::Document, index);
        let (text, _) = generate_and_get_range(&self.text, &self.workbook, &self.config, self.codec.as_ref());
        self.text = text.clone();
        Ok(OpOutcome {
            text,
            changed_range: None,
        })
    }

    /// Spec §4.7 `moveDocumentSection`.
    pub fn move_document_section(&mut self, from_index: usize, to_index: usize) -> OpResultT<OpOutcome> {
        self.text = document_ops::move_document_section(&self.text, from_index, to_index, &self.root_marker())?;
        Ok(OpOutcome {
            text: self.text.clone(),
            changed_range: None,
        })
    }

    // -- Tab order --------------------------------------------------------

    /// Classify and execute a request to rearrange the tab strip into
    /// `desired` order (spec §4.9, §4.10, §4.11).
    pub fn reorder_tabs(&mut self, desired: Vec<TabOrderItem>) -> OpResultT<OpOutcome> {
        let structure = self.structure();
        let action = classifier::classify(&structure, &self.workbook.metadata, &desired);
        if action == ReorderAction::NoOp {
            return Ok(OpOutcome {
                text: self.text.clone(),
                changed_range: None,
            });
        }
        let (text, workbook) = executor::execute_reorder(&self.text, &self.workbook, &self.config, self.codec.as_ref(), action)?;
        self.text = text.clone();
        self.workbook = workbook;
        Ok(OpOutcome {
            text,
            changed_range: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::GfmTableCodec;

    fn ctx(text: &str) -> WorkbookContext {
        WorkbookContext::init(text, Config::tables_default(), Box::new(GfmTableCodec)).unwrap()
    }

    #[test]
    fn init_parses_existing_workbook() {
        let c = ctx("# Tables\n\n## S1\n\n### T1\n\n| A |\n| --- |\n| 1 |\n");
        assert_eq!(c.workbook().sheets.len(), 1);
        assert_eq!(c.workbook().sheets[0].tables[0].headers, vec!["A"]);
    }

    #[test]
    fn update_cell_commits_and_regenerates_text() {
        let mut c = ctx("");
        c.add_sheet(Some("S1".to_string()), vec!["A".into(), "B".into()], None, None);
        let outcome = c.update_cell(0, 0, 0, 0, "hi").unwrap();
        assert!(outcome.text.contains("hi"));
        assert_eq!(c.workbook().sheets[0].tables[0].cell(0, 0), "hi");
    }

    #[test]
    fn insert_column_round_trips_through_text() {
        let mut c = ctx("");
        c.add_sheet(Some("S1".to_string()), vec!["A".into(), "B".into()], None, None);
        c.insert_column(0, 0, 1, "X").unwrap();
        let mut reloaded = ctx(c.text());
        assert_eq!(reloaded.workbook().sheets[0].tables[0].headers, vec!["A", "X", "B"]);
        let _ = reloaded.structure();
    }

    #[test]
    fn add_document_without_explicit_tab_order_leaves_workbook_model_untouched() {
        let mut c = ctx("# Tables\n\n## S1\n");
        let before = c.workbook().clone();
        c.add_document("Notes", "hello", None);
        assert_eq!(c.workbook(), &before);
        assert!(c.text().contains("# Notes"));
    }

    #[test]
    fn scenario_f_add_document_repairs_explicit_tab_order() {
        let mut c = ctx("# D1\n\n# D2\n");
        c.workbook.metadata.tab_order = Some(vec![TabOrderItem::document(0), TabOrderItem::document(1)]);
        let outcome = c.add_document("New", "", Some(0));
        assert!(outcome.text.contains("# D1"));
        assert!(outcome.text.contains("# New"));
        assert!(outcome.text.contains("# D2"));
        let order = c.workbook().metadata.tab_order.clone().unwrap();
        assert!(order.contains(&TabOrderItem::document(1)));
        assert!(order.contains(&TabOrderItem::document(2)));
    }

    #[test]
    fn get_state_snapshots_current_text_and_workbook() {
        let mut c = ctx("");
        c.add_sheet(None, vec![], None, None);
        let snap = c.get_state();
        assert_eq!(snap.workbook.sheets.len(), 1);
        assert_eq!(snap.text, c.text());
    }
}
