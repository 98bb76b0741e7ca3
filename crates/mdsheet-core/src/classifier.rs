//! The tab-reorder classifier (spec §4.10): decides how much of a requested tab
//! order can be realized by moving text around versus how much must be written
//! down as `tab_order` metadata.
//!
//! A Workbook region is always one contiguous block of text, so its Sheets can
//! never be physically split apart by a Document sitting between two of them —
//! only `tab_order` metadata can describe a genuinely interleaved strip. Sheet
//! order *within* the Workbook, Document order among themselves, and the
//! Workbook block's position relative to the Documents are each independently
//! achievable by moving text, with no metadata at all. The classifier is pure
//! and total: handed a `desired` order that isn't even a permutation of the
//! file's actual tabs, it degrades to [`ReorderAction::NoOp`] rather than error.

use crate::model::{FileStructure, TabKind, TabOrderItem, WorkbookMetadata};
use crate::tab_order::{effective_order, natural_order};

/// The physical (metadata-free) part of a reorder: independent adjustments to
/// sheet order, document order, and the Workbook block's position among
/// documents. Any field left `None` means that adjustment isn't needed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PhysicalPlan {
    /// New order for `Workbook.sheets`, as old indices (`sheet_order[i]` is the
    /// old index that should end up at position `i`). `None` if the sheets are
    /// already in this order.
    pub sheet_order: Option<Vec<usize>>,
    /// New relative order for Documents, as natural document indices. `None` if
    /// documents are already in this order relative to each other.
    pub doc_order: Option<Vec<usize>>,
    /// Where the Workbook block should sit: `Some(Some(pos))` to relocate it
    /// immediately before the document that will occupy position `pos` (in the
    /// *post-`doc_order`* physical numbering), `Some(None)` to relocate it to
    /// the end of the file, `None` if it's already in the right place.
    pub workbook_before_doc: Option<Option<usize>>,
}

impl PhysicalPlan {
    /// `true` if every field is `None` — nothing physical to do.
    pub fn is_noop(&self) -> bool {
        self.sheet_order.is_none() && self.doc_order.is_none() && self.workbook_before_doc.is_none()
    }
}

/// What the executor should do to realize a requested tab order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorderAction {
    /// The requested order is already in effect (or isn't a valid permutation
    /// of the file's actual tabs).
    NoOp,
    /// Write `tab_order`; physical layout is untouched.
    Metadata {
        /// The order to persist.
        tab_order: Vec<TabOrderItem>,
    },
    /// Move text; no metadata is needed afterward (the physical change alone
    /// reproduces the requested order).
    Physical {
        /// What to move.
        plan: PhysicalPlan,
    },
    /// Move text as far as it can go toward the requested order, and persist
    /// `tab_order` for the interleaving physical layout fundamentally can't
    /// express (Sheets split across more than one Document-separated run).
    PhysicalAndMetadata {
        /// The best physically achievable approximation.
        plan: PhysicalPlan,
        /// The order to persist on top of it.
        tab_order: Vec<TabOrderItem>,
    },
}

fn is_permutation(a: &[TabOrderItem], b: &[TabOrderItem]) -> bool {
    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.sort();
    b.sort();
    a == b
}

/// Classify a request to rearrange the tab strip into `desired` order.
pub fn classify(structure: &FileStructure, metadata: &WorkbookMetadata, desired: &[TabOrderItem]) -> ReorderAction {
    let natural = natural_order(structure);
    if !is_permutation(desired, &natural) {
        return ReorderAction::NoOp;
    }

    let current = effective_order(metadata, structure);
    if desired == current.as_slice() {
        return ReorderAction::NoOp;
    }

    let sheet_positions: Vec<usize> = desired
        .iter()
        .enumerate()
        .filter(|(_, item)| item.kind == TabKind::Sheet)
        .map(|(pos, _)| pos)
        .collect();
    let contiguous = sheet_positions.windows(2).all(|w| w[1] == w[0] + 1);

    let sheet_order: Vec<usize> = desired
        .iter()
        .filter(|i| i.kind == TabKind::Sheet)
        .map(|i| i.index)
        .collect();
    let doc_order: Vec<usize> = desired
        .iter()
        .filter(|i| i.kind == TabKind::Document)
        .map(|i| i.index)
        .collect();

    let natural_sheet_order: Vec<usize> = (0..structure.sheets.len()).collect();
    let natural_doc_order: Vec<usize> = (0..structure.doc_count()).collect();

    let mut plan = PhysicalPlan::default();
    if !sheet_order.is_empty() && sheet_order != natural_sheet_order {
        plan.sheet_order = Some(sheet_order);
    }
    if !doc_order.is_empty() && doc_order != natural_doc_order {
        plan.doc_order = Some(doc_order.clone());
    }

    if let Some(&first_sheet_pos) = sheet_positions.first() {
        let docs_before_sheets = desired[..first_sheet_pos]
            .iter()
            .filter(|i| i.kind == TabKind::Document)
            .count();
        let current_docs_before = structure.docs_before_wb.len();
        if docs_before_sheets != current_docs_before {
            let target = if docs_before_sheets >= doc_order.len() {
                None
            } else {
                Some(docs_before_sheets)
            };
            plan.workbook_before_doc = Some(target);
        }
    }

    if plan.is_noop() {
        return ReorderAction::Metadata {
            tab_order: desired.to_vec(),
        };
    }

    if contiguous {
        ReorderAction::Physical { plan }
    } else {
        ReorderAction::PhysicalAndMetadata {
            plan,
            tab_order: desired.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn structure() -> FileStructure {
        FileStructure {
            docs_before_wb: vec![0],
            sheets: vec![0, 1],
            docs_after_wb: vec![1],
            has_workbook: true,
        }
    }

    #[test]
    fn unchanged_order_is_noop() {
        let fs = structure();
        let meta = WorkbookMetadata::default();
        let action = classify(&fs, &meta, &natural_order(&fs));
        assert_eq!(action, ReorderAction::NoOp);
    }

    #[test]
    fn invalid_permutation_degrades_to_noop() {
        let fs = structure();
        let meta = WorkbookMetadata::default();
        let bogus = vec![TabOrderItem::sheet(0), TabOrderItem::sheet(0)];
        assert_eq!(classify(&fs, &meta, &bogus), ReorderAction::NoOp);
    }

    #[test]
    fn scenario_e_doc_swap_is_physical_only() {
        let fs = structure(); // doc(0), sheet(0), sheet(1), doc(1)
        let meta = WorkbookMetadata::default();
        let desired = vec![
            TabOrderItem::document(1),
            TabOrderItem::sheet(0),
            TabOrderItem::sheet(1),
            TabOrderItem::document(0),
        ];
        match classify(&fs, &meta, &desired) {
            ReorderAction::Physical { plan } => {
                assert_eq!(plan.doc_order, Some(vec![1, 0]));
                assert!(plan.sheet_order.is_none());
                assert!(plan.workbook_before_doc.is_none());
            }
            other => panic!("expected Physical, got {other:?}"),
        }
    }

    #[test]
    fn pure_interleave_is_metadata_only() {
        let fs = FileStructure {
            docs_before_wb: vec![],
            sheets: vec![0, 1],
            docs_after_wb: vec![0, 1],
            has_workbook: true,
        };
        let meta = WorkbookMetadata::default();
        let desired = vec![
            TabOrderItem::sheet(0),
            TabOrderItem::document(0),
            TabOrderItem::sheet(1),
            TabOrderItem::document(1),
        ];
        match classify(&fs, &meta, &desired) {
            ReorderAction::Metadata { tab_order } => assert_eq!(tab_order, desired),
            other => panic!("expected Metadata, got {other:?}"),
        }
    }

    #[test]
    fn interleave_with_sheet_reorder_is_physical_and_metadata() {
        let fs = FileStructure {
            docs_before_wb: vec![],
            sheets: vec![0, 1],
            docs_after_wb: vec![0, 1],
            has_workbook: true,
        };
        let meta = WorkbookMetadata::default();
        let desired = vec![
            TabOrderItem::sheet(1),
            TabOrderItem::document(0),
            TabOrderItem::sheet(0),
            TabOrderItem::document(1),
        ];
        match classify(&fs, &meta, &desired) {
            ReorderAction::PhysicalAndMetadata { plan, tab_order } => {
                assert_eq!(plan.sheet_order, Some(vec![1, 0]));
                assert_eq!(tab_order, desired);
            }
            other => panic!("expected PhysicalAndMetadata, got {other:?}"),
        }
    }

    #[test]
    fn h9_workbook_relocation_when_sheets_stay_contiguous() {
        let fs = FileStructure {
            docs_before_wb: vec![],
            sheets: vec![0, 1],
            docs_after_wb: vec![0],
            has_workbook: true,
        };
        let meta = WorkbookMetadata::default();
        // Move the whole (still-contiguous) sheet block to after the document.
        let desired = vec![
            TabOrderItem::document(0),
            TabOrderItem::sheet(0),
            TabOrderItem::sheet(1),
        ];
        match classify(&fs, &meta, &desired) {
            ReorderAction::Physical { plan } => {
                assert_eq!(plan.workbook_before_doc, Some(None));
                assert!(plan.sheet_order.is_none());
            }
            other => panic!("expected Physical, got {other:?}"),
        }
    }
}
