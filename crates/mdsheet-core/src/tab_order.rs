//! Tab order: natural order derivation and redundancy pruning (spec §4.9).
//!
//! The "tab strip" a host renders interleaves Sheets and Documents into one
//! visual sequence. Most files never need an explicit order — the natural,
//! file-physical order already matches what the user wants — so `tab_order` is
//! only ever persisted when it diverges from that default, and dropped again
//! the moment a requested reorder happens to restore it (spec §8 Scenario D).

use crate::model::{FileStructure, TabKind, TabOrderItem, WorkbookMetadata};

/// The tab order implied purely by physical file layout: Documents before the
/// Workbook, then every Sheet in `Workbook.sheets` order, then Documents after
/// the Workbook.
pub fn natural_order(structure: &FileStructure) -> Vec<TabOrderItem> {
    let mut order = Vec::with_capacity(structure.doc_count() + structure.sheets.len());
    order.extend(structure.docs_before_wb.iter().map(|&i| TabOrderItem::document(i)));
    order.extend(structure.sheets.iter().map(|&i| TabOrderItem::sheet(i)));
    order.extend(structure.docs_after_wb.iter().map(|&i| TabOrderItem::document(i)));
    order
}

/// Is `order` exactly the file's natural order?
pub fn is_natural(order: &[TabOrderItem], structure: &FileStructure) -> bool {
    order == natural_order(structure).as_slice()
}

/// Does persisting `order` as `tab_order` metadata add any information beyond
/// what physical layout already implies?
pub fn is_metadata_required(order: &[TabOrderItem], structure: &FileStructure) -> bool {
    !is_natural(order, structure)
}

/// The tab order actually in effect: the explicit `tab_order`, or natural order
/// when none is set.
pub fn effective_order(metadata: &WorkbookMetadata, structure: &FileStructure) -> Vec<TabOrderItem> {
    metadata
        .tab_order
        .clone()
        .unwrap_or_else(|| natural_order(structure))
}

/// Write `desired` into `metadata.tab_order`, pruning it back to `None` if it
/// turns out to equal natural order (spec §8 Scenario D).
pub fn reorder_tab_metadata(metadata: &WorkbookMetadata, desired: Vec<TabOrderItem>, structure: &FileStructure) -> WorkbookMetadata {
    let mut metadata = metadata.clone();
    metadata.tab_order = if is_metadata_required(&desired, structure) {
        Some(desired)
    } else {
        None
    };
    metadata
}

/// Repair an explicit `tab_order` (leaving `None` alone) when a new `kind` item
/// is inserted at natural index `at`: every existing entry of that kind at or
/// past `at` shifts up by one, and a fresh entry for the new item is appended
/// (spec §4.7 `addDocument`'s index bookkeeping, generalized to Sheets too —
/// invariant 3 requires `tab_order`, when present, to stay a permutation of
/// *every* current Sheet and Document, including ones added after the order
/// was first written).
pub fn repair_for_insert(metadata: &WorkbookMetadata, kind: TabKind, at: usize) -> WorkbookMetadata {
    let mut metadata = metadata.clone();
    if let Some(order) = metadata.tab_order.take() {
        let mut shifted: Vec<TabOrderItem> = order
            .into_iter()
            .map(|item| {
                if item.kind == kind && item.index >= at {
                    TabOrderItem { kind: item.kind, index: item.index + 1 }
                } else {
                    item
                }
            })
            .collect();
        shifted.push(TabOrderItem { kind, index: at });
        metadata.tab_order = Some(shifted);
    }
    metadata
}

/// Like [`repair_for_insert`], but additionally relocates the freshly-added
/// entry to `target_tab_order_idx`'s position in the persisted order list
/// when given (spec §4.6 `addSheet`'s `targetTabOrderIdx`). `None` leaves it
/// where `repair_for_insert` put it (the end of the list).
pub fn repair_for_insert_with_target(
    metadata: &WorkbookMetadata,
    kind: TabKind,
    at: usize,
    target_tab_order_idx: Option<usize>,
) -> WorkbookMetadata {
    let mut metadata = repair_for_insert(metadata, kind, at);
    let Some(target_pos) = target_tab_order_idx else {
        return metadata;
    };
    if let Some(mut order) = metadata.tab_order.take() {
        if let Some(cur_pos) = order.iter().position(|item| item.kind == kind && item.index == at) {
            let item = order.remove(cur_pos);
            order.insert(target_pos.min(order.len()), item);
        }
        metadata.tab_order = Some(order);
    }
    metadata
}

/// Repair an explicit `tab_order` (leaving `None` alone) when the `kind` item
/// at natural index `at` is removed: its entry is dropped and every later
/// entry of that kind shifts down by one (spec §4.7 `deleteDocument`).
pub fn repair_for_delete(metadata: &WorkbookMetadata, kind: TabKind, at: usize) -> WorkbookMetadata {
    let mut metadata = metadata.clone();
    if let Some(order) = metadata.tab_order.take() {
        let repaired: Vec<TabOrderItem> = order
            .into_iter()
            .filter(|item| !(item.kind == kind && item.index == at))
            .map(|item| {
                if item.kind == kind && item.index > at {
                    TabOrderItem { kind: item.kind, index: item.index - 1 }
                } else {
                    item
                }
            })
            .collect();
        metadata.tab_order = Some(repaired);
    }
    metadata
}

/// Repair an explicit `tab_order` (leaving `None` alone) for a direct move of
/// the `kind` item at position `from` to position `to`, per spec §4.9
/// `reorderTabMetadata`: every `kind` index is re-keyed through the
/// permutation that moving `from` to `to` induces on `0..len`, and then:
/// - `target_tab_order_idx = None` (the move's optional parameter omitted):
///   only the re-keying happens; the moved tab's position within the
///   persisted order list is untouched.
/// - `Some(None)`: `tab_order` is deleted outright, so it regenerates from
///   natural order on the next write (spec §4.6 `moveSheet`'s `null` case).
/// - `Some(Some(idx))`: after re-keying, the moved entry is pulled out of the
///   order list and reinserted at position `idx` (with the off-by-one
///   correction spec §4.9 calls for when the removal preceded the target).
pub fn repair_for_move(
    metadata: &WorkbookMetadata,
    kind: TabKind,
    from: usize,
    to: usize,
    target_tab_order_idx: Option<Option<usize>>,
) -> WorkbookMetadata {
    let mut metadata = metadata.clone();

    if let Some(None) = target_tab_order_idx {
        metadata.tab_order = None;
        return metadata;
    }

    let Some(order) = metadata.tab_order.take() else {
        return metadata;
    };

    let rekey = |i: usize| -> usize {
        if i == from {
            to
        } else if from < to && i > from && i <= to {
            i - 1
        } else if to < from && i >= to && i < from {
            i + 1
        } else {
            i
        }
    };
    let mut rekeyed: Vec<TabOrderItem> = order
        .into_iter()
        .map(|item| {
            if item.kind == kind {
                TabOrderItem { kind, index: rekey(item.index) }
            } else {
                item
            }
        })
        .collect();

    if let Some(Some(target_pos)) = target_tab_order_idx {
        if let Some(cur_pos) = rekeyed.iter().position(|item| item.kind == kind && item.index == to) {
            let item = rekeyed.remove(cur_pos);
            let target_pos = if cur_pos < target_pos { target_pos.saturating_sub(1) } else { target_pos };
            rekeyed.insert(target_pos.min(rekeyed.len()), item);
        }
    }

    metadata.tab_order = Some(rekeyed);
    metadata
}
