//! Sheet- and table-collection mutations on a [`Workbook`] (spec §4.6).

use crate::error::{IndexKind, OpError, OpResultT};
use crate::metadata::TableMetadata;
use crate::model::{Sheet, Table, TabKind, Workbook};
use crate::tab_order;
use serde_json::{Map, Value};

fn check_index(kind: IndexKind, index: usize, len: usize) -> OpResultT<()> {
    if index < len {
        Ok(())
    } else {
        Err(OpError::InvalidIndex { kind, index, len })
    }
}

fn sheet_mut<'a>(wb: &'a mut Workbook, sheet: usize) -> OpResultT<&'a mut Sheet> {
    check_index(IndexKind::Sheet, sheet, wb.sheets.len())?;
    Ok(&mut wb.sheets[sheet])
}

fn table_ref<'a>(sheet_ref: &'a Sheet, table: usize) -> OpResultT<&'a Table> {
    check_index(IndexKind::Table, table, sheet_ref.tables.len())?;
    Ok(&sheet_ref.tables[table])
}

// ---------------------------------------------------------------------------
// Tables within a Sheet
// ---------------------------------------------------------------------------

/// Append a new table with the given name and headers to `sheet`.
pub fn add_table(wb: &Workbook, sheet: usize, name: impl Into<String>, headers: Vec<String>) -> OpResultT<Workbook> {
    check_index(IndexKind::Sheet, sheet, wb.sheets.len())?;
    let mut wb = wb.clone();
    wb.sheets[sheet].tables.push(Table::empty(name, headers));
    Ok(wb)
}

/// Delete table `table` from `sheet`.
pub fn delete_table(wb: &Workbook, sheet: usize, table: usize) -> OpResultT<Workbook> {
    let mut wb = wb.clone();
    let s = sheet_mut(&mut wb, sheet)?;
    check_index(IndexKind::Table, table, s.tables.len())?;
    s.tables.remove(table);
    Ok(wb)
}

/// Rename table `table` in `sheet`.
pub fn rename_table(wb: &Workbook, sheet: usize, table: usize, name: impl Into<String>) -> OpResultT<Workbook> {
    let mut wb = wb.clone();
    let s = sheet_mut(&mut wb, sheet)?;
    check_index(IndexKind::Table, table, s.tables.len())?;
    s.tables[table].name = name.into();
    Ok(wb)
}

/// Replace a table's full [`TableMetadata`] wholesale.
pub fn update_table_metadata(
    wb: &Workbook,
    sheet: usize,
    table: usize,
    metadata: TableMetadata,
) -> OpResultT<Workbook> {
    let mut wb = wb.clone();
    let s = sheet_mut(&mut wb, sheet)?;
    check_index(IndexKind::Table, table, s.tables.len())?;
    s.tables[table].metadata = metadata;
    Ok(wb)
}

/// Apply a `new_table` closure (typically a [`crate::cell_ops`] function's result)
/// back into the workbook at `(sheet, table)`. This is the seam every cell/column
/// operation is wired through: callers build the updated [`Table`] via
/// `cell_ops`, then splice it back with this helper.
pub fn replace_table(wb: &Workbook, sheet: usize, table: usize, new_table: Table) -> OpResultT<Workbook> {
    let mut wb = wb.clone();
    let s = sheet_mut(&mut wb, sheet)?;
    check_index(IndexKind::Table, table, s.tables.len())?;
    s.tables[table] = new_table;
    Ok(wb)
}

/// Merge `patch` into a table's `visual` metadata (width/validation/filters/
/// formulas/extra), leaving `legacy_validation` and top-level `extra` untouched.
/// `table_ref` exists so callers can read-before-write without cloning the whole
/// workbook first.
pub fn read_table<'a>(wb: &'a Workbook, sheet: usize, table: usize) -> OpResultT<&'a Table> {
    check_index(IndexKind::Sheet, sheet, wb.sheets.len())?;
    table_ref(&wb.sheets[sheet], table)
}

// ---------------------------------------------------------------------------
// Sheets
// ---------------------------------------------------------------------------

/// The smallest `"Sheet N"` name (`N >= 1`) not already used by any sheet.
fn default_sheet_name(wb: &Workbook) -> String {
    let used: std::collections::HashSet<&str> = wb.sheets.iter().map(|s| s.name.as_str()).collect();
    let mut n = 1usize;
    loop {
        let candidate = format!("Sheet {n}");
        if !used.contains(candidate.as_str()) {
            return candidate;
        }
        n += 1;
    }
}

/// Append or insert a new sheet. `name` defaults to the smallest unused
/// `"Sheet N"` when `None`; `columns` defaults to `["Column 1", "Column 2",
/// "Column 3"]` when empty. `after_idx` inserts right after that sheet when
/// given and in-range, else the sheet is appended. `target_tab_order_idx`
/// places the new sheet's tab at that position in an explicit `tab_order`,
/// if one is set; `None` leaves it appended at the end of the order (spec
/// §4.6 `addSheet`).
pub fn add_sheet(
    wb: &Workbook,
    name: Option<String>,
    columns: Vec<String>,
    after_idx: Option<usize>,
    target_tab_order_idx: Option<usize>,
) -> Workbook {
    let mut wb = wb.clone();
    let name = name.unwrap_or_else(|| default_sheet_name(&wb));
    let columns = if columns.is_empty() {
        vec!["Column 1".to_string(), "Column 2".to_string(), "Column 3".to_string()]
    } else {
        columns
    };
    let new_index = match after_idx {
        Some(i) if i < wb.sheets.len() => i + 1,
        _ => wb.sheets.len(),
    };
    wb.sheets.insert(new_index, Sheet::empty(name, columns));
    wb.metadata = tab_order::repair_for_insert_with_target(&wb.metadata, TabKind::Sheet, new_index, target_tab_order_idx);
    wb
}

/// Delete sheet `sheet`, repairing an explicit `tab_order` (if one is set) to
/// drop its entry and shift later sheets down.
pub fn delete_sheet(wb: &Workbook, sheet: usize) -> OpResultT<Workbook> {
    check_index(IndexKind::Sheet, sheet, wb.sheets.len())?;
    let mut wb = wb.clone();
    wb.sheets.remove(sheet);
    wb.metadata = tab_order::repair_for_delete(&wb.metadata, TabKind::Sheet, sheet);
    Ok(wb)
}

/// Rename sheet `sheet`.
pub fn rename_sheet(wb: &Workbook, sheet: usize, name: impl Into<String>) -> OpResultT<Workbook> {
    check_index(IndexKind::Sheet, sheet, wb.sheets.len())?;
    let mut wb = wb.clone();
    wb.sheets[sheet].name = name.into();
    Ok(wb)
}

/// Move sheet `from` to position `to` in `Workbook.sheets` (physical reorder
/// of the in-memory model; the Markdown-level consequences of a sheet move
/// are handled by [`crate::classifier`]/[`crate::executor`], not here).
/// `target_tab_order_idx` governs what happens to an explicit `tab_order`
/// (spec §4.6 `moveSheet`): `None` only re-keys its indices for the move;
/// `Some(None)` deletes it so it regenerates from natural order; `Some(Some(idx))`
/// re-keys it and also relocates the moved tab to position `idx`.
pub fn move_sheet(wb: &Workbook, from: usize, to: usize, target_tab_order_idx: Option<Option<usize>>) -> OpResultT<Workbook> {
    check_index(IndexKind::Sheet, from, wb.sheets.len())?;
    let to = to.min(wb.sheets.len().saturating_sub(1));
    let mut wb = wb.clone();
    let sheet = wb.sheets.remove(from);
    wb.sheets.insert(to, sheet);
    wb.metadata = tab_order::repair_for_move(&wb.metadata, TabKind::Sheet, from, to, target_tab_order_idx);
    Ok(wb)
}

/// Merge free-form keys into a Sheet's opaque metadata map.
pub fn update_sheet_metadata(wb: &Workbook, sheet: usize, patch: Map<String, Value>) -> OpResultT<Workbook> {
    let mut wb = wb.clone();
    let s = sheet_mut(&mut wb, sheet)?;
    for (k, v) in patch {
        s.metadata.insert(k, v);
    }
    Ok(wb)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_sheet_workbook() -> Workbook {
        let mut wb = Workbook::empty("Tables");
        wb.sheets.push(Sheet::empty("Sheet 1", vec!["A".into()]));
        wb.sheets.push(Sheet::empty("Sheet 2", vec!["A".into()]));
        wb
    }

    #[test]
    fn add_sheet_picks_smallest_unused_name() {
        let wb = two_sheet_workbook();
        let wb = add_sheet(&wb, None, vec![], None, None);
        assert_eq!(wb.sheets[2].name, "Sheet 3");
        assert_eq!(wb.sheets[2].tables[0].headers, vec!["Column 1", "Column 2", "Column 3"]);
    }

    #[test]
    fn add_sheet_fills_gap_in_naming() {
        let mut wb = Workbook::empty("Tables");
        wb.sheets.push(Sheet::empty("Sheet 2", vec!["A".into()]));
        let wb = add_sheet(&wb, None, vec![], None, None);
        assert_eq!(wb.sheets[1].name, "Sheet 1");
    }

    #[test]
    fn add_sheet_inserts_after_given_index() {
        let wb = two_sheet_workbook();
        let wb = add_sheet(&wb, Some("Mid".to_string()), vec!["A".into()], Some(0), None);
        assert_eq!(
            wb.sheets.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            vec!["Sheet 1", "Mid", "Sheet 2"]
        );
    }

    #[test]
    fn add_sheet_places_new_tab_at_target_tab_order_idx() {
        use crate::model::TabOrderItem;
        let mut wb = two_sheet_workbook();
        wb.metadata.tab_order = Some(vec![TabOrderItem::sheet(0), TabOrderItem::sheet(1)]);
        let wb = add_sheet(&wb, None, vec![], None, Some(0));
        let order = wb.metadata.tab_order.unwrap();
        assert_eq!(order[0], TabOrderItem::sheet(2));
    }

    #[test]
    fn delete_sheet_rejects_out_of_range() {
        let wb = two_sheet_workbook();
        assert!(delete_sheet(&wb, 9).is_err());
        let wb = delete_sheet(&wb, 0).unwrap();
        assert_eq!(wb.sheets.len(), 1);
        assert_eq!(wb.sheets[0].name, "Sheet 2");
    }

    #[test]
    fn move_sheet_reorders() {
        let mut wb = two_sheet_workbook();
        wb.sheets.push(Sheet::empty("Sheet 3", vec!["A".into()]));
        let wb = move_sheet(&wb, 0, 2, None).unwrap();
        assert_eq!(
            wb.sheets.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            vec!["Sheet 2", "Sheet 3", "Sheet 1"]
        );
    }

    #[test]
    fn move_sheet_with_null_target_deletes_explicit_tab_order() {
        use crate::model::TabOrderItem;
        let mut wb = two_sheet_workbook();
        wb.metadata.tab_order = Some(vec![TabOrderItem::sheet(0), TabOrderItem::sheet(1)]);
        let wb = move_sheet(&wb, 0, 1, Some(None)).unwrap();
        assert!(wb.metadata.tab_order.is_none());
    }

    #[test]
    fn move_sheet_without_target_rekeys_explicit_tab_order() {
        use crate::model::TabOrderItem;
        let mut wb = two_sheet_workbook();
        wb.metadata.tab_order = Some(vec![TabOrderItem::sheet(0), TabOrderItem::sheet(1)]);
        let wb = move_sheet(&wb, 0, 1, None).unwrap();
        assert_eq!(wb.metadata.tab_order.unwrap(), vec![TabOrderItem::sheet(1), TabOrderItem::sheet(0)]);
    }

    #[test]
    fn add_table_appends_to_target_sheet() {
        let wb = two_sheet_workbook();
        let wb = add_table(&wb, 1, "T2", vec!["X".into()]).unwrap();
        assert_eq!(wb.sheets[1].tables.len(), 2);
        assert_eq!(wb.sheets[1].tables[1].name, "T2");
    }

    #[test]
    fn rename_table_and_delete_table() {
        let wb = two_sheet_workbook();
        let wb = rename_table(&wb, 0, 0, "Renamed").unwrap();
        assert_eq!(wb.sheets[0].tables[0].name, "Renamed");
        let wb = delete_table(&wb, 0, 0).unwrap();
        assert!(wb.sheets[0].tables.is_empty());
    }

    #[test]
    fn add_sheet_extends_explicit_tab_order() {
        use crate::model::TabOrderItem;
        let mut wb = two_sheet_workbook();
        wb.metadata.tab_order = Some(vec![TabOrderItem::sheet(0), TabOrderItem::sheet(1)]);
        let wb = add_sheet(&wb, None, vec![], None, None);
        let order = wb.metadata.tab_order.unwrap();
        assert!(order.contains(&TabOrderItem::sheet(2)));
    }

    #[test]
    fn delete_sheet_shrinks_explicit_tab_order() {
        use crate::model::TabOrderItem;
        let mut wb = two_sheet_workbook();
        wb.metadata.tab_order = Some(vec![TabOrderItem::sheet(0), TabOrderItem::sheet(1)]);
        let wb = delete_sheet(&wb, 0).unwrap();
        assert_eq!(wb.metadata.tab_order.unwrap(), vec![TabOrderItem::sheet(0)]);
    }
}
