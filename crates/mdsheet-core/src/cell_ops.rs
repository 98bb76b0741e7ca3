//! Cell, row, and column mutations on a single [`Table`] (spec §4.4).
//!
//! Every function here takes a `&Table` and returns a new `Table` (or an
//! [`OpError`]) rather than mutating in place, matching the rest of the crate's
//! copy-on-write discipline (spec §3's "state replaced wholesale"). Column
//! mutations additionally carry the table's metadata through a [`ShiftMap`] so
//! `visual.columns`/`visual.validation`/`visual.filters`/`legacy_validation` stay
//! aligned with the new column layout (spec §4.5); `visual.formulas` is left
//! untouched by [`TableMetadata::remap`] regardless of which operation below
//! triggered it.
//!
//! Markdown-specific cell escaping (`escapePipe`) lives in [`crate::codec`], but
//! it runs here, at storage time: every function that writes a raw external
//! value into a cell ([`update_cell`], [`paste_cells`]) escapes it before it
//! ever lands in `Table.rows`, so `row[c]` always holds the same text the
//! Markdown renderer will emit verbatim (spec §4.4 `updateCell`: `row[c] =
//! escapePipe(v)`). Functions that only relocate already-stored cells
//! ([`move_rows`], [`move_columns`], [`move_cells`]) never escape again.

use crate::codec::escape_pipe;
use crate::error::{IndexKind, OpError, OpResultT};
use crate::metadata::ShiftMap;
use crate::model::{Alignment, Table};
use std::collections::BTreeSet;

fn check_index(kind: IndexKind, index: usize, len: usize) -> OpResultT<()> {
    if index < len {
        Ok(())
    } else {
        Err(OpError::InvalidIndex { kind, index, len })
    }
}

fn check_indices(kind: IndexKind, indices: &[usize], len: usize) -> OpResultT<()> {
    for &i in indices {
        check_index(kind, i, len)?;
    }
    Ok(())
}

/// Full per-column alignment, right-extended to `headers.len()` (spec §3's
/// right-extend rule, made explicit so middle-of-table inserts/moves/deletes
/// don't silently misalign the trailing, never-written alignment entries).
fn full_alignments(table: &Table) -> Vec<Alignment> {
    (0..table.col_count()).map(|c| table.alignment(c)).collect()
}

/// `oldIdx -> newIdx` for moving a subset of `indices` (in their given order) to
/// land starting at position `to` among the *remaining* (non-moved) items. This
/// is shared by [`move_rows`] and [`move_columns`].
fn build_move_order(len: usize, indices: &[usize], to: usize) -> Vec<usize> {
    let moving: BTreeSet<usize> = indices.iter().copied().collect();
    let remaining: Vec<usize> = (0..len).filter(|i| !moving.contains(i)).collect();
    let to = to.min(remaining.len());
    let mut order = Vec::with_capacity(len);
    order.extend_from_slice(&remaining[..to]);
    order.extend_from_slice(indices);
    order.extend_from_slice(&remaining[to..]);
    order
}

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

/// Overwrite one cell, pipe-escaping `value` before it is stored (spec §4.4
/// `updateCell`).
pub fn update_cell(table: &Table, row: usize, col: usize, value: impl Into<String>) -> OpResultT<Table> {
    check_index(IndexKind::Row, row, table.rows.len())?;
    check_index(IndexKind::Column, col, table.col_count())?;
    let mut t = table.clone();
    let r = &mut t.rows[row];
    if r.len() <= col {
        r.resize(col + 1, String::new());
    }
    r[col] = escape_pipe(&value.into());
    Ok(t)
}

/// Paste a rectangular block of `values` with its top-left corner at
/// `(top_row, left_col)`, pipe-escaping each value before it is stored (spec
/// §4.4 `pasteCells`: "write cells with pipe-escape"). Rows beyond the current
/// row count are appended (blank-padded); columns beyond `col_count` are
/// silently dropped, since column creation is `insert_column`'s job, not
/// paste's.
pub fn paste_cells(
    table: &Table,
    top_row: usize,
    left_col: usize,
    values: &[Vec<String>],
) -> OpResultT<Table> {
    let mut t = table.clone();
    let needed_rows = top_row + values.len();
    if t.rows.len() < needed_rows {
        t.rows.resize(needed_rows, vec![String::new(); t.col_count()]);
    }
    let col_count = t.col_count();
    for (r, row_values) in values.iter().enumerate() {
        let target_row = &mut t.rows[top_row + r];
        if target_row.len() < col_count {
            target_row.resize(col_count, String::new());
        }
        for (c, value) in row_values.iter().enumerate() {
            let col = left_col + c;
            if col < col_count {
                target_row[col] = escape_pipe(value);
            }
        }
    }
    Ok(t)
}

/// Move a `height` x `width` block from `(from_row, from_col)` to
/// `(to_row, to_col)`, clearing the source cells even where the destination
/// doesn't fully overlap them (spec §8 Scenario G). Relocates already-stored
/// (already pipe-escaped) cell text verbatim; no new external value enters the
/// table here, so nothing is re-escaped.
pub fn move_cells(
    table: &Table,
    from_row: usize,
    from_col: usize,
    height: usize,
    width: usize,
    to_row: usize,
    to_col: usize,
) -> OpResultT<Table> {
    let mut t = table.clone();
    let col_count = t.col_count();
    let row_count = t.rows.len().max(from_row + height).max(to_row + height);
    t.rows.resize(row_count, vec![String::new(); col_count]);
    for row in &mut t.rows {
        if row.len() < col_count {
            row.resize(col_count, String::new());
        }
    }

    let mut buffer = vec![vec![String::new(); width]; height];
    for r in 0..height {
        for c in 0..width {
            let (sr, sc) = (from_row + r, from_col + c);
            if sc < col_count {
                buffer[r][c] = t.rows[sr][sc].clone();
            }
        }
    }
    for r in 0..height {
        for c in 0..width {
            let (sr, sc) = (from_row + r, from_col + c);
            if sc < col_count {
                t.rows[sr][sc] = String::new();
            }
        }
    }
    for r in 0..height {
        for c in 0..width {
            let (dr, dc) = (to_row + r, to_col + c);
            if dc < col_count {
                if dr >= t.rows.len() {
                    t.rows.resize(dr + 1, vec![String::new(); col_count]);
                }
                t.rows[dr][dc] = buffer[r][c].clone();
            }
        }
    }
    Ok(t)
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// Insert a row at `at` (0-indexed insertion point, `at == rows.len()` appends).
/// Missing `values` default to a blank row.
pub fn insert_row(table: &Table, at: usize, values: Option<Vec<String>>) -> OpResultT<Table> {
    check_index(IndexKind::Row, at, table.rows.len() + 1)?;
    let mut t = table.clone();
    let mut row = values.unwrap_or_default();
    row.resize(t.col_count(), String::new());
    t.rows.insert(at, row);
    Ok(t)
}

/// Delete rows at `indices`, preserving the relative order of the survivors.
pub fn delete_rows(table: &Table, indices: &[usize]) -> OpResultT<Table> {
    check_indices(IndexKind::Row, indices, table.rows.len())?;
    let to_delete: BTreeSet<usize> = indices.iter().copied().collect();
    let mut t = table.clone();
    let mut i = 0usize;
    t.rows.retain(|_| {
        let keep = !to_delete.contains(&i);
        i += 1;
        keep
    });
    Ok(t)
}

/// Move the rows at `indices` so they start at position `to` among the
/// remaining rows (see [`build_move_order`]).
pub fn move_rows(table: &Table, indices: &[usize], to: usize) -> OpResultT<Table> {
    check_indices(IndexKind::Row, indices, table.rows.len())?;
    let order = build_move_order(table.rows.len(), indices, to);
    let mut t = table.clone();
    t.rows = order.into_iter().map(|i| table.rows[i].clone()).collect();
    Ok(t)
}

/// Parse a cell as a number for [`sort_rows`]: strips thousands-separator
/// commas; an empty (after stripping) cell sorts as `-inf`, ahead of every
/// real number in an ascending sort.
fn parse_numeric(cell: &str) -> f64 {
    let stripped = cell.replace(',', "");
    let trimmed = stripped.trim();
    if trimmed.is_empty() {
        f64::NEG_INFINITY
    } else {
        trimmed.parse::<f64>().unwrap_or(f64::NEG_INFINITY)
    }
}

fn column_looks_numeric(table: &Table, col: usize) -> bool {
    if let Some(hint) = table
        .metadata
        .visual
        .columns
        .get(&col)
        .and_then(|c| c.column_type.as_deref())
    {
        return hint == "number";
    }
    table
        .rows
        .iter()
        .map(|r| r.get(col).map(String::as_str).unwrap_or(""))
        .filter(|c| !c.trim().is_empty())
        .all(|c| c.replace(',', "").trim().parse::<f64>().is_ok())
}

/// Sort rows by column `col`. Numeric sort is used when the column's
/// `ColumnMeta::column_type` hint says `"number"`, or (absent a hint) every
/// non-empty cell in the column parses as a number after stripping commas;
/// otherwise rows sort lexicographically by raw cell text. Stable: ties keep
/// their original relative order.
pub fn sort_rows(table: &Table, col: usize, ascending: bool) -> OpResultT<Table> {
    check_index(IndexKind::Column, col, table.col_count())?;
    let mut t = table.clone();
    let numeric = column_looks_numeric(table, col);
    if numeric {
        t.rows.sort_by(|a, b| {
            let av = parse_numeric(a.get(col).map(String::as_str).unwrap_or(""));
            let bv = parse_numeric(b.get(col).map(String::as_str).unwrap_or(""));
            av.partial_cmp(&bv).unwrap_or(std::cmp::Ordering::Equal)
        });
    } else {
        t.rows.sort_by(|a, b| {
            let av = a.get(col).map(String::as_str).unwrap_or("");
            let bv = b.get(col).map(String::as_str).unwrap_or("");
            av.cmp(bv)
        });
    }
    if !ascending {
        t.rows.reverse();
    }
    Ok(t)
}

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

/// Insert a column at `at` with the given header, shifting every column-indexed
/// metadata map via [`ShiftMap::for_insert`].
pub fn insert_column(table: &Table, at: usize, header: impl Into<String>) -> OpResultT<Table> {
    check_index(IndexKind::Column, at, table.col_count() + 1)?;
    let old_len = table.col_count();
    let mut t = table.clone();

    t.headers.insert(at, header.into());

    let mut alignments = full_alignments(table);
    alignments.insert(at, Alignment::default());
    t.alignments = alignments;

    t.rows = table
        .padded_rows()
        .into_iter()
        .map(|mut row| {
            row.insert(at, String::new());
            row
        })
        .collect();

    let shift = ShiftMap::for_insert(old_len, at);
    t.metadata = table.metadata.remap(&shift);
    Ok(t)
}

/// Delete the columns at `indices`, shifting metadata via [`ShiftMap::for_delete`].
pub fn delete_columns(table: &Table, indices: &[usize]) -> OpResultT<Table> {
    check_indices(IndexKind::Column, indices, table.col_count())?;
    let old_len = table.col_count();
    let to_delete: BTreeSet<usize> = indices.iter().copied().collect();
    let keep = |i: &usize| !to_delete.contains(i);

    let mut t = table.clone();
    let headers: Vec<String> = table
        .headers
        .iter()
        .enumerate()
        .filter(|(i, _)| keep(i))
        .map(|(_, h)| h.clone())
        .collect();
    let alignments: Vec<Alignment> = full_alignments(table)
        .into_iter()
        .enumerate()
        .filter(|(i, _)| keep(i))
        .map(|(_, a)| a)
        .collect();
    let rows: Vec<Vec<String>> = table
        .padded_rows()
        .into_iter()
        .map(|row| {
            row.into_iter()
                .enumerate()
                .filter(|(i, _)| keep(i))
                .map(|(_, c)| c)
                .collect()
        })
        .collect();

    t.headers = headers;
    t.alignments = alignments;
    t.rows = rows;

    let shift = ShiftMap::for_delete(old_len, indices);
    t.metadata = table.metadata.remap(&shift);
    Ok(t)
}

/// Move the columns at `indices` so they start at position `to` among the
/// remaining columns, shifting metadata via [`ShiftMap::for_move`].
pub fn move_columns(table: &Table, indices: &[usize], to: usize) -> OpResultT<Table> {
    check_indices(IndexKind::Column, indices, table.col_count())?;
    let order = build_move_order(table.col_count(), indices, to);
    let alignments = full_alignments(table);
    let padded = table.padded_rows();

    let mut t = table.clone();
    t.headers = order.iter().map(|&i| table.headers[i].clone()).collect();
    t.alignments = order.iter().map(|&i| alignments[i]).collect();
    t.rows = padded
        .iter()
        .map(|row| order.iter().map(|&i| row[i].clone()).collect())
        .collect();

    let shift = ShiftMap::for_move(&order);
    t.metadata = table.metadata.remap(&shift);
    Ok(t)
}

/// Blank every cell in the given columns, without touching headers or metadata.
pub fn clear_columns(table: &Table, indices: &[usize]) -> OpResultT<Table> {
    check_indices(IndexKind::Column, indices, table.col_count())?;
    let cols: BTreeSet<usize> = indices.iter().copied().collect();
    let mut t = table.clone();
    t.rows = table
        .padded_rows()
        .into_iter()
        .map(|mut row| {
            for &c in &cols {
                row[c] = String::new();
            }
            row
        })
        .collect();
    Ok(t)
}

/// Write `ColumnMeta::width` for column `col`.
pub fn update_column_width(table: &Table, col: usize, width: Option<f64>) -> OpResultT<Table> {
    check_index(IndexKind::Column, col, table.col_count())?;
    let mut t = table.clone();
    t.metadata.visual.columns.entry(col).or_default().width = width;
    Ok(t)
}

/// Write `ColumnMeta::format` for column `col`.
pub fn update_column_format(table: &Table, col: usize, format: Option<String>) -> OpResultT<Table> {
    check_index(IndexKind::Column, col, table.col_count())?;
    let mut t = table.clone();
    t.metadata.visual.columns.entry(col).or_default().format = format;
    Ok(t)
}

/// Write `Table.alignments[col]` (spec §4.6: alignment lives on the table, not in
/// `metadata.visual.columns`).
pub fn update_column_align(table: &Table, col: usize, align: Alignment) -> OpResultT<Table> {
    check_index(IndexKind::Column, col, table.col_count())?;
    let mut alignments = full_alignments(table);
    alignments[col] = align;
    let mut t = table.clone();
    t.alignments = alignments;
    Ok(t)
}

/// Write `visual.filters[col]`: the set of values hidden by a column filter.
pub fn update_column_filter(table: &Table, col: usize, hidden_values: Vec<String>) -> OpResultT<Table> {
    check_index(IndexKind::Column, col, table.col_count())?;
    let mut t = table.clone();
    if hidden_values.is_empty() {
        t.metadata.visual.filters.remove(&col);
    } else {
        t.metadata.visual.filters.insert(col, hidden_values);
    }
    Ok(t)
}
