//! Column-indexed metadata and the shift map that keeps it aligned with column
//! mutations (spec §3.1, §4.5).
//!
//! Every column-indexed sub-map (`visual.columns`, `visual.validation`,
//! `visual.filters`, and the legacy top-level `metadata.validation` alias) is keyed
//! by a string-encoded non-negative integer on disk and by a plain `usize` in
//! memory. `visual.formulas` is the one exception spec §4.5 calls out: it is carried
//! through verbatim on every shift, never rekeyed.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Per-column width/format/hidden/type (spec §3.1). Alignment is **not** stored
/// here — `updateColumnAlign` writes into `Table.alignments` instead (spec §4.6).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnMeta {
    /// Column width, in the host's display units.
    pub width: Option<f64>,
    /// A format string (e.g. a number/date format pattern).
    pub format: Option<String>,
    /// Whether the column is hidden.
    pub hidden: Option<bool>,
    /// A type hint (`"number"`, `"string"`, ...) consulted by `sortRows` (spec
    /// §4.4) before falling back to heuristic inference.
    pub column_type: Option<String>,
    /// Any other keys present on this entry, carried through verbatim.
    pub extra: Map<String, Value>,
}

/// The recognized validation kinds (spec §3.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    /// Cell value must be one of a fixed list.
    List,
    /// Cell value must parse as a date.
    Date,
    /// Cell value must parse as an integer.
    Integer,
    /// Cell value must look like an email address.
    Email,
    /// Cell value must look like a URL.
    Url,
}

/// Per-column validation rule (spec §3.1). Kind-specific parameters (the list's
/// allowed values, date bounds, ...) are not enumerated by the spec beyond the
/// kind tag, so they're carried in `options` verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationRule {
    /// The validation kind.
    pub kind: ValidationKind,
    /// Kind-specific parameters, carried through opaquely.
    pub options: Map<String, Value>,
}

/// `functionType` values for [`ArithmeticFormula`] (spec §3.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticFunction {
    /// A free-form expression over other columns.
    Expression,
    /// Sum of the referenced columns/source table.
    Sum,
    /// Average of the referenced columns/source table.
    Avg,
    /// Count of non-empty cells.
    Count,
    /// Minimum value.
    Min,
    /// Maximum value.
    Max,
}

/// A computed column defined by an arithmetic expression (spec §3.2).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArithmeticFormula {
    /// Which arithmetic function this column computes.
    pub function_type: Option<ArithmeticFunction>,
    /// Free-form expression text, used when `function_type` is `Expression`.
    pub expression: Option<String>,
    /// Column names the expression/aggregate reads from.
    pub columns: Option<Vec<String>>,
    /// When aggregating across tables, the source table's `visual.id`.
    pub source_table_id: Option<i64>,
}

/// A computed column defined by a cross-table lookup/join (spec §3.2).
#[derive(Debug, Clone, PartialEq)]
pub struct LookupFormula {
    /// The `visual.id` of the table being joined against.
    pub source_table_id: i64,
    /// The join key column name in this table.
    pub join_key_local: String,
    /// The join key column name in the source table.
    pub join_key_remote: String,
    /// The source table column copied into this one.
    pub target_field: String,
}

/// A computed-column definition (spec §3.2). The core stores and migrates these
/// verbatim; it never evaluates them.
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaDef {
    /// An arithmetic/expression formula.
    Arithmetic(ArithmeticFormula),
    /// A cross-table lookup formula.
    Lookup(LookupFormula),
}

/// The `visual` metadata sub-tree (spec §3.1).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VisualMetadata {
    /// Stable table identity for cross-table formula references.
    pub id: Option<i64>,
    /// Per-column width/format/hidden/type.
    pub columns: BTreeMap<usize, ColumnMeta>,
    /// Per-column validation.
    pub validation: BTreeMap<usize, ValidationRule>,
    /// Per-column hidden-values sets.
    pub filters: BTreeMap<usize, Vec<String>>,
    /// Per-column computed-column definitions. Never rekeyed by [`TableMetadata::remap`]
    /// (spec §4.5).
    pub formulas: BTreeMap<usize, FormulaDef>,
    /// Any other keys present under `visual`, carried through verbatim.
    pub extra: Map<String, Value>,
}

impl VisualMetadata {
    /// `true` if every field is at its default / empty.
    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.columns.is_empty()
            && self.validation.is_empty()
            && self.filters.is_empty()
            && self.formulas.is_empty()
            && self.extra.is_empty()
    }
}

/// A Table's full metadata tree (spec §3.1): the `visual` sub-tree plus the legacy
/// top-level `validation` alias, plus anything else, carried verbatim.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableMetadata {
    /// `metadata.visual`.
    pub visual: VisualMetadata,
    /// `metadata.validation`: a legacy top-level alias shifted alongside
    /// `visual.validation`, never unified with it (spec §9 open question — both
    /// are preserved; this crate does not guess which wins when both are present).
    pub legacy_validation: BTreeMap<usize, ValidationRule>,
    /// Any other top-level metadata keys, carried through verbatim.
    pub extra: Map<String, Value>,
}

impl TableMetadata {
    /// `true` if there is nothing recognized or opaque to persist.
    pub fn is_empty(&self) -> bool {
        self.visual.is_empty() && self.legacy_validation.is_empty() && self.extra.is_empty()
    }

    /// Apply a [`ShiftMap`] to every column-indexed sub-map except `visual.formulas`,
    /// which spec §4.5 says is carried through verbatim.
    pub fn remap(&self, shift: &ShiftMap) -> TableMetadata {
        TableMetadata {
            visual: VisualMetadata {
                id: self.visual.id,
                columns: remap_map(&self.visual.columns, shift),
                validation: remap_map(&self.visual.validation, shift),
                filters: remap_map(&self.visual.filters, shift),
                formulas: self.visual.formulas.clone(),
                extra: self.visual.extra.clone(),
            },
            legacy_validation: remap_map(&self.legacy_validation, shift),
            extra: self.extra.clone(),
        }
    }
}

/// Rekey a column-indexed map through a [`ShiftMap`], dropping tombstoned keys.
/// Keys not present in `shift`'s domain are preserved unchanged (spec §4.5: "keys
/// for deleted columns are dropped" applies only to keys the shift map tombstones;
/// an index beyond the shift map's built width is left alone rather than silently
/// discarded, since it was never covered by the mutation that produced the map).
pub fn remap_map<T: Clone>(map: &BTreeMap<usize, T>, shift: &ShiftMap) -> BTreeMap<usize, T> {
    let mut out = BTreeMap::new();
    for (&old_idx, value) in map {
        match shift.apply(old_idx) {
            ColumnFate::To(new_idx) => {
                out.insert(new_idx, value.clone());
            }
            ColumnFate::Tombstone => {}
            ColumnFate::Unchanged => {
                out.insert(old_idx, value.clone());
            }
        }
    }
    out
}

/// Where a single old column index ends up after a shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnFate {
    /// Maps to a new index.
    To(usize),
    /// The column was deleted; drop this entry.
    Tombstone,
    /// Not covered by the shift map; leave the key as-is.
    Unchanged,
}

/// A function from old column indices to new indices (or tombstone), built once
/// per mutation and applied to every column-indexed metadata map in lock-step with
/// the header/row shape change that produced it (spec §4.5).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShiftMap {
    /// `entries[old_idx]` is the fate of that old column. Indices beyond the end of
    /// this vector are [`ColumnFate::Unchanged`].
    entries: Vec<ColumnFate>,
}

impl ShiftMap {
    /// The no-op shift: every column maps to itself.
    pub fn identity(len: usize) -> Self {
        Self {
            entries: (0..len).map(ColumnFate::To).collect(),
        }
    }

    /// Shift for `insertColumn(at, ..)` on a table with `old_len` columns:
    /// `oldIdx -> oldIdx + (oldIdx >= at ? 1 : 0)`.
    pub fn for_insert(old_len: usize, at: usize) -> Self {
        let entries = (0..old_len)
            .map(|old_idx| {
                let new_idx = if old_idx >= at { old_idx + 1 } else { old_idx };
                ColumnFate::To(new_idx)
            })
            .collect();
        Self { entries }
    }

    /// Shift for `deleteColumns(indices)` on a table with `old_len` columns:
    /// surviving columns get a dense new index in their original relative order;
    /// deleted columns tombstone.
    pub fn for_delete(old_len: usize, indices: &[usize]) -> Self {
        let to_delete: std::collections::BTreeSet<usize> = indices.iter().copied().collect();
        let mut entries = Vec::with_capacity(old_len);
        let mut next_new = 0usize;
        for old_idx in 0..old_len {
            if to_delete.contains(&old_idx) {
                entries.push(ColumnFate::Tombstone);
            } else {
                entries.push(ColumnFate::To(next_new));
                next_new += 1;
            }
        }
        Self { entries }
    }

    /// Shift for `moveColumns`: `new_order[new_pos]` is the old index now occupying
    /// `new_pos`. Every old index must appear exactly once.
    pub fn for_move(new_order: &[usize]) -> Self {
        let mut entries = vec![ColumnFate::Unchanged; new_order.len()];
        for (new_pos, &old_idx) in new_order.iter().enumerate() {
            if old_idx < entries.len() {
                entries[old_idx] = ColumnFate::To(new_pos);
            }
        }
        Self { entries }
    }

    /// Where does `old_idx` end up?
    pub fn apply(&self, old_idx: usize) -> ColumnFate {
        self.entries
            .get(old_idx)
            .copied()
            .unwrap_or(ColumnFate::Unchanged)
    }
}

/// Verify invariant 2 (spec §8): every integer key of every remapped sub-map lies
/// in `[0, header_count)`. `visual.formulas` is intentionally excluded (spec §4.5).
pub fn column_keys_in_range(metadata: &TableMetadata, header_count: usize) -> bool {
    fn in_range<V>(m: &BTreeMap<usize, V>, header_count: usize) -> bool {
        m.keys().all(|&k| k < header_count)
    }
    in_range(&metadata.visual.columns, header_count)
        && in_range(&metadata.visual.validation, header_count)
        && in_range(&metadata.visual.filters, header_count)
        && in_range(&metadata.legacy_validation, header_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta_with_columns(entries: &[(usize, f64)]) -> TableMetadata {
        let mut m = TableMetadata::default();
        for &(k, width) in entries {
            m.visual.columns.insert(
                k,
                ColumnMeta {
                    width: Some(width),
                    ..Default::default()
                },
            );
        }
        m
    }

    #[test]
    fn scenario_a_insert_column_shifts_up() {
        // headers ["A","B","C"], visual.columns = {0: w100, 2: w300}
        let meta = meta_with_columns(&[(0, 100.0), (2, 300.0)]);
        let shift = ShiftMap::for_insert(3, 1);
        let shifted = meta.remap(&shift);
        assert_eq!(shifted.visual.columns.get(&0).unwrap().width, Some(100.0));
        assert_eq!(shifted.visual.columns.get(&3).unwrap().width, Some(300.0));
        assert_eq!(shifted.visual.columns.len(), 2);
    }

    #[test]
    fn scenario_b_delete_column_drops_tombstone() {
        // headers ["A","B","C","D"], visual.columns = {1: w50, 3: w200}; delete col 1
        let meta = meta_with_columns(&[(1, 50.0), (3, 200.0)]);
        let shift = ShiftMap::for_delete(4, &[1]);
        let shifted = meta.remap(&shift);
        assert_eq!(shifted.visual.columns.len(), 1);
        assert_eq!(shifted.visual.columns.get(&2).unwrap().width, Some(200.0));
    }

    #[test]
    fn formulas_are_never_remapped() {
        let mut meta = TableMetadata::default();
        meta.visual.formulas.insert(
            2,
            FormulaDef::Arithmetic(ArithmeticFormula {
                function_type: Some(ArithmeticFunction::Sum),
                ..Default::default()
            }),
        );
        let shift = ShiftMap::for_delete(4, &[0, 1]);
        let shifted = meta.remap(&shift);
        // Still keyed at 2, even though column 2 is now out of range / nonsensical.
        assert!(shifted.visual.formulas.contains_key(&2));
    }

    #[test]
    fn for_move_builds_old_to_new_positions() {
        // move column 0 to the end of a 3-column table: new order is [1, 2, 0]
        let shift = ShiftMap::for_move(&[1, 2, 0]);
        assert_eq!(shift.apply(0), ColumnFate::To(2));
        assert_eq!(shift.apply(1), ColumnFate::To(0));
        assert_eq!(shift.apply(2), ColumnFate::To(1));
    }

    #[test]
    fn column_keys_in_range_ignores_formulas() {
        let mut meta = TableMetadata::default();
        meta.visual.formulas.insert(
            99,
            FormulaDef::Arithmetic(ArithmeticFormula::default()),
        );
        assert!(column_keys_in_range(&meta, 3));
    }
}
