//! End-to-end coverage of the literal scenarios and the cross-cutting
//! invariants, driven entirely through [`WorkbookContext`] the way a host
//! would use the crate.

use mdsheet_core::cell_ops;
use mdsheet_core::codec::{escape_pipe, GfmTableCodec};
use mdsheet_core::config::Config;
use mdsheet_core::metadata::ColumnMeta;
use mdsheet_core::model::{Alignment, TabOrderItem};
use mdsheet_core::scanner::split_lines;
use mdsheet_core::{Table, WorkbookContext};

fn context(text: &str) -> WorkbookContext {
    WorkbookContext::init(text, Config::tables_default(), Box::new(GfmTableCodec)).unwrap()
}

/// Scenario A — insertColumn preserves metadata.
#[test]
fn scenario_a_insert_column_preserves_metadata() {
    let mut t = Table::empty("T", vec!["A".into(), "B".into(), "C".into()]);
    t.metadata.visual.columns.insert(0, ColumnMeta { width: Some(100.0), ..Default::default() });
    t.metadata.visual.columns.insert(2, ColumnMeta { width: Some(300.0), ..Default::default() });

    let updated = cell_ops::insert_column(&t, 1, "X").unwrap();

    assert_eq!(updated.headers, vec!["A", "X", "B", "C"]);
    assert_eq!(updated.metadata.visual.columns.get(&0).unwrap().width, Some(100.0));
    assert_eq!(updated.metadata.visual.columns.get(&3).unwrap().width, Some(300.0));
    assert!(!updated.metadata.visual.columns.contains_key(&1));
}

/// Scenario B — deleteColumns drops tombstones and renumbers survivors.
#[test]
fn scenario_b_delete_columns_drops_tombstones() {
    let mut t = Table::empty("T", vec!["A".into(), "B".into(), "C".into(), "D".into()]);
    t.metadata.visual.columns.insert(1, ColumnMeta { width: Some(50.0), ..Default::default() });
    t.metadata.visual.columns.insert(3, ColumnMeta { width: Some(200.0), ..Default::default() });

    let updated = cell_ops::delete_columns(&t, &[1]).unwrap();

    assert_eq!(updated.headers, vec!["A", "C", "D"]);
    assert!(!updated.metadata.visual.columns.contains_key(&1));
    assert_eq!(updated.metadata.visual.columns.get(&2).unwrap().width, Some(200.0));
}

/// Scenario C — pipe escape in updateCell leaves inline-code pipes alone.
#[test]
fn scenario_c_pipe_escape_in_update_cell() {
    let mut ctx = context("");
    ctx.add_sheet(Some("S1".to_string()), vec!["X".into()], None, None);
    ctx.update_cell(0, 0, 0, 0, "a|b `c|d` e|f").unwrap();

    // `updateCell` stores the escaped value directly (spec.md `row[c] =
    // escapePipe(v)`): outside-code pipes are escaped, the inside-code one is
    // left alone.
    let table = &ctx.workbook().sheets[0].tables[0];
    assert_eq!(table.cell(0, 0), r"a\|b `c|d` e\|f");
    assert_eq!(table.cell(0, 0), escape_pipe("a|b `c|d` e|f"));
    assert!(ctx.text().contains(r"a\|b `c|d` e\|f"));
}

/// Scenario D — tab-order redundancy pruning.
#[test]
fn scenario_d_tab_order_redundancy_pruning() {
    let text = "# D1\n\n# Tables\n\n## S1\n\n## S2\n\n# D2\n";
    let mut ctx = WorkbookContext::init(text, Config::tables_default(), Box::new(GfmTableCodec)).unwrap();
    ctx.reorder_tabs(vec![
        TabOrderItem::document(0),
        TabOrderItem::sheet(0),
        TabOrderItem::sheet(1),
        TabOrderItem::document(1),
    ])
    .unwrap();
    assert!(ctx.workbook().metadata.tab_order.is_none());
    assert!(!ctx.text().contains("tab_order"));
}

/// Scenario E — a tab strip where Sheets stay contiguous is realized purely
/// by moving text; no `tab_order` metadata is written.
#[test]
fn scenario_e_physical_reorder_needs_no_metadata() {
    let text = "# Tables\n\n## S1\n\n## S2\n\n# D1\n\n# D2\n";
    let mut ctx = WorkbookContext::init(text, Config::tables_default(), Box::new(GfmTableCodec)).unwrap();
    ctx.reorder_tabs(vec![
        TabOrderItem::document(1),
        TabOrderItem::sheet(0),
        TabOrderItem::sheet(1),
        TabOrderItem::document(0),
    ])
    .unwrap();
    assert!(ctx.workbook().metadata.tab_order.is_none());
    let lines = split_lines(ctx.text());
    assert_eq!(lines[0], "# D2");
}

/// Scenario F — adding a document between two others keeps later tab-order
/// entries correctly renumbered.
#[test]
fn scenario_f_add_document_bookkeeping() {
    let mut ctx = context("# D1\n\n# D2\n");
    let outcome = ctx.add_document("New", "", Some(0));
    let lines = split_lines(&outcome.text);
    assert_eq!(lines[0], "# D1");
    assert_eq!(lines[2], "# New");
    assert_eq!(lines[4], "# D2");
}

/// Scenario G — moveCells clears every source cell even on partial overlap.
#[test]
fn scenario_g_move_cells_clears_source() {
    let mut t = Table::empty("T", vec!["A".into(), "B".into(), "C".into()]);
    t.rows = vec![
        vec!["1".into(), "2".into(), "3".into()],
        vec!["4".into(), "5".into(), "6".into()],
    ];
    let updated = cell_ops::move_cells(&t, 0, 0, 1, 2, 1, 1).unwrap();
    assert_eq!(updated.rows, vec![
        vec!["".to_string(), "".to_string(), "3".to_string()],
        vec!["4".to_string(), "1".to_string(), "2".to_string()],
    ]);
}

/// Invariant 2 — column-metadata key closure: every sub-map key stays inside
/// `[0, col_count)` after a sequence of column operations.
#[test]
fn invariant_column_metadata_key_closure() {
    let mut t = Table::empty("T", vec!["A".into(), "B".into(), "C".into()]);
    for i in 0..3 {
        t.metadata.visual.columns.insert(i, ColumnMeta { width: Some(i as f64), ..Default::default() });
    }
    let t = cell_ops::insert_column(&t, 1, "X").unwrap();
    let t = cell_ops::delete_columns(&t, &[0]).unwrap();
    let t = cell_ops::move_columns(&t, &[0], 2).unwrap();
    let col_count = t.col_count();
    for &key in t.metadata.visual.columns.keys() {
        assert!(key < col_count, "key {key} escaped [0, {col_count})");
    }
}

/// Invariant 3 — tab_order, when present, is always a permutation of every
/// current Sheet/Document.
#[test]
fn invariant_tab_order_stays_a_permutation_after_sheet_and_document_churn() {
    let text = "# D1\n\n# Tables\n\n## S1\n\n## S2\n\n# D2\n";
    let mut ctx = WorkbookContext::init(text, Config::tables_default(), Box::new(GfmTableCodec)).unwrap();
    ctx.reorder_tabs(vec![
        TabOrderItem::sheet(1),
        TabOrderItem::document(0),
        TabOrderItem::sheet(0),
        TabOrderItem::document(1),
    ])
    .unwrap();
    assert!(ctx.workbook().metadata.tab_order.is_some());

    ctx.add_sheet(None, vec![], None, None);
    let order = ctx.workbook().metadata.tab_order.clone().unwrap();
    let sheet_count = ctx.workbook().sheet_count();
    let sheet_entries: Vec<_> = order.iter().filter(|i| i.kind == mdsheet_core::model::TabKind::Sheet).collect();
    assert_eq!(sheet_entries.len(), sheet_count);
}

/// Invariant 4 — natural-order redundancy: generating after a no-op reorder
/// request never leaves a `tab_order` comment behind.
#[test]
fn invariant_generate_drops_tab_order_matching_natural_order() {
    let text = "# Tables\n\n## S1\n\n## S2\n";
    let mut ctx = WorkbookContext::init(text, Config::tables_default(), Box::new(GfmTableCodec)).unwrap();
    let natural = vec![TabOrderItem::sheet(0), TabOrderItem::sheet(1)];
    // Asking to "reorder" into the order that was already natural is a no-op.
    let before = ctx.text().to_string();
    ctx.reorder_tabs(natural).unwrap();
    assert_eq!(ctx.text(), before);
}

/// Invariant 6 — region independence: renaming one Document leaves every
/// other Document and the Workbook region's bytes untouched.
#[test]
fn invariant_document_mutation_is_region_independent() {
    let text = "# D1\nfirst body\n\n# Tables\n\n## S1\n\n# D2\nsecond body\n";
    let mut ctx = WorkbookContext::init(text, Config::tables_default(), Box::new(GfmTableCodec)).unwrap();
    let outcome = ctx.rename_document(0, "Renamed").unwrap();
    assert!(outcome.text.contains("# Renamed"));
    assert!(outcome.text.contains("first body"));
    assert!(outcome.text.contains("## S1"));
    assert!(outcome.text.contains("# D2\nsecond body"));
}

/// Invariant 7 — fenced code safety: heading-like lines inside a fence are
/// never treated as headings, so mutating the Workbook never disturbs them.
#[test]
fn invariant_fenced_headings_survive_workbook_mutation() {
    let text = "# D1\n```\n# Not A Heading\n```\n\n# Tables\n\n## S1\n";
    let mut ctx = WorkbookContext::init(text, Config::tables_default(), Box::new(GfmTableCodec)).unwrap();
    ctx.add_sheet(Some("S2".to_string()), vec!["A".into()], None, None);
    assert!(ctx.text().contains("```\n# Not A Heading\n```"));
}

/// `Alignment` round-trips through a column-align update without touching
/// column metadata.
#[test]
fn column_align_update_is_independent_of_column_metadata() {
    let mut ctx = context("");
    ctx.add_sheet(Some("S1".to_string()), vec!["A".into(), "B".into()], None, None);
    ctx.update_column_align(0, 0, 1, Alignment::Right).unwrap();
    assert_eq!(ctx.workbook().sheets[0].tables[0].alignment(1), Alignment::Right);
    assert!(ctx.workbook().sheets[0].tables[0].metadata.visual.columns.is_empty());
}
