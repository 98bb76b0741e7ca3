//! Workbook session example
//!
//! Demonstrates driving a `WorkbookContext` through a typical editing
//! session: parsing a file, adding a sheet, editing cells, adding a
//! Document, and reordering the tab strip.

use mdsheet_core::{Alignment, Config, GfmTableCodec, WorkbookContext};

fn main() {
    println!("=== Workbook session ===\n");

    let mut ctx = WorkbookContext::init(
        "# Notes\nKickoff scheduled for next week.\n",
        Config::tables_default(),
        Box::new(GfmTableCodec),
    )
    .unwrap();

    println!("1. Initial text:\n{}", ctx.text());

    println!("2. Adding a sheet named \"Budget\"...");
    let outcome = ctx.add_sheet(Some("Budget".to_string()), vec!["Item".into(), "Cost".into()], None, None);
    println!("{}", outcome.text);

    println!("3. Filling in a couple of cells...");
    ctx.update_cell(0, 0, 0, 0, "Rent").unwrap();
    let outcome = ctx.update_cell(0, 0, 0, 1, "1200").unwrap();
    println!("{}", outcome.text);

    println!("4. Right-aligning the cost column...");
    let outcome = ctx.update_column_align(0, 0, 1, Alignment::Right).unwrap();
    println!("{}", outcome.text);

    println!("5. Adding a second Document after \"Notes\"...");
    let outcome = ctx.add_document("Appendix", "Nothing here yet.", Some(0));
    println!("{}", outcome.text);

    println!("6. Current physical structure:");
    let structure = ctx.structure();
    println!(
        "   documents before workbook: {:?}, sheets: {:?}, documents after: {:?}",
        structure.docs_before_wb, structure.sheets, structure.docs_after_wb
    );

    println!("\n=== Session complete ===");
}
