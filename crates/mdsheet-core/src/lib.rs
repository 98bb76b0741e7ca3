//! A headless core for a spreadsheet-style editor that treats a single
//! Markdown file as its source of truth.
//!
//! The file holds at most one **Workbook** region — a level-1 heading whose
//! text matches a configured root marker (`"# Tables"` by default), containing
//! **Sheets** (level-2 headings) that each group one or more **Tables**
//! (level-3 headings, rendered as GFM pipe tables) — plus zero or more
//! free-form **Document** regions: any other level-1 heading and the content
//! that follows it, up to the next one.
//!
//! ```text
//! # Notes                      <- Document
//! Anything at all.
//!
//! # Tables                     <- Workbook region (root marker)
//! ## Budget                    <- Sheet
//! ### Q1                       <- Table
//! | Item | Cost |
//! | --- | --- |
//! | Rent | 1200 |
//!
//! # Appendix                   <- Document
//! More prose.
//! ```
//!
//! [`WorkbookContext`] is the entry point: it owns the parsed [`Workbook`]
//! alongside the raw file text and exposes every mutation (cell edits, row/
//! column inserts, sheet and table management, Document edits, and tab-order
//! reordering) as a method that returns the new text plus the changed range.
//!
//! ```
//! use mdsheet_core::{Config, GfmTableCodec, WorkbookContext};
//!
//! let mut ctx = WorkbookContext::init("", Config::tables_default(), Box::new(GfmTableCodec)).unwrap();
//! ctx.add_sheet(Some("Budget".to_string()), vec!["Item".into(), "Cost".into()], None, None);
//! let outcome = ctx.update_cell(0, 0, 0, 0, "Rent").unwrap();
//! assert!(outcome.text.contains("Rent"));
//! ```
//!
//! Column-indexed metadata (widths, validation rules, filters, arithmetic and
//! lookup formulas) rides along with every insert/delete/move of the column it
//! describes; see [`metadata::ShiftMap`]. Rearranging the visual tab strip
//! (see [`classifier`]) moves Sheets and Documents around in the file when a
//! request is physically realizable, falling back to explicit `tab_order`
//! metadata only for the genuinely interleaved residue that moving text alone
//! can never express.

pub mod cell_ops;
pub mod classifier;
pub mod codec;
pub mod config;
pub mod context;
pub mod document_ops;
pub mod error;
pub mod executor;
pub mod generator;
pub mod metadata;
pub mod model;
pub mod region;
pub mod scanner;
pub mod sheet_ops;
pub mod structure;
pub mod tab_order;

pub use codec::{GfmTableCodec, WorkbookCodec};
pub use config::Config;
pub use context::{OpOutcome, StateSnapshot, WorkbookContext};
pub use error::{IndexKind, OpError, OpResultT};
pub use model::{
    Alignment, FileStructure, Section, Sheet, Table, TabKind, TabOrderItem, Workbook, WorkbookMetadata,
};
