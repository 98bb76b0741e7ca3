//! The Workbook data model (spec §3).
//!
//! Every tree node here is replaced wholesale rather than mutated: operations in
//! [`crate::cell_ops`] and [`crate::sheet_ops`] take a node by value (or `&`) and
//! return a new one. There is no interior mutability and no arena — persistent
//! sharing is left to the caller (clone is cheap enough at the sizes this crate
//! targets; see spec §5's resource model).

use crate::metadata::TableMetadata;
use serde_json::{Map, Value};

/// Column alignment as declared by a GFM delimiter row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    /// No colons, or only a left colon (`:--`).
    #[default]
    Left,
    /// Colons on both sides (`:-:`).
    Center,
    /// Only a right colon (`--:`).
    Right,
}

/// One GFM table nested under a Sheet heading.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    /// The table's heading text.
    pub name: String,
    /// Free-form text captured between the heading and the table body, when
    /// `Config::capture_description` is set.
    pub description: Option<String>,
    /// Column headers, in order.
    pub headers: Vec<String>,
    /// Per-column alignment. Shorter than `headers` is valid; readers right-extend
    /// with `Alignment::Left` (see [`Table::alignment`]).
    pub alignments: Vec<Alignment>,
    /// Data rows. A row may be shorter than `headers`; readers treat missing cells
    /// as the empty string (see [`Table::cell`]).
    pub rows: Vec<Vec<String>>,
    /// Recognized + opaque metadata (spec §3.1).
    pub metadata: TableMetadata,
}

impl Table {
    /// An empty table with the given name and headers, and a single blank row.
    pub fn empty(name: impl Into<String>, headers: Vec<String>) -> Self {
        let width = headers.len();
        Self {
            name: name.into(),
            description: None,
            alignments: vec![Alignment::Left; width],
            rows: vec![vec![String::new(); width]],
            headers,
            metadata: TableMetadata::default(),
        }
    }

    /// Number of columns, i.e. `headers.len()`.
    pub fn col_count(&self) -> usize {
        self.headers.len()
    }

    /// Alignment for column `c`, right-extending with `Alignment::Left` past the
    /// end of `alignments` as spec §3 requires.
    pub fn alignment(&self, c: usize) -> Alignment {
        self.alignments.get(c).copied().unwrap_or_default()
    }

    /// The value of cell `(r, c)`, or `""` if the row doesn't reach that far (or
    /// doesn't exist).
    pub fn cell(&self, r: usize, c: usize) -> &str {
        self.rows
            .get(r)
            .and_then(|row| row.get(c))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Row `r` right-padded with empty strings to `headers.len()`.
    pub fn padded_row(&self, r: usize) -> Vec<String> {
        let mut row = self.rows.get(r).cloned().unwrap_or_default();
        row.resize(self.col_count(), String::new());
        row
    }

    /// All rows right-padded to `headers.len()`.
    pub fn padded_rows(&self) -> Vec<Vec<String>> {
        (0..self.rows.len()).map(|r| self.padded_row(r)).collect()
    }
}

/// A named group of Tables (spec §3).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    /// The sheet's heading text.
    pub name: String,
    /// Tables contained in this sheet, in order.
    pub tables: Vec<Table>,
    /// Free-form metadata. No recognized keys are defined at the Sheet level.
    pub metadata: Map<String, Value>,
}

impl Sheet {
    /// An empty sheet with one table of the given columns and a single blank row.
    pub fn empty(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            tables: vec![Table::empty("Table 1", columns)],
            metadata: Map::new(),
        }
    }
}

/// One entry of the table-kind/index sort used by `tab_order` (spec §3, §4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TabKind {
    /// A Sheet, addressed by its position in `Workbook.sheets`.
    Sheet,
    /// A Document region, addressed by its position in file-natural document order.
    Document,
}

/// One slot of an explicit visual tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TabOrderItem {
    /// Sheet or Document.
    pub kind: TabKind,
    /// 0-based position within that kind, in the file's natural order.
    pub index: usize,
}

impl TabOrderItem {
    /// Shorthand for `TabOrderItem { kind: TabKind::Sheet, index }`.
    pub fn sheet(index: usize) -> Self {
        Self {
            kind: TabKind::Sheet,
            index,
        }
    }

    /// Shorthand for `TabOrderItem { kind: TabKind::Document, index }`.
    pub fn document(index: usize) -> Self {
        Self {
            kind: TabKind::Document,
            index,
        }
    }
}

/// Recognized + opaque Workbook-level metadata (spec §3).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorkbookMetadata {
    /// Explicit visual tab order, when it differs from natural order (spec §4.9).
    pub tab_order: Option<Vec<TabOrderItem>>,
    /// Any other keys found in the persisted metadata comment, carried verbatim.
    pub extra: Map<String, Value>,
}

impl WorkbookMetadata {
    /// `true` if there is nothing left to persist (spec §4.8 step 1: an empty
    /// metadata map is dropped entirely rather than emitted as `{}`).
    pub fn is_empty(&self) -> bool {
        self.tab_order.is_none() && self.extra.is_empty()
    }
}

/// The Workbook region's parsed tree (spec §3).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workbook {
    /// The Workbook heading's text (without the leading `"# "`).
    pub name: String,
    /// Free-form text between the Workbook heading and the first Sheet heading.
    pub root_content: Option<String>,
    /// Sheets, in file order.
    pub sheets: Vec<Sheet>,
    /// Recognized + opaque Workbook metadata.
    pub metadata: WorkbookMetadata,
}

impl Workbook {
    /// An empty workbook with the given name and no sheets.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root_content: None,
            sheets: Vec::new(),
            metadata: WorkbookMetadata::default(),
        }
    }

    /// Total sheet count.
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }
}

/// One top-level Markdown region (spec §3): the single Workbook, or a free-form
/// Document section.
#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    /// The Workbook region. Its content is not captured by the structure extractor
    /// (spec §4.3); read it via [`crate::context::WorkbookContext::workbook`].
    Workbook,
    /// A non-marker level-1 heading and everything until the next one (or EOF).
    Document {
        /// Heading text, with the leading `"# "` stripped.
        title: String,
        /// Everything after the heading line, up to (exclusive) the next level-1
        /// heading or EOF, joined with `"\n"`.
        content: String,
    },
}

/// The file's physical layout, used by the tab-reorder classifier (spec §3).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileStructure {
    /// Document indices (file-natural, across zones) that appear before the
    /// Workbook region.
    pub docs_before_wb: Vec<usize>,
    /// Sheet indices, `0..sheets.len()`, positional within the Workbook.
    pub sheets: Vec<usize>,
    /// Document indices that appear after the Workbook region.
    pub docs_after_wb: Vec<usize>,
    /// Whether the file has a Workbook region at all.
    pub has_workbook: bool,
}

impl FileStructure {
    /// Total document count across both zones.
    pub fn doc_count(&self) -> usize {
        self.docs_before_wb.len() + self.docs_after_wb.len()
    }
}
