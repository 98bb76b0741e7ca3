//! Parser/generator configuration (spec §6.5).
//!
//! Unknown keys are ignored by construction: [`Config`] is a plain struct, not a
//! free-form map, so there is nothing to ignore at the type level — callers building
//! one from an external settings blob simply skip fields they don't recognize before
//! constructing it.

/// Options recognized by the scanner, region locator, and codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// The exact trimmed text of the level-1 heading that marks the Workbook region,
    /// e.g. `"# Tables"`.
    pub root_marker: String,
    /// Heading level (`#` run length) for Sheet boundaries inside the Workbook region.
    pub sheet_header_level: usize,
    /// Heading level for Table boundaries inside a Sheet. Must be greater than
    /// `sheet_header_level`; this is a documented expectation, not enforced by the
    /// type (a `Config` with an inverted pair is constructible, matching the
    /// source's "unknown keys ignored / no schema validation" posture).
    pub table_header_level: usize,
    /// Whether the first non-table paragraph under a Table heading is captured as
    /// `Table.description`.
    pub capture_description: bool,
    /// Pipe-table column separator character.
    pub column_separator: char,
    /// Character used in the GFM delimiter row (`---`, `:--`, ...).
    pub header_separator_char: char,
    /// Whether rendered tables require a leading/trailing `|` on each row.
    pub require_outer_pipes: bool,
    /// Whether cell text is trimmed of surrounding whitespace on read.
    pub strip_whitespace: bool,
}

impl Config {
    /// Build a config with the given root marker and every other field defaulted.
    pub fn with_root_marker(root_marker: impl Into<String>) -> Self {
        Self {
            root_marker: root_marker.into(),
            ..Self::default()
        }
    }

    /// The `"# Tables"` entry-path default (spec §6.1).
    pub fn tables_default() -> Self {
        Self::with_root_marker("# Tables")
    }

    /// The `"# Workbook"` entry-path default (spec §6.1).
    pub fn workbook_default() -> Self {
        Self::with_root_marker("# Workbook")
    }

    /// Derive the root marker from a parsed Workbook's `name`, per spec §4.2:
    /// `"# " + name` when a name is available, otherwise this config's own marker.
    pub fn root_marker_for(&self, workbook_name: Option<&str>) -> String {
        match workbook_name {
            Some(name) if !name.is_empty() => format!("# {name}"),
            _ => self.root_marker.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_marker: "# Tables".to_string(),
            sheet_header_level: 2,
            table_header_level: 3,
            capture_description: false,
            column_separator: '|',
            header_separator_char: '-',
            require_outer_pipes: true,
            strip_whitespace: false,
        }
    }
}
