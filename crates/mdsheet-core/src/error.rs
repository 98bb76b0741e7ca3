//! Operation error types (spec §7).
//!
//! Every mutating operation returns `Result<_, OpError>`. There is no retry: a raised
//! error leaves the prior state intact because every transform is built on
//! immutable-value updates (see [`crate::context`]).

use std::fmt;

/// Which kind of index was out of range for an [`OpError::InvalidIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    /// Sheet index into `Workbook.sheets`.
    Sheet,
    /// Table index into `Sheet.tables`.
    Table,
    /// Row index into `Table.rows`.
    Row,
    /// Column index into `Table.headers`.
    Column,
    /// Position index into `tab_order`.
    TabOrder,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IndexKind::Sheet => "sheet",
            IndexKind::Table => "table",
            IndexKind::Row => "row",
            IndexKind::Column => "column",
            IndexKind::TabOrder => "tab order",
        };
        write!(f, "{s}")
    }
}

/// Operation error kinds.
///
/// Propagation policy: operations catch transform failures and surface them here;
/// the classifier (`classifier.rs`) is total and never produces one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpError {
    /// Out-of-range sheet/table/row/column/tab-order index.
    InvalidIndex {
        /// Which kind of index.
        kind: IndexKind,
        /// The offending index.
        index: usize,
        /// The valid length at the time of the check.
        len: usize,
    },
    /// A mutation was attempted when no workbook has been initialized.
    MissingWorkbook,
    /// A document section lookup by index found nothing.
    NotFound {
        /// The requested document index.
        document_index: usize,
    },
    /// The configured [`crate::codec::WorkbookCodec`] failed to parse or render.
    ParseFailure(String),
}

impl fmt::Display for OpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpError::InvalidIndex { kind, index, len } => {
                write!(f, "Invalid {kind} index: {index} (len {len})")
            }
            OpError::NotFound { document_index } => {
                write!(f, "Document section {document_index} not found")
            }
            OpError::MissingWorkbook => write!(f, "No workbook"),
            OpError::ParseFailure(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for OpError {}

/// Convenience alias used throughout the crate's pure-transform modules.
pub type OpResultT<T> = Result<T, OpError>;
