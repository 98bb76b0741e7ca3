//! Region locator (spec §4.2): turns heading scans into the half-open line ranges
//! every mutating operation replaces.

use crate::model::FileStructure;
use crate::scanner::{find_marker_line, scan_headings, split_lines};

/// `getWorkbookRange`: `[start, end)` of the Workbook region.
///
/// `start` is the marker heading's line, or `lines.len()` if the marker isn't
/// found. `end` is the first heading (outside code blocks) with level strictly
/// less than `sheet_header_level`, or `lines.len()`.
pub fn workbook_range(text: &str, root_marker: &str, sheet_header_level: usize) -> (usize, usize) {
    let lines = split_lines(text);
    let start = match find_marker_line(&lines, root_marker) {
        Some(line) => line,
        None => return (lines.len(), lines.len()),
    };

    let headings = scan_headings(&lines);
    let end = headings
        .iter()
        .filter(|h| h.line > start && h.level < sheet_header_level)
        .map(|h| h.line)
        .next()
        .unwrap_or(lines.len());

    (start, end)
}

/// `getDocumentSectionRange`: `[start, end)` of the `section_index`-th Document
/// region (0-based, in file order, excluding the Workbook marker heading).
///
/// Returns `None` (spec's `NotFound`) if `section_index` is out of range.
pub fn document_section_range(
    text: &str,
    section_index: usize,
    root_marker: &str,
) -> Option<(usize, usize)> {
    let lines = split_lines(text);
    let headings = scan_headings(&lines);
    let level1: Vec<_> = headings.iter().filter(|h| h.level == 1).collect();

    let docs: Vec<_> = level1
        .iter()
        .filter(|h| h.text.trim() != root_marker)
        .collect();
    let target = *docs.get(section_index)?;

    let start = target.line;
    let end = level1
        .iter()
        .map(|h| h.line)
        .find(|&line| line > start)
        .unwrap_or(lines.len());

    Some((start, end))
}

/// Derive the file's physical [`FileStructure`] from raw text. `sheet_count` comes
/// from the parsed Workbook model (the number of sheets actually inside the
/// Workbook region), not from re-scanning headings, since a Sheet's boundary
/// semantics are owned by the parser collaborator (spec §6.2), not the scanner.
pub fn file_structure(text: &str, root_marker: &str, sheet_count: usize) -> FileStructure {
    let lines = split_lines(text);
    let headings = scan_headings(&lines);
    let wb_line = find_marker_line(&lines, root_marker);

    let mut docs_before_wb = Vec::new();
    let mut docs_after_wb = Vec::new();
    let mut doc_idx = 0usize;

    for h in headings.iter().filter(|h| h.level == 1) {
        if h.text.trim() == root_marker {
            continue;
        }
        match wb_line {
            Some(wb) if h.line < wb => docs_before_wb.push(doc_idx),
            _ => docs_after_wb.push(doc_idx),
        }
        doc_idx += 1;
    }

    FileStructure {
        docs_before_wb,
        sheets: (0..sheet_count).collect(),
        docs_after_wb,
        has_workbook: wb_line.is_some(),
    }
}
