//! Document-region mutations (spec §4.7).
//!
//! Document regions are never parsed into a model the way the Workbook region
//! is (spec §6.2's parser collaborator only knows about tables): every function
//! here works directly on the raw file text and the line ranges [`crate::region`]
//! computes over it.

use crate::error::OpError;
use crate::region::{document_section_range, workbook_range};
use crate::scanner::split_lines;

/// Cut the `[cut.0, cut.1)` line range out of `text` and splice it back in so it
/// sits immediately before `insert_before_line` (expressed in the *original*
/// line numbering). Shared physical-move primitive for document/Workbook
/// reordering; `crate::executor` uses it for the same reason.
pub(crate) fn move_range(text: &str, cut: (usize, usize), insert_before_line: usize) -> String {
    let lines = split_lines(text);
    let (cut_start, cut_end) = cut;
    let removed: Vec<&str> = lines[cut_start.min(lines.len())..cut_end.min(lines.len())].to_vec();

    let mut remaining: Vec<&str> = Vec::with_capacity(lines.len());
    remaining.extend_from_slice(&lines[..cut_start.min(lines.len())]);
    remaining.extend_from_slice(&lines[cut_end.min(lines.len())..]);

    let insert_at = if insert_before_line <= cut_start {
        insert_before_line
    } else {
        insert_before_line.saturating_sub(cut_end - cut_start)
    };
    let insert_at = insert_at.min(remaining.len());

    let mut result: Vec<&str> = Vec::with_capacity(lines.len());
    result.extend_from_slice(&remaining[..insert_at]);
    result.extend_from_slice(&removed);
    result.extend_from_slice(&remaining[insert_at..]);
    result.join("\n")
}

/// Insert a new Document section (`"# {title}"` + `content`) into `text`,
/// returning the new text and the inserted document's natural index.
///
/// `after_doc_index = None` prepends at line 0 (document index 0, shifting
/// every existing document up by one); `Some(i)` inserts right after Document
/// `i` ends, becoming document index `i + 1` (spec §4.7 `addDocument`). The
/// caller is responsible for repairing any explicit `tab_order` with
/// [`crate::tab_order::repair_for_insert`] — this function only touches text.
pub fn add_document(text: &str, title: &str, content: &str, after_doc_index: Option<usize>, root_marker: &str) -> (String, usize) {
    let mut body = format!("# {title}\n");
    if !content.is_empty() {
        body.push_str(content);
        if !content.ends_with('\n') {
            body.push('\n');
        }
    }

    match after_doc_index {
        None => {
            let mut out = body;
            if !text.is_empty() {
                out.push('\n');
                out.push_str(text);
            }
            (out, 0)
        }
        Some(i) => {
            let lines = split_lines(text);
            let lines_len = lines.len();
            let insert_at = document_section_range(text, i, root_marker)
                .map(|(_, e)| e)
                .unwrap_or(lines_len)
                .min(lines_len);
            let mut out: Vec<String> = Vec::with_capacity(lines_len + 4);
            out.extend(lines[..insert_at].iter().map(|s| s.to_string()));
            out.extend(split_lines(body.trim_end_matches('\n')).iter().map(|s| s.to_string()));
            if insert_at < lines_len {
                out.push(String::new());
            }
            out.extend(lines[insert_at..].iter().map(|s| s.to_string()));
            (out.join("\n"), i + 1)
        }
    }
}

/// Rewrite the heading line of Document `index` to `"# {new_title}"`.
pub fn rename_document(text: &str, index: usize, new_title: &str, root_marker: &str) -> Result<String, OpError> {
    let (start, _) = document_section_range(text, index, root_marker)
        .ok_or(OpError::NotFound { document_index: index })?;
    let mut lines: Vec<String> = split_lines(text).iter().map(|s| s.to_string()).collect();
    lines[start] = format!("# {new_title}");
    Ok(lines.join("\n"))
}

/// Remove Document `index` entirely, heading and body.
pub fn delete_document(text: &str, index: usize, root_marker: &str) -> Result<String, OpError> {
    let (start, end) = document_section_range(text, index, root_marker)
        .ok_or(OpError::NotFound { document_index: index })?;
    let lines = split_lines(text);
    let mut out: Vec<&str> = Vec::with_capacity(lines.len());
    out.extend_from_slice(&lines[..start]);
    out.extend_from_slice(&lines[end..]);
    Ok(out.join("\n"))
}

/// Physically relocate Document `from_index` so it becomes the `to_index`-th
/// Document in file order (document indices span both zones around the
/// Workbook, per [`crate::region::document_section_range`]'s numbering).
pub fn move_document_section(
    text: &str,
    from_index: usize,
    to_index: usize,
    root_marker: &str,
) -> Result<String, OpError> {
    let (cut_start, cut_end) = document_section_range(text, from_index, root_marker)
        .ok_or(OpError::NotFound { document_index: from_index })?;
    if to_index == from_index {
        return Ok(text.to_string());
    }

    let lines_len = split_lines(text).len();
    let insert_before_line = if to_index < from_index {
        document_section_range(text, to_index, root_marker)
            .map(|(s, _)| s)
            .ok_or(OpError::NotFound { document_index: to_index })?
    } else {
        document_section_range(text, to_index, root_marker)
            .map(|(_, e)| e)
            .unwrap_or(lines_len)
    };

    Ok(move_range(text, (cut_start, cut_end), insert_before_line))
}

/// Physically relocate the whole Workbook region so it sits immediately before
/// Document `insert_before_doc_index` (or at end of file when `None`). This is
/// the mechanic behind the classifier's H9/H10 physical-normalization rules
/// (spec §4.10); the classifier decides *when* to call it, this function only
/// knows *how*.
pub fn move_workbook_section(
    text: &str,
    root_marker: &str,
    sheet_header_level: usize,
    insert_before_doc_index: Option<usize>,
) -> Result<String, OpError> {
    let (cut_start, cut_end) = workbook_range(text, root_marker, sheet_header_level);
    let lines_len = split_lines(text).len();
    if cut_start >= lines_len {
        return Err(OpError::MissingWorkbook);
    }

    let insert_before_line = match insert_before_doc_index {
        Some(idx) => document_section_range(text, idx, root_marker)
            .map(|(s, _)| s)
            .ok_or(OpError::NotFound { document_index: idx })?,
        None => lines_len,
    };

    Ok(move_range(text, (cut_start, cut_end), insert_before_line))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_document_with_no_after_index_prepends() {
        let (out, index) = add_document("# D1\n", "Notes", "body", None, "# Tables");
        assert_eq!(index, 0);
        assert!(out.starts_with("# Notes\nbody\n\n# D1"));
    }

    #[test]
    fn add_document_to_empty_file_has_no_leading_blank() {
        let (out, index) = add_document("", "Notes", "body", None, "# Tables");
        assert_eq!(out, "# Notes\nbody\n");
        assert_eq!(index, 0);
    }

    #[test]
    fn scenario_f_add_document_between_two_others() {
        let (out, index) = add_document("# D1\n\n# D2\n", "New", "", Some(0), "# Tables");
        assert_eq!(index, 1);
        let lines = split_lines(&out);
        assert_eq!(lines[0], "# D1");
        assert_eq!(lines[2], "# New");
        assert_eq!(lines[4], "# D2");
    }

    #[test]
    fn scenario_f_rename_then_delete_keeps_remaining_indices_valid() {
        let text = "# D1\n\n# D2\n\n# D3\n";
        let renamed = rename_document(text, 1, "Renamed", "# Tables").unwrap();
        assert!(renamed.contains("# Renamed"));
        let deleted = delete_document(&renamed, 0, "# Tables").unwrap();
        // D1 is gone; the renamed D2 is now document index 0.
        assert!(deleted.starts_with("# Renamed"));
        assert!(deleted.contains("# D3"));
    }

    #[test]
    fn move_document_section_forward_and_backward() {
        let text = "# D1\n\n# D2\n\n# D3\n";
        let forward = move_document_section(text, 0, 2, "# Tables").unwrap();
        let lines = split_lines(&forward);
        assert_eq!(lines[0], "# D2");
        assert_eq!(lines[2], "# D3");
        assert_eq!(lines[4], "# D1");

        let backward = move_document_section(text, 2, 0, "# Tables").unwrap();
        let lines = split_lines(&backward);
        assert_eq!(lines[0], "# D3");
        assert_eq!(lines[2], "# D1");
        assert_eq!(lines[4], "# D2");
    }

    #[test]
    fn move_workbook_section_relocates_whole_region() {
        let text = "# D1\n\n# Tables\n\n## S1\n\n# D2\n";
        let moved = move_workbook_section(&text, "# Tables", 2, None).unwrap();
        let lines = split_lines(&moved);
        assert_eq!(lines[0], "# D1");
        assert_eq!(lines[2], "# D2");
        assert_eq!(lines[4], "# Tables");
        assert_eq!(lines[6], "## S1");
    }
}
