//! Workbook regeneration (spec §4.8): turn an in-memory [`Workbook`] back into
//! Markdown and splice it into the file at the right place.

use crate::codec::WorkbookCodec;
use crate::config::Config;
use crate::model::Workbook;
use crate::region::{file_structure, workbook_range};
use crate::scanner::split_lines;
use crate::tab_order::is_metadata_required;

/// Render `workbook` and splice it into `text`, replacing the current Workbook
/// region (or appending a new one, blank-line separated, if the file has none
/// yet). Returns the new full text and the `[start, end)` line range the
/// rendered Workbook now occupies.
///
/// Before rendering, prunes `workbook.metadata.tab_order` back to `None` if it
/// turns out to equal natural order (spec §4.8 step 1) — every caller that
/// built a `tab_order` gets this check for free rather than having to remember
/// it themselves.
pub fn generate_and_get_range(
    text: &str,
    workbook: &Workbook,
    config: &Config,
    codec: &dyn WorkbookCodec,
) -> (String, (usize, usize)) {
    let root_marker = config.root_marker_for(Some(&workbook.name));
    let mut wb = workbook.clone();

    let structure = file_structure(text, &root_marker, wb.sheets.len());
    if let Some(order) = wb.metadata.tab_order.clone() {
        if !is_metadata_required(&order, &structure) {
            wb.metadata.tab_order = None;
        }
    }

    let rendered = codec.to_markdown(&wb, config);

    if !structure.has_workbook {
        return append_at_end(text, &rendered);
    }

    let (start, end) = workbook_range(text, &root_marker, config.sheet_header_level);
    let lines = split_lines(text);
    let rendered_lines: Vec<&str> = split_lines(&rendered);

    let mut out: Vec<&str> = Vec::with_capacity(lines.len() + rendered_lines.len());
    out.extend_from_slice(&lines[..start.min(lines.len())]);
    let new_start = out.len();
    out.extend_from_slice(&rendered_lines);
    let new_end = out.len();
    out.extend_from_slice(&lines[end.min(lines.len())..]);

    (out.join("\n"), (new_start, new_end))
}

/// Append `rendered` as a new trailing block, blank-line separated from any
/// existing content, with a single trailing newline overall.
fn append_at_end(text: &str, rendered: &str) -> (String, (usize, usize)) {
    let existing = text.trim_end_matches('\n');
    let mut blocks: Vec<&str> = Vec::new();
    if !existing.is_empty() {
        blocks.push(existing);
    }
    let start = if blocks.is_empty() {
        0
    } else {
        split_lines(blocks[0]).len() + 1
    };
    blocks.push(rendered.trim_end_matches('\n'));
    let joined = format!("{}\n", blocks.join("\n\n"));
    let end = split_lines(&joined).len() - 1;
    (joined, (start, end))
}
