//! The tab-reorder executor (spec §4.11): carries out a [`ReorderAction`]
//! against the live file text and the parsed [`Workbook`].
//!
//! Ordering matters here in a way it doesn't for the other operation modules:
//!
//! 1. If the action carries `tab_order` metadata, it is written into the
//!    Workbook *before* any physical move runs, so a crash or early return
//!    mid-sequence still leaves the file's visual order correct via metadata
//!    alone.
//! 2. If the action carries no metadata but the Workbook currently has a
//!    (now-redundant) `tab_order`, it is cleared.
//! 3. A pure [`ReorderAction::Metadata`] stops here — no text outside the
//!    Workbook region changes.
//! 4. Physical changes run in a fixed order: sheets are reordered inside the
//!    Workbook model and the Workbook region is regenerated first; Documents
//!    are then moved into their new relative order; the Workbook block itself
//!    is relocated last, since its target position is expressed in terms of
//!    the *post-reorder* document numbering.
//! 5. Every step re-derives line ranges from the current text rather than
//!    reusing ranges computed before an earlier step — the Workbook region's
//!    own boundaries shift every time a Document in front of it moves.

use crate::classifier::{PhysicalPlan, ReorderAction};
use crate::codec::WorkbookCodec;
use crate::config::Config;
use crate::document_ops::move_workbook_section;
use crate::document_ops::move_range;
use crate::error::OpError;
use crate::generator::generate_and_get_range;
use crate::model::{TabKind, TabOrderItem, Workbook};
use crate::region::document_section_range;
use crate::scanner::split_lines;

/// Run `action` against `text`/`workbook`, returning the new file text and the
/// updated in-memory Workbook.
pub fn execute_reorder(
    text: &str,
    workbook: &Workbook,
    config: &Config,
    codec: &dyn WorkbookCodec,
    action: ReorderAction,
) -> Result<(String, Workbook), OpError> {
    match action {
        ReorderAction::NoOp => Ok((text.to_string(), workbook.clone())),

        ReorderAction::Metadata { tab_order } => {
            let mut wb = workbook.clone();
            wb.metadata.tab_order = Some(tab_order);
            let (new_text, _) = generate_and_get_range(text, &wb, config, codec);
            Ok((new_text, wb))
        }

        ReorderAction::Physical { plan } => {
            let mut wb = workbook.clone();
            if wb.metadata.tab_order.is_some() {
                wb.metadata.tab_order = None;
            }
            let new_text = apply_physical_plan(text, &mut wb, config, codec, &plan)?;
            Ok((new_text, wb))
        }

        ReorderAction::PhysicalAndMetadata { plan, tab_order } => {
            let mut wb = workbook.clone();
            // `tab_order` was computed against the pre-move `wb.sheets` layout,
            // but `apply_physical_plan` below is about to permute it per
            // `plan.sheet_order`. Re-key the Sheet entries through that same
            // permutation before persisting, or the stored order would resolve
            // against stale positions.
            wb.metadata.tab_order = Some(rekey_tab_order_for_plan(tab_order, &plan));
            let new_text = apply_physical_plan(text, &mut wb, config, codec, &plan)?;
            Ok((new_text, wb))
        }
    }
}

/// Translate `tab_order`'s `Sheet` entries from "position in the pre-plan
/// `Workbook.sheets`" to "position after `plan.sheet_order` is applied".
/// `TabOrderItem::sheet(i)` means "position `i` in `Workbook.sheets`" (spec
/// §4.10 / §4.11); `plan.sheet_order[new_pos] == old_index` describes the
/// permutation `apply_physical_plan` is about to perform, so this inverts it
/// to map each old index to its new position. Document entries are untouched.
fn rekey_tab_order_for_plan(tab_order: Vec<TabOrderItem>, plan: &PhysicalPlan) -> Vec<TabOrderItem> {
    let Some(sheet_order) = &plan.sheet_order else {
        return tab_order;
    };
    let mut new_pos_of_old = vec![0usize; sheet_order.len()];
    for (new_pos, &old_index) in sheet_order.iter().enumerate() {
        new_pos_of_old[old_index] = new_pos;
    }
    tab_order
        .into_iter()
        .map(|item| match item.kind {
            TabKind::Sheet => TabOrderItem::sheet(new_pos_of_old[item.index]),
            TabKind::Document => item,
        })
        .collect()
}

fn apply_physical_plan(
    text: &str,
    wb: &mut Workbook,
    config: &Config,
    codec: &dyn WorkbookCodec,
    plan: &PhysicalPlan,
) -> Result<String, OpError> {
    let mut text = text.to_string();

    if let Some(sheet_order) = &plan.sheet_order {
        wb.sheets = sheet_order.iter().map(|&i| wb.sheets[i].clone()).collect();
    }
    // Regenerate unconditionally: even with no sheet reorder, the Workbook
    // region's metadata comment may need to reflect a tab_order write/clear
    // the caller already applied to `wb`.
    let (new_text, _) = generate_and_get_range(&text, wb, config, codec);
    text = new_text;

    if let Some(doc_order) = &plan.doc_order {
        let root_marker = config.root_marker_for(Some(&wb.name));
        text = apply_doc_order(&text, doc_order, &root_marker)?;
    }

    if let Some(target) = plan.workbook_before_doc {
        let root_marker = config.root_marker_for(Some(&wb.name));
        text = move_workbook_section(&text, &root_marker, config.sheet_header_level, target)?;
    }

    Ok(text)
}

/// Rearrange Documents so their physical relative order matches `doc_order`
/// (original natural indices, in target order), via a sequence of single moves.
fn apply_doc_order(text: &str, doc_order: &[usize], root_marker: &str) -> Result<String, OpError> {
    let mut text = text.to_string();
    let mut perm: Vec<usize> = (0..doc_order.len()).collect();

    for (target_pos, &identity) in doc_order.iter().enumerate() {
        let cur_pos = perm
            .iter()
            .position(|&id| id == identity)
            .ok_or(OpError::NotFound { document_index: identity })?;
        if cur_pos == target_pos {
            continue;
        }
        text = move_single_document(&text, cur_pos, target_pos, root_marker)?;
        let value = perm.remove(cur_pos);
        perm.insert(target_pos, value);
    }
    Ok(text)
}

fn move_single_document(text: &str, from_index: usize, to_index: usize, root_marker: &str) -> Result<String, OpError> {
    let (cut_start, cut_end) = document_section_range(text, from_index, root_marker)
        .ok_or(OpError::NotFound { document_index: from_index })?;
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
