//! The structure extractor (spec §4.3): a flat, file-order walk of every
//! top-level region in the file.

use crate::model::Section;
use crate::scanner::{scan_headings, split_lines};

/// Walk `text` once and emit a flat sequence of [`Section`]s in file order: the
/// Workbook marker heading becomes `Section::Workbook` (its content is not
/// captured here — see [`crate::context::WorkbookContext`]); every other level-1
/// heading becomes a `Section::Document` whose `content` runs until the next
/// level-1 heading or EOF.
pub fn extract_structure(text: &str, root_marker: &str) -> Vec<Section> {
    let lines = split_lines(text);
    let level1: Vec<_> = scan_headings(&lines)
        .into_iter()
        .filter(|h| h.level == 1)
        .collect();

    let mut sections = Vec::with_capacity(level1.len());
    for (i, heading) in level1.iter().enumerate() {
        if heading.text.trim() == root_marker {
            sections.push(Section::Workbook);
            continue;
        }
        let end = level1.get(i + 1).map(|h| h.line).unwrap_or(lines.len());
        let content = lines[(heading.line + 1).min(lines.len())..end.min(lines.len())].join("\n");
        sections.push(Section::Document {
            title: heading.title().to_string(),
            content,
        });
    }
    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_d_structure_order() {
        let text = "# D1\n\n# Tables\n\n## S1\n\n## S2\n\n# D2\n";
        let sections = extract_structure(text, "# Tables");
        assert_eq!(sections.len(), 3);
        assert_eq!(
            sections[0],
            Section::Document {
                title: "D1".to_string(),
                content: "".to_string(),
            }
        );
        assert_eq!(sections[1], Section::Workbook);
        match &sections[2] {
            Section::Document { title, .. } => assert_eq!(title, "D2"),
            _ => panic!("expected Document"),
        }
    }

    #[test]
    fn document_content_excludes_following_heading() {
        let text = "# D1\nline one\nline two\n# D2\nbody\n";
        let sections = extract_structure(text, "# Tables");
        assert_eq!(
            sections[0],
            Section::Document {
                title: "D1".to_string(),
                content: "line one\nline two".to_string(),
            }
        );
        assert_eq!(
            sections[1],
            Section::Document {
                title: "D2".to_string(),
                content: "body".to_string(),
            }
        );
    }

    #[test]
    fn no_headings_yields_empty_structure() {
        assert!(extract_structure("just text, no headings\n", "# Tables").is_empty());
    }
}
