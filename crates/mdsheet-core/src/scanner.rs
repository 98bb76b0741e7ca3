//! The structural line scanner (spec §4.1).
//!
//! Every mutating operation in this crate ultimately measures itself in line
//! numbers into the raw Markdown text, so this module is the one piece of shared
//! ground truth: it is the only place that decides what counts as a heading and
//! tracks fenced-code-block state. `region.rs` and `structure.rs` are thin callers
//! on top of it.

/// Split `text` into lines at `\n`. No CRLF normalization: a line ending in `\r`
/// keeps its trailing `\r` as part of the line's content.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n').collect()
}

/// Does this line flip fenced-code-block state? (Its *trimmed* text starts with
/// three backticks.)
pub fn is_fence_toggle(line: &str) -> bool {
    line.trim_start().starts_with("```")
}

/// The heading level of `line` (the run length of leading `#`), if it is a heading:
/// `line` must start with one or more `#` immediately followed by a space. Code
/// block state is the caller's concern (see [`scan_headings`]).
pub fn heading_level(line: &str) -> Option<usize> {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    if hashes == 0 {
        return None;
    }
    if line.as_bytes().get(hashes) == Some(&b' ') {
        Some(hashes)
    } else {
        None
    }
}

/// Is `line` a level-1 heading? Requires `heading_level(line) == Some(1)` *and*
/// that the line does not start with `"## "` — a belt-and-suspenders guard against
/// the shared-prefix check spec §4.1 calls out explicitly, even though a line
/// matching `heading_level == Some(1)` can never start with two hashes.
pub fn is_level1_heading(line: &str) -> bool {
    heading_level(line) == Some(1) && !line.starts_with("## ")
}

/// A heading found by a full-text, fence-aware scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// 0-based line number.
    pub line: usize,
    /// Heading level (`#` run length).
    pub level: usize,
    /// The raw line text (including the leading `#`s).
    pub text: String,
}

impl Heading {
    /// The heading's title: the line with its leading `"#"*level + " "` stripped.
    pub fn title(&self) -> &str {
        let prefix_len = self.level + 1; // hashes + the mandatory space
        self.text.get(prefix_len..).unwrap_or("")
    }
}

/// Scan every line of `lines` and return every heading outside fenced code blocks,
/// in file order. Never interprets a line inside a fence as a heading; never reads
/// past the end of `lines`.
pub fn scan_headings(lines: &[&str]) -> Vec<Heading> {
    let mut in_code_block = false;
    let mut out = Vec::new();
    for (i, &line) in lines.iter().enumerate() {
        if is_fence_toggle(line) {
            in_code_block = !in_code_block;
            continue;
        }
        if in_code_block {
            continue;
        }
        if let Some(level) = heading_level(line) {
            out.push(Heading {
                line: i,
                level,
                text: line.to_string(),
            });
        }
    }
    out
}

/// Find the first line (outside code blocks) whose trimmed text exactly equals
/// `marker`. Returns `None` if there is no such line.
pub fn find_marker_line(lines: &[&str], marker: &str) -> Option<usize> {
    let mut in_code_block = false;
    for (i, &line) in lines.iter().enumerate() {
        if is_fence_toggle(line) {
            in_code_block = !in_code_block;
            continue;
        }
        if in_code_block {
            continue;
        }
        if line.trim() == marker {
            return Some(i);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_lines_one_split_per_newline() {
        assert_eq!(split_lines("a\nb\nc"), vec!["a", "b", "c"]);
        assert_eq!(split_lines(""), vec![""]);
        assert_eq!(split_lines("a\n"), vec!["a", ""]);
    }

    #[test]
    fn heading_level_requires_trailing_space() {
        assert_eq!(heading_level("# Title"), Some(1));
        assert_eq!(heading_level("## Title"), Some(2));
        assert_eq!(heading_level("###Title"), None);
        assert_eq!(heading_level("Title"), None);
        assert_eq!(heading_level("#"), None);
    }

    #[test]
    fn fenced_code_blocks_hide_headings() {
        let text = "# Real\n```\n# Fake\n```\n## Also Real";
        let lines = split_lines(text);
        let headings = scan_headings(&lines);
        assert_eq!(headings.len(), 2);
        assert_eq!(headings[0].line, 0);
        assert_eq!(headings[1].line, 4);
    }

    #[test]
    fn never_reads_past_input() {
        let lines = split_lines("# Only line");
        let headings = scan_headings(&lines);
        assert_eq!(headings.len(), 1);
        assert_eq!(headings[0].title(), "Only line");
    }

    #[test]
    fn fence_detection_ignores_leading_whitespace() {
        assert!(is_fence_toggle("   ```"));
        assert!(!is_fence_toggle("not a fence"));
    }

    #[test]
    fn find_marker_line_skips_code_blocks() {
        let text = "```\n# Tables\n```\n# Tables\n";
        let lines = split_lines(text);
        assert_eq!(find_marker_line(&lines, "# Tables"), Some(3));
    }
}
