//! The GFM table parser/generator collaborator (spec §6.2).
//!
//! Spec §1 treats `parseWorkbook`/`toMarkdown` as an opaque external collaborator:
//! "the core consumes it as an opaque collaborator with the contract defined in
//! §6." This module is that contract (the [`WorkbookCodec`] trait) plus the one
//! concrete implementation the crate ships, [`GfmTableCodec`], which understands
//! exactly the pipe-table subset of GFM spec §6.1 describes. A host that already
//! owns a full GFM document parser can implement [`WorkbookCodec`] against it
//! instead without touching any other module in this crate.

use crate::config::Config;
use crate::error::OpError;
use crate::metadata::{
    ArithmeticFormula, ArithmeticFunction, ColumnMeta, FormulaDef, LookupFormula, TableMetadata,
    ValidationKind, ValidationRule, VisualMetadata,
};
use crate::model::{Alignment, Sheet, Table, TabKind, TabOrderItem, Workbook, WorkbookMetadata};
use crate::scanner::{scan_headings, split_lines, Heading};
use regex::Regex;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// The external parser/generator contract (spec §6.2).
pub trait WorkbookCodec {
    /// `parseWorkbook(text, schema) -> Workbook`.
    fn parse(&self, text: &str, config: &Config) -> Result<Workbook, OpError>;
    /// `Workbook.toMarkdown(schema) -> string`.
    fn to_markdown(&self, workbook: &Workbook, config: &Config) -> String;
}

/// The built-in codec: a hand-rolled GFM pipe-table reader/writer plus the
/// `md-spreadsheet-*-metadata:` HTML comment convention spec §6.1 documents for
/// the Workbook. The Workbook-level comment format is spelled out by the spec;
/// this codec extends the same convention, one level down, to per-table metadata
/// (spec §3.1's column-indexed maps have to live *somewhere* in the text, and the
/// spec leaves the exact on-disk shape to the parser collaborator) — see
/// DESIGN.md for this decision.
#[derive(Debug, Clone, Copy, Default)]
pub struct GfmTableCodec;

impl WorkbookCodec for GfmTableCodec {
    fn parse(&self, text: &str, config: &Config) -> Result<Workbook, OpError> {
        parse_workbook(text, config)
    }

    fn to_markdown(&self, workbook: &Workbook, config: &Config) -> String {
        to_markdown(workbook, config)
    }
}

const WORKBOOK_METADATA_KEY: &str = "md-spreadsheet-workbook-metadata:";
const TABLE_METADATA_KEY: &str = "md-spreadsheet-table-metadata:";

fn workbook_metadata_re() -> Regex {
    Regex::new(r"^<!--\s*md-spreadsheet-workbook-metadata:\s*(.*?)\s*-->\s*$").unwrap()
}

fn table_metadata_re() -> Regex {
    Regex::new(r"^<!--\s*md-spreadsheet-table-metadata:\s*(.*?)\s*-->\s*$").unwrap()
}

// ---------------------------------------------------------------------------
// Cell-level pipe escaping (spec §4.4)
// ---------------------------------------------------------------------------

/// Escape `|` characters in `value` for embedding in a pipe-table cell, leaving
/// pipes inside inline code (backtick-delimited) spans untouched, and leaving an
/// already-escaped `\|` alone (spec §4.4 `escapePipe`).
pub fn escape_pipe(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_code = false;
    for c in value.chars() {
        match c {
            '`' => {
                in_code = !in_code;
                out.push(c);
            }
            '|' if !in_code => {
                if out.ends_with('\\') {
                    out.push(c);
                } else {
                    out.push('\\');
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Split a rendered pipe-table row into its cell values. An unescaped `|`
/// outside inline code is a cell boundary; a `\|` outside inline code is kept
/// exactly as written (it stays escaped — cell storage holds the same escaped
/// text [`crate::cell_ops`] wrote, not the unescaped form) so it isn't mistaken
/// for a boundary; a `|` inside inline code is left exactly as written too.
fn split_row_cells(raw: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_code = false;
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '`' => {
                in_code = !in_code;
                current.push(c);
            }
            '\\' if !in_code && chars.peek() == Some(&'|') => {
                current.push('\\');
                current.push('|');
                chars.next();
            }
            '|' if !in_code => {
                cells.push(current.clone());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    cells.push(current);
    cells
}

/// Split and trim a row, dropping the leading/trailing empty cell artifacts of
/// outer pipes (`"| a | b |"` -> `["a", "b"]`).
fn split_row_cells_trimmed(raw: &str) -> Vec<String> {
    let mut cells = split_row_cells(raw.trim());
    if cells.first().is_some_and(|c| c.trim().is_empty()) {
        cells.remove(0);
    }
    if cells.last().is_some_and(|c| c.trim().is_empty()) {
        cells.pop();
    }
    cells.into_iter().map(|c| c.trim().to_string()).collect()
}

fn alignment_delim(a: Alignment) -> &'static str {
    match a {
        Alignment::Left => "---",
        Alignment::Center => ":-:",
        Alignment::Right => "--:",
    }
}

fn parse_alignments(delim_line: &str, col_count: usize) -> Vec<Alignment> {
    let cells = split_row_cells_trimmed(delim_line);
    let mut aligns: Vec<Alignment> = cells
        .iter()
        .map(|c| {
            let left = c.starts_with(':');
            let right = c.ends_with(':');
            match (left, right) {
                (true, true) => Alignment::Center,
                (false, true) => Alignment::Right,
                _ => Alignment::Left,
            }
        })
        .collect();
    aligns.resize(col_count, Alignment::Left);
    aligns
}

fn render_row(cells: &[String], config: &Config) -> String {
    let body = cells
        .iter()
        .map(|c| format!(" {c} "))
        .collect::<Vec<_>>()
        .join(&config.column_separator.to_string());
    if config.require_outer_pipes {
        format!("{sep}{body}{sep}", sep = config.column_separator)
    } else {
        body
    }
}

fn find_header_row_index(lines: &[&str]) -> Option<usize> {
    if lines.len() < 2 {
        return None;
    }
    let delim_re = Regex::new(r"^\|?\s*:?-{1,}:?\s*(\|\s*:?-{1,}:?\s*)*\|?$").unwrap();
    for i in 0..lines.len() - 1 {
        if lines[i].contains('|') && delim_re.is_match(lines[i + 1].trim()) {
            return Some(i);
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Column-indexed metadata <-> JSON
// ---------------------------------------------------------------------------

fn map_to_json<T>(m: &BTreeMap<usize, T>, to_json: fn(&T) -> Value) -> Value {
    let mut obj = Map::new();
    for (k, v) in m {
        obj.insert(k.to_string(), to_json(v));
    }
    Value::Object(obj)
}

fn map_from_json<T>(v: Option<&Value>, from_json: fn(&Value) -> Option<T>) -> BTreeMap<usize, T> {
    let mut out = BTreeMap::new();
    if let Some(Value::Object(obj)) = v {
        for (k, val) in obj {
            if let Ok(idx) = k.parse::<usize>() {
                if let Some(t) = from_json(val) {
                    out.insert(idx, t);
                }
            }
        }
    }
    out
}

fn column_meta_to_json(c: &ColumnMeta) -> Value {
    let mut map = c.extra.clone();
    if let Some(w) = c.width {
        map.insert("width".to_string(), json!(w));
    }
    if let Some(f) = &c.format {
        map.insert("format".to_string(), json!(f));
    }
    if let Some(h) = c.hidden {
        map.insert("hidden".to_string(), json!(h));
    }
    if let Some(t) = &c.column_type {
        map.insert("type".to_string(), json!(t));
    }
    Value::Object(map)
}

fn column_meta_from_json(v: &Value) -> Option<ColumnMeta> {
    let mut extra = v.as_object().cloned().unwrap_or_default();
    let width = extra.remove("width").and_then(|v| v.as_f64());
    let format = extra.remove("format").and_then(|v| v.as_str().map(String::from));
    let hidden = extra.remove("hidden").and_then(|v| v.as_bool());
    let column_type = extra.remove("type").and_then(|v| v.as_str().map(String::from));
    Some(ColumnMeta {
        width,
        format,
        hidden,
        column_type,
        extra,
    })
}

fn validation_kind_str(k: ValidationKind) -> &'static str {
    match k {
        ValidationKind::List => "list",
        ValidationKind::Date => "date",
        ValidationKind::Integer => "integer",
        ValidationKind::Email => "email",
        ValidationKind::Url => "url",
    }
}

fn validation_kind_from_str(s: &str) -> Option<ValidationKind> {
    match s {
        "list" => Some(ValidationKind::List),
        "date" => Some(ValidationKind::Date),
        "integer" => Some(ValidationKind::Integer),
        "email" => Some(ValidationKind::Email),
        "url" => Some(ValidationKind::Url),
        _ => None,
    }
}

fn validation_rule_to_json(r: &ValidationRule) -> Value {
    let mut map = r.options.clone();
    map.insert(
        "kind".to_string(),
        json!(validation_kind_str(r.kind)),
    );
    Value::Object(map)
}

fn validation_rule_from_json(v: &Value) -> Option<ValidationRule> {
    let obj = v.as_object()?;
    let kind = validation_kind_from_str(obj.get("kind")?.as_str()?)?;
    let mut options = obj.clone();
    options.remove("kind");
    Some(ValidationRule { kind, options })
}

fn arithmetic_function_str(f: ArithmeticFunction) -> &'static str {
    match f {
        ArithmeticFunction::Expression => "expression",
        ArithmeticFunction::Sum => "sum",
        ArithmeticFunction::Avg => "avg",
        ArithmeticFunction::Count => "count",
        ArithmeticFunction::Min => "min",
        ArithmeticFunction::Max => "max",
    }
}

fn arithmetic_function_from_str(s: &str) -> Option<ArithmeticFunction> {
    match s {
        "expression" => Some(ArithmeticFunction::Expression),
        "sum" => Some(ArithmeticFunction::Sum),
        "avg" => Some(ArithmeticFunction::Avg),
        "count" => Some(ArithmeticFunction::Count),
        "min" => Some(ArithmeticFunction::Min),
        "max" => Some(ArithmeticFunction::Max),
        _ => None,
    }
}

fn formula_def_to_json(f: &FormulaDef) -> Value {
    match f {
        FormulaDef::Arithmetic(a) => {
            let mut map = Map::new();
            map.insert("formulaType".to_string(), json!("arithmetic"));
            if let Some(ft) = a.function_type {
                map.insert(
                    "functionType".to_string(),
                    json!(arithmetic_function_str(ft)),
                );
            }
            if let Some(e) = &a.expression {
                map.insert("expression".to_string(), json!(e));
            }
            if let Some(c) = &a.columns {
                map.insert("columns".to_string(), json!(c));
            }
            if let Some(id) = a.source_table_id {
                map.insert("sourceTableId".to_string(), json!(id));
            }
            Value::Object(map)
        }
        FormulaDef::Lookup(l) => {
            json!({
                "formulaType": "lookup",
                "sourceTableId": l.source_table_id,
                "joinKeyLocal": l.join_key_local,
                "joinKeyRemote": l.join_key_remote,
                "targetField": l.target_field,
            })
        }
    }
}

fn formula_def_from_json(v: &Value) -> Option<FormulaDef> {
    let obj = v.as_object()?;
    match obj.get("formulaType")?.as_str()? {
        "arithmetic" => Some(FormulaDef::Arithmetic(ArithmeticFormula {
            function_type: obj
                .get("functionType")
                .and_then(|v| v.as_str())
                .and_then(arithmetic_function_from_str),
            expression: obj.get("expression").and_then(|v| v.as_str().map(String::from)),
            columns: obj.get("columns").and_then(|v| v.as_array()).map(|a| {
                a.iter()
                    .filter_map(|x| x.as_str().map(String::from))
                    .collect()
            }),
            source_table_id: obj.get("sourceTableId").and_then(|v| v.as_i64()),
        })),
        "lookup" => Some(FormulaDef::Lookup(LookupFormula {
            source_table_id: obj.get("sourceTableId")?.as_i64()?,
            join_key_local: obj.get("joinKeyLocal")?.as_str()?.to_string(),
            join_key_remote: obj.get("joinKeyRemote")?.as_str()?.to_string(),
            target_field: obj.get("targetField")?.as_str()?.to_string(),
        })),
        _ => None,
    }
}

fn table_metadata_to_json(meta: &TableMetadata) -> Value {
    let mut top = meta.extra.clone();
    if !meta.legacy_validation.is_empty() {
        top.insert(
            "validation".to_string(),
            map_to_json(&meta.legacy_validation, validation_rule_to_json),
        );
    }
    if !meta.visual.is_empty() {
        let mut visual = meta.visual.extra.clone();
        if let Some(id) = meta.visual.id {
            visual.insert("id".to_string(), json!(id));
        }
        if !meta.visual.columns.is_empty() {
            visual.insert(
                "columns".to_string(),
                map_to_json(&meta.visual.columns, column_meta_to_json),
            );
        }
        if !meta.visual.validation.is_empty() {
            visual.insert(
                "validation".to_string(),
                map_to_json(&meta.visual.validation, validation_rule_to_json),
            );
        }
        if !meta.visual.filters.is_empty() {
            let filters: Map<String, Value> = meta
                .visual
                .filters
                .iter()
                .map(|(k, v)| (k.to_string(), json!(v)))
                .collect();
            visual.insert("filters".to_string(), Value::Object(filters));
        }
        if !meta.visual.formulas.is_empty() {
            visual.insert(
                "formulas".to_string(),
                map_to_json(&meta.visual.formulas, formula_def_to_json),
            );
        }
        top.insert("visual".to_string(), Value::Object(visual));
    }
    Value::Object(top)
}

fn table_metadata_from_json(v: Value) -> TableMetadata {
    let mut top = match v {
        Value::Object(o) => o,
        _ => Map::new(),
    };
    let legacy_validation = map_from_json(top.get("validation"), validation_rule_from_json);
    top.remove("validation");

    let mut visual = VisualMetadata::default();
    if let Some(Value::Object(mut vobj)) = top.remove("visual") {
        visual.id = vobj.remove("id").and_then(|v| v.as_i64());
        visual.columns = map_from_json(vobj.get("columns"), column_meta_from_json);
        visual.validation = map_from_json(vobj.get("validation"), validation_rule_from_json);
        visual.filters = map_from_json(vobj.get("filters"), |v| {
            v.as_array().map(|a| {
                a.iter()
                    .filter_map(|x| x.as_str().map(String::from))
                    .collect()
            })
        });
        visual.formulas = map_from_json(vobj.get("formulas"), formula_def_from_json);
        vobj.remove("columns");
        vobj.remove("validation");
        vobj.remove("filters");
        vobj.remove("formulas");
        visual.extra = vobj;
    }

    TableMetadata {
        visual,
        legacy_validation,
        extra: top,
    }
}

fn workbook_metadata_to_json(meta: &WorkbookMetadata) -> Option<Value> {
    if meta.is_empty() {
        return None;
    }
    let mut map = meta.extra.clone();
    if let Some(order) = &meta.tab_order {
        let arr: Vec<Value> = order
            .iter()
            .map(|item| {
                json!({
                    "kind": match item.kind {
                        TabKind::Sheet => "sheet",
                        TabKind::Document => "document",
                    },
                    "index": item.index,
                })
            })
            .collect();
        map.insert("tab_order".to_string(), Value::Array(arr));
    }
    Some(Value::Object(map))
}

fn workbook_metadata_from_json(value: Value) -> WorkbookMetadata {
    let mut extra = match value {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    let tab_order = extra.remove("tab_order").and_then(|v| v.as_array().cloned()).map(|arr| {
        arr.into_iter()
            .filter_map(|item| {
                let obj = item.as_object()?;
                let kind = match obj.get("kind")?.as_str()? {
                    "sheet" => TabKind::Sheet,
                    "document" => TabKind::Document,
                    _ => return None,
                };
                let index = obj.get("index")?.as_u64()? as usize;
                Some(TabOrderItem { kind, index })
            })
            .collect()
    });
    WorkbookMetadata { tab_order, extra }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

fn parse_table(lines: &[&str], heading: &Heading, end: usize, config: &Config) -> Table {
    let body = &lines[(heading.line + 1).min(lines.len())..end.min(lines.len())];
    let meta_re = table_metadata_re();

    let mut metadata = TableMetadata::default();
    let mut content_lines: Vec<&str> = Vec::new();
    for line in body {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(caps) = meta_re.captures(trimmed) {
            if let Ok(v) = serde_json::from_str::<Value>(&caps[1]) {
                metadata = table_metadata_from_json(v);
            }
            continue;
        }
        content_lines.push(line);
    }

    let name = heading.title().trim().to_string();
    let header_idx = find_header_row_index(&content_lines);
    let (description, header_idx) = match header_idx {
        Some(h) => {
            let text = content_lines[..h]
                .iter()
                .map(|l| l.trim())
                .collect::<Vec<_>>()
                .join("\n");
            let desc = if config.capture_description && !text.is_empty() {
                Some(text)
            } else {
                None
            };
            (desc, h)
        }
        None => (None, content_lines.len()),
    };

    if header_idx >= content_lines.len() {
        return Table {
            name,
            description,
            headers: Vec::new(),
            alignments: Vec::new(),
            rows: Vec::new(),
            metadata,
        };
    }

    let headers = split_row_cells_trimmed(content_lines[header_idx]);
    let alignments = parse_alignments(
        content_lines.get(header_idx + 1).copied().unwrap_or(""),
        headers.len(),
    );
    let rows = content_lines[(header_idx + 2).min(content_lines.len())..]
        .iter()
        .map(|line| split_row_cells_trimmed(line))
        .collect();

    Table {
        name,
        description,
        headers,
        alignments,
        rows,
        metadata,
    }
}

/// `parseWorkbook(text, schema) -> Workbook` (spec §6.2).
pub fn parse_workbook(text: &str, config: &Config) -> Result<Workbook, OpError> {
    let lines = split_lines(text);
    let (wb_start, wb_end) = crate::region::workbook_range(text, &config.root_marker, config.sheet_header_level);

    if wb_start >= lines.len() {
        let name = config
            .root_marker
            .trim_start_matches('#')
            .trim()
            .to_string();
        return Ok(Workbook::empty(name));
    }

    let name = lines[wb_start].trim_start_matches('#').trim().to_string();
    let headings = scan_headings(&lines);

    let sheet_headings: Vec<&Heading> = headings
        .iter()
        .filter(|h| h.level == config.sheet_header_level && h.line > wb_start && h.line < wb_end)
        .collect();

    let preamble_end = sheet_headings.first().map(|h| h.line).unwrap_or(wb_end);
    let preamble = &lines[(wb_start + 1).min(lines.len())..preamble_end.min(lines.len())];

    let meta_re = workbook_metadata_re();
    let mut metadata = WorkbookMetadata::default();
    let mut root_lines: Vec<&str> = Vec::new();
    for line in preamble {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(caps) = meta_re.captures(trimmed) {
            if let Ok(v) = serde_json::from_str::<Value>(&caps[1]) {
                metadata = workbook_metadata_from_json(v);
            }
            continue;
        }
        root_lines.push(line);
    }
    let root_content = {
        let joined = root_lines.join("\n");
        let trimmed = joined.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    };

    let mut sheets = Vec::with_capacity(sheet_headings.len());
    for (i, sh) in sheet_headings.iter().enumerate() {
        let sheet_end = sheet_headings.get(i + 1).map(|h| h.line).unwrap_or(wb_end);
        let table_headings: Vec<&Heading> = headings
            .iter()
            .filter(|h| {
                h.level == config.table_header_level && h.line > sh.line && h.line < sheet_end
            })
            .collect();
        let mut tables = Vec::with_capacity(table_headings.len());
        for (j, th) in table_headings.iter().enumerate() {
            let table_end = table_headings.get(j + 1).map(|h| h.line).unwrap_or(sheet_end);
            tables.push(parse_table(&lines, th, table_end, config));
        }
        sheets.push(Sheet {
            name: sh.title().trim().to_string(),
            tables,
            metadata: Map::new(),
        });
    }

    Ok(Workbook {
        name,
        root_content,
        sheets,
        metadata,
    })
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

fn join_blocks(blocks: Vec<String>) -> String {
    blocks
        .into_iter()
        .filter(|b| !b.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_table_block(table: &Table, config: &Config) -> String {
    let mut blocks = Vec::new();
    blocks.push(format!(
        "{} {}",
        "#".repeat(config.table_header_level),
        table.name
    ));
    if config.capture_description {
        if let Some(d) = &table.description {
            if !d.trim().is_empty() {
                blocks.push(d.trim().to_string());
            }
        }
    }
    if !table.metadata.is_empty() {
        blocks.push(format!(
            "<!-- {TABLE_METADATA_KEY} {} -->",
            table_metadata_to_json(&table.metadata)
        ));
    }

    let mut rows = Vec::with_capacity(table.rows.len() + 2);
    let headers: Vec<String> = table.headers.iter().map(|h| escape_pipe(h)).collect();
    rows.push(render_row(&headers, config));
    let delims: Vec<String> = (0..table.col_count())
        .map(|c| alignment_delim(table.alignment(c)).to_string())
        .collect();
    rows.push(render_row(&delims, config));
    // Cell values are already pipe-escaped at storage time (see
    // `crate::cell_ops::update_cell`/`paste_cells`); rendering writes them
    // verbatim instead of escaping again.
    for row in table.padded_rows() {
        rows.push(render_row(&row, config));
    }
    blocks.push(rows.join("\n"));

    join_blocks(blocks)
}

/// `Workbook.toMarkdown(schema) -> string` (spec §6.2). Renders only the Workbook
/// region's Markdown, including the metadata comment when non-empty; it does not
/// know about Document regions or the rest of the file.
pub fn to_markdown(workbook: &Workbook, config: &Config) -> String {
    let mut blocks = Vec::new();
    blocks.push(format!("# {}", workbook.name));
    if let Some(meta_json) = workbook_metadata_to_json(&workbook.metadata) {
        blocks.push(format!("<!-- {WORKBOOK_METADATA_KEY} {meta_json} -->"));
    }
    if let Some(content) = &workbook.root_content {
        if !content.trim().is_empty() {
            blocks.push(content.trim().to_string());
        }
    }
    for sheet in &workbook.sheets {
        blocks.push(format!(
            "{} {}",
            "#".repeat(config.sheet_header_level),
            sheet.name
        ));
        for table in &sheet.tables {
            blocks.push(render_table_block(table, config));
        }
    }
    format!("{}\n", join_blocks(blocks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::ColumnMeta;

    #[test]
    fn scenario_c_pipe_escape_round_trips() {
        let escaped = escape_pipe("a|b `c|d` e|f");
        assert_eq!(escaped, "a\\|b `c|d` e\\|f");
        // Splitting a rendered row recovers the same escaped text that was
        // stored — it does not unescape back to the raw value.
        let cells = split_row_cells_trimmed(&format!("| {escaped} |"));
        assert_eq!(cells, vec![escaped]);
    }

    #[test]
    fn round_trip_simple_workbook() {
        let config = Config::tables_default();
        let mut wb = Workbook::empty("Tables");
        wb.sheets.push(Sheet::empty("Sheet 1", vec!["A".into(), "B".into()]));
        wb.sheets[0].tables[0].rows = vec![vec!["1".into(), "2".into()]];

        let md = to_markdown(&wb, &config);
        let parsed = parse_workbook(&md, &config).unwrap();

        assert_eq!(parsed.name, "Tables");
        assert_eq!(parsed.sheets.len(), 1);
        assert_eq!(parsed.sheets[0].name, "Sheet 1");
        assert_eq!(parsed.sheets[0].tables[0].headers, vec!["A", "B"]);
        assert_eq!(parsed.sheets[0].tables[0].rows, vec![vec!["1", "2"]]);
    }

    #[test]
    fn round_trip_preserves_column_metadata() {
        let config = Config::tables_default();
        let mut wb = Workbook::empty("Tables");
        let mut sheet = Sheet::empty("Sheet 1", vec!["A".into(), "B".into()]);
        sheet.tables[0].metadata.visual.columns.insert(
            1,
            ColumnMeta {
                width: Some(120.0),
                ..Default::default()
            },
        );
        wb.sheets.push(sheet);

        let md = to_markdown(&wb, &config);
        let parsed = parse_workbook(&md, &config).unwrap();
        let width = parsed.sheets[0].tables[0]
            .metadata
            .visual
            .columns
            .get(&1)
            .and_then(|c| c.width);
        assert_eq!(width, Some(120.0));
    }

    #[test]
    fn parse_missing_marker_yields_empty_workbook() {
        let config = Config::tables_default();
        let wb = parse_workbook("# Other\n", &config).unwrap();
        assert_eq!(wb.name, "Tables");
        assert!(wb.sheets.is_empty());
    }

    #[test]
    fn alignment_round_trips() {
        let config = Config::tables_default();
        let mut wb = Workbook::empty("Tables");
        let mut sheet = Sheet::empty("Sheet 1", vec!["A".into(), "B".into(), "C".into()]);
        sheet.tables[0].alignments = vec![Alignment::Left, Alignment::Center, Alignment::Right];
        wb.sheets.push(sheet);

        let md = to_markdown(&wb, &config);
        let parsed = parse_workbook(&md, &config).unwrap();
        assert_eq!(
            parsed.sheets[0].tables[0].alignments,
            vec![Alignment::Left, Alignment::Center, Alignment::Right]
        );
    }
}
