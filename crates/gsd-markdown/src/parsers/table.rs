//! Pipe table parser
//!
//! Reads the first pipe table of a body:
//!
//! ```text
//! | Phase | Decision | Rationale |
//! |-------|----------|-----------|
//! | 01    | Use $5   | cheaper   |
//! ```
//!
//! Cell text is kept exactly as written apart from surrounding whitespace.
//! An escaped pipe (`\|`) does not split a cell and is kept verbatim.

use crate::parsers::{line_spans, BodyParser};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

static SEPARATOR_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\|?[ \t]*:?-+:?[ \t]*(?:\|[ \t]*:?-+:?[ \t]*)*\|?[ \t]*$")
        .expect("table separator regex")
});

/// One data row keyed by header cell
pub type TableRow = IndexMap<String, String>;

fn is_table_line(line: &str) -> bool {
    line.trim_start().starts_with('|')
}

/// Split a table line into trimmed cells
#[must_use]
pub fn split_cells(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let inner = match inner.strip_suffix('|') {
        Some(rest) if !rest.ends_with('\\') => rest,
        _ => inner,
    };

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut escaped = false;
    for ch in inner.chars() {
        if ch == '|' && !escaped {
            cells.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(ch);
        }
        escaped = ch == '\\' && !escaped;
    }
    cells.push(current.trim().to_string());
    cells
}

/// Parse the first pipe table in `body`
///
/// Returns an empty vector when no header + separator pair is present.
/// Short rows are padded with empty cells; extra cells are dropped.
#[must_use]
pub fn parse_table(body: &str) -> Vec<TableRow> {
    let lines: Vec<_> = line_spans(body).map(|l| l.text).collect();

    let Some(header_idx) = lines.windows(2).position(|pair| {
        is_table_line(pair[0]) && SEPARATOR_ROW.is_match(pair[1].trim())
    }) else {
        return Vec::new();
    };

    let headers = split_cells(lines[header_idx]);
    let rows: Vec<TableRow> = lines[header_idx + 2..]
        .iter()
        .take_while(|line| is_table_line(line))
        .map(|line| {
            let mut cells = split_cells(line).into_iter();
            headers
                .iter()
                .map(|h| (h.clone(), cells.next().unwrap_or_default()))
                .collect()
        })
        .collect();

    tracing::debug!(columns = headers.len(), rows = rows.len(), "parsed table");
    rows
}

/// [`BodyParser`] adapter for the table rule
#[derive(Debug, Clone, Copy, Default)]
pub struct TableParser;

impl BodyParser for TableParser {
    type Output = Vec<TableRow>;

    fn parse(&self, body: &str) -> Vec<TableRow> {
        parse_table(body)
    }
}
