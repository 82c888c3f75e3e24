//! Field scanner
//!
//! Extracts bold-label field lines into a [`FieldMap`]. Both colon placements
//! seen in planning documents are accepted:
//!
//! ```text
//! **Total Phases:** 6
//! **Requirements**: CP-01, CP-02
//! ```

use crate::parsers::{line_spans, BodyParser, LineSpan};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::ops::Range;

static FIELD_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\*\*([^*]+?)(?::\*\*|\*\*:)[ \t]*(.*?)[ \t]*$").expect("field line regex")
});

/// Field name → value mapping scanned from a document
///
/// Keys are case-sensitive, exactly as written between the `**` markers.
/// When a label repeats, the later line wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldMap(IndexMap<String, String>);

impl FieldMap {
    /// Create empty map
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw string value of a field
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Integer form of a field (`"45%"` → 45, `"6"` → 6)
    #[must_use]
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(parse_int)
    }

    /// First present field among `keys`
    #[must_use]
    pub fn get_any(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|k| self.get(k))
    }

    /// Insert or overwrite a field
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Whether a field is present
    #[inline]
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of distinct fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no fields were found
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate fields in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Parse the numeric form of a field value, stripping a trailing `%`
#[must_use]
pub fn parse_int(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
    trimmed.parse().ok()
}

/// A matched field line with the position of its value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLine<'a> {
    /// Label between the `**` markers, trimmed
    pub key: &'a str,
    /// Value after the colon, trimmed
    pub value: &'a str,
    /// The whole line
    pub line: LineSpan<'a>,
    /// Byte range of `value` in the scanned text
    pub value_range: Range<usize>,
}

/// Match a single line against the field rule
#[must_use]
pub fn match_field_line(line: LineSpan<'_>) -> Option<FieldLine<'_>> {
    let caps = FIELD_LINE.captures(line.text)?;
    let key = caps.get(1)?.as_str().trim();
    if key.is_empty() {
        return None;
    }
    let value = caps.get(2)?;
    Some(FieldLine {
        key,
        value: value.as_str(),
        line,
        value_range: line.start + value.start()..line.start + value.end(),
    })
}

/// All field lines of `text`, in document order
pub fn field_lines(text: &str) -> Vec<FieldLine<'_>> {
    line_spans(text).filter_map(match_field_line).collect()
}

/// Scan every field line of `text` into a [`FieldMap`]
#[must_use]
pub fn scan_fields(text: &str) -> FieldMap {
    let map: FieldMap = field_lines(text)
        .into_iter()
        .map(|f| (f.key.to_string(), f.value.to_string()))
        .collect();
    tracing::debug!(fields = map.len(), "scanned field lines");
    map
}

/// [`BodyParser`] adapter for the field scanner
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldScanner;

impl BodyParser for FieldScanner {
    type Output = FieldMap;

    fn parse(&self, body: &str) -> FieldMap {
        scan_fields(body)
    }
}
