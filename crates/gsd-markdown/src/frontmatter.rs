//! Frontmatter block mechanics
//!
//! A frontmatter block is a `---` line, key/value lines, and a closing `---`
//! line, always at the very top of the document. This module only knows how
//! to find, decode, render and replace such a block; which keys go into it is
//! decided by the caller.

use crate::error::{MarkdownError, Result};
use crate::parsers::{line_spans, newline_style};
use serde::de::DeserializeOwned;
use std::ops::Range;

const DELIMITER: &str = "---";

/// A frontmatter block found at the top of a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontmatterBlock<'a> {
    /// Text between the delimiter lines
    pub raw: &'a str,
    /// Byte range of the whole block, both delimiter lines included
    pub range: Range<usize>,
}

/// Split a document into its frontmatter block (if any) and its body
///
/// A block opened on the first line but never closed is not a block; the
/// whole document is returned as body.
#[must_use]
pub fn split_frontmatter(doc: &str) -> (Option<FrontmatterBlock<'_>>, &str) {
    let mut lines = line_spans(doc);
    let Some(first) = lines.next() else {
        return (None, doc);
    };
    if first.text.trim_end() != DELIMITER {
        return (None, doc);
    }

    match lines.find(|line| line.text.trim_end() == DELIMITER) {
        Some(closing) => (
            Some(FrontmatterBlock {
                raw: &doc[first.end..closing.start],
                range: 0..closing.end,
            }),
            &doc[closing.end..],
        ),
        None => {
            tracing::warn!("frontmatter delimiter on first line is never closed; treating as body");
            (None, doc)
        }
    }
}

/// Decode a frontmatter block into a typed value
///
/// # Errors
/// Returns [`MarkdownError::Frontmatter`] when the block is not valid YAML for
/// `T`, and [`MarkdownError::NotAMapping`] when it is not a mapping at all.
pub fn parse_block<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let shape: serde_yaml::Value = serde_yaml::from_str(raw)?;
    let found = match shape {
        serde_yaml::Value::Mapping(_) => return Ok(serde_yaml::from_str(raw)?),
        serde_yaml::Value::Null => "an empty block",
        serde_yaml::Value::Sequence(_) => "a sequence",
        _ => "a scalar",
    };
    Err(MarkdownError::NotAMapping { found })
}

/// A value written into a frontmatter block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontmatterValue {
    /// Scalar text, written plain unless YAML needs quotes
    Text(String),
    /// Integer
    Int(i64),
    /// Nested mapping, indented two spaces
    Map(Vec<(String, FrontmatterValue)>),
}

impl From<&str> for FrontmatterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FrontmatterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FrontmatterValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

fn needs_quotes(text: &str) -> bool {
    const LEADING: &[char] = &[
        '-', '?', ':', ',', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '\'', '"', '%',
        '@', '`',
    ];
    const NULLS: &[&str] = &["null", "Null", "NULL", "~"];
    text.is_empty()
        || NULLS.contains(&text)
        || text.starts_with(LEADING)
        || text.ends_with(':')
        || text.contains(": ")
        || text.contains(" #")
        || text.contains(['\n', '\r', '\t'])
        || text.trim() != text
}

fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

fn render_entries(out: &mut String, entries: &[(String, FrontmatterValue)], indent: usize, nl: &str) {
    for (key, value) in entries {
        out.push_str(&" ".repeat(indent));
        out.push_str(key);
        out.push(':');
        match value {
            FrontmatterValue::Text(text) if needs_quotes(text) => {
                out.push(' ');
                out.push_str(&quote(text));
            }
            FrontmatterValue::Text(text) => {
                out.push(' ');
                out.push_str(text);
            }
            FrontmatterValue::Int(n) => {
                out.push(' ');
                out.push_str(&n.to_string());
            }
            FrontmatterValue::Map(children) => {
                out.push_str(nl);
                render_entries(out, children, indent + 2, nl);
                continue;
            }
        }
        out.push_str(nl);
    }
}

/// Render an ordered list of entries as a complete block, delimiters included
#[must_use]
pub fn render_block(entries: &[(String, FrontmatterValue)], nl: &str) -> String {
    let mut out = String::new();
    out.push_str(DELIMITER);
    out.push_str(nl);
    render_entries(&mut out, entries, 0, nl);
    out.push_str(DELIMITER);
    out.push_str(nl);
    out
}

/// Replace the document's frontmatter with `block`, or prepend it if absent
///
/// One blank line separates the block from the body. A document that
/// already had a block loses the one blank line written after it, so
/// repeated writes are stable; the rest of the body is kept byte-for-byte.
#[must_use]
pub fn with_frontmatter(doc: &str, block: &str) -> String {
    let body = match split_frontmatter(doc) {
        (Some(_), body) => body
            .strip_prefix("\r\n")
            .or_else(|| body.strip_prefix('\n'))
            .unwrap_or(body),
        (None, body) => body,
    };
    let nl = newline_style(doc);
    let mut out = String::with_capacity(block.len() + nl.len() + body.len());
    out.push_str(block);
    out.push_str(nl);
    out.push_str(body);
    out
}
