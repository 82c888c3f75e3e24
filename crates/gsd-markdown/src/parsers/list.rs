//! Bullet list parser

use crate::parsers::{line_spans, BodyParser, LineSpan};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

static BULLET_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ \t]*[-*+][ \t]+(.*?)[ \t]*$").expect("bullet line regex"));

/// A matched bullet line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulletLine<'a> {
    /// Bullet text, trimmed
    pub text: &'a str,
    /// The whole line
    pub line: LineSpan<'a>,
}

impl BulletLine<'_> {
    /// Byte range of the line, terminator included
    #[inline]
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.line.start..self.line.end
    }
}

/// Match a single line against the bullet rule
#[must_use]
pub fn match_bullet(line: LineSpan<'_>) -> Option<BulletLine<'_>> {
    let caps = BULLET_LINE.captures(line.text)?;
    let text = caps.get(1)?.as_str();
    if text.is_empty() {
        return None;
    }
    Some(BulletLine { text, line })
}

/// Every bullet line of `body`, with positions
pub fn bullet_lines(body: &str) -> Vec<BulletLine<'_>> {
    line_spans(body).filter_map(match_bullet).collect()
}

/// Bullet texts of `body`, in order, verbatim apart from surrounding whitespace
#[must_use]
pub fn parse_list(body: &str) -> Vec<String> {
    bullet_lines(body)
        .into_iter()
        .map(|b| b.text.to_string())
        .collect()
}

/// [`BodyParser`] adapter for the bullet rule
#[derive(Debug, Clone, Copy, Default)]
pub struct ListParser;

impl BodyParser for ListParser {
    type Output = Vec<String>;

    fn parse(&self, body: &str) -> Vec<String> {
        parse_list(body)
    }
}
