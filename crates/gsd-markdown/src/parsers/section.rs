//! Section locator
//!
//! A section is a heading plus everything up to the next heading of the same
//! or a shallower level. Sections are found by a flat scan; nesting is not
//! modelled, so asking for a `###` title returns its body including any
//! deeper `####` headings inside it.

use crate::parsers::{is_fence, line_spans, BodyParser, LineSpan};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

static HEADING_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(#{1,6})[ \t]+(.*?)(?:[ \t]+#+)?[ \t]*$").expect("heading line regex")
});

/// A heading line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Heading<'a> {
    /// Number of `#` characters (1-6)
    pub level: u8,
    /// Title text, trimmed, without closing `#`s
    pub title: &'a str,
    /// The heading line itself
    pub line: LineSpan<'a>,
}

/// Match a single line against the heading rule
#[must_use]
pub fn match_heading(line: LineSpan<'_>) -> Option<Heading<'_>> {
    let caps = HEADING_LINE.captures(line.text)?;
    let hashes = caps.get(1)?.as_str();
    let title = caps.get(2)?.as_str().trim();
    if title.is_empty() {
        return None;
    }
    Some(Heading {
        level: u8::try_from(hashes.len()).unwrap_or(6),
        title,
        line,
    })
}

/// All headings of `doc` in document order, skipping fenced code blocks
pub fn headings(doc: &str) -> Vec<Heading<'_>> {
    let mut in_fence = false;
    let mut out = Vec::new();
    for line in line_spans(doc) {
        if is_fence(line.text) {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        if let Some(heading) = match_heading(line) {
            out.push(heading);
        }
    }
    out
}

/// Predicate deciding whether a heading title is the one being looked for
pub trait TitleMatcher {
    /// Whether `title` (trimmed, without `#`s) matches
    fn matches(&self, title: &str) -> bool;
}

impl<F> TitleMatcher for F
where
    F: Fn(&str) -> bool,
{
    fn matches(&self, title: &str) -> bool {
        self(title)
    }
}

/// Case-insensitive exact title match
#[derive(Debug, Clone)]
pub struct TitleEq(String);

impl TitleEq {
    /// Match headings titled `title`
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self(title.into())
    }
}

impl TitleMatcher for TitleEq {
    fn matches(&self, title: &str) -> bool {
        title.eq_ignore_ascii_case(&self.0)
    }
}

/// Case-insensitive title prefix match (`Decisions` matches `Decisions Made`)
#[derive(Debug, Clone)]
pub struct TitlePrefix(String);

impl TitlePrefix {
    /// Match headings whose title starts with `prefix`
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self(prefix.into())
    }
}

impl TitleMatcher for TitlePrefix {
    fn matches(&self, title: &str) -> bool {
        title
            .get(..self.0.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(&self.0))
    }
}

/// A located section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<'a> {
    /// Heading title
    pub heading_text: &'a str,
    /// Heading level (1-6)
    pub level: u8,
    /// Text from after the heading line up to the next sibling-or-higher heading
    pub body: &'a str,
    /// Byte range of the heading line, terminator included
    pub heading_range: Range<usize>,
    /// Byte range of `body`
    pub body_range: Range<usize>,
    source: &'a str,
}

impl<'a> Section<'a> {
    /// Heading line plus body, as it appears in the document
    #[inline]
    #[must_use]
    pub fn full_text(&self) -> &'a str {
        &self.source[self.heading_range.start..self.body_range.end]
    }

    /// This section cut short at the first heading inside the body whose
    /// title matches `stop`, whatever that heading's level
    #[must_use]
    pub fn until<M>(self, stop: &M) -> Self
    where
        M: TitleMatcher + ?Sized,
    {
        let Some(cut) = headings(self.body)
            .iter()
            .find(|h| stop.matches(h.title))
            .map(|h| h.line.start)
        else {
            return self;
        };
        let end = self.body_range.start + cut;
        Self {
            body: &self.source[self.body_range.start..end],
            body_range: self.body_range.start..end,
            ..self
        }
    }

    /// Run a body parser over this section
    pub fn parse_with<P: BodyParser>(&self, parser: &P) -> P::Output {
        parser.parse(self.body)
    }
}

/// Outcome of looking a section up in a document that may not exist
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Located<'a> {
    /// The section was found
    Found(Section<'a>),
    /// The document exists but holds no matching heading
    NotFound,
    /// No document was supplied (file absent)
    MissingDocument,
}

impl<'a> Located<'a> {
    /// Section if found
    #[must_use]
    pub fn found(self) -> Option<Section<'a>> {
        match self {
            Self::Found(section) => Some(section),
            Self::NotFound | Self::MissingDocument => None,
        }
    }
}

/// Locate the first section whose heading matches, distinguishing a missing
/// document from a missing heading
pub fn locate<'a, M>(document: Option<&'a str>, matcher: &M) -> Located<'a>
where
    M: TitleMatcher + ?Sized,
{
    let Some(doc) = document else {
        return Located::MissingDocument;
    };
    find_section(doc, matcher).map_or(Located::NotFound, Located::Found)
}

/// First section of `doc` whose heading matches
pub fn find_section<'a, M>(doc: &'a str, matcher: &M) -> Option<Section<'a>>
where
    M: TitleMatcher + ?Sized,
{
    find_sections(doc, matcher).into_iter().next()
}

/// Every section of `doc` whose heading matches, in document order
pub fn find_sections<'a, M>(doc: &'a str, matcher: &M) -> Vec<Section<'a>>
where
    M: TitleMatcher + ?Sized,
{
    let all = headings(doc);
    all.iter()
        .enumerate()
        .filter(|(_, h)| matcher.matches(h.title))
        .map(|(idx, h)| {
            let body_start = h.line.end;
            let body_end = all[idx + 1..]
                .iter()
                .find(|next| next.level <= h.level)
                .map_or(doc.len(), |next| next.line.start);
            Section {
                heading_text: h.title,
                level: h.level,
                body: &doc[body_start..body_end],
                heading_range: h.line.start..h.line.end,
                body_range: body_start..body_end,
                source: doc,
            }
        })
        .collect()
}
