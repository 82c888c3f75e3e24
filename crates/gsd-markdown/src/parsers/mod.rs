//! Line rules for planning documents
//!
//! One rule per construct, each independently testable:
//! - Field lines (`**Key:** value`)
//! - Heading lines and the sections they open
//! - Pipe tables
//! - Bullet lists
//!
//! All rules are driven by [`line_spans`], which keeps the byte offsets of
//! every line so edits can be spliced back into the source.

pub mod fields;
pub mod list;
pub mod section;
pub mod table;

pub use fields::FieldScanner;
pub use list::ListParser;
pub use table::TableParser;

/// Parser trait for turning a section body into a typed value
///
/// Implement this trait to add support for new body shapes.
pub trait BodyParser {
    /// The value this parser produces
    type Output;

    /// Parse a section body (or a whole document)
    fn parse(&self, body: &str) -> Self::Output;
}

/// One line of a document with its position in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan<'a> {
    /// Line content without the `\n` / `\r\n` terminator
    pub text: &'a str,
    /// Byte offset of the first character of the line
    pub start: usize,
    /// Byte offset just past the line terminator (or end of input)
    pub end: usize,
}

impl LineSpan<'_> {
    /// Whether the line ends with a terminator
    #[inline]
    #[must_use]
    pub fn has_newline(&self) -> bool {
        self.end > self.start + self.text.len()
    }

    /// Whether the line holds only whitespace
    #[inline]
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Iterate over the lines of `doc`, tolerating CRLF and a missing final newline
pub fn line_spans(doc: &str) -> impl Iterator<Item = LineSpan<'_>> {
    let mut offset = 0;
    doc.split_inclusive('\n').map(move |raw| {
        let start = offset;
        offset += raw.len();
        let text = raw.strip_suffix('\n').unwrap_or(raw);
        let text = text.strip_suffix('\r').unwrap_or(text);
        LineSpan {
            text,
            start,
            end: offset,
        }
    })
}

/// Line terminator used by `doc` (`"\r\n"` if any line uses it, else `"\n"`)
#[inline]
#[must_use]
pub fn newline_style(doc: &str) -> &'static str {
    if doc.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

/// Whether a line opens or closes a fenced code block
#[inline]
pub(crate) fn is_fence(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}
