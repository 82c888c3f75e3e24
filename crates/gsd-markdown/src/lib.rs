//! GSD Markdown Layer
//!
//! The text boundary between planning documents on disk and the typed
//! records the rest of the workspace works with. Only the handful of shapes
//! the planning documents actually use are understood:
//!
//! - **Field lines**: `**Key:** value` (and `**Key**: value`)
//! - **Headings**: `#`..`######` followed by a title
//! - **Pipe tables**: header row, dash separator row, data rows
//! - **Bullet lists**: `- text`
//! - **Frontmatter**: a `---` delimited key/value block on the first lines
//!
//! Every rule works on byte offsets into the original text so callers can
//! splice edits without touching anything outside the span they target.
//!
//! # Architecture
//!
//! ```text
//! Document text → line_spans → { field rule, heading rule, table rule, bullet rule }
//!                                        ↓
//!                     FieldMap / Section / Vec<TableRow> / Vec<String>
//! ```
//!
//! # Example
//!
//! ```rust
//! use gsd_markdown::{find_section, parse_list, scan_fields, TitleEq};
//!
//! let doc = "# State\n\n**Status:** In progress\n\n## Blockers\n\n- Waiting on API keys\n";
//! let fields = scan_fields(doc);
//! assert_eq!(fields.get("Status"), Some("In progress"));
//!
//! let blockers = find_section(doc, &TitleEq::new("Blockers")).unwrap();
//! assert_eq!(parse_list(blockers.body), vec!["Waiting on API keys".to_string()]);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

// Core modules
pub mod error;
pub mod frontmatter;
pub mod parsers;

// Re-exports for convenience
pub use error::{MarkdownError, Result};
pub use frontmatter::{
    parse_block, render_block, split_frontmatter, with_frontmatter, FrontmatterBlock,
    FrontmatterValue,
};
pub use parsers::fields::{field_lines, scan_fields, FieldLine, FieldMap, FieldScanner};
pub use parsers::list::{bullet_lines, parse_list, BulletLine, ListParser};
pub use parsers::section::{
    find_section, find_sections, headings, locate, Heading, Located, Section, TitleEq, TitleMatcher,
    TitlePrefix,
};
pub use parsers::table::{parse_table, TableParser, TableRow};
pub use parsers::{line_spans, newline_style, BodyParser, LineSpan};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with planning documents
    pub use crate::parsers::{BodyParser, FieldScanner, ListParser, TableParser};
    pub use crate::{
        find_section, locate, scan_fields, FieldMap, Located, Section, TitleEq, TitleMatcher,
        TitlePrefix,
    };
}
