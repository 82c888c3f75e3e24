//! Error types for the markdown layer
//!
//! Scanning rules never fail: a line either matches a rule or is ignored.
//! The only fallible step is decoding a frontmatter block into a typed value.

/// Errors raised while decoding planning documents
#[derive(Debug, thiserror::Error)]
pub enum MarkdownError {
    /// Frontmatter block is not valid YAML for the requested shape
    #[error("frontmatter is not valid YAML: {0}")]
    Frontmatter(#[from] serde_yaml::Error),

    /// Frontmatter block decoded to something other than a key/value mapping
    #[error("frontmatter must be a key/value mapping, found {found}")]
    NotAMapping {
        /// Short description of what was found instead
        found: &'static str,
    },
}

/// Result type alias for markdown operations
pub type Result<T> = std::result::Result<T, MarkdownError>;
