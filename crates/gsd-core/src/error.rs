//! Error types for GSD Core
//!
//! Only invalid requests are errors. A missing document, a phase that is not
//! in the roadmap, or a malformed roadmap are reported as values in the
//! command payload instead.

use gsd_markdown::MarkdownError;

/// Main core error type
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Phase number is not `N` or `N.M`
    #[error("invalid phase number: '{0}'")]
    InvalidPhaseNumber(String),

    /// A mutation payload was empty after trimming
    #[error("{field} must not be empty")]
    EmptyPayload {
        /// Name of the empty input
        field: &'static str,
    },

    /// A decision summary holding the summary/rationale separator
    #[error("summary must not contain '{separator}'")]
    SeparatorInSummary {
        /// The reserved separator
        separator: &'static str,
    },

    /// A field name that cannot be written as a `**Key:**` label
    #[error("invalid field name: '{0}'")]
    InvalidFieldName(String),

    /// Planning config file is not valid JSON
    #[error("invalid config.json: {0}")]
    Config(#[from] serde_json::Error),

    /// Markdown layer error
    #[error("markdown error: {0}")]
    Markdown(#[from] MarkdownError),
}

impl CoreError {
    /// Create empty payload error
    #[inline]
    #[must_use]
    pub fn empty(field: &'static str) -> Self {
        Self::EmptyPayload { field }
    }
}

/// Result type alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;
