//! Rich diagnostic error types for the association facade.
//!
//! Failures that abort a whole query surface as [`GolrError`]. Problems
//! confined to a single result row never abort a query; they are reported
//! as [`RowWarning`]s alongside the translated results.

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

/// Top-level error type for the association facade.
#[derive(Debug, Error, Diagnostic)]
pub enum GolrError {
    #[error("search backend unavailable at {url}: {message}")]
    #[diagnostic(
        code(golr::backend::unavailable),
        help(
            "The Solr endpoint could not be reached, timed out, or answered with a \
             non-success status. Check the endpoint URL in the configuration and \
             that the index is up. Consider raising `timeout_secs` for slow facet queries."
        )
    )]
    BackendUnavailable {
        url: String,
        /// HTTP status when the backend answered, `None` for transport failures.
        status: Option<u16>,
        message: String,
    },

    #[error("malformed response from {url}: {message}")]
    #[diagnostic(
        code(golr::backend::malformed_response),
        help(
            "The backend answered but the body is not a Solr JSON response. \
             Verify the endpoint points at a Solr core (the URL should end in the core path)."
        )
    )]
    MalformedResponse { url: String, message: String },

    #[error("no endpoint named \"{name}\" is configured")]
    #[diagnostic(
        code(golr::backend::unknown_endpoint),
        help("Add an `[endpoints.{name}]` table to the configuration or fix the route that references it.")
    )]
    UnknownEndpoint { name: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

/// Errors from loading or validating a [`GolrConfig`](crate::config::GolrConfig).
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(golr::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}")]
    #[diagnostic(
        code(golr::config::parse),
        help("Check the TOML syntax. {message}")
    )]
    Parse { path: String, message: String },

    #[error("invalid configuration: {message}")]
    #[diagnostic(
        code(golr::config::invalid),
        help("Check the configuration fields. {message}")
    )]
    Invalid { message: String },
}

/// Convenience alias for functions returning facade results.
pub type GolrResult<T> = std::result::Result<T, GolrError>;

/// Classification of a per-row problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowWarningKind {
    /// The row could not be translated, or part of it could not be decoded.
    MalformedDocument,
}

/// A non-fatal problem with a single result row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowWarning {
    /// Zero-based index of the row in the backend response.
    pub row: usize,
    /// Document id, when the row carried one.
    pub doc_id: Option<String>,
    pub kind: RowWarningKind,
    pub message: String,
}

impl RowWarning {
    pub fn malformed(row: usize, doc_id: Option<String>, message: impl Into<String>) -> Self {
        Self {
            row,
            doc_id,
            kind: RowWarningKind::MalformedDocument,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for RowWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.doc_id {
            Some(id) => write!(f, "row {} ({id}): {}", self.row, self.message),
            None => write!(f, "row {}: {}", self.row, self.message),
        }
    }
}
