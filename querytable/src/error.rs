//! Error types for the querytable build pipeline.
//!
//! Errors are layered the same way the pipeline is:
//!
//! - [`ConfigError`] - Invalid configuration, detected before anything is rendered
//! - [`SourceError`] - The data source failed to produce a row
//! - [`CallbackError`] - A user-supplied callback failed (always fatal)
//! - [`BuildError`] - Top-level error returned by a table build
//!
//! Non-fatal problems are not errors: they are collected as [`BuildWarning`]s
//! and returned next to the built table.
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Boxed error used as the cause of a [`CallbackError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors in the table configuration or in the shape of the data source.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The data source exposes no columns.
    #[error("Data source exposes no columns")]
    NoColumns,

    /// The data source exposes the same column twice.
    #[error("Duplicate column in data source: {0}")]
    DuplicateColumn(String),

    /// Override header list does not line up with the columns.
    #[error("Override headers count mismatch: expected {expected}, got {found}")]
    OverrideHeaderCount { expected: usize, found: usize },

    /// Rename mapping refers to a column the source does not have.
    #[error("Cannot rename unknown column: {0}")]
    UnknownRenameColumn(String),

    /// HTML handling mode is not one of none/strip/escape.
    #[error("Unknown HTML mode '{0}' (expected none, strip or escape)")]
    UnknownHtmlMode(String),

    /// Regular expression failed to compile.
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Rule list is not a list of rule objects.
    #[error("Malformed rule list: {0}")]
    MalformedRules(String),

    /// JSON error while loading a declarative configuration.
    #[error("Config JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error while reading a configuration file.
    #[error("Config IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Data Source Errors
// =============================================================================

/// Errors raised by a data source while fetching.
///
/// End of data is not one of them: sources signal it with `Ok(None)`.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Failed to read the underlying input.
    #[error("Failed to read source: {0}")]
    Io(#[from] std::io::Error),

    /// CSV decoding failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Input has no header row to take column names from.
    #[error("No header row found")]
    NoHeaders,

    /// Field delimiter is not a single-byte character.
    #[error("Invalid delimiter {0:?}: must be a single ASCII character")]
    InvalidDelimiter(char),

    /// Fetching a row failed.
    #[error("Failed to fetch row {row}: {message}")]
    Fetch { row: usize, message: String },
}

// =============================================================================
// Callback Errors
// =============================================================================

/// Failure reported by a user-supplied predicate, observer or transform.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CallbackError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl CallbackError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an underlying error, keeping it as the source.
    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for CallbackError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for CallbackError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

// =============================================================================
// Build Errors (top-level)
// =============================================================================

/// Top-level build error.
///
/// This is the error type returned by [`crate::transform::pipeline::build`].
#[derive(Debug, Error)]
pub enum BuildError {
    /// Configuration rejected before rendering started.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Data source failed mid-build.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// A cell-level callback failed.
    #[error("Callback failed in rule {rule} (row {row}, column '{column}'): {source}")]
    Callback {
        row: usize,
        column: String,
        rule: usize,
        #[source]
        source: CallbackError,
    },

    /// A row-level callback failed.
    #[error("Row callback failed on row {row}: {source}")]
    RowCallback {
        row: usize,
        #[source]
        source: CallbackError,
    },
}

// =============================================================================
// Warnings (non-fatal)
// =============================================================================

/// Which side of a rule a matcher was tested against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchTarget {
    Column,
    Value,
}

impl fmt::Display for MatchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchTarget::Column => f.write_str("column"),
            MatchTarget::Value => f.write_str("value"),
        }
    }
}

/// A misconfigured rule that was skipped for one cell.
///
/// The build still completes; these are returned in
/// [`crate::transform::pipeline::BuildReport::warnings`].
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BuildWarning {
    /// Matcher is a structured value that cannot be matched; treated as no match.
    #[error("rule {rule}: unsupported {target} matcher {matcher} ignored (row {row}, column '{column}')")]
    UnsupportedMatcher {
        rule: usize,
        target: MatchTarget,
        matcher: String,
        row: usize,
        column: String,
    },

    /// Transform is present but cannot be invoked; value passed through.
    #[error("rule {rule}: transform {transform} is not callable, value kept (row {row}, column '{column}')")]
    UncallableTransform {
        rule: usize,
        transform: String,
        row: usize,
        column: String,
    },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for data source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for user callbacks.
pub type CallbackResult<T> = Result<T, CallbackError>;

/// Result type for table builds.
pub type BuildResult<T> = Result<T, BuildError>;
