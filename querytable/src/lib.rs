//! # Querytable - render query result sets as HTML tables
//!
//! Querytable takes the rows of an already-executed query and turns them into
//! a table, rewriting cell values through an ordered list of rules on the way.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ DataSource  │────▶│  HTML mode  │────▶│    Rules    │────▶│  TableSink  │
//! │ (rows/CSV)  │     │strip/escape │     │ (in order)  │     │ (HtmlTable) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use querytable::{build_html, Markup, Matcher, MemorySource, Rule, TableConfig};
//! use serde_json::json;
//!
//! let source = MemorySource::from_values(
//!     ["Col1", "Col2"],
//!     vec![vec![json!("R1C1"), json!("R1C2")]],
//! );
//! let config = TableConfig::new().rule(
//!     Rule::for_column(Matcher::pattern("^Col(1|2)$")?).transform(|_, _| json!("RE_T")),
//! );
//!
//! let report = build_html(source, &config)?;
//! assert!(report.table.to_markup().contains("<td>RE_T</td><td>RE_T</td>"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Layered error types and build warnings
//! - [`models`] - Row type and cell text helpers
//! - [`config`] - Build configuration, programmatic and JSON
//! - [`html`] - Strip / escape preprocessing
//! - [`source`] - Data sources (memory, iterator, CSV)
//! - [`transform`] - Matchers, rules, operations and the build pipeline
//! - [`render`] - Table sinks and the bundled HTML renderer

// Core modules
pub mod error;
pub mod models;

// Configuration
pub mod config;

// Cell preprocessing
pub mod html;

// Data sources
pub mod source;

// Transformation
pub mod transform;

// Rendering
pub mod render;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    BoxError,
    BuildError,
    BuildResult,
    BuildWarning,
    CallbackError,
    CallbackResult,
    ConfigError,
    ConfigResult,
    MatchTarget,
    SourceError,
    SourceResult,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{cell_text, Row};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::{example_config, RowCallbackFn, TableConfig};

// =============================================================================
// Re-exports - HTML handling
// =============================================================================

pub use html::HtmlMode;

// =============================================================================
// Re-exports - Data sources
// =============================================================================

pub use source::{CsvSource, DataSource, IterSource, MemorySource};

// =============================================================================
// Re-exports - Rules
// =============================================================================

pub use transform::{
    operations_description,
    Matcher,
    Operation,
    Pattern,
    Rule,
    Transform,
};

// =============================================================================
// Re-exports - Rendering
// =============================================================================

pub use render::{HtmlTable, Markup, TableOptions, TableSink};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    build,
    build_html,
    render_csv,
    render_csv_bytes,
    BuildReport,
};
