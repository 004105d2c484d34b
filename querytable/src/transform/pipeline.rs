//! High-level build API: data source in, rendered table out.
//!
//! # Example
//!
//! ```rust
//! use querytable::{build_html, Markup, MemorySource, Rule, TableConfig};
//! use serde_json::json;
//!
//! let source = MemorySource::from_values(
//!     ["name", "score"],
//!     vec![vec![json!("alice"), json!(12)], vec![json!("bob"), json!(7)]],
//! );
//! let config = TableConfig::new()
//!     .rename_header("score", "Score")
//!     .rule(Rule::for_column("name").transform(|v, _| json!(v.as_str().unwrap_or("").to_uppercase())));
//!
//! let report = build_html(source, &config)?;
//! assert_eq!(report.row_count, 2);
//! assert!(report.table.to_markup().contains("<td>ALICE</td><td>12</td>"));
//! # Ok::<(), querytable::BuildError>(())
//! ```

use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

use super::row::RowProcessor;
use crate::config::TableConfig;
use crate::error::{BuildError, BuildResult, BuildWarning};
use crate::render::{HtmlTable, TableSink};
use crate::source::{CsvSource, DataSource};

/// Result of a complete table build
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport<T> {
    /// Built table returned by the sink
    pub table: T,

    /// Misconfigured rules skipped along the way
    pub warnings: Vec<BuildWarning>,

    /// Number of data rows emitted
    pub row_count: usize,
}

impl<T> BuildReport<T> {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "Built table with {} rows ({} warnings)",
            self.row_count,
            self.warnings.len()
        )
    }
}

/// Build a table from `source` into `sink`.
///
/// The configuration is validated against the source's columns before the
/// sink sees anything. Then the header row is emitted and rows are pulled
/// one by one until the source reports end of data, each passing through
/// the row callbacks and the rule list before reaching the sink.
///
/// Any error aborts the build and drops the sink.
pub fn build<S, K>(mut source: S, mut sink: K, config: &TableConfig) -> BuildResult<BuildReport<K::Table>>
where
    S: DataSource,
    K: TableSink,
{
    let columns = source.columns().to_vec();
    config.validate(&columns)?;

    for (index, rule) in config.rules.iter().enumerate() {
        if rule.is_inert() {
            debug!("Rule {} has no matcher and never fires", index);
        }
    }

    let labels = config.header_labels(&columns);
    debug!(
        "Building table: {} columns, {} rules, html mode {}",
        columns.len(),
        config.rules.len(),
        config.html_mode
    );
    sink.header_row(labels);

    let processor = RowProcessor::new(&columns, config);
    let mut warnings = Vec::new();
    let mut row_count = 0;

    while let Some(mut row) = source.next_row()? {
        for callback in &config.row_callbacks {
            callback(&mut row).map_err(|err| BuildError::RowCallback {
                row: row_count,
                source: err,
            })?;
        }

        let cells = processor.process(&row, row_count, &mut warnings)?;
        sink.data_row(cells);
        row_count += 1;
    }

    info!(
        "Built table: {} rows, {} warnings",
        row_count,
        warnings.len()
    );

    Ok(BuildReport {
        table: sink.finish(),
        warnings,
        row_count,
    })
}

/// Build with the bundled HTML renderer, using `config.table_options`.
pub fn build_html<S: DataSource>(source: S, config: &TableConfig) -> BuildResult<BuildReport<HtmlTable>> {
    build(source, HtmlTable::new(config.table_options.clone()), config)
}

/// Render a CSV file, detecting encoding and delimiter.
pub fn render_csv(path: impl AsRef<Path>, config: &TableConfig) -> BuildResult<BuildReport<HtmlTable>> {
    let source = CsvSource::open(path)?;
    build_html(source, config)
}

/// Render CSV bytes, detecting encoding and delimiter.
pub fn render_csv_bytes(bytes: &[u8], config: &TableConfig) -> BuildResult<BuildReport<HtmlTable>> {
    let source = CsvSource::from_bytes(bytes)?;
    build_html(source, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CallbackError, ConfigError, SourceError};
    use crate::models::Row;
    use crate::source::{IterSource, MemorySource};
    use crate::transform::rule::Rule;
    use serde_json::{json, Value};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Sink recording every call it receives.
    struct Recorder(Rc<RefCell<Vec<String>>>);

    impl TableSink for Recorder {
        type Table = ();

        fn header_row(&mut self, labels: Vec<String>) {
            self.0.borrow_mut().push(format!("header {}", labels.join(",")));
        }

        fn data_row(&mut self, cells: Vec<Value>) {
            self.0.borrow_mut().push(format!("row {}", Value::Array(cells)));
        }

        fn finish(self) {}
    }

    fn source() -> MemorySource {
        MemorySource::from_values(
            ["Col1", "Col2"],
            vec![
                vec![json!("R1C1"), json!("R1C2")],
                vec![json!("R2C1"), json!("R2C2")],
            ],
        )
    }

    #[test]
    fn test_header_then_rows_in_fetch_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let report = build(source(), Recorder(Rc::clone(&log)), &TableConfig::new()).unwrap();

        assert_eq!(report.row_count, 2);
        assert!(report.is_clean());
        assert_eq!(
            *log.borrow(),
            vec![
                "header Col1,Col2".to_string(),
                r#"row ["R1C1","R1C2"]"#.to_string(),
                r#"row ["R2C1","R2C2"]"#.to_string(),
            ]
        );
    }

    #[test]
    fn test_config_error_leaves_sink_untouched() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let config = TableConfig::new().override_headers(["only one"]);
        let err = build(source(), Recorder(Rc::clone(&log)), &config).unwrap_err();

        assert!(matches!(
            err,
            BuildError::Config(ConfigError::OverrideHeaderCount { expected: 2, found: 1 })
        ));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_rules_match_original_column_names() {
        let config = TableConfig::new()
            .rename_header("Col1", "First")
            .rule(Rule::for_column("Col1").transform(|_, _| json!("hit")))
            .rule(Rule::for_column("First").transform(|_, _| json!("renamed hit")));
        let report = build_html(source(), &config).unwrap();

        assert_eq!(report.table.headers(), ["First", "Col2"]);
        assert_eq!(report.table.rows()[0][0], json!("hit"));
    }

    #[test]
    fn test_row_callbacks_run_before_rules() {
        let config = TableConfig::new()
            .row_callback(|row: &mut Row| {
                row.insert("Col2".into(), json!("patched"));
                Ok(())
            })
            .rule(Rule::for_value("patched").transform(|_, row| json!(format!("{}+", row["Col1"].as_str().unwrap_or("")))));
        let report = build_html(source(), &config).unwrap();

        assert_eq!(report.table.rows()[1], vec![json!("R2C1"), json!("R2C1+")]);
    }

    #[test]
    fn test_row_callback_error_aborts() {
        let config = TableConfig::new().row_callback(|row: &mut Row| {
            if row["Col1"] == json!("R2C1") {
                Err(CallbackError::new("row rejected"))
            } else {
                Ok(())
            }
        });
        let err = build_html(source(), &config).unwrap_err();
        assert!(matches!(err, BuildError::RowCallback { row: 1, .. }));
    }

    #[test]
    fn test_source_error_mid_build() {
        let rows = vec![
            Ok(Row::new()),
            Err(SourceError::Fetch {
                row: 1,
                message: "cursor closed".into(),
            }),
        ];
        let err = build_html(IterSource::new(["a"], rows.into_iter()), &TableConfig::new()).unwrap_err();
        assert!(matches!(err, BuildError::Source(SourceError::Fetch { .. })));
    }

    #[test]
    fn test_warnings_collected_in_report() {
        let config = TableConfig::from_json(r#"{"rules": [{"column": "Col1", "transform": "shout"}]}"#).unwrap();
        let report = build_html(source(), &config).unwrap();

        assert_eq!(report.warnings.len(), 2);
        assert!(!report.is_clean());
        assert_eq!(report.summary(), "Built table with 2 rows (2 warnings)");
        assert_eq!(report.table.rows()[0][0], json!("R1C1"));
    }

    #[test]
    fn test_render_csv_bytes() {
        let report = render_csv_bytes(b"a;b\n1;2\n", &TableConfig::new()).unwrap();
        assert_eq!(report.table.headers(), ["a", "b"]);
        assert_eq!(report.table.rows()[0], vec![json!("1"), json!("2")]);
    }

    #[test]
    fn test_borrowed_source() {
        let mut memory = source();
        let report = build_html(&mut memory, &TableConfig::new()).unwrap();
        assert_eq!(report.row_count, 2);
        assert_eq!(memory.remaining(), 0);
    }
}
