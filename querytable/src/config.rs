//! Table build configuration.
//!
//! A [`TableConfig`] can be assembled in code with the builder methods, or
//! loaded from a JSON document:
//!
//! ```json
//! {
//!   "html_mode": "escape",
//!   "rename_headers": { "Col1": "First" },
//!   "pad_empty_cells": false,
//!   "table": { "attributes": { "class": "results" }, "caption": "Results" },
//!   "rules": [
//!     { "column": "Col1", "transform": { "type": "uppercase" } },
//!     { "value": { "pattern": "^R2" }, "transform": [
//!         { "type": "replace", "pattern": "\\d", "value": "_T" }
//!     ] }
//!   ]
//! }
//! ```
//!
//! Code-only features (predicates, observers, function transforms and row
//! callbacks) are added on top with the builder after loading.

use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::{CallbackResult, ConfigError, ConfigResult};
use crate::html::HtmlMode;
use crate::models::Row;
use crate::render::TableOptions;
use crate::transform::matcher::Matcher;
use crate::transform::rule::{Rule, Transform};

/// Callback run on every fetched row before its cells are processed.
pub type RowCallbackFn = Arc<dyn Fn(&mut Row) -> CallbackResult<()> + Send + Sync>;

/// Everything one table build needs besides its source and sink.
#[derive(Clone, Default)]
pub struct TableConfig {
    /// Ordered rule list.
    pub rules: Vec<Rule>,
    /// Raw-markup handling applied before rules.
    pub html_mode: HtmlMode,
    /// Replacement labels for every column, in column order.
    pub override_headers: Option<Vec<String>>,
    /// Replacement labels for some columns, keyed by column name.
    pub rename_headers: Option<HashMap<String, String>>,
    /// Emit `&nbsp;` for cells that end up empty.
    pub pad_empty_cells: bool,
    /// Row-level callbacks, in order.
    pub row_callbacks: Vec<RowCallbackFn>,
    /// Options handed to the bundled HTML renderer.
    pub table_options: TableOptions,
}

impl TableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule.
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Append several rules.
    pub fn rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn html_mode(mut self, mode: HtmlMode) -> Self {
        self.html_mode = mode;
        self
    }

    pub fn override_headers<S: Into<String>>(mut self, headers: impl IntoIterator<Item = S>) -> Self {
        self.override_headers = Some(headers.into_iter().map(Into::into).collect());
        self
    }

    pub fn rename_header(mut self, column: impl Into<String>, label: impl Into<String>) -> Self {
        self.rename_headers
            .get_or_insert_with(HashMap::new)
            .insert(column.into(), label.into());
        self
    }

    pub fn pad_empty_cells(mut self, pad: bool) -> Self {
        self.pad_empty_cells = pad;
        self
    }

    pub fn row_callback<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Row) -> CallbackResult<()> + Send + Sync + 'static,
    {
        self.row_callbacks.push(Arc::new(f));
        self
    }

    pub fn table_options(mut self, options: TableOptions) -> Self {
        self.table_options = options;
        self
    }

    /// Parse a declarative configuration from a JSON string.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// Load a declarative configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Build from an already-parsed JSON document.
    pub fn from_value(value: Value) -> ConfigResult<Self> {
        check_rules_shape(&value)?;
        let spec: ConfigSpec = serde_json::from_value(value)?;

        let html_mode = match spec.html_mode.as_deref() {
            Some(mode) => mode.parse()?,
            None => HtmlMode::default(),
        };

        let rules = spec
            .rules
            .into_iter()
            .map(RuleSpec::into_rule)
            .collect::<ConfigResult<Vec<_>>>()?;

        Ok(Self {
            rules,
            html_mode,
            override_headers: spec.override_headers,
            rename_headers: spec.rename_headers,
            pad_empty_cells: spec.pad_empty_cells,
            row_callbacks: Vec::new(),
            table_options: spec.table,
        })
    }

    /// Check the configuration against the source's columns.
    ///
    /// Columns must be present and unique, override headers must cover every
    /// column, and renames must name existing columns.
    pub fn validate(&self, columns: &[String]) -> ConfigResult<()> {
        if columns.is_empty() {
            return Err(ConfigError::NoColumns);
        }

        let mut seen = HashSet::new();
        for column in columns {
            if !seen.insert(column.as_str()) {
                return Err(ConfigError::DuplicateColumn(column.clone()));
            }
        }

        if let Some(headers) = &self.override_headers {
            if headers.len() != columns.len() {
                return Err(ConfigError::OverrideHeaderCount {
                    expected: columns.len(),
                    found: headers.len(),
                });
            }
        }

        if let Some(renames) = &self.rename_headers {
            let mut unknown: Vec<&String> =
                renames.keys().filter(|k| !seen.contains(k.as_str())).collect();
            unknown.sort();
            if let Some(first) = unknown.first() {
                return Err(ConfigError::UnknownRenameColumn((*first).clone()));
            }
        }

        Ok(())
    }

    /// Display labels for `columns`.
    ///
    /// Override headers win outright when present; otherwise renames apply
    /// per column; otherwise the column name is the label.
    pub fn header_labels(&self, columns: &[String]) -> Vec<String> {
        if let Some(headers) = &self.override_headers {
            return headers.clone();
        }
        columns
            .iter()
            .map(|column| {
                self.rename_headers
                    .as_ref()
                    .and_then(|r| r.get(column))
                    .unwrap_or(column)
                    .clone()
            })
            .collect()
    }
}

impl fmt::Debug for TableConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableConfig")
            .field("rules", &self.rules)
            .field("html_mode", &self.html_mode)
            .field("override_headers", &self.override_headers)
            .field("rename_headers", &self.rename_headers)
            .field("pad_empty_cells", &self.pad_empty_cells)
            .field("row_callbacks", &self.row_callbacks.len())
            .field("table_options", &self.table_options)
            .finish()
    }
}

// =============================================================================
// Declarative form
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigSpec {
    #[serde(default)]
    html_mode: Option<String>,
    #[serde(default)]
    override_headers: Option<Vec<String>>,
    #[serde(default)]
    rename_headers: Option<HashMap<String, String>>,
    #[serde(default)]
    pad_empty_cells: bool,
    #[serde(default)]
    table: TableOptions,
    #[serde(default)]
    rules: Vec<RuleSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleSpec {
    #[serde(default)]
    column: Option<Value>,
    #[serde(default)]
    value: Option<Value>,
    #[serde(default)]
    transform: Option<Value>,
}

impl RuleSpec {
    fn into_rule(self) -> ConfigResult<Rule> {
        Ok(Rule {
            column: self.column.map(Matcher::from_value).transpose()?,
            value: self.value.map(Matcher::from_value).transpose()?,
            observe: None,
            transform: self.transform.map(Transform::from_value).transpose()?,
        })
    }
}

/// A declarative configuration exercising every section, for the CLI.
pub fn example_config() -> Value {
    json!({
        "html_mode": "escape",
        "rename_headers": { "Col1": "First column" },
        "pad_empty_cells": true,
        "table": {
            "attributes": { "class": "results" },
            "caption": "Query results"
        },
        "rules": [
            { "column": "Col1", "transform": { "type": "uppercase" } },
            { "column": { "pattern": "^(Col2|Col3)$" }, "transform": [
                { "type": "trim" },
                { "type": "ensure_prefix", "value": "#" }
            ] },
            { "value": "N/A", "transform": { "type": "constant", "value": "" } },
            { "value": { "pattern": "^R\\d+C4$" }, "transform": [
                { "type": "replace", "pattern": "\\d", "value": "_T" }
            ] }
        ]
    })
}

/// Reject rule lists that are not arrays of objects with a precise message.
fn check_rules_shape(value: &Value) -> ConfigResult<()> {
    match value.get("rules") {
        None | Some(Value::Null) => Ok(()),
        Some(Value::Array(items)) => match items.iter().position(|r| !r.is_object()) {
            Some(idx) => Err(ConfigError::MalformedRules(format!(
                "rule {} is not an object",
                idx
            ))),
            None => Ok(()),
        },
        Some(other) => Err(ConfigError::MalformedRules(format!(
            "expected a list of rules, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_validate_ok() {
        let config = TableConfig::new()
            .override_headers(["A", "B"])
            .rename_header("Col1", "First");
        assert!(config.validate(&cols(&["Col1", "Col2"])).is_ok());
    }

    #[test]
    fn test_validate_override_count() {
        let config = TableConfig::new().override_headers(["A", "B"]);
        let err = config.validate(&cols(&["Col1", "Col2", "Col3"])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OverrideHeaderCount {
                expected: 3,
                found: 2
            }
        ));
    }

    #[test]
    fn test_validate_unknown_rename() {
        let config = TableConfig::new().rename_header("Nope", "X");
        let err = config.validate(&cols(&["Col1"])).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownRenameColumn(ref c) if c == "Nope"));
    }

    #[test]
    fn test_validate_columns() {
        let config = TableConfig::new();
        assert!(matches!(config.validate(&[]), Err(ConfigError::NoColumns)));
        assert!(matches!(
            config.validate(&cols(&["a", "b", "a"])),
            Err(ConfigError::DuplicateColumn(ref c)) if c == "a"
        ));
    }

    #[test]
    fn test_header_labels_override_wins() {
        let columns = cols(&["Col1", "Col2"]);
        let renamed = TableConfig::new().rename_header("Col2", "Second");
        assert_eq!(renamed.header_labels(&columns), vec!["Col1", "Second"]);

        let both = renamed.override_headers(["A", "B"]);
        assert_eq!(both.header_labels(&columns), vec!["A", "B"]);

        assert_eq!(TableConfig::new().header_labels(&columns), columns);
    }

    #[test]
    fn test_from_json_full() {
        let config = TableConfig::from_json(
            r#"{
                "html_mode": "strip",
                "rename_headers": {"Col1": "First"},
                "pad_empty_cells": true,
                "table": {"attributes": {"class": "results"}, "caption": "Results"},
                "rules": [
                    {"column": "Col1", "transform": {"type": "uppercase"}},
                    {"value": {"pattern": "^R2"}, "transform": [{"type": "trim"}]},
                    {"value": {"weird": 1}}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(config.html_mode, HtmlMode::Strip);
        assert!(config.pad_empty_cells);
        assert_eq!(config.rules.len(), 3);
        assert!(matches!(config.rules[0].column, Some(Matcher::Exact(_))));
        assert!(matches!(config.rules[1].value, Some(Matcher::Pattern(_))));
        assert!(matches!(config.rules[2].value, Some(Matcher::Unsupported(_))));
        assert_eq!(config.table_options.caption.as_deref(), Some("Results"));
    }

    #[test]
    fn test_from_json_unknown_html_mode() {
        let err = TableConfig::from_json(r#"{"html_mode": "encode"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownHtmlMode(_)));
    }

    #[test]
    fn test_from_json_malformed_rules() {
        let err = TableConfig::from_json(r#"{"rules": {"column": "a"}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::MalformedRules(_)));

        let err = TableConfig::from_value(json!({"rules": [{"column": "a"}, "b"]})).unwrap_err();
        assert!(err.to_string().contains("rule 1"));
    }

    #[test]
    fn test_from_json_invalid_pattern() {
        let err = TableConfig::from_json(r#"{"rules": [{"column": {"pattern": "("}}]}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { .. }));
    }

    #[test]
    fn test_from_json_rejects_unknown_keys() {
        assert!(TableConfig::from_json(r#"{"colour": "red"}"#).is_err());
        assert!(TableConfig::from_json(r#"{"rules": [{"columns": "a"}]}"#).is_err());
    }

    #[test]
    fn test_example_config_loads() {
        let config = TableConfig::from_value(example_config()).unwrap();
        assert_eq!(config.html_mode, HtmlMode::Escape);
        assert_eq!(config.rules.len(), 4);
        assert!(config.rules.iter().all(|r| matches!(r.transform, Some(Transform::Operations(_)))));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.json");
        std::fs::write(&path, r#"{"override_headers": ["A"]}"#).unwrap();

        let config = TableConfig::from_file(&path).unwrap();
        assert_eq!(config.override_headers, Some(vec!["A".to_string()]));

        let missing = TableConfig::from_file(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
