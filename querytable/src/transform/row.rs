//! Row processing: turn one fetched row into its ordered cell values.

use serde_json::Value;
use tracing::warn;

use super::invoker::{self, CellContext};
use super::matcher::{MatchError, Matcher};
use crate::config::TableConfig;
use crate::error::{BuildError, BuildWarning, MatchTarget};
use crate::models::{is_empty_cell, Row};

/// Text emitted for empty cells when padding is enabled.
pub const EMPTY_CELL_PADDING: &str = "&nbsp;";

/// Applies the HTML mode and the rule list to rows of one table.
pub struct RowProcessor<'a> {
    columns: &'a [String],
    config: &'a TableConfig,
}

impl<'a> RowProcessor<'a> {
    pub fn new(columns: &'a [String], config: &'a TableConfig) -> Self {
        Self { columns, config }
    }

    /// Produce the cell values of `row`, in column order.
    ///
    /// For every cell the HTML mode runs first. Then, rule by rule, a column
    /// match applies the rule, and independently a value match against the
    /// current value applies it again. A rule matching both ways therefore
    /// fires twice on the same cell.
    pub fn process(
        &self,
        row: &Row,
        row_index: usize,
        warnings: &mut Vec<BuildWarning>,
    ) -> Result<Vec<Value>, BuildError> {
        let mut cells = Vec::with_capacity(self.columns.len());

        for column in self.columns {
            let raw = row.get(column).cloned().unwrap_or(Value::Null);
            let mut value = self.config.html_mode.apply(raw);
            let column_id = Value::String(column.clone());

            for (rule_index, rule) in self.config.rules.iter().enumerate() {
                let ctx = CellContext {
                    row: row_index,
                    column,
                    rule: rule_index,
                };

                if let Some(matcher) = &rule.column {
                    if test(matcher, &column_id, MatchTarget::Column, ctx, warnings)? {
                        value = invoker::apply(rule, ctx, value, row, warnings)
                            .map_err(|source| callback_error(ctx, source))?;
                    }
                }

                if let Some(matcher) = &rule.value {
                    if test(matcher, &value, MatchTarget::Value, ctx, warnings)? {
                        value = invoker::apply(rule, ctx, value, row, warnings)
                            .map_err(|source| callback_error(ctx, source))?;
                    }
                }
            }

            if self.config.pad_empty_cells && is_empty_cell(&value) {
                value = Value::String(EMPTY_CELL_PADDING.to_string());
            }

            cells.push(value);
        }

        Ok(cells)
    }
}

/// Run one matcher; unsupported matchers count as no match and warn.
fn test(
    matcher: &Matcher,
    candidate: &Value,
    target: MatchTarget,
    ctx: CellContext<'_>,
    warnings: &mut Vec<BuildWarning>,
) -> Result<bool, BuildError> {
    match matcher.matches(candidate) {
        Ok(matched) => Ok(matched),
        Err(MatchError::Unsupported(spec)) => {
            let warning = BuildWarning::UnsupportedMatcher {
                rule: ctx.rule,
                target,
                matcher: spec,
                row: ctx.row,
                column: ctx.column.to_string(),
            };
            warn!("{}", warning);
            warnings.push(warning);
            Ok(false)
        }
        Err(MatchError::Predicate(source)) => Err(callback_error(ctx, source)),
    }
}

fn callback_error(ctx: CellContext<'_>, source: crate::error::CallbackError) -> BuildError {
    BuildError::Callback {
        row: ctx.row,
        column: ctx.column.to_string(),
        rule: ctx.rule,
        source,
    }
}
