//! Callback invocation for a rule that matched a cell.

use serde_json::Value;
use tracing::warn;

use super::operations::apply_all;
use super::rule::{Rule, Transform};
use crate::error::{BuildWarning, CallbackResult};
use crate::models::Row;

/// Where in the table a rule is being applied.
#[derive(Debug, Clone, Copy)]
pub struct CellContext<'a> {
    /// Zero-based data row index.
    pub row: usize,
    pub column: &'a str,
    /// Zero-based position of the rule in the rule list.
    pub rule: usize,
}

/// Run `rule`'s observer and transform against `value`.
///
/// The observer sees the value before the transform. Without a transform the
/// value comes back unchanged. Callback failures are returned as errors; an
/// uncallable transform is recorded in `warnings` and the value kept.
pub fn apply(
    rule: &Rule,
    ctx: CellContext<'_>,
    value: Value,
    row: &Row,
    warnings: &mut Vec<BuildWarning>,
) -> CallbackResult<Value> {
    if let Some(observe) = &rule.observe {
        observe(&value, row)?;
    }

    match &rule.transform {
        None => Ok(value),
        Some(Transform::Function(f)) => f(&value, row),
        Some(Transform::Operations(ops)) => Ok(apply_all(ops, value)),
        Some(Transform::Uncallable(spec)) => {
            let warning = BuildWarning::UncallableTransform {
                rule: ctx.rule,
                transform: spec.to_string(),
                row: ctx.row,
                column: ctx.column.to_string(),
            };
            warn!("{}", warning);
            warnings.push(warning);
            Ok(value)
        }
    }
}
