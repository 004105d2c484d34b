//! Rule definition
//!
//! A rule pairs an optional column matcher and an optional value matcher with
//! the actions to run when either fires: an observer whose result is ignored
//! and a transform whose result replaces the cell value.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use super::matcher::Matcher;
use super::operations::Operation;
use crate::error::{CallbackResult, ConfigError};
use crate::models::Row;

/// Side-effecting callback: `(value, row)`.
pub type ObserveFn = Arc<dyn Fn(&Value, &Row) -> CallbackResult<()> + Send + Sync>;

/// Value-rewriting callback: `(value, row) -> new value`.
pub type TransformFn = Arc<dyn Fn(&Value, &Row) -> CallbackResult<Value> + Send + Sync>;

/// What a rule does to a matched value.
#[derive(Clone)]
pub enum Transform {
    /// Arbitrary code.
    Function(TransformFn),
    /// Declarative operations applied in order.
    Operations(Vec<Operation>),
    /// Config value that cannot be turned into a transform; the cell value
    /// passes through and a warning is recorded.
    Uncallable(Value),
}

impl Transform {
    /// Resolve a transform from a declarative config value: one operation
    /// object or an array of them.
    ///
    /// Anything that is not shaped like an operation becomes
    /// [`Transform::Uncallable`]. Something that is shaped like one but is
    /// invalid (a bad regex, a missing field) is a configuration error.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        match value {
            Value::Array(items) if items.iter().all(is_operation_shaped) => {
                let ops = items
                    .into_iter()
                    .map(serde_json::from_value)
                    .collect::<Result<Vec<Operation>, _>>()?;
                Ok(Transform::Operations(ops))
            }
            v if is_operation_shaped(&v) => Ok(Transform::Operations(vec![
                serde_json::from_value(v)?,
            ])),
            other => Ok(Transform::Uncallable(other)),
        }
    }
}

fn is_operation_shaped(value: &Value) -> bool {
    value.get("type").is_some_and(Value::is_string)
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Function(_) => f.write_str("Function(<fn>)"),
            Transform::Operations(ops) => f.debug_tuple("Operations").field(ops).finish(),
            Transform::Uncallable(v) => f.debug_tuple("Uncallable").field(v).finish(),
        }
    }
}

/// One entry of the ordered rule list.
///
/// A rule with neither a column nor a value matcher never fires.
///
/// ```rust
/// use querytable::{Matcher, Rule};
/// use serde_json::json;
///
/// let rule = Rule::for_column("price").transform(|v, _row| {
///     json!(format!("${}", querytable::models::cell_text(v)))
/// });
/// assert!(rule.column.is_some());
/// ```
#[derive(Clone, Default)]
pub struct Rule {
    pub column: Option<Matcher>,
    pub value: Option<Matcher>,
    pub observe: Option<ObserveFn>,
    pub transform: Option<Transform>,
}

impl Rule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rule firing on columns matched by `matcher`.
    pub fn for_column(matcher: impl Into<Matcher>) -> Self {
        Self::new().matching_column(matcher)
    }

    /// Rule firing on values matched by `matcher`.
    pub fn for_value(matcher: impl Into<Matcher>) -> Self {
        Self::new().matching_value(matcher)
    }

    pub fn matching_column(mut self, matcher: impl Into<Matcher>) -> Self {
        self.column = Some(matcher.into());
        self
    }

    pub fn matching_value(mut self, matcher: impl Into<Matcher>) -> Self {
        self.value = Some(matcher.into());
        self
    }

    /// Set an observer that cannot fail.
    pub fn observe<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &Row) + Send + Sync + 'static,
    {
        self.observe = Some(Arc::new(move |v, row| {
            f(v, row);
            Ok(())
        }));
        self
    }

    /// Set an observer whose failure aborts the build.
    pub fn try_observe<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &Row) -> CallbackResult<()> + Send + Sync + 'static,
    {
        self.observe = Some(Arc::new(f));
        self
    }

    /// Set a transform that cannot fail.
    pub fn transform<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &Row) -> Value + Send + Sync + 'static,
    {
        self.transform = Some(Transform::Function(Arc::new(move |v, row| Ok(f(v, row)))));
        self
    }

    /// Set a transform whose failure aborts the build.
    pub fn try_transform<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &Row) -> CallbackResult<Value> + Send + Sync + 'static,
    {
        self.transform = Some(Transform::Function(Arc::new(f)));
        self
    }

    /// Set a declarative transform.
    pub fn operations(mut self, ops: Vec<Operation>) -> Self {
        self.transform = Some(Transform::Operations(ops));
        self
    }

    /// Add one declarative operation to the chain.
    pub fn with_operation(mut self, op: Operation) -> Self {
        match self.transform {
            Some(Transform::Operations(ref mut ops)) => ops.push(op),
            _ => self.transform = Some(Transform::Operations(vec![op])),
        }
        self
    }

    /// Whether the rule can ever fire.
    pub fn is_inert(&self) -> bool {
        self.column.is_none() && self.value.is_none()
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("column", &self.column)
            .field("value", &self.value)
            .field("observe", &self.observe.as_ref().map(|_| "<fn>"))
            .field("transform", &self.transform)
            .finish()
    }
}
