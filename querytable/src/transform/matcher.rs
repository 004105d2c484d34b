//! Cell matching: decide whether a rule applies to a column or a value.
//!
//! A [`Matcher`] is resolved once, when the rule is configured:
//!
//! | Config value                 | Matcher                     |
//! |------------------------------|-----------------------------|
//! | string / number / bool / null | `Exact` (text equality)    |
//! | `{"pattern": "<regex>"}`     | `Pattern` (regex search)    |
//! | closure                      | `Predicate`                 |
//! | any other object or array    | `Unsupported` (never matches, warns) |

use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use super::pattern::Pattern;
use crate::error::{CallbackError, CallbackResult, ConfigError};
use crate::models::cell_text;

/// Predicate callback: receives the candidate, returns whether it matches.
pub type PredicateFn = Arc<dyn Fn(&Value) -> CallbackResult<bool> + Send + Sync>;

/// How a rule recognizes the columns or values it applies to.
#[derive(Clone)]
pub enum Matcher {
    /// Equal canonical text (see [`cell_text`]).
    Exact(Value),
    /// Regex search over the candidate's text.
    Pattern(Pattern),
    /// User predicate.
    Predicate(PredicateFn),
    /// Structured value with no matching semantics.
    Unsupported(Value),
}

/// Why a match could not be decided.
#[derive(Debug, Error)]
pub enum MatchError {
    /// Non-fatal: the matcher is a structured value.
    #[error("unsupported matcher {0}")]
    Unsupported(String),

    /// Fatal: the predicate itself failed.
    #[error("predicate failed: {0}")]
    Predicate(#[from] CallbackError),
}

impl Matcher {
    /// Exact matcher. Objects and arrays have no text equality and become
    /// [`Matcher::Unsupported`].
    pub fn exact(value: impl Into<Value>) -> Self {
        match value.into() {
            v @ (Value::Object(_) | Value::Array(_)) => Matcher::Unsupported(v),
            v => Matcher::Exact(v),
        }
    }

    /// Regex matcher, compiled now.
    pub fn pattern(pattern: &str) -> Result<Self, ConfigError> {
        Pattern::new(pattern).map(Matcher::Pattern)
    }

    /// Infallible predicate.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Matcher::Predicate(Arc::new(move |v| Ok(f(v))))
    }

    /// Predicate that may fail; a failure aborts the build.
    pub fn try_predicate<F>(f: F) -> Self
    where
        F: Fn(&Value) -> CallbackResult<bool> + Send + Sync + 'static,
    {
        Matcher::Predicate(Arc::new(f))
    }

    /// Resolve a matcher from a declarative config value.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        if let Value::Object(ref obj) = value {
            if obj.len() == 1 {
                if let Some(Value::String(pattern)) = obj.get("pattern") {
                    return Matcher::pattern(pattern);
                }
            }
        }
        Ok(Matcher::exact(value))
    }

    /// Test `candidate` against this matcher.
    pub fn matches(&self, candidate: &Value) -> Result<bool, MatchError> {
        match self {
            Matcher::Exact(expected) => Ok(cell_text(expected) == cell_text(candidate)),
            Matcher::Pattern(pattern) => Ok(pattern.is_match(&cell_text(candidate))),
            Matcher::Predicate(f) => Ok(f(candidate)?),
            Matcher::Unsupported(value) => Err(MatchError::Unsupported(value.to_string())),
        }
    }
}

impl From<&str> for Matcher {
    fn from(value: &str) -> Self {
        Matcher::Exact(Value::String(value.to_string()))
    }
}

impl From<String> for Matcher {
    fn from(value: String) -> Self {
        Matcher::Exact(Value::String(value))
    }
}

impl From<regex::Regex> for Matcher {
    fn from(regex: regex::Regex) -> Self {
        Matcher::Pattern(regex.into())
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Exact(v) => f.debug_tuple("Exact").field(v).finish(),
            Matcher::Pattern(p) => f.debug_tuple("Pattern").field(p).finish(),
            Matcher::Predicate(_) => f.write_str("Predicate(<fn>)"),
            Matcher::Unsupported(v) => f.debug_tuple("Unsupported").field(v).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_exact_text_equality() {
        let m = Matcher::from("R2C4");
        assert!(m.matches(&json!("R2C4")).unwrap());
        assert!(!m.matches(&json!("R2C3")).unwrap());
    }

    #[test]
    fn test_exact_number_matches_string_form() {
        let m = Matcher::exact(3);
        assert!(m.matches(&json!("3")).unwrap());
        assert!(m.matches(&json!(3)).unwrap());
        assert!(!m.matches(&json!(3.5)).unwrap());

        let empty = Matcher::exact("");
        assert!(empty.matches(&Value::Null).unwrap());
    }

    #[test]
    fn test_pattern_search() {
        let m = Matcher::pattern("^Col[12]$").unwrap();
        assert!(m.matches(&json!("Col1")).unwrap());
        assert!(m.matches(&json!("Col2")).unwrap());
        assert!(!m.matches(&json!("Col3")).unwrap());

        let digits = Matcher::pattern(r"\d+").unwrap();
        assert!(digits.matches(&json!(12)).unwrap());
    }

    #[test]
    fn test_predicate() {
        let m = Matcher::predicate(|v| v.as_i64().is_some_and(|n| n > 10));
        assert!(m.matches(&json!(11)).unwrap());
        assert!(!m.matches(&json!(10)).unwrap());
    }

    #[test]
    fn test_failing_predicate_is_error() {
        let m = Matcher::try_predicate(|_| Err(CallbackError::new("lookup down")));
        let err = m.matches(&json!("x")).unwrap_err();
        assert!(matches!(err, MatchError::Predicate(_)));
    }

    #[test]
    fn test_structured_matcher_is_unsupported() {
        let m = Matcher::exact(json!({"any": "thing"}));
        assert!(matches!(m, Matcher::Unsupported(_)));
        assert!(matches!(
            m.matches(&json!("thing")),
            Err(MatchError::Unsupported(_))
        ));
    }

    #[test]
    fn test_from_value_resolution() {
        assert!(matches!(
            Matcher::from_value(json!("Col1")).unwrap(),
            Matcher::Exact(_)
        ));
        assert!(matches!(
            Matcher::from_value(json!({"pattern": "^R2"})).unwrap(),
            Matcher::Pattern(_)
        ));
        assert!(matches!(
            Matcher::from_value(json!({"pattern": "^R2", "flags": "i"})).unwrap(),
            Matcher::Unsupported(_)
        ));
        assert!(matches!(
            Matcher::from_value(json!(["Col1", "Col2"])).unwrap(),
            Matcher::Unsupported(_)
        ));
        assert!(Matcher::from_value(json!({"pattern": "("})).is_err());
    }
}
