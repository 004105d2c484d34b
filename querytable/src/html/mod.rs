//! Raw-markup handling applied to cell values before any rule runs.
//!
//! [`HtmlMode::Strip`] removes tags, [`HtmlMode::Escape`] entity-escapes
//! markup-significant characters. Only string cells are touched: numbers,
//! booleans and nulls cannot carry markup.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// How raw cell content is treated before rule evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HtmlMode {
    /// Leave values untouched.
    #[default]
    None,
    /// Remove tags and comments, keep text.
    Strip,
    /// Escape `&`, `<` and `>`.
    Escape,
}

impl HtmlMode {
    /// Apply this mode to one cell value.
    pub fn apply(self, value: Value) -> Value {
        match (self, value) {
            (HtmlMode::None, value) => value,
            (HtmlMode::Strip, Value::String(s)) => Value::String(strip_tags(&s)),
            (HtmlMode::Escape, Value::String(s)) => Value::String(escape(&s)),
            (_, value) => value,
        }
    }
}

impl FromStr for HtmlMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "" => Ok(HtmlMode::None),
            "strip" => Ok(HtmlMode::Strip),
            "escape" => Ok(HtmlMode::Escape),
            _ => Err(ConfigError::UnknownHtmlMode(s.to_string())),
        }
    }
}

impl fmt::Display for HtmlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HtmlMode::None => "none",
            HtmlMode::Strip => "strip",
            HtmlMode::Escape => "escape",
        };
        f.write_str(name)
    }
}

/// Escape markup-significant characters for use as element text.
pub fn escape(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

/// Remove tags and comments from `html`, keeping the text between them.
///
/// Handles `>` inside quoted attribute values, comments, and unterminated
/// tags or comments at the end of input (which are dropped).
pub fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];

        if let Some(comment) = tail.strip_prefix("<!--") {
            match comment.find("-->") {
                Some(end) => rest = &comment[end + 3..],
                None => return out,
            }
            continue;
        }

        match tag_end(tail) {
            Some(end) => rest = &tail[end..],
            None => return out,
        }
    }

    out.push_str(rest);
    out
}

/// Byte offset just past the `>` closing the tag that starts `tail`.
fn tag_end(tail: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (idx, ch) in tail.char_indices().skip(1) {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(ch),
            (None, '>') => return Some(idx + 1),
            (None, _) => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_escape_paragraph() {
        assert_eq!(escape("<p>HTML</p>"), "&lt;p&gt;HTML&lt;/p&gt;");
        assert_eq!(escape("fish & chips"), "fish &amp; chips");
    }

    #[test]
    fn test_strip_basic_tags() {
        assert_eq!(strip_tags("<p>Hello <b>World</b></p>"), "Hello World");
        assert_eq!(strip_tags("no markup"), "no markup");
    }

    #[test]
    fn test_strip_quoted_gt_in_attribute() {
        assert_eq!(strip_tags(r#"<a title="x>y">Link</a>"#), "Link");
        assert_eq!(strip_tags("<a title='x>y'>Link</a>"), "Link");
    }

    #[test]
    fn test_strip_comments_and_unclosed() {
        assert_eq!(strip_tags("Hello<!-- comment -->World"), "HelloWorld");
        assert_eq!(strip_tags("Hello<!-- never closed"), "Hello");
        assert_eq!(strip_tags("Hello<br"), "Hello");
        assert_eq!(strip_tags("Hello<"), "Hello");
    }

    #[test]
    fn test_apply_only_touches_strings() {
        assert_eq!(HtmlMode::Escape.apply(json!(5)), json!(5));
        assert_eq!(HtmlMode::Strip.apply(Value::Null), Value::Null);
        assert_eq!(HtmlMode::None.apply(json!("<i>x</i>")), json!("<i>x</i>"));
        assert_eq!(HtmlMode::Strip.apply(json!("<i>x</i>")), json!("x"));
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!("escape".parse::<HtmlMode>().unwrap(), HtmlMode::Escape);
        assert_eq!("STRIP".parse::<HtmlMode>().unwrap(), HtmlMode::Strip);
        assert_eq!("none".parse::<HtmlMode>().unwrap(), HtmlMode::None);

        let err = "encode".parse::<HtmlMode>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownHtmlMode(ref m) if m == "encode"));
    }
}
