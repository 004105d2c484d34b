//! Declarative cell operations
//!
//! Operations let a config file describe a transform without code. A rule's
//! transform may be a single operation or an ordered list of them; each
//! operation receives the previous one's output.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::pattern::Pattern;

/// All available cell operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    /// Remove leading and trailing whitespace
    Trim,

    /// Convert to uppercase
    Uppercase,

    /// Convert to lowercase
    Lowercase,

    /// Replace every regex match
    Replace {
        pattern: Pattern,
        #[serde(default)]
        value: String,
    },

    /// Pad at start to reach target length
    PadStart {
        length: usize,
        #[serde(default = "default_pad_char")]
        char: String,
    },

    /// Pad at end to reach target length
    PadEnd {
        length: usize,
        #[serde(default = "default_pad_char")]
        char: String,
    },

    /// Ensure value starts with given prefix
    EnsurePrefix { value: String },

    /// Ensure value ends with given suffix
    EnsureSuffix { value: String },

    /// Map values using a lookup table
    Map {
        mapping: HashMap<String, String>,
        #[serde(default)]
        case_insensitive: bool,
        /// Value used when nothing matches (`None` keeps the input)
        #[serde(default)]
        default_unmapped: Option<String>,
    },

    /// Take a character range
    Substring {
        start: usize,
        #[serde(default)]
        length: Option<usize>,
    },

    /// Keep only ASCII digits
    DigitsOnly,

    /// Keep only alphanumeric characters
    Alphanumeric,

    /// Replace the value outright
    Constant { value: Value },

    /// Substitute the value into a template at every `{}`
    Template { template: String },
}

fn default_pad_char() -> String {
    " ".to_string()
}

impl Operation {
    /// Apply this operation to a value
    pub fn apply(&self, value: &Value) -> Value {
        match self {
            Operation::Constant { value: constant } => constant.clone(),
            op => match as_text(value) {
                Some(text) => Value::String(op.apply_text(text)),
                None => value.clone(),
            },
        }
    }

    fn apply_text(&self, text: String) -> String {
        match self {
            Operation::Trim => text.trim().to_string(),
            Operation::Uppercase => text.to_uppercase(),
            Operation::Lowercase => text.to_lowercase(),
            Operation::Replace { pattern, value } => {
                pattern.regex().replace_all(&text, value.as_str()).into_owned()
            }
            Operation::PadStart { length, char } => {
                let padding = padding(&text, *length, char);
                format!("{}{}", padding, text)
            }
            Operation::PadEnd { length, char } => {
                let padding = padding(&text, *length, char);
                format!("{}{}", text, padding)
            }
            Operation::EnsurePrefix { value: prefix } => {
                if text.starts_with(prefix.as_str()) {
                    text
                } else {
                    format!("{}{}", prefix, text)
                }
            }
            Operation::EnsureSuffix { value: suffix } => {
                if text.ends_with(suffix.as_str()) {
                    text
                } else {
                    format!("{}{}", text, suffix)
                }
            }
            Operation::Map {
                mapping,
                case_insensitive,
                default_unmapped,
            } => {
                let found = if *case_insensitive {
                    let key = text.to_lowercase();
                    mapping
                        .iter()
                        .find(|(k, _)| k.to_lowercase() == key)
                        .map(|(_, v)| v)
                } else {
                    mapping.get(&text)
                };
                match (found, default_unmapped) {
                    (Some(v), _) => v.clone(),
                    (None, Some(d)) => d.clone(),
                    (None, None) => text,
                }
            }
            Operation::Substring { start, length } => {
                let skipped = text.chars().skip(*start);
                match length {
                    Some(len) => skipped.take(*len).collect(),
                    None => skipped.collect(),
                }
            }
            Operation::DigitsOnly => text.chars().filter(|c| c.is_ascii_digit()).collect(),
            Operation::Alphanumeric => text.chars().filter(|c| c.is_alphanumeric()).collect(),
            Operation::Template { template } => template.replace("{}", &text),
            Operation::Constant { .. } => text,
        }
    }
}

/// Apply operations in sequence.
pub fn apply_all(operations: &[Operation], value: Value) -> Value {
    operations.iter().fold(value, |v, op| op.apply(&v))
}

/// Text view of scalar values; arrays, objects and null are left alone.
fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn padding(text: &str, length: usize, pad: &str) -> String {
    let current = text.chars().count();
    if current >= length {
        return String::new();
    }
    let ch = pad.chars().next().unwrap_or(' ');
    std::iter::repeat(ch).take(length - current).collect()
}

/// Get a description of all available operations
pub fn operations_description() -> String {
    r#"Available cell operations:

| Operation | Description | Parameters |
|-----------|-------------|------------|
| trim | Remove leading/trailing whitespace | - |
| uppercase | Convert to uppercase | - |
| lowercase | Convert to lowercase | - |
| replace | Regex replacement of every match | pattern: regex, value: replacement |
| pad_start | Pad at start | length: target length, char: pad character (default " ") |
| pad_end | Pad at end | length: target length, char: pad character (default " ") |
| ensure_prefix | Add prefix if not present | value: prefix string |
| ensure_suffix | Add suffix if not present | value: suffix string |
| map | Map values using lookup table | mapping: {source: target}, case_insensitive: bool, default_unmapped: string |
| substring | Character range | start: start index, length: optional length |
| digits_only | Keep only digits | - |
| alphanumeric | Keep only alphanumeric chars | - |
| constant | Replace value outright | value: any JSON value |
| template | Insert value at each {} | template: string |

Example rule transforms in JSON:
[
  {"type": "trim"},
  {"type": "replace", "pattern": "\\d", "value": "_T"},
  {"type": "map", "mapping": {"Y": "Yes", "N": "No"}, "case_insensitive": true},
  {"type": "template", "template": "<a href=\"/users/{}\">{}</a>"}
]"#
    .to_string()
}
