//! Bundled HTML table renderer.
//!
//! Cell and header text is written as received: sanitizing values is the job
//! of the HTML mode upstream. Table attributes and the caption are escaped.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::{self, Write};

use super::{Markup, TableSink};
use crate::models::cell_text;

/// Presentation options passed through to the renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableOptions {
    /// Attributes of the `<table>` element, written in key order.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

impl TableOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }
}

/// In-memory HTML table built by the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HtmlTable {
    #[serde(flatten)]
    options: TableOptions,
    headers: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl HtmlTable {
    pub fn new(options: TableOptions) -> Self {
        Self {
            options,
            headers: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }
}

impl TableSink for HtmlTable {
    type Table = HtmlTable;

    fn header_row(&mut self, labels: Vec<String>) {
        self.headers = labels;
    }

    fn data_row(&mut self, cells: Vec<Value>) {
        self.rows.push(cells);
    }

    fn finish(self) -> HtmlTable {
        self
    }
}

impl Markup for HtmlTable {
    fn to_markup(&self) -> String {
        let mut out = String::from("<table");
        for (name, value) in &self.options.attributes {
            let _ = write!(
                out,
                " {}=\"{}\"",
                html_escape::encode_text(name),
                html_escape::encode_double_quoted_attribute(value)
            );
        }
        out.push_str(">\n");

        if let Some(caption) = &self.options.caption {
            let _ = writeln!(out, "<caption>{}</caption>", html_escape::encode_text(caption));
        }

        out.push_str("<thead>\n<tr>");
        for label in &self.headers {
            let _ = write!(out, "<th>{}</th>", label);
        }
        out.push_str("</tr>\n</thead>\n<tbody>\n");

        for row in &self.rows {
            out.push_str("<tr>");
            for cell in row {
                let _ = write!(out, "<td>{}</td>", cell_text(cell));
            }
            out.push_str("</tr>\n");
        }

        out.push_str("</tbody>\n</table>\n");
        out
    }
}

impl fmt::Display for HtmlTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_markup())
    }
}
