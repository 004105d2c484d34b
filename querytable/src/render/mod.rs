//! Table renderers.
//!
//! The pipeline talks to a renderer through [`TableSink`]: one header row,
//! then data rows in fetch order, then [`TableSink::finish`] to obtain the
//! built table. [`HtmlTable`] is the bundled implementation.

pub mod html;

use serde_json::Value;

pub use html::{HtmlTable, TableOptions};

/// Receives a table row by row.
pub trait TableSink {
    /// Built table handed back by [`TableSink::finish`].
    type Table;

    fn header_row(&mut self, labels: Vec<String>);

    fn data_row(&mut self, cells: Vec<Value>);

    fn finish(self) -> Self::Table;
}

/// A built table that can be written out as markup.
pub trait Markup {
    fn to_markup(&self) -> String;
}
