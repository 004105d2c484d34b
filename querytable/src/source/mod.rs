//! Data sources: where the rows of a table come from.
//!
//! A source exposes a fixed, ordered column list and hands out rows one at a
//! time until it is exhausted. Sources are pull-only and not restartable.

pub mod csv;

use serde_json::Value;
use std::collections::VecDeque;

use crate::error::SourceResult;
use crate::models::{row_from_values, Row};

pub use self::csv::CsvSource;

/// A result set that can be walked once, row by row.
pub trait DataSource {
    /// Column identifiers, in display order.
    fn columns(&self) -> &[String];

    /// Fetch the next row. `Ok(None)` marks the end of data.
    fn next_row(&mut self) -> SourceResult<Option<Row>>;
}

impl<S: DataSource + ?Sized> DataSource for &mut S {
    fn columns(&self) -> &[String] {
        (**self).columns()
    }

    fn next_row(&mut self) -> SourceResult<Option<Row>> {
        (**self).next_row()
    }
}

impl<S: DataSource + ?Sized> DataSource for Box<S> {
    fn columns(&self) -> &[String] {
        (**self).columns()
    }

    fn next_row(&mut self) -> SourceResult<Option<Row>> {
        (**self).next_row()
    }
}

/// Rows already held in memory.
#[derive(Debug, Clone)]
pub struct MemorySource {
    columns: Vec<String>,
    rows: VecDeque<Row>,
}

impl MemorySource {
    pub fn new<S: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        rows: impl IntoIterator<Item = Row>,
    ) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: rows.into_iter().collect(),
        }
    }

    /// Build rows from positional values, matched to `columns` by index.
    pub fn from_values<S: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        rows: impl IntoIterator<Item = Vec<Value>>,
    ) -> Self {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let rows = rows
            .into_iter()
            .map(|values| row_from_values(&columns, values))
            .collect();
        Self { columns, rows }
    }

    /// Rows not yet fetched.
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }
}

impl DataSource for MemorySource {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn next_row(&mut self) -> SourceResult<Option<Row>> {
        Ok(self.rows.pop_front())
    }
}

/// Adapter over a fallible row iterator, such as a database cursor.
pub struct IterSource<I> {
    columns: Vec<String>,
    rows: I,
}

impl<I> IterSource<I>
where
    I: Iterator<Item = SourceResult<Row>>,
{
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>, rows: I) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows,
        }
    }
}

impl<I> DataSource for IterSource<I>
where
    I: Iterator<Item = SourceResult<Row>>,
{
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn next_row(&mut self) -> SourceResult<Option<Row>> {
        self.rows.next().transpose()
    }
}
