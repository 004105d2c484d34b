//! Transformation module.
//!
//! This module turns fetched rows into rendered cells:
//! - Matcher / Pattern: decide whether a rule applies to a column or value
//! - Rule / Operations: what a rule does when it fires
//! - Invoker: runs a fired rule's callbacks
//! - Row: applies the HTML mode and the rule list to one row
//! - Pipeline: drives a whole build from source to sink

pub mod invoker;
pub mod matcher;
pub mod operations;
pub mod pattern;
pub mod pipeline;
pub mod row;
pub mod rule;

pub use matcher::{MatchError, Matcher, PredicateFn};
pub use operations::{apply_all, operations_description, Operation};
pub use pattern::Pattern;
pub use pipeline::*;
pub use row::{RowProcessor, EMPTY_CELL_PADDING};
pub use rule::{ObserveFn, Rule, Transform, TransformFn};
