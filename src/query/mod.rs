//! Filtering over a table's rows.
//!
//! A [`Selection`] starts as "all rows" from [`Table::query`](crate::Table::query)
//! and is narrowed by chaining filters, each returning a fresh selection.
//! Record-family shortcuts (`filter_date_equals`, `filter_story`, ...) live in
//! `families`.

mod families;
pub mod selection;
pub mod value;

pub use selection::{RowSet, Selection};
pub use value::{format_yyyymmdd, parse_yyyymmdd, Value};
