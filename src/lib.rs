//! Data access for the flat files behind a small scrum tracker: time boards,
//! sprint lists, story lists and task lists.
//!
//! ```no_run
//! use scrumstore::Table;
//!
//! # fn main() -> scrumstore::Result<()> {
//! let mut board = Table::time_board();
//! board.load("sprint-3/timeboard.csv");
//! let hits = board.query().filter_date_equals("20240105")?.filter_story(2)?;
//! for row in hits.rows()? {
//!     println!("{} logged {}h", row[1], row[4]);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod query;
pub mod schema;
pub mod table;

pub use config::TableOptions;
pub use diagnostics::{CollectingDiagnostics, Diagnostic, Diagnostics, Severity, TracingDiagnostics};
pub use error::{Result, StoreError};
pub use query::{RowSet, Selection, Value};
pub use schema::{Column, ColumnKind, Family, Schema};
pub use table::{Dialect, SaveOutcome, Table};
