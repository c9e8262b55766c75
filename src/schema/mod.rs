pub mod families;
pub mod types;

pub use families::{columns, Family, SPRINT_LIST, STORY_LIST, TASK_LIST, TIME_BOARD};
pub use types::{Column, ColumnKind, Schema};
