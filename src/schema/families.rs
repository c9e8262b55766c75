// src/schema/families.rs

use std::fmt;

use serde::{Deserialize, Serialize};

use super::types::{Column, ColumnKind, Schema};

/// `date(yyyymmdd),author(str),story-id(int),task-id(int),hrs-spent(float)`
///
/// One file per sprint.
pub static TIME_BOARD: Schema = Schema {
    name: "time-board",
    columns: &[
        Column::new("date(yyyymmdd)", ColumnKind::Date),
        Column::new("author(str)", ColumnKind::Str),
        Column::new("story-id(int)", ColumnKind::Int),
        Column::new("task-id(int)", ColumnKind::Int),
        Column::new("hrs-spent(float)", ColumnKind::Float),
    ],
};

/// `sprint-id(int),sprint-description(str)`, one file per project.
pub static SPRINT_LIST: Schema = Schema {
    name: "sprint-list",
    columns: &[
        Column::new("sprint-id(int)", ColumnKind::Int),
        Column::new("sprint-description(str)", ColumnKind::Str),
    ],
};

/// `sprint-id(int),story-id(int),story-description(str)`, one file per project.
pub static STORY_LIST: Schema = Schema {
    name: "story-list",
    columns: &[
        Column::new("sprint-id(int)", ColumnKind::Int),
        Column::new("story-id(int)", ColumnKind::Int),
        Column::new("story-description(str)", ColumnKind::Str),
    ],
};

/// `story-id(int),task-id(int),task-description(str),initial-hrs(float)`,
/// one file per project.
pub static TASK_LIST: Schema = Schema {
    name: "task-list",
    columns: &[
        Column::new("story-id(int)", ColumnKind::Int),
        Column::new("task-id(int)", ColumnKind::Int),
        Column::new("task-description(str)", ColumnKind::Str),
        Column::new("initial-hrs(float)", ColumnKind::Float),
    ],
};

/// The closed set of record families.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Family {
    TimeBoard,
    SprintList,
    StoryList,
    TaskList,
}

impl Family {
    pub const ALL: [Family; 4] = [
        Family::TimeBoard,
        Family::SprintList,
        Family::StoryList,
        Family::TaskList,
    ];

    pub fn schema(self) -> &'static Schema {
        match self {
            Family::TimeBoard => &TIME_BOARD,
            Family::SprintList => &SPRINT_LIST,
            Family::StoryList => &STORY_LIST,
            Family::TaskList => &TASK_LIST,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.schema().name
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase().replace('_', "-");
        Family::ALL.into_iter().find(|f| f.as_str() == s)
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column positions, so callers and helpers don't hardcode bare indices.
pub mod columns {
    pub mod time_board {
        pub const DATE: usize = 0;
        pub const AUTHOR: usize = 1;
        pub const STORY_ID: usize = 2;
        pub const TASK_ID: usize = 3;
        pub const HRS_SPENT: usize = 4;
    }

    pub mod sprint_list {
        pub const SPRINT_ID: usize = 0;
        pub const DESCRIPTION: usize = 1;
    }

    pub mod story_list {
        pub const SPRINT_ID: usize = 0;
        pub const STORY_ID: usize = 1;
        pub const DESCRIPTION: usize = 2;
    }

    pub mod task_list {
        pub const STORY_ID: usize = 0;
        pub const TASK_ID: usize = 1;
        pub const DESCRIPTION: usize = 2;
        pub const INITIAL_HRS: usize = 3;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_labels_keep_type_annotations() {
        let labels: Vec<_> = TIME_BOARD.labels().collect();
        assert_eq!(
            labels,
            [
                "date(yyyymmdd)",
                "author(str)",
                "story-id(int)",
                "task-id(int)",
                "hrs-spent(float)"
            ]
        );
        assert_eq!(TASK_LIST.position("initial-hrs(float)"), Some(3));
    }

    #[test]
    fn header_match_is_order_sensitive() {
        assert!(STORY_LIST.matches_header(&[
            "sprint-id(int)",
            "story-id(int)",
            "story-description(str)"
        ]));
        assert!(!STORY_LIST.matches_header(&[
            "story-id(int)",
            "sprint-id(int)",
            "story-description(str)"
        ]));
        assert!(!STORY_LIST.matches_header(&["sprint-id(int)", "story-id(int)"]));
    }

    #[test]
    fn family_names_round_trip() {
        for family in Family::ALL {
            assert_eq!(Family::from_str(family.as_str()), Some(family));
        }
        assert_eq!(Family::from_str("Task_List"), Some(Family::TaskList));
        assert_eq!(Family::from_str("backlog"), None);
    }

    #[test]
    fn schemas_are_distinct() {
        for a in Family::ALL {
            for b in Family::ALL {
                if a != b {
                    assert_ne!(a.schema(), b.schema());
                }
            }
        }
    }
}
