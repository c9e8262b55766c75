// src/query/families.rs
//
// Convenience filters tied to a record family. Each checks the selection's
// family tag first and refuses to run over any other family's table.

use chrono::NaiveDate;

use super::selection::Selection;
use super::value::format_yyyymmdd;
use crate::error::Result;
use crate::schema::columns::{sprint_list, story_list, task_list, time_board};
use crate::schema::Family;

impl<'t> Selection<'t> {
    /// Time-board rows logged on `date`, given in the file's `yyyymmdd` form.
    pub fn filter_date_equals(&self, date: &str) -> Result<Selection<'t>> {
        self.expect_family("filter_date_equals", &[Family::TimeBoard])?;
        self.match_filter(time_board::DATE, &regex::escape(date), true)
    }

    /// Same as [`filter_date_equals`](Self::filter_date_equals) for a parsed date.
    pub fn filter_on_day(&self, date: NaiveDate) -> Result<Selection<'t>> {
        self.filter_date_equals(&format_yyyymmdd(date))
    }

    /// Time-board rows logged between `from` and `to`, both inclusive.
    pub fn filter_date_range(&self, from: NaiveDate, to: NaiveDate) -> Result<Selection<'t>> {
        self.expect_family("filter_date_range", &[Family::TimeBoard])?;
        self.range_filter(time_board::DATE, from, to)
    }

    /// Time-board rows booked by exactly `author`.
    pub fn filter_author(&self, author: &str) -> Result<Selection<'t>> {
        self.expect_family("filter_author", &[Family::TimeBoard])?;
        self.equals_filter(time_board::AUTHOR, author)
    }

    pub fn filter_sprint(&self, sprint_id: i64) -> Result<Selection<'t>> {
        self.expect_family("filter_sprint", &[Family::SprintList, Family::StoryList])?;
        let column = match self.family() {
            Family::StoryList => story_list::SPRINT_ID,
            _ => sprint_list::SPRINT_ID,
        };
        self.equals_filter(column, sprint_id)
    }

    pub fn filter_story(&self, story_id: i64) -> Result<Selection<'t>> {
        self.expect_family(
            "filter_story",
            &[Family::TimeBoard, Family::StoryList, Family::TaskList],
        )?;
        let column = match self.family() {
            Family::TimeBoard => time_board::STORY_ID,
            Family::StoryList => story_list::STORY_ID,
            _ => task_list::STORY_ID,
        };
        self.equals_filter(column, story_id)
    }

    pub fn filter_task(&self, task_id: i64) -> Result<Selection<'t>> {
        self.expect_family("filter_task", &[Family::TimeBoard, Family::TaskList])?;
        let column = match self.family() {
            Family::TimeBoard => time_board::TASK_ID,
            _ => task_list::TASK_ID,
        };
        self.equals_filter(column, task_id)
    }
}
