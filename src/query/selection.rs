// src/query/selection.rs

use std::cmp::Ordering;
use std::fmt;

use regex::{Regex, RegexBuilder};

use super::value::Value;
use crate::error::{Result, StoreError};
use crate::schema::{ColumnKind, Family};
use crate::table::Table;

/// Row indices a selection covers.
///
/// Owned and detached from the table, so it can be kept across mutations and
/// dereferenced later with [`Table::rows`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RowSet {
    /// Every row, resolved lazily when filtered.
    #[default]
    All,
    /// Concrete indices in selection order.
    Indices(Vec<usize>),
}

impl RowSet {
    pub fn is_all(&self) -> bool {
        matches!(self, RowSet::All)
    }

    /// The concrete indices, `None` for [`RowSet::All`].
    pub fn indices(&self) -> Option<&[usize]> {
        match self {
            RowSet::All => None,
            RowSet::Indices(ix) => Some(ix),
        }
    }
}

/// Immutable view over rows of one [`Table`].
///
/// Every filter returns a new selection tagged with the same family and bound
/// to the same table; the receiver is left as it was. Filters over
/// [`RowSet::All`] visit rows `0..row_count` in order, otherwise they keep the
/// receiver's order. Rows whose queried cell is missing are dropped.
#[derive(Clone)]
pub struct Selection<'t> {
    table: &'t Table,
    family: Family,
    rows: RowSet,
}

impl<'t> Selection<'t> {
    pub(crate) fn all(table: &'t Table) -> Self {
        Self {
            table,
            family: table.family(),
            rows: RowSet::All,
        }
    }

    /// Same table and family, new rows.
    fn narrowed(&self, rows: Vec<usize>) -> Self {
        Self {
            table: self.table,
            family: self.family,
            rows: RowSet::Indices(rows),
        }
    }

    pub fn table(&self) -> &'t Table {
        self.table
    }

    pub fn family(&self) -> Family {
        self.family
    }

    /// Current row set, for enumerating results through the table.
    pub fn get_range(&self) -> &RowSet {
        &self.rows
    }

    pub fn into_range(self) -> RowSet {
        self.rows
    }

    /// Rows of the selection, read from the table now.
    pub fn rows(&self) -> Result<Vec<&'t [String]>> {
        self.table.rows(&self.rows)
    }

    pub fn count(&self) -> Result<usize> {
        match &self.rows {
            RowSet::All => self.table.row_count(),
            RowSet::Indices(ix) => Ok(ix.len()),
        }
    }

    /// Keep rows whose cell in `column`, coerced to the column's declared
    /// kind, satisfies `predicate`. A cell that does not parse as that kind
    /// fails the whole filter with [`StoreError::InvalidValue`].
    pub fn filter<P>(&self, column: usize, predicate: P) -> Result<Selection<'t>>
    where
        P: Fn(&Value) -> bool,
    {
        let kind = self.column_kind(column)?;
        self.retain(column, |row, raw| {
            let value = Value::coerce(kind, raw).ok_or_else(|| StoreError::InvalidValue {
                row,
                column,
                kind,
                value: raw.to_string(),
            })?;
            Ok(predicate(&value))
        })
    }

    /// Keep rows with `min <= value <= max`. Text columns have no ordering
    /// and are refused.
    pub fn range_filter(
        &self,
        column: usize,
        min: impl Into<Value>,
        max: impl Into<Value>,
    ) -> Result<Selection<'t>> {
        let kind = self.column_kind(column)?;
        if !kind.is_ordered() {
            return Err(StoreError::UnorderedColumn { column });
        }
        let min = conform(column, kind, min.into())?;
        let max = conform(column, kind, max.into())?;
        self.filter(column, |v| min <= *v && *v <= max)
    }

    pub fn equals_filter(&self, column: usize, value: impl Into<Value>) -> Result<Selection<'t>> {
        let kind = self.column_kind(column)?;
        let wanted = conform(column, kind, value.into())?;
        self.filter(column, |v| v.partial_cmp(&wanted) == Some(Ordering::Equal))
    }

    /// Keep rows where `pattern` matches anywhere in the cell text.
    pub fn search_filter(
        &self,
        column: usize,
        pattern: &str,
        ignore_case: bool,
    ) -> Result<Selection<'t>> {
        self.column_kind(column)?;
        let re = build_regex(pattern, ignore_case)?;
        self.retain(column, |_, raw| Ok(re.is_match(raw)))
    }

    /// Keep rows where `pattern` matches at the start of the cell text. The
    /// match need not reach the end unless the pattern says so.
    pub fn match_filter(
        &self,
        column: usize,
        pattern: &str,
        ignore_case: bool,
    ) -> Result<Selection<'t>> {
        self.column_kind(column)?;
        let re = build_regex(&format!("^(?:{})", pattern), ignore_case)?;
        self.retain(column, |_, raw| Ok(re.is_match(raw)))
    }

    pub(crate) fn expect_family(&self, filter: &'static str, allowed: &[Family]) -> Result<()> {
        if allowed.contains(&self.family) {
            Ok(())
        } else {
            Err(StoreError::WrongFamily {
                filter,
                found: self.family,
            })
        }
    }

    fn column_kind(&self, column: usize) -> Result<ColumnKind> {
        let schema = self.table.schema();
        schema
            .column(column)
            .map(|c| c.kind)
            .ok_or(StoreError::NoSuchColumn {
                column,
                width: schema.width(),
            })
    }

    /// Visit each candidate row's raw cell and keep the ones `keep` accepts.
    fn retain<F>(&self, column: usize, mut keep: F) -> Result<Selection<'t>>
    where
        F: FnMut(usize, &str) -> Result<bool>,
    {
        let mut kept = Vec::new();
        let mut visit = |row: usize| -> Result<()> {
            if let Some(raw) = self.table.read_cell(row, column)? {
                if keep(row, raw)? {
                    kept.push(row);
                }
            }
            Ok(())
        };

        match &self.rows {
            RowSet::All => {
                for row in 0..self.table.row_count()? {
                    visit(row)?;
                }
            }
            RowSet::Indices(indices) => {
                for &row in indices {
                    visit(row)?;
                }
            }
        }

        Ok(self.narrowed(kept))
    }
}

impl fmt::Debug for Selection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selection")
            .field("family", &self.family)
            .field("path", &self.table.path())
            .field("rows", &self.rows)
            .finish()
    }
}

fn conform(column: usize, kind: ColumnKind, value: Value) -> Result<Value> {
    let shown = value.to_string();
    value.conform(kind).ok_or(StoreError::BadArgument {
        column,
        kind,
        value: shown,
    })
}

fn build_regex(pattern: &str, ignore_case: bool) -> Result<Regex> {
    Ok(RegexBuilder::new(pattern)
        .case_insensitive(ignore_case)
        .build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TableOptions;
    use crate::schema::columns::{sprint_list, task_list};
    use anyhow::Result;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn fixture(text: &str) -> Result<NamedTempFile> {
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(text.as_bytes())?;
        Ok(tmp)
    }

    /// story-id column holds 5,1,5,3,5
    const TASKS: &str = "story-id(int),task-id(int),task-description(str),initial-hrs(float)\n\
                         5,1,Plan the sprint,2\n\
                         1,2,no match,1.5\n\
                         5,3,PLANNED,4\n\
                         3,4,review plan,0.5\n\
                         5,5,ship,8\n";

    fn tasks(tmp: &NamedTempFile) -> Table {
        let mut table = Table::task_list();
        table.load(tmp.path());
        table
    }

    fn indices(sel: &Selection<'_>) -> Vec<usize> {
        sel.get_range().indices().map(<[usize]>::to_vec).unwrap_or_default()
    }

    #[test]
    fn equals_keeps_order() -> Result<()> {
        let tmp = fixture(TASKS)?;
        let table = tasks(&tmp);
        let all = table.query();
        assert!(all.get_range().is_all());

        let fives = all.equals_filter(task_list::STORY_ID, 5)?;
        assert_eq!(indices(&fives), [0, 2, 4]);

        let ranged = all.range_filter(task_list::STORY_ID, 3, 5)?;
        assert_eq!(indices(&ranged), [0, 2, 3, 4]);

        // chaining narrows the earlier result, order preserved
        let chained = fives.range_filter(task_list::STORY_ID, 3, 5)?;
        assert_eq!(indices(&chained), [0, 2, 4]);

        // the receivers are untouched
        assert!(all.get_range().is_all());
        assert_eq!(indices(&fives), [0, 2, 4]);
        Ok(())
    }

    #[test]
    fn filters_keep_caller_order() -> Result<()> {
        let tmp = fixture(TASKS)?;
        let table = tasks(&tmp);
        let shuffled = table.query().narrowed(vec![4, 1, 0, 3]);
        let sel = shuffled.range_filter(task_list::INITIAL_HRS, 0.5, 4)?;
        assert_eq!(indices(&sel), [1, 0, 3]);
        Ok(())
    }

    #[test]
    fn search_ignores_case_by_default() -> Result<()> {
        let tmp = fixture(TASKS)?;
        let table = tasks(&tmp);
        let first_three = table.query().narrowed(vec![0, 1, 2]);

        let hits = first_three.search_filter(task_list::DESCRIPTION, "plan", true)?;
        assert_eq!(indices(&hits), [0, 2]);

        let strict = first_three.search_filter(task_list::DESCRIPTION, "plan", false)?;
        assert_eq!(indices(&strict), Vec::<usize>::new());

        let anywhere = table.query().search_filter(task_list::DESCRIPTION, "plan", true)?;
        assert_eq!(indices(&anywhere), [0, 2, 3]);
        Ok(())
    }

    #[test]
    fn match_is_anchored_at_start_only() -> Result<()> {
        let tmp = fixture(TASKS)?;
        let table = tasks(&tmp);

        let prefix = table.query().match_filter(task_list::DESCRIPTION, "plan", true)?;
        assert_eq!(indices(&prefix), [0, 2]);

        // no implicit end anchor
        let partial = table.query().match_filter(task_list::DESCRIPTION, "PLAN", false)?;
        assert_eq!(indices(&partial), [2]);

        let alternatives = table.query().match_filter(task_list::DESCRIPTION, "ship|review", true)?;
        assert_eq!(indices(&alternatives), [3, 4]);

        let whole = table.query().match_filter(task_list::DESCRIPTION, "plan$", true)?;
        assert_eq!(indices(&whole), Vec::<usize>::new());
        Ok(())
    }

    #[test]
    fn short_rows_are_excluded_silently() -> Result<()> {
        let tmp = fixture(
            "story-id(int),task-id(int),task-description(str),initial-hrs(float)\n\
             1,1,a,1\n\
             1,2\n\
             2,3,c,2\n",
        )?;
        let opts = TableOptions {
            strict_width: false,
            ..TableOptions::default()
        };
        let mut table = Table::with_options(Family::TaskList, opts);
        table.load(tmp.path());

        let q = table.query();
        assert_eq!(indices(&q.range_filter(task_list::INITIAL_HRS, 0, 10)?), [0, 2]);
        assert_eq!(indices(&q.search_filter(task_list::DESCRIPTION, ".*", true)?), [0, 2]);
        assert_eq!(indices(&q.equals_filter(task_list::TASK_ID, 2)?), [1]);
        Ok(())
    }

    #[test]
    fn bad_cells_and_arguments_are_errors() -> Result<()> {
        let tmp = fixture("sprint-id(int),sprint-description(str)\n1,a\nzwei,b\n")?;
        let mut table = Table::sprint_list();
        table.load(tmp.path());
        let q = table.query();

        let err = q.equals_filter(sprint_list::SPRINT_ID, 1).unwrap_err();
        assert!(matches!(err, StoreError::InvalidValue { row: 1, column: 0, .. }), "{err}");

        // text filters never coerce
        assert_eq!(indices(&q.search_filter(sprint_list::SPRINT_ID, "^z", true)?), [1]);

        assert!(matches!(
            q.range_filter(sprint_list::DESCRIPTION, "a", "z"),
            Err(StoreError::UnorderedColumn { column: 1 })
        ));
        assert!(matches!(
            q.equals_filter(sprint_list::SPRINT_ID, "one"),
            Err(StoreError::BadArgument { .. })
        ));
        assert!(matches!(
            q.equals_filter(7, 1),
            Err(StoreError::NoSuchColumn { column: 7, width: 2 })
        ));
        assert!(matches!(
            q.search_filter(sprint_list::DESCRIPTION, "(", true),
            Err(StoreError::Pattern(_))
        ));
        Ok(())
    }

    #[test]
    fn custom_predicates_see_coerced_values() -> Result<()> {
        let tmp = fixture(TASKS)?;
        let table = tasks(&tmp);
        let big = table
            .query()
            .filter(task_list::INITIAL_HRS, |v| matches!(v, Value::Float(h) if *h >= 4.0))?;
        assert_eq!(indices(&big), [2, 4]);
        assert_eq!(big.count()?, 2);
        let rows = big.rows()?;
        assert_eq!(rows[1][2], "ship");
        Ok(())
    }

    #[test]
    fn row_sets_are_views_not_snapshots() -> Result<()> {
        let tmp = fixture(TASKS)?;
        let mut table = tasks(&tmp);
        let kept = table
            .query()
            .equals_filter(task_list::TASK_ID, 3)?
            .into_range();

        table.set_row(2, ["5", "3", "rewritten", "4"])?;
        let rows = table.rows(&kept)?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][2], "rewritten");
        Ok(())
    }

    #[test]
    fn filtering_an_empty_table_yields_nothing() -> Result<()> {
        let tmp = fixture("sprint-id(int),sprint-description(str)\n")?;
        let mut table = Table::sprint_list();
        table.load(tmp.path());
        let sel = table.query().equals_filter(sprint_list::SPRINT_ID, 1)?;
        assert_eq!(sel.get_range(), &RowSet::Indices(vec![]));
        assert_eq!(sel.count()?, 0);
        Ok(())
    }
}
