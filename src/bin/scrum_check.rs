//! scrum_check.rs: validate scrum tracker files against their record family.
//!
//! Usage: `scrum_check <family> <file>... [--options table.yaml]`
//!
//! - `<family>` is one of `time-board`, `sprint-list`, `story-list`, `task-list`.
//! - Each file is loaded, its header checked against the family schema and
//!   every row parsed; the row count (and total hours for time boards and task lists) is printed.
//! - Exits non-zero if any file fails.

use anyhow::{anyhow, bail, Context, Result};
use scrumstore::{
    query::{RowSet, Value},
    schema::columns::{task_list, time_board},
    ColumnKind, Family, Table, TableOptions,
};
use std::{
    env,
    path::{Path, PathBuf},
};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(filter).init();

    // ─── 2) parse args ───────────────────────────────────────────────
    let mut args = env::args().skip(1);
    let family_arg = args
        .next()
        .ok_or_else(|| anyhow!("usage: scrum_check <family> <file>... [--options FILE]"))?;
    let family = Family::from_str(&family_arg)
        .ok_or_else(|| anyhow!("unknown record family `{}`", family_arg))?;

    let mut files: Vec<PathBuf> = Vec::new();
    let mut options = TableOptions::default();
    while let Some(arg) = args.next() {
        if arg == "--options" {
            let path = args.next().context("--options needs a file")?;
            options = TableOptions::from_yaml_file(&path)?;
        } else {
            files.push(PathBuf::from(arg));
        }
    }
    if files.is_empty() {
        bail!("no files given");
    }

    // ─── 3) check each file ──────────────────────────────────────────
    let mut failures = 0;
    for path in &files {
        match check(family, path, &options) {
            Ok(summary) => println!("{}: {}", path.display(), summary),
            Err(e) => {
                error!(path = %path.display(), "{:#}", e);
                failures += 1;
            }
        }
    }

    info!(checked = files.len(), failures, "done");
    if failures > 0 {
        bail!("{} of {} files failed", failures, files.len());
    }
    Ok(())
}

fn check(family: Family, path: &Path, options: &TableOptions) -> Result<String> {
    let mut table = Table::with_options(family, options.clone());
    table.load(path);
    let rows = table
        .row_count()
        .with_context(|| format!("loading {} file", family))?;

    // force coercion of every typed column so bad values surface here
    let mut summary = format!("{} rows", rows);
    let hours_column = match family {
        Family::TimeBoard => Some(time_board::HRS_SPENT),
        Family::TaskList => Some(task_list::INITIAL_HRS),
        _ => None,
    };
    for (index, column) in family.schema().columns.iter().enumerate() {
        if column.kind.is_ordered() {
            table.query().filter(index, |_| true)?;
        }
    }
    if let Some(col) = hours_column {
        let mut total = 0.0;
        for row in table.rows(&RowSet::All)? {
            let hours = row
                .get(col)
                .and_then(|raw| Value::coerce(ColumnKind::Float, raw));
            if let Some(Value::Float(h)) = hours {
                total += h;
            }
        }
        summary.push_str(&format!(", {:.1}h", total));
    }
    Ok(summary)
}
