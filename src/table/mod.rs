// src/table/mod.rs

pub mod dialect;

use std::{
    fmt,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use csv::{ReaderBuilder, WriterBuilder};
use once_cell::unsync::OnceCell;
use tempfile::NamedTempFile;

use crate::config::TableOptions;
use crate::diagnostics::{Diagnostic, Diagnostics, Severity, TracingDiagnostics};
use crate::error::{Result, StoreError};
use crate::query::{RowSet, Selection};
use crate::schema::{Family, Schema};

pub use dialect::{sniff, Dialect};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// What [`Table::save`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Nothing was dirty; the file was not touched.
    Unchanged,
    Written,
}

/// Materialized contents of a bound file.
#[derive(Debug)]
struct RawTable {
    dialect: Dialect,
    /// Header as parsed from disk, or the canonical one after a mutation.
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// One delimited file of a fixed record family.
///
/// `load` only records the path; the file is parsed the first time anything
/// reads from it. Rows change only through [`set_row`](Table::set_row) and
/// [`append_row`](Table::append_row), which mark the table dirty, and
/// [`save`](Table::save) writes back only when dirty.
///
/// Selections hold row indices, not values: a [`RowSet`] taken before a
/// mutation sees the new values when it is read again.
pub struct Table {
    family: Family,
    options: TableOptions,
    diagnostics: Arc<dyn Diagnostics>,
    path: Option<PathBuf>,
    data: OnceCell<RawTable>,
    dirty: bool,
}

impl Table {
    pub fn new(family: Family) -> Self {
        Self::with_options(family, TableOptions::default())
    }

    pub fn with_options(family: Family, options: TableOptions) -> Self {
        Self {
            family,
            options,
            diagnostics: Arc::new(TracingDiagnostics),
            path: None,
            data: OnceCell::new(),
            dirty: false,
        }
    }

    /// Replace the sink this table reports to.
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn time_board() -> Self {
        Self::new(Family::TimeBoard)
    }

    pub fn sprint_list() -> Self {
        Self::new(Family::SprintList)
    }

    pub fn story_list() -> Self {
        Self::new(Family::StoryList)
    }

    pub fn task_list() -> Self {
        Self::new(Family::TaskList)
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn schema(&self) -> &'static Schema {
        self.family.schema()
    }

    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_materialized(&self) -> bool {
        self.data.get().is_some()
    }

    /// Dialect in use, once the file has been materialized.
    pub fn dialect(&self) -> Option<Dialect> {
        self.data.get().map(|d| d.dialect)
    }

    /// Bind to `path`. Rebinding to the current path is a no-op; any other
    /// path drops in-memory rows and the dirty flag. Never touches the file.
    pub fn load(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        if self.path.as_deref() == Some(path) {
            self.report(Severity::Debug, "already bound, load skipped");
            return;
        }
        self.path = Some(path.to_path_buf());
        self.data = OnceCell::new();
        self.dirty = false;
        self.report(Severity::Debug, "bound");
    }

    /// Bind to `path` as a new, empty file. The table starts dirty so the next
    /// `save` writes the header even if no rows are added.
    pub fn create(&mut self, path: impl AsRef<Path>) {
        let dialect = Dialect::with_delimiter(self.options.default_delimiter_byte());
        self.path = Some(path.as_ref().to_path_buf());
        self.data = OnceCell::with_value(RawTable {
            dialect,
            headers: self.canonical_headers(),
            rows: Vec::new(),
        });
        self.dirty = true;
        self.report(Severity::Debug, "created empty table");
    }

    /// Cell at (`row`, `column`), materializing the file on first use.
    /// `Ok(None)` when either index is out of bounds.
    pub fn read_cell(&self, row: usize, column: usize) -> Result<Option<&str>> {
        let data = self.loaded()?;
        Ok(data
            .rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str))
    }

    pub fn row_count(&self) -> Result<usize> {
        Ok(self.loaded()?.rows.len())
    }

    pub fn row(&self, index: usize) -> Result<Option<&[String]>> {
        Ok(self.loaded()?.rows.get(index).map(Vec::as_slice))
    }

    /// Header currently held in memory.
    pub fn headers(&self) -> Result<&[String]> {
        Ok(&self.loaded()?.headers)
    }

    /// Rows addressed by `set`, in its order. Indices past the end are skipped.
    pub fn rows(&self, set: &RowSet) -> Result<Vec<&[String]>> {
        let data = self.loaded()?;
        Ok(match set {
            RowSet::All => data.rows.iter().map(Vec::as_slice).collect(),
            RowSet::Indices(indices) => indices
                .iter()
                .filter_map(|&i| data.rows.get(i))
                .map(Vec::as_slice)
                .collect(),
        })
    }

    /// Replace row `index`. The table must already be materialized and the
    /// index in range; a failed call leaves rows and dirty flag untouched.
    pub fn set_row<I, S>(&mut self, index: usize, values: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = self.checked_row(values)?;
        let headers = self.canonical_headers();
        let data = self
            .data
            .get_mut()
            .ok_or(StoreError::OutOfRange { index, len: 0 })?;
        let len = data.rows.len();
        let slot = data
            .rows
            .get_mut(index)
            .ok_or(StoreError::OutOfRange { index, len })?;
        *slot = values;
        data.headers = headers;
        self.dirty = true;
        Ok(())
    }

    /// Append a row, materializing first if needed. Returns its index.
    pub fn append_row<I, S>(&mut self, values: I) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = self.checked_row(values)?;
        self.loaded()?;
        let headers = self.canonical_headers();
        let data = self.data.get_mut().ok_or(StoreError::Unbound)?;
        data.rows.push(values);
        data.headers = headers;
        self.dirty = true;
        Ok(data.rows.len() - 1)
    }

    /// Write header and every row back to the bound file, if dirty.
    ///
    /// Rows go to a temporary file next to the target which is then renamed
    /// over it, so readers never observe a half-written file.
    #[tracing::instrument(level = "debug", skip(self), fields(path = ?self.path))]
    pub fn save(&mut self) -> Result<SaveOutcome> {
        if !self.dirty {
            self.report(Severity::Debug, "clean, save skipped");
            return Ok(SaveOutcome::Unchanged);
        }
        let path = self.path.clone().ok_or(StoreError::Unbound)?;
        let data = self.data.get().ok_or(StoreError::Unbound)?;

        if let Err(e) = write_atomically(&path, self.schema(), data) {
            self.report(Severity::Error, format!("save failed: {}", e));
            return Err(e);
        }

        let written = data.rows.len();
        self.dirty = false;
        self.report(Severity::Debug, format!("wrote {} rows", written));
        Ok(SaveOutcome::Written)
    }

    /// All-rows selection over this table.
    pub fn query(&self) -> Selection<'_> {
        Selection::all(self)
    }

    fn loaded(&self) -> Result<&RawTable> {
        let path = self.path.as_deref().ok_or(StoreError::Unbound)?;
        self.data.get_or_try_init(|| {
            self.materialize(path).map_err(|e| {
                self.report(Severity::Error, e.to_string());
                e
            })
        })
    }

    #[tracing::instrument(level = "debug", skip(self), fields(family = %self.family))]
    fn materialize(&self, path: &Path) -> Result<RawTable> {
        // 1) read the whole file; the handle is closed before parsing
        let bytes = fs::read(path).map_err(|e| StoreError::io(path, e))?;
        let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);

        // 2) sniff the dialect from the leading sample
        let sample_len = body.len().min(self.options.sniff_bytes);
        let dialect = sniff(
            &body[..sample_len],
            sample_len < body.len(),
            Some(self.schema().width()),
            &self.options,
        )
        .ok_or_else(|| StoreError::DialectUndetected {
            path: path.to_path_buf(),
        })?;
        self.report(
            Severity::Debug,
            format!(
                "dialect delimiter={:?} quote={:?}",
                dialect.delimiter as char, dialect.quote as char
            ),
        );

        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(dialect.delimiter)
            .quote(dialect.quote)
            .from_reader(body);
        let mut records = rdr.records();

        // 3) header must equal the schema, label for label
        let schema = self.schema();
        let headers: Vec<String> = match records.next() {
            Some(rec) => rec
                .map_err(|e| StoreError::csv(path, e))?
                .iter()
                .map(str::to_string)
                .collect(),
            None => Vec::new(),
        };
        if !schema.matches_header(headers.as_slice()) {
            return Err(StoreError::BadHeader {
                path: path.to_path_buf(),
                expected: self.canonical_headers(),
                found: headers,
            });
        }

        // 4) data rows, width-checked
        let width = schema.width();
        let mut rows = Vec::new();
        for rec in records {
            let rec = rec.map_err(|e| StoreError::csv(path, e))?;
            let line = rec.position().map_or(0, |p| p.line());
            let found = rec.len();
            if found > width || (found < width && self.options.strict_width) {
                return Err(StoreError::MalformedRow {
                    path: path.to_path_buf(),
                    line,
                    expected: width,
                    found,
                });
            }
            if found < width {
                self.report(
                    Severity::Warning,
                    format!("line {} has {} of {} fields, kept", line, found, width),
                );
            }
            rows.push(rec.iter().map(str::to_string).collect());
        }

        self.report(Severity::Debug, format!("materialized {} rows", rows.len()));
        Ok(RawTable {
            dialect,
            headers,
            rows,
        })
    }

    fn checked_row<I, S>(&self, values: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        let expected = self.schema().width();
        if values.len() != expected {
            return Err(StoreError::RowWidth {
                expected,
                found: values.len(),
            });
        }
        Ok(values)
    }

    fn canonical_headers(&self) -> Vec<String> {
        self.schema().labels().map(str::to_string).collect()
    }

    fn report(&self, severity: Severity, message: impl Into<String>) {
        self.diagnostics
            .report(Diagnostic::new(severity, self.path.as_deref(), message));
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("family", &self.family)
            .field("path", &self.path)
            .field("materialized", &self.is_materialized())
            .field("dirty", &self.dirty)
            .finish()
    }
}

fn write_atomically(path: &Path, schema: &Schema, data: &RawTable) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| StoreError::io(dir, e))?;
    {
        let mut wtr = WriterBuilder::new()
            .delimiter(data.dialect.delimiter)
            .quote(data.dialect.quote)
            .flexible(true)
            .from_writer(tmp.as_file_mut());
        wtr.write_record(schema.labels())
            .map_err(|e| StoreError::csv(path, e))?;
        for row in &data.rows {
            wtr.write_record(row).map_err(|e| StoreError::csv(path, e))?;
        }
        wtr.flush().map_err(|e| StoreError::io(path, e))?;
    }
    // the temp file is created 0600; carry over the mode of the file it replaces
    if let Ok(meta) = fs::metadata(path) {
        tmp.as_file()
            .set_permissions(meta.permissions())
            .map_err(|e| StoreError::io(path, e))?;
    }
    tmp.persist(path)
        .map_err(|e| StoreError::io(path, e.error))?;
    Ok(())
}
