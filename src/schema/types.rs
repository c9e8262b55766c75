// src/schema/types.rs

use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared value kind of a column; picks the coercion used by filters.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Calendar date written as `yyyymmdd`.
    Date,
    Int,
    Float,
    Str,
}

impl ColumnKind {
    /// Whether range filters make sense for this kind.
    pub fn is_ordered(self) -> bool {
        !matches!(self, ColumnKind::Str)
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColumnKind::Date => "date",
            ColumnKind::Int => "int",
            ColumnKind::Float => "float",
            ColumnKind::Str => "str",
        })
    }
}

/// A single column definition: the literal header label plus its kind.
#[derive(Debug, PartialEq, Clone, Copy, Eq, Hash)]
pub struct Column {
    pub label: &'static str,
    pub kind: ColumnKind,
}

impl Column {
    pub const fn new(label: &'static str, kind: ColumnKind) -> Self {
        Self { label, kind }
    }
}

/// Ordered column list of one record family.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Schema {
    pub name: &'static str,
    pub columns: &'static [Column],
}

impl Schema {
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Header labels in file order.
    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|c| c.label)
    }

    /// Index of the column carrying `label`.
    pub fn position(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.label == label)
    }

    /// Label-for-label, order-sensitive comparison against a parsed header.
    pub fn matches_header<S: AsRef<str>>(&self, header: &[S]) -> bool {
        header.len() == self.width()
            && self
                .labels()
                .zip(header)
                .all(|(want, got)| want == AsRef::<str>::as_ref(got))
    }
}
