// src/query/value.rs

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;

use crate::schema::ColumnKind;

/// A cell coerced to its column's declared kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Date(NaiveDate),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Coerce raw cell text according to `kind`. `None` if it doesn't parse.
    pub fn coerce(kind: ColumnKind, raw: &str) -> Option<Value> {
        match kind {
            ColumnKind::Date => parse_yyyymmdd(raw).map(Value::Date),
            ColumnKind::Int => raw.trim().parse().ok().map(Value::Int),
            ColumnKind::Float => raw.trim().parse().ok().map(Value::Float),
            ColumnKind::Str => Some(Value::Text(raw.to_string())),
        }
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            Value::Date(_) => ColumnKind::Date,
            Value::Int(_) => ColumnKind::Int,
            Value::Float(_) => ColumnKind::Float,
            Value::Text(_) => ColumnKind::Str,
        }
    }

    /// Fit a caller-supplied value to a column of `kind`.
    ///
    /// Text is parsed as that kind; ints and floats are interchangeable.
    /// `None` when the value can never compare with cells of that column.
    pub fn conform(self, kind: ColumnKind) -> Option<Value> {
        match (self, kind) {
            (Value::Text(s), k) => Value::coerce(k, &s),
            (v @ Value::Date(_), ColumnKind::Date) => Some(v),
            (v @ (Value::Int(_) | Value::Float(_)), ColumnKind::Int | ColumnKind::Float) => Some(v),
            _ => None,
        }
    }
}

/// Dates, numbers and text each order among themselves; ints and floats
/// compare numerically. Values of unrelated kinds are unordered.
impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Date(a), Value::Date(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Text(a), Value::Text(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Date(d) => f.write_str(&format_yyyymmdd(*d)),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// Strict `yyyymmdd`: exactly eight ASCII digits forming a real date.
pub fn parse_yyyymmdd(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = s[0..4].parse().ok()?;
    let month: u32 = s[4..6].parse().ok()?;
    let day: u32 = s[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Canonical on-disk text for a date.
pub fn format_yyyymmdd(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}
