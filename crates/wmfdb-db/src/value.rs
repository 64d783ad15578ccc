//! Column values, SQL literals and row decoding.

use std::fmt::Write as _;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use sqlx::mysql::MySqlRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};
use wmfdb_core::{Result, WmfdbError};

/// A single column value, either read from a row or passed as a query
/// argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Text(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
}

impl Value {
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Render as an SQL literal, safe to splice into a query.
    ///
    /// Strings use backslash escaping, so the server must not run with
    /// `NO_BACKSLASH_ESCAPES`. Bytes become hex literals.
    pub fn to_sql_literal(&self) -> Result<String> {
        Ok(match self {
            Self::Null => "NULL".to_string(),
            Self::Int(i) => i.to_string(),
            Self::UInt(u) => u.to_string(),
            Self::Float(f) => float_literal(*f)?,
            Self::Bool(b) => u8::from(*b).to_string(),
            Self::Text(s) => format!("'{}'", escape_string(s)),
            Self::Bytes(b) => hex_literal(b),
            Self::Date(d) => format!("'{}'", d.format("%Y-%m-%d")),
            Self::DateTime(dt) => format!("'{}'", format_datetime(dt)),
            Self::Time(t) => format!("'{}'", format_time(*t)),
        })
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Self::UInt(u)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Self::DateTime(dt)
    }
}

impl From<NaiveTime> for Value {
    fn from(t: NaiveTime) -> Self {
        Self::Time(t)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Backslash-escape the characters the server treats specially inside a
/// quoted string.
pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\0' => out.push_str("\\0"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x1a' => out.push_str("\\Z"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            _ => out.push(c),
        }
    }
    out
}

// The exponent suffix makes the server treat the literal as a DOUBLE, not a
// DECIMAL.
fn float_literal(f: f64) -> Result<String> {
    if !f.is_finite() {
        return Err(WmfdbError::value(format!("{f} can not be used with MySQL")));
    }
    let mut s = format!("{f:?}");
    if !s.contains('e') {
        s.push_str("e0");
    }
    Ok(s)
}

fn hex_literal(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2 + 3);
    out.push_str("X'");
    for b in bytes {
        let _ = write!(out, "{b:02X}");
    }
    out.push('\'');
    out
}

fn format_datetime(dt: &NaiveDateTime) -> String {
    if dt.nanosecond() == 0 {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
    }
}

fn format_time(t: NaiveTime) -> String {
    if t.nanosecond() == 0 {
        t.format("%H:%M:%S").to_string()
    } else {
        t.format("%H:%M:%S%.6f").to_string()
    }
}

pub(crate) type DecodeResult<T = Value> = std::result::Result<T, sqlx::Error>;

/// Decode column `idx` of `row` according to its server-side type.
///
/// Temporal values the chrono types can't hold (zero dates, negative or
/// >24h `TIME`s) come back as text.
pub(crate) fn decode_column(row: &MySqlRow, idx: usize) -> DecodeResult {
    if row.try_get_raw(idx)?.is_null() {
        return Ok(Value::Null);
    }
    let type_name = row.column(idx).type_info().name();
    let value = match type_name {
        "BOOLEAN" => Value::Bool(row.try_get_unchecked(idx)?),
        n if n.ends_with("UNSIGNED") => Value::UInt(row.try_get_unchecked(idx)?),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => {
            Value::Int(row.try_get_unchecked(idx)?)
        }
        "FLOAT" | "DOUBLE" => Value::Float(row.try_get_unchecked(idx)?),
        "DATE" => row
            .try_get_unchecked::<NaiveDate, _>(idx)
            .map_or_else(|_| text(row, idx), |d| Ok(Value::Date(d)))?,
        "DATETIME" | "TIMESTAMP" => row
            .try_get_unchecked::<NaiveDateTime, _>(idx)
            .map_or_else(|_| text(row, idx), |dt| Ok(Value::DateTime(dt)))?,
        "TIME" => row
            .try_get_unchecked::<NaiveTime, _>(idx)
            .map_or_else(|_| text(row, idx), |t| Ok(Value::Time(t)))?,
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BIT"
        | "GEOMETRY" => Value::Bytes(row.try_get_unchecked(idx)?),
        _ => text(row, idx)?,
    };
    Ok(value)
}

fn text(row: &MySqlRow, idx: usize) -> DecodeResult {
    row.try_get_unchecked::<String, _>(idx).map(Value::Text)
}
