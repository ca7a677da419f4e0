//! Value representations.
//!
//! Three layers exist:
//! - [`Value`] is the dynamic host value tree produced by `Reflect::to_value`.
//! - [`SqlValue`] is a bindable wire value exchanged with a driver.
//! - [`SqlArgument`] is what an encoder produces: a bound value, an inline SQL
//!   token, or a SQL function call wrapping further arguments.

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::ValueError;
use crate::geo::Point;

/// Raw JSON document stored verbatim in a JSON column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RawJson(pub String);

impl RawJson {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Dynamic host value.
///
/// `Option<T>` is transparent: `None` is [`Value::Null`] and `Some(v)` is the
/// value of `v`. Records hold their fields positionally in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Time(DateTime<Utc>),
    Uuid(Uuid),
    Json(String),
    Point(Point),
    LineString(Vec<Point>),
    Array(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Record(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` if the value equals the zero value of its variant.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Int(v) => *v == 0,
            Value::Uint(v) => *v == 0,
            Value::Float(v) => *v == 0.0,
            Value::String(s) => s.is_empty(),
            Value::Bytes(b) => b.is_empty(),
            Value::Time(t) => *t == DateTime::<Utc>::default(),
            Value::Uuid(u) => u.is_nil(),
            Value::Json(s) => s.is_empty(),
            Value::Point(p) => *p == Point::default(),
            Value::LineString(points) => points.is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::Map(entries) => entries.is_empty(),
            Value::Record(fields) => fields.iter().all(Value::is_zero),
        }
    }

    /// Name of the variant, used in error messages.
    pub fn variant_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Uint(_) => "uint",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Time(_) => "time",
            Value::Uuid(_) => "uuid",
            Value::Json(_) => "json",
            Value::Point(_) => "point",
            Value::LineString(_) => "linestring",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Record(_) => "record",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Json(s) => Some(s),
            _ => None,
        }
    }

    /// Unwraps a record value, checking the field count.
    pub fn into_record(
        self,
        record: &'static str,
        expected: usize,
    ) -> Result<Vec<Value>, ValueError> {
        match self {
            Value::Record(fields) if fields.len() == expected => Ok(fields),
            Value::Record(fields) => Err(ValueError::FieldCount {
                record,
                expected,
                got: fields.len(),
            }),
            other => Err(ValueError::TypeMismatch {
                expected: "record",
                got: other.variant_name(),
            }),
        }
    }
}

/// Bindable wire value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Time(DateTime<Utc>),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    pub fn variant_name(&self) -> &'static str {
        match self {
            SqlValue::Null => "NULL",
            SqlValue::Bool(_) => "bool",
            SqlValue::Int(_) => "int",
            SqlValue::Uint(_) => "uint",
            SqlValue::Float(_) => "float",
            SqlValue::Text(_) => "text",
            SqlValue::Bytes(_) => "bytes",
            SqlValue::Time(_) => "time",
        }
    }

    /// Borrows textual content of `Text` and valid UTF-8 `Bytes` values.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            SqlValue::Bytes(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => f.write_str("NULL"),
            SqlValue::Bool(b) => write!(f, "{b}"),
            SqlValue::Int(v) => write!(f, "{v}"),
            SqlValue::Uint(v) => write!(f, "{v}"),
            SqlValue::Float(v) => write!(f, "{v}"),
            SqlValue::Text(s) => write!(f, "{s:?}"),
            SqlValue::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            SqlValue::Time(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S%.6f")),
        }
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(i64::from(v))
    }
}

impl From<u64> for SqlValue {
    fn from(v: u64) -> Self {
        SqlValue::Uint(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Float(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(v: Vec<u8>) -> Self {
        SqlValue::Bytes(v)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(v: DateTime<Utc>) -> Self {
        SqlValue::Time(v)
    }
}

/// Encoder output.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlArgument {
    /// Bound through a placeholder.
    Value(SqlValue),
    /// Written inline into the SQL text.
    Raw(String),
    /// SQL function call over further arguments, e.g. `UUID_TO_BIN(?)`.
    Call {
        func: String,
        args: Vec<SqlArgument>,
    },
}

impl SqlArgument {
    pub fn null() -> Self {
        SqlArgument::Value(SqlValue::Null)
    }

    pub fn bind(value: impl Into<SqlValue>) -> Self {
        SqlArgument::Value(value.into())
    }

    pub fn call(func: impl Into<String>, args: Vec<SqlArgument>) -> Self {
        SqlArgument::Call {
            func: func.into(),
            args,
        }
    }

    /// Returns the bound value if this argument is a plain value.
    pub fn as_value(&self) -> Option<&SqlValue> {
        match self {
            SqlArgument::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl From<SqlValue> for SqlArgument {
    fn from(v: SqlValue) -> Self {
        SqlArgument::Value(v)
    }
}
