use std::fmt;

use jiff::{Zoned, civil::Date};

use crate::{
    geometry::Geometry,
    temporal::{self, Period},
};

/// A literal value carried by the filter tree.
///
/// Integers and floats are kept apart so that `10` and `10.0` encode back
/// to the text they were read from.
///
/// # Examples
///
/// ```
/// use cql_lang::Value;
///
/// let count = Value::Integer(42);
/// let ratio = Value::Float(0.5);
/// let name = Value::String("O'Brien".to_string());
///
/// assert_eq!(count.as_float(), Some(42.0));
/// assert_eq!(ratio.as_int(), None);
/// assert_eq!(name.to_string(), "O'Brien");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),

    /// Integer number (64-bit signed)
    Integer(i64),

    /// Floating-point number
    Float(f64),

    /// UTF-8 string
    String(String),

    /// Calendar date without time of day
    Date(Date),

    /// Instant with a fixed UTC offset
    DateTime(Zoned),

    /// Closed time interval
    Period(Period),

    Geometry(Geometry),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::Period(_) => "period",
            Value::Geometry(_) => "geometry",
        }
    }

    /// Get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as integer; floats are not truncated
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_geometry(&self) -> Option<&Geometry> {
        match self {
            Value::Geometry(g) => Some(g),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{:?}", n),
            Value::String(s) => f.write_str(s),
            Value::Date(d) => f.write_str(&temporal::format_date(d)),
            Value::DateTime(z) => f.write_str(&temporal::format_date_time(z)),
            Value::Period(p) => write!(f, "{}", p),
            Value::Geometry(g) => write!(f, "{}", g),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Geometry> for Value {
    fn from(g: Geometry) -> Self {
        Value::Geometry(g)
    }
}
