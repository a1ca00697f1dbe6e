//! Defines the `Value` enum stored in every field of a [`crate::WeatherRecord`].

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use std::fmt;

/// A single variable value inside a weather record.
///
/// Weather tables are heterogeneous: most variables are numeric, but rows also
/// carry timestamps, step durations and occasionally categorical data (e.g. a
/// condition code stored as text). Reducers other than `First`/`Last` only
/// accept the numeric variants ([`Value::Float`] and [`Value::Int`]).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Float(f64),
    Int(i64),
    Bool(bool),
    Text(String),
    Timestamp(DateTime<Utc>),
    Date(NaiveDate),
    Duration(TimeDelta),
}

impl Value {
    /// Returns the value as `f64` if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// The civil date of a `Timestamp` or `Date` value.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Timestamp(dt) => Some(dt.date_naive()),
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Short type name, used in error messages and frame conversion warnings.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Float(_) => "float",
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::Text(_) => "text",
            Value::Timestamp(_) => "timestamp",
            Value::Date(_) => "date",
            Value::Duration(_) => "duration",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Float(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "{}", v),
            Value::Timestamp(v) => write!(f, "{}", v),
            Value::Date(v) => write!(f, "{}", v),
            Value::Duration(v) => write!(f, "{}s", v.num_milliseconds() as f64 / 1000.0),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value as f64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<TimeDelta> for Value {
    fn from(value: TimeDelta) -> Self {
        Value::Duration(value)
    }
}
