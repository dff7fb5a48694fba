//! Bridge between language-native values and [`super::Value`]

use bytes::Bytes;
use chrono::{DateTime, FixedOffset};

use super::DataKind;
use super::Value;

/// The closed set of native values the engine converts from and to.
///
/// Unsupported host types are unrepresentable by construction, so
/// [`Value::from_native`] is only fallible for [`Native::Bind`] payloads,
/// which must still parse against their declared kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Native {
    Null,
    Bytes(Bytes),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    Str(String),
    /// Formatted as `YYYY-MM-DD HH:MM:SS` in the timestamp's own zone.
    Datetime(DateTime<FixedOffset>),
    /// An already-built value; converts by identity.
    Value(Value),
    /// A typed bind variable: kind plus unparsed bytes.
    Bind(DataKind, Bytes),
}

impl From<i64> for Native {
    fn from(v: i64) -> Self {
        Native::Int64(v)
    }
}

impl From<u64> for Native {
    fn from(v: u64) -> Self {
        Native::UInt64(v)
    }
}

impl From<f64> for Native {
    fn from(v: f64) -> Self {
        Native::Float64(v)
    }
}

impl From<&str> for Native {
    fn from(v: &str) -> Self {
        Native::Str(v.to_string())
    }
}

impl From<String> for Native {
    fn from(v: String) -> Self {
        Native::Str(v)
    }
}

impl From<Vec<u8>> for Native {
    fn from(v: Vec<u8>) -> Self {
        Native::Bytes(Bytes::from(v))
    }
}

impl From<Value> for Native {
    fn from(v: Value) -> Self {
        Native::Value(v)
    }
}
