//! The typed SQL scalar and its canonical byte encodings

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bytes::Bytes;

use crate::error::{EngineError, Result};

use super::escape::{DONT_ESCAPE, SQL_ENCODE_MAP};
use super::kind::DataKind;
use super::native::Native;

/// The unique NULL value: empty bytes, [`DataKind::Null`].
pub const NULL: Value = Value {
    kind: DataKind::Null,
    raw: Bytes::new(),
};

/// A typed SQL scalar.
///
/// For integral and float kinds the bytes are always the canonical decimal
/// ASCII representation, matching how MySQL returns such values over the
/// text protocol. Values are immutable once constructed; cloning shares the
/// underlying bytes by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value {
    kind: DataKind,
    raw: Bytes,
}

fn parse_ascii<T: FromStr>(raw: &[u8]) -> Result<T>
where
    T::Err: fmt::Display,
{
    let s = std::str::from_utf8(raw)
        .map_err(|e| EngineError::Type(format!("invalid utf-8 in numeric value: {e}")))?;
    s.parse::<T>()
        .map_err(|e| EngineError::Type(format!("{e}: {s:?}")))
}

impl Value {
    /// Builds a value, validating `raw` against `kind`.
    ///
    /// Integral and float payloads are parsed and re-emitted in canonical
    /// form; `Decimal` is parse-verified but keeps its input bytes; quoted
    /// kinds, `Bit` and `Null` admit any payload. All other kinds are
    /// rejected.
    pub fn validated(kind: DataKind, raw: impl Into<Bytes>) -> Result<Value> {
        let raw = raw.into();
        if kind.is_signed() {
            let v: i64 = parse_ascii(&raw)?;
            Ok(Value::trusted(kind, v.to_string()))
        } else if kind.is_unsigned() {
            let v: u64 = parse_ascii(&raw)?;
            Ok(Value::trusted(kind, v.to_string()))
        } else if kind.is_float() {
            let v: f64 = parse_ascii(&raw)?;
            Ok(Value::trusted(kind, v.to_string()))
        } else if kind == DataKind::Decimal {
            let _: f64 = parse_ascii(&raw)?;
            Ok(Value::trusted(kind, raw))
        } else if kind.is_quoted() || kind == DataKind::Bit || kind == DataKind::Null {
            Ok(Value::trusted(kind, raw))
        } else {
            Err(EngineError::Type(format!(
                "invalid kind for validated value: {kind}"
            )))
        }
    }

    /// Builds a value without validation. The sole fast path.
    ///
    /// The caller asserts that `raw` already conforms to the canonical rules
    /// for `kind`. A `Null` kind yields [`NULL`] regardless of the payload.
    pub fn trusted(kind: DataKind, raw: impl Into<Bytes>) -> Value {
        if kind == DataKind::Null {
            return NULL;
        }
        Value {
            kind,
            raw: raw.into(),
        }
    }

    /// Like [`Value::validated`], but floats keep the input byte form after
    /// parse-verification, and kinds outside the numeric families admit any
    /// payload. This is the bind-variable path.
    pub fn from_bytes(kind: DataKind, raw: impl Into<Bytes>) -> Result<Value> {
        let raw = raw.into();
        if kind.is_signed() {
            let v: i64 = parse_ascii(&raw)?;
            Ok(Value::trusted(kind, v.to_string()))
        } else if kind.is_unsigned() {
            let v: u64 = parse_ascii(&raw)?;
            Ok(Value::trusted(kind, v.to_string()))
        } else if kind.is_float() || kind == DataKind::Decimal {
            let _: f64 = parse_ascii(&raw)?;
            Ok(Value::trusted(kind, raw))
        } else {
            Ok(Value::trusted(kind, raw))
        }
    }

    /// Builds a value from a native host value.
    pub fn from_native(native: impl Into<Native>) -> Result<Value> {
        match native.into() {
            Native::Null => Ok(NULL),
            Native::Bytes(b) => Ok(Value::trusted(DataKind::VarBinary, b)),
            Native::Int8(v) => Ok(Value::int8(v)),
            Native::Int16(v) => Ok(Value::int16(v)),
            Native::Int32(v) => Ok(Value::int32(v)),
            Native::Int64(v) => Ok(Value::int64(v)),
            Native::UInt8(v) => Ok(Value::uint8(v)),
            Native::UInt16(v) => Ok(Value::uint16(v)),
            Native::UInt32(v) => Ok(Value::uint32(v)),
            Native::UInt64(v) => Ok(Value::uint64(v)),
            Native::Float32(v) => Ok(Value::trusted(DataKind::Float32, v.to_string())),
            Native::Float64(v) => Ok(Value::float64(v)),
            Native::Str(s) => Ok(Value::varchar(s)),
            Native::Datetime(ts) => Ok(Value::trusted(
                DataKind::Datetime,
                ts.format("%Y-%m-%d %H:%M:%S").to_string(),
            )),
            Native::Value(v) => Ok(v),
            Native::Bind(kind, raw) => Value::from_bytes(kind, raw),
        }
    }

    /// Builds an integral value from its text form. `Int64` is preferred;
    /// values beyond `i64::MAX` fall back to `UInt64`.
    pub fn integral(text: &str) -> Result<Value> {
        if let Ok(signed) = text.parse::<i64>() {
            return Ok(Value::trusted(DataKind::Int64, signed.to_string()));
        }
        let unsigned = text
            .parse::<u64>()
            .map_err(|e| EngineError::Type(format!("{e}: {text:?}")))?;
        Ok(Value::trusted(DataKind::UInt64, unsigned.to_string()))
    }

    pub fn int8(v: i8) -> Value {
        Value::trusted(DataKind::Int8, v.to_string())
    }

    pub fn int16(v: i16) -> Value {
        Value::trusted(DataKind::Int16, v.to_string())
    }

    pub fn int32(v: i32) -> Value {
        Value::trusted(DataKind::Int32, v.to_string())
    }

    pub fn int64(v: i64) -> Value {
        Value::trusted(DataKind::Int64, v.to_string())
    }

    pub fn uint8(v: u8) -> Value {
        Value::trusted(DataKind::UInt8, v.to_string())
    }

    pub fn uint16(v: u16) -> Value {
        Value::trusted(DataKind::UInt16, v.to_string())
    }

    pub fn uint32(v: u32) -> Value {
        Value::trusted(DataKind::UInt32, v.to_string())
    }

    pub fn uint64(v: u64) -> Value {
        Value::trusted(DataKind::UInt64, v.to_string())
    }

    pub fn float64(v: f64) -> Value {
        Value::trusted(DataKind::Float64, v.to_string())
    }

    pub fn varchar(v: impl Into<String>) -> Value {
        Value::trusted(DataKind::VarChar, v.into())
    }

    pub fn varbinary(v: impl Into<Bytes>) -> Value {
        Value::trusted(DataKind::VarBinary, v)
    }

    pub fn kind(&self) -> DataKind {
        self.kind
    }

    /// The internal byte representation.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// The bytes as MySQL would return them. `None` for `Expression`,
    /// which is not convertible.
    pub fn to_bytes(&self) -> Option<&[u8]> {
        if self.kind == DataKind::Expression {
            return None;
        }
        Some(&self.raw)
    }

    /// Checked text view of the payload. `None` for `Expression` or when
    /// the bytes are not valid UTF-8; the byte-faithful form is
    /// [`Value::to_bytes`].
    pub fn as_str(&self) -> Option<&str> {
        if self.kind == DataKind::Expression {
            return None;
        }
        std::str::from_utf8(&self.raw).ok()
    }

    pub fn is_null(&self) -> bool {
        self.kind == DataKind::Null
    }

    pub fn is_integral(&self) -> bool {
        self.kind.is_integral()
    }

    pub fn is_signed(&self) -> bool {
        self.kind.is_signed()
    }

    pub fn is_unsigned(&self) -> bool {
        self.kind.is_unsigned()
    }

    pub fn is_float(&self) -> bool {
        self.kind.is_float()
    }

    pub fn is_quoted(&self) -> bool {
        self.kind.is_quoted()
    }

    pub fn is_text(&self) -> bool {
        self.kind.is_text()
    }

    pub fn is_binary(&self) -> bool {
        self.kind.is_binary()
    }

    /// Encodes the value as an SQL literal. Writer failures are
    /// unrecoverable (encoders target in-memory buffers).
    pub fn encode_sql<W: Write>(&self, w: &mut W) -> Result<()> {
        if self.kind == DataKind::Null {
            w.write_all(b"null")?;
        } else if self.kind.is_quoted() {
            encode_bytes_sql(&self.raw, w)?;
        } else if self.kind == DataKind::Bit {
            encode_bytes_sql_bits(&self.raw, w)?;
        } else {
            w.write_all(&self.raw)?;
        }
        Ok(())
    }

    /// Encodes the value using 7-bit clean ASCII bytes: quoted and bit
    /// payloads become single-quoted base64.
    pub fn encode_ascii<W: Write>(&self, w: &mut W) -> Result<()> {
        if self.kind == DataKind::Null {
            w.write_all(b"null")?;
        } else if self.kind.is_quoted() || self.kind == DataKind::Bit {
            w.write_all(b"'")?;
            w.write_all(BASE64.encode(&self.raw).as_bytes())?;
            w.write_all(b"'")?;
        } else {
            w.write_all(&self.raw)?;
        }
        Ok(())
    }

    /// JSON form of the value. A testing aid, not a general codec: quoted
    /// and bit values become JSON strings, NULL becomes `null`, numerics
    /// are emitted as bare literals. String payloads are rendered byte for
    /// byte, never transcoded.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        if self.kind.is_quoted() || self.kind == DataKind::Bit {
            let mut out = Vec::with_capacity(self.raw.len() + 2);
            encode_json_bytes(&self.raw, &mut out);
            Ok(out)
        } else if self.kind == DataKind::Null {
            Ok(b"null".to_vec())
        } else {
            Ok(self.raw.to_vec())
        }
    }

    /// Inverse of [`Value::to_json`], dispatching on the first byte:
    /// `-` signed integer, `"` byte string, `n` null, otherwise unsigned.
    pub fn from_json(data: &[u8]) -> Result<Value> {
        let first = *data
            .first()
            .ok_or_else(|| EngineError::Type("error unmarshaling empty bytes".into()))?;
        let native = match first {
            b'-' => {
                let v: i64 = serde_json::from_slice(data)
                    .map_err(|e| EngineError::Type(e.to_string()))?;
                Native::Int64(v)
            }
            b'"' => {
                let s: String = serde_json::from_slice(data)
                    .map_err(|e| EngineError::Type(e.to_string()))?;
                Native::Bytes(Bytes::from(s.into_bytes()))
            }
            b'n' => {
                let v: serde_json::Value = serde_json::from_slice(data)
                    .map_err(|e| EngineError::Type(e.to_string()))?;
                if !v.is_null() {
                    return Err(EngineError::Type(format!("expected null, got {v}")));
                }
                Native::Null
            }
            _ => {
                let v: u64 = serde_json::from_slice(data)
                    .map_err(|e| EngineError::Type(e.to_string()))?;
                Native::UInt64(v)
            }
        };
        Value::from_native(native)
    }

    /// Converts to a native value: parsed numerics for the numeric
    /// families, raw bytes for everything else, `Null` for NULL.
    pub fn to_native(&self) -> Result<Native> {
        if self.kind == DataKind::Null {
            Ok(Native::Null)
        } else if self.kind.is_signed() {
            Ok(Native::Int64(self.parse_i64()?))
        } else if self.kind.is_unsigned() {
            Ok(Native::UInt64(self.parse_u64()?))
        } else if self.kind.is_float() {
            Ok(Native::Float64(self.parse_f64()?))
        } else {
            Ok(Native::Bytes(self.raw.clone()))
        }
    }

    /// Parses the payload as `i64`. Does not check the kind.
    pub fn parse_i64(&self) -> Result<i64> {
        parse_ascii(&self.raw)
    }

    /// Parses the payload as `u64`. Does not check the kind.
    pub fn parse_u64(&self) -> Result<u64> {
        parse_ascii(&self.raw)
    }

    /// Parses the payload as `f64`. Does not check the kind.
    pub fn parse_f64(&self) -> Result<f64> {
        parse_ascii(&self.raw)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == DataKind::Null {
            return f.write_str("NULL");
        }
        if self.kind.is_quoted() || self.kind == DataKind::Bit {
            write!(f, "{}(\"{}\")", self.kind, self.raw.escape_ascii())
        } else {
            write!(f, "{}({})", self.kind, self.raw.escape_ascii())
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::int64(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::uint64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::float64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::varchar(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::varchar(v)
    }
}

fn encode_bytes_sql<W: Write>(val: &[u8], w: &mut W) -> Result<()> {
    let mut buf = Vec::with_capacity(val.len() + 2);
    buf.push(b'\'');
    for &ch in val {
        let encoded = SQL_ENCODE_MAP[ch as usize];
        if encoded == DONT_ESCAPE {
            buf.push(ch);
        } else {
            buf.push(b'\\');
            buf.push(encoded);
        }
    }
    buf.push(b'\'');
    w.write_all(&buf)?;
    Ok(())
}

fn encode_bytes_sql_bits<W: Write>(val: &[u8], w: &mut W) -> Result<()> {
    w.write_all(b"b'")?;
    for &ch in val {
        write!(w, "{ch:08b}")?;
    }
    w.write_all(b"'")?;
    Ok(())
}

// JSON string form of arbitrary bytes: quotes, backslashes and control
// characters are escaped, every other byte is emitted verbatim, so the
// payload survives untouched.
fn encode_json_bytes(val: &[u8], out: &mut Vec<u8>) {
    out.push(b'"');
    for &ch in val {
        match ch {
            b'"' => out.extend_from_slice(b"\\\""),
            b'\\' => out.extend_from_slice(b"\\\\"),
            0x08 => out.extend_from_slice(b"\\b"),
            0x0C => out.extend_from_slice(b"\\f"),
            b'\n' => out.extend_from_slice(b"\\n"),
            b'\r' => out.extend_from_slice(b"\\r"),
            b'\t' => out.extend_from_slice(b"\\t"),
            _ if ch < 0x20 => {
                out.push(b'\\');
                out.push(b'u');
                out.extend_from_slice(format!("{ch:04x}").as_bytes());
            }
            _ => out.push(ch),
        }
    }
    out.push(b'"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sql(v: &Value) -> String {
        let mut buf = Vec::new();
        v.encode_sql(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn ascii(v: &Value) -> String {
        let mut buf = Vec::new();
        v.encode_ascii(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_null_identity() {
        let v = Value::trusted(DataKind::Null, "garbage".to_string());
        assert!(v.is_null());
        assert_eq!(v.len(), 0);
        assert_eq!(v, NULL);
    }

    #[test]
    fn test_validated_canonical_form() {
        assert!(Value::validated(DataKind::Int64, " 007 ".to_string()).is_err());
        let v = Value::validated(DataKind::Int64, "7".to_string()).unwrap();
        assert_eq!(v.raw(), b"7");
        assert_eq!(v, Value::int64(7));
        // Leading zeros are parsed and re-emitted canonically.
        let v = Value::validated(DataKind::Int64, "007".to_string()).unwrap();
        assert_eq!(v.raw(), b"7");
    }

    #[test]
    fn test_validated_bounds() {
        assert!(Value::validated(DataKind::UInt64, "-1".to_string()).is_err());
        assert!(Value::validated(DataKind::Int64, "abc".to_string()).is_err());
        assert!(Value::validated(DataKind::Float64, "1.2.3".to_string()).is_err());
        assert!(Value::validated(DataKind::Datetime, "2020-01-01".to_string()).is_err());
        assert!(Value::validated(DataKind::Expression, "f(x)".to_string()).is_err());
    }

    #[test]
    fn test_validated_float_recanonicalizes() {
        let v = Value::validated(DataKind::Float64, "1.50".to_string()).unwrap();
        assert_eq!(v.raw(), b"1.5");
    }

    #[test]
    fn test_from_bytes_float_preserves_input() {
        let v = Value::from_bytes(DataKind::Float64, "1.50".to_string()).unwrap();
        assert_eq!(v.raw(), b"1.50");
        assert!(Value::from_bytes(DataKind::Float64, "nope".to_string()).is_err());
        // Integers still re-emit canonically.
        let v = Value::from_bytes(DataKind::Int32, "007".to_string()).unwrap();
        assert_eq!(v.raw(), b"7");
    }

    #[test]
    fn test_validated_equals_trusted_on_canonical_input() {
        for x in [i64::MIN, -7, 0, 7, i64::MAX] {
            let formatted = x.to_string();
            let validated = Value::validated(DataKind::Int64, formatted.clone()).unwrap();
            let trusted = Value::trusted(DataKind::Int64, formatted);
            assert_eq!(validated, trusted);
            assert_eq!(validated.parse_i64().unwrap(), x);
        }
        for x in [0u64, 42, u64::MAX] {
            let formatted = x.to_string();
            let validated = Value::validated(DataKind::UInt64, formatted.clone()).unwrap();
            assert_eq!(validated, Value::trusted(DataKind::UInt64, formatted));
            assert_eq!(validated.parse_u64().unwrap(), x);
        }
    }

    #[test]
    fn test_integral_prefers_int64() {
        let v = Value::integral("42").unwrap();
        assert_eq!(v.kind(), DataKind::Int64);
        let v = Value::integral("-42").unwrap();
        assert_eq!(v.kind(), DataKind::Int64);
        // Beyond i64::MAX falls back to UInt64.
        let v = Value::integral("18446744073709551615").unwrap();
        assert_eq!(v.kind(), DataKind::UInt64);
        assert!(Value::integral("pear").is_err());
    }

    #[test]
    fn test_from_native_round_trip() {
        assert!(Value::from_native(Native::Null).unwrap().is_null());

        let v = Value::from_native(Native::Int16(-9)).unwrap();
        assert_eq!(v.kind(), DataKind::Int16);
        assert_eq!(v.raw(), b"-9");

        let v = Value::from_native(3.25f64).unwrap();
        assert_eq!(v.kind(), DataKind::Float64);
        assert_eq!(v.parse_f64().unwrap(), 3.25);

        let v = Value::from_native("hello").unwrap();
        assert_eq!(v.kind(), DataKind::VarChar);

        let v = Value::from_native(vec![1u8, 2, 3]).unwrap();
        assert_eq!(v.kind(), DataKind::VarBinary);

        let inner = Value::int64(5);
        assert_eq!(Value::from_native(inner.clone()).unwrap(), inner);

        let v = Value::from_native(Native::Bind(
            DataKind::Float64,
            Bytes::from_static(b"2.50"),
        ))
        .unwrap();
        assert_eq!(v.raw(), b"2.50");
    }

    #[test]
    fn test_from_native_datetime() {
        let ts = chrono::FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2020, 1, 2, 3, 4, 5)
            .unwrap();
        let v = Value::from_native(Native::Datetime(ts)).unwrap();
        assert_eq!(v.kind(), DataKind::Datetime);
        assert_eq!(v.raw(), b"2020-01-02 03:04:05");
    }

    #[test]
    fn test_expression_is_unconvertible() {
        let v = Value::trusted(DataKind::Expression, "a + b".to_string());
        assert_eq!(v.to_bytes(), None);
        assert_eq!(v.as_str(), None);
        // Raw access still works.
        assert_eq!(v.raw(), b"a + b");
    }

    #[test]
    fn test_encode_sql_scenarios() {
        assert_eq!(sql(&Value::varchar("he'llo")), r"'he\'llo'");
        assert_eq!(sql(&Value::varchar("tab\there")), "'tab\\there'");
        assert_eq!(
            sql(&Value::trusted(DataKind::Bit, vec![0x05])),
            "b'00000101'"
        );
        assert_eq!(sql(&NULL), "null");
        assert_eq!(sql(&Value::int64(-42)), "-42");
    }

    #[test]
    fn test_encode_sql_every_escapable_byte() {
        let payload: Vec<u8> = vec![0x00, b'\'', b'"', 0x08, b'\n', b'\r', b'\t', 0x1A, b'\\'];
        let v = Value::varbinary(payload);
        assert_eq!(sql(&v), "'\\0\\'\\\"\\b\\n\\r\\t\\Z\\\\'");
    }

    #[test]
    fn test_encode_ascii() {
        assert_eq!(ascii(&Value::varchar("abc")), "'YWJj'");
        assert_eq!(ascii(&Value::trusted(DataKind::Bit, vec![0x05])), "'BQ=='");
        assert_eq!(ascii(&NULL), "null");
        assert_eq!(ascii(&Value::uint32(9)), "9");
    }

    #[test]
    fn test_json_round_trip() {
        let v = Value::from_json(b"-42").unwrap();
        assert_eq!(v.kind(), DataKind::Int64);
        assert_eq!(v.to_json().unwrap(), b"-42");

        let v = Value::from_json(b"\"abc\"").unwrap();
        assert_eq!(v.kind(), DataKind::VarBinary);
        assert_eq!(v.raw(), b"abc");
        assert_eq!(v.to_json().unwrap(), b"\"abc\"");

        let v = Value::from_json(b"null").unwrap();
        assert!(v.is_null());
        assert_eq!(v.to_json().unwrap(), b"null");

        let v = Value::from_json(b"42").unwrap();
        assert_eq!(v.kind(), DataKind::UInt64);

        assert!(Value::from_json(b"").is_err());
        assert!(Value::from_json(b"not json").is_err());

        // Control characters are escaped on the way out and restored on the
        // way back in.
        let v = Value::varchar("a\nb");
        assert_eq!(v.to_json().unwrap(), b"\"a\\nb\"");
        let back = Value::from_json(&v.to_json().unwrap()).unwrap();
        assert_eq!(back.raw(), b"a\nb");
    }

    #[test]
    fn test_binary_payloads_survive_untouched() {
        // Bytes that are not valid UTF-8 must reach the JSON and display
        // forms unaltered.
        let v = Value::varbinary(vec![0xFF, b'a']);
        assert_eq!(v.to_json().unwrap(), vec![b'"', 0xFF, b'a', b'"']);
        assert_eq!(v.to_string(), "VARBINARY(\"\\xffa\")");
        assert_eq!(v.as_str(), None);
        assert_eq!(v.to_bytes(), Some(&[0xFF, b'a'][..]));

        let v = Value::trusted(DataKind::Bit, vec![0xFF]);
        assert_eq!(v.to_json().unwrap(), vec![b'"', 0xFF, b'"']);

        let v = Value::varchar("abc");
        assert_eq!(v.as_str(), Some("abc"));
    }

    #[test]
    fn test_to_native() {
        assert_eq!(Value::int64(-3).to_native().unwrap(), Native::Int64(-3));
        assert_eq!(Value::uint8(3).to_native().unwrap(), Native::UInt64(3));
        assert_eq!(
            Value::float64(1.5).to_native().unwrap(),
            Native::Float64(1.5)
        );
        assert_eq!(NULL.to_native().unwrap(), Native::Null);
        assert_eq!(
            Value::varchar("x").to_native().unwrap(),
            Native::Bytes(Bytes::from_static(b"x"))
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(NULL.to_string(), "NULL");
        assert_eq!(
            Value::varchar("he'llo").to_string(),
            "VARCHAR(\"he\\'llo\")"
        );
        assert_eq!(Value::int64(7).to_string(), "INT64(7)");
        assert_eq!(Value::float64(1.5).to_string(), "FLOAT64(1.5)");
    }
}
