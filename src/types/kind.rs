//! The fixed enumeration of SQL value types

use std::fmt;

/// Type tag carried by every [`super::Value`].
///
/// The set is partitioned into families; the family predicates below are
/// what the rest of the engine dispatches on, not individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    Null,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Decimal,
    VarChar,
    Char,
    Text,
    Blob,
    VarBinary,
    Binary,
    Bit,
    Datetime,
    Date,
    Time,
    Timestamp,
    Tuple,
    /// Placeholder for an unevaluated expression; never convertible to bytes.
    Expression,
}

impl DataKind {
    /// Signed integer family.
    pub fn is_signed(self) -> bool {
        matches!(
            self,
            DataKind::Int8 | DataKind::Int16 | DataKind::Int32 | DataKind::Int64
        )
    }

    /// Unsigned integer family.
    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            DataKind::UInt8 | DataKind::UInt16 | DataKind::UInt32 | DataKind::UInt64
        )
    }

    /// Signed or unsigned integer.
    pub fn is_integral(self) -> bool {
        self.is_signed() || self.is_unsigned()
    }

    pub fn is_float(self) -> bool {
        matches!(self, DataKind::Float32 | DataKind::Float64)
    }

    /// Types whose SQL literal form requires surrounding quotes.
    pub fn is_quoted(self) -> bool {
        self.is_text() || self.is_binary()
    }

    /// Collatable text types.
    pub fn is_text(self) -> bool {
        matches!(self, DataKind::VarChar | DataKind::Char | DataKind::Text)
    }

    /// Raw byte-string types.
    pub fn is_binary(self) -> bool {
        matches!(self, DataKind::Blob | DataKind::VarBinary | DataKind::Binary)
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataKind::Null => "NULL",
            DataKind::Int8 => "INT8",
            DataKind::Int16 => "INT16",
            DataKind::Int32 => "INT32",
            DataKind::Int64 => "INT64",
            DataKind::UInt8 => "UINT8",
            DataKind::UInt16 => "UINT16",
            DataKind::UInt32 => "UINT32",
            DataKind::UInt64 => "UINT64",
            DataKind::Float32 => "FLOAT32",
            DataKind::Float64 => "FLOAT64",
            DataKind::Decimal => "DECIMAL",
            DataKind::VarChar => "VARCHAR",
            DataKind::Char => "CHAR",
            DataKind::Text => "TEXT",
            DataKind::Blob => "BLOB",
            DataKind::VarBinary => "VARBINARY",
            DataKind::Binary => "BINARY",
            DataKind::Bit => "BIT",
            DataKind::Datetime => "DATETIME",
            DataKind::Date => "DATE",
            DataKind::Time => "TIME",
            DataKind::Timestamp => "TIMESTAMP",
            DataKind::Tuple => "TUPLE",
            DataKind::Expression => "EXPRESSION",
        };
        f.write_str(name)
    }
}
