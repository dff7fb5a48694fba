//! Column descriptors and their value vectors

use std::fmt;

use crate::types::{DataKind, Value};

/// A named column: identity within a block is by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    name: String,
    kind: DataKind,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: DataKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> DataKind {
        self.kind
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.kind)
    }
}

/// A column paired with its value vector.
///
/// The vector grows only while the enclosing block is mutable; there is no
/// per-cell mutation.
#[derive(Debug, Clone)]
pub struct ColumnValue {
    pub(crate) column: Column,
    pub(crate) values: Vec<Value>,
}

impl ColumnValue {
    pub(crate) fn new(column: Column) -> Self {
        Self {
            column,
            values: Vec::new(),
        }
    }

    pub fn column(&self) -> &Column {
        &self.column
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn num_rows(&self) -> usize {
        self.values.len()
    }
}
