//! Batch accumulation for block writes

use crate::error::{EngineError, Result};
use crate::types::Value;

use super::column::{Column, ColumnValue};

/// Accumulates rows or whole column vectors against a fixed schema, then is
/// consumed by [`DataBlock::write`](super::DataBlock::write).
#[derive(Debug)]
pub struct BatchWriter {
    columns: Vec<ColumnValue>,
}

impl BatchWriter {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns: columns.into_iter().map(ColumnValue::new).collect(),
        }
    }

    /// Appends one row across all columns. The row arity must match the
    /// schema.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(EngineError::InvalidArgument(format!(
                "row arity {} does not match schema arity {}",
                row.len(),
                self.columns.len()
            )));
        }
        for (cv, value) in self.columns.iter_mut().zip(row) {
            cv.values.push(value);
        }
        Ok(())
    }

    /// Appends a vector of values to one column.
    pub fn push_column(&mut self, name: &str, values: Vec<Value>) -> Result<()> {
        let cv = self
            .columns
            .iter_mut()
            .find(|cv| cv.column.name() == name)
            .ok_or_else(|| EngineError::UnknownColumn(name.to_string()))?;
        cv.values.extend(values);
        Ok(())
    }

    pub fn columns(&self) -> &[ColumnValue] {
        &self.columns
    }

    pub(crate) fn into_columns(self) -> Vec<ColumnValue> {
        self.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DataKind;

    fn schema() -> Vec<Column> {
        vec![
            Column::new("a", DataKind::Int64),
            Column::new("b", DataKind::VarChar),
        ]
    }

    #[test]
    fn test_push_row() {
        let mut batch = BatchWriter::new(schema());
        batch
            .push_row(vec![Value::int64(1), Value::varchar("x")])
            .unwrap();
        batch
            .push_row(vec![Value::int64(2), Value::varchar("y")])
            .unwrap();
        assert_eq!(batch.columns()[0].num_rows(), 2);
        assert_eq!(batch.columns()[1].values()[0].raw(), b"x");
    }

    #[test]
    fn test_push_row_arity_mismatch() {
        let mut batch = BatchWriter::new(schema());
        let err = batch.push_row(vec![Value::int64(1)]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
    }

    #[test]
    fn test_push_column() {
        let mut batch = BatchWriter::new(schema());
        batch
            .push_column("a", vec![Value::int64(1), Value::int64(2)])
            .unwrap();
        assert_eq!(batch.columns()[0].num_rows(), 2);

        let err = batch.push_column("c", vec![Value::int64(3)]).unwrap_err();
        assert_eq!(err, EngineError::UnknownColumn("c".to_string()));
    }
}
