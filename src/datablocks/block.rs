//! The columnar row-batch exchanged between pipeline stages

use std::sync::Arc;

use futures::stream::{self, BoxStream};
use hashbrown::HashMap;
use tokio::sync::mpsc;

use crate::error::{EngineError, Result};

use super::batch::BatchWriter;
use super::column::{Column, ColumnValue};
use super::iterator::DataBlockIterator;

/// Stream of blocks produced by [`DataBlock::split_async`].
pub type DataBlockStream = BoxStream<'static, DataBlock>;

/// Block-level metadata. Reserved; currently empty.
#[derive(Debug, Default, Clone)]
pub struct DataBlockInfo {}

/// A columnar row-batch.
///
/// Holds one value vector per column plus an optional sequence index
/// (`seqs`): when present, logical row `i` lives at physical position
/// `seqs[i]` of every column vector. Assigning `seqs` freezes the block;
/// a frozen block rejects further writes but remains readable forever.
#[derive(Debug, Clone)]
pub struct DataBlock {
    info: DataBlockInfo,
    columns: Vec<ColumnValue>,
    index: HashMap<String, usize>,
    seqs: Option<Arc<[usize]>>,
    immutable: bool,
}

impl DataBlock {
    /// Creates an empty, mutable block with a fixed column schema.
    pub fn new(columns: Vec<Column>) -> Self {
        let mut index = HashMap::with_capacity(columns.len());
        let columns: Vec<ColumnValue> = columns
            .into_iter()
            .enumerate()
            .map(|(i, col)| {
                index.insert(col.name().to_string(), i);
                ColumnValue::new(col)
            })
            .collect();
        Self {
            info: DataBlockInfo::default(),
            columns,
            index,
            seqs: None,
            immutable: false,
        }
    }

    pub fn info(&self) -> &DataBlockInfo {
        &self.info
    }

    pub fn columns(&self) -> Vec<Column> {
        self.columns.iter().map(|cv| cv.column().clone()).collect()
    }

    /// Logical row count: the sequence index length when present, else the
    /// physical length of the column vectors.
    pub fn num_rows(&self) -> usize {
        match &self.seqs {
            Some(seqs) => seqs.len(),
            None => self.columns.first().map_or(0, ColumnValue::num_rows),
        }
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_immutable(&self) -> bool {
        self.immutable
    }

    pub fn seqs(&self) -> Option<&[usize]> {
        self.seqs.as_deref()
    }

    /// Assigns the sequence index, freezing the block. Every index must be
    /// a valid physical position in every column vector. Set at most once.
    pub fn set_seqs(&mut self, seqs: Vec<usize>) {
        debug_assert!(self.seqs.is_none(), "sequence index is set at most once");
        self.seqs = Some(Arc::from(seqs));
        self.immutable = true;
    }

    /// Cursor over one column in logical row order.
    pub fn iterator(&self, name: &str) -> Result<DataBlockIterator<'_>> {
        let idx = *self
            .index
            .get(name)
            .ok_or_else(|| EngineError::UnknownColumn(name.to_string()))?;
        Ok(DataBlockIterator::new(self.seqs.as_deref(), &self.columns[idx]))
    }

    /// Cursors for all columns, in declaration order.
    pub fn iterators(&self) -> Vec<DataBlockIterator<'_>> {
        self.columns
            .iter()
            .map(|cv| DataBlockIterator::new(self.seqs.as_deref(), cv))
            .collect()
    }

    /// Appends a batch. Fails with [`EngineError::Immutable`] on a frozen
    /// block and with [`EngineError::UnknownColumn`] if any incoming column
    /// is not in the schema; column existence is checked for every incoming
    /// column before any append begins.
    pub fn write(&mut self, batch: BatchWriter) -> Result<()> {
        if self.immutable {
            return Err(EngineError::Immutable);
        }
        for cv in batch.columns() {
            if !self.index.contains_key(cv.column().name()) {
                return Err(EngineError::UnknownColumn(cv.column().name().to_string()));
            }
        }
        for cv in batch.into_columns() {
            let idx = self.index[cv.column.name()];
            self.columns[idx].values.extend(cv.values);
        }
        Ok(())
    }

    /// Eagerly partitions the block into chunks of at most `chunk_size`
    /// logical rows.
    ///
    /// The chunk count is `num_rows / chunk_size + 1`, so the final block is
    /// empty when `num_rows` is a positive multiple of `chunk_size`. Each
    /// output is fresh and mutable, shares the input's schema, and holds the
    /// gathered rows in materialized order (outputs carry no sequence
    /// index; cells share the source's value bytes by reference).
    pub fn split(&self, chunk_size: usize) -> Vec<DataBlock> {
        assert!(chunk_size > 0, "chunk_size must be positive");
        let cols = self.columns();
        let nums = self.num_rows();
        let chunks = nums / chunk_size + 1;
        let mut blocks: Vec<DataBlock> = (0..chunks).map(|_| DataBlock::new(cols.clone())).collect();

        for (i, cv) in self.columns.iter().enumerate() {
            let mut it = DataBlockIterator::new(self.seqs.as_deref(), cv);
            for (j, block) in blocks.iter_mut().enumerate() {
                let begin = j * chunk_size;
                let end = ((j + 1) * chunk_size).min(nums);
                let out = &mut block.columns[i].values;
                out.reserve(end - begin);
                for value in it.by_ref().take(end - begin) {
                    out.push(value.clone());
                }
            }
        }
        blocks
    }

    /// Like [`DataBlock::split`], but chunks are gathered lazily by a
    /// dedicated task and emitted on a bounded channel sized to the chunk
    /// count. Dropping the stream stops the producer. Must be called from
    /// within a tokio runtime.
    pub fn split_async(&self, chunk_size: usize) -> DataBlockStream {
        assert!(chunk_size > 0, "chunk_size must be positive");
        let cols = self.columns();
        let nums = self.num_rows();
        let chunks = nums / chunk_size + 1;
        let seqs = self.seqs.clone();
        let columns = self.columns.clone();

        let (tx, rx) = mpsc::channel(chunks);
        tokio::spawn(async move {
            for j in 0..chunks {
                let begin = j * chunk_size;
                let end = ((j + 1) * chunk_size).min(nums);
                let mut block = DataBlock::new(cols.clone());
                for (i, cv) in columns.iter().enumerate() {
                    let out = &mut block.columns[i].values;
                    out.reserve(end - begin);
                    for k in begin..end {
                        let physical = seqs.as_deref().map_or(k, |seqs| seqs[k]);
                        out.push(cv.values[physical].clone());
                    }
                }
                if tx.send(block).await.is_err() {
                    // Consumer gone; stop producing.
                    return;
                }
            }
        });

        Box::pin(stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|block| (block, rx))
        }))
    }
}
