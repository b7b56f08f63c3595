//! Tabular dataset model consumed by the batch runner.
//!
//! A [`Dataset`] is an ordered, finite sequence of [`Row`]s. The runner only
//! ever borrows it, so its length and iteration order stay stable for the
//! duration of a run.

mod row;

use std::io::BufRead;
use std::num::NonZeroUsize;
use std::slice::Chunks;

use serde_json::{Map, Value};

use crate::error::{json_kind, DatasetError, ValidationError};

pub use row::Row;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    rows: Vec<Row>,
}

impl Dataset {
    /// Build a dataset from field maps; row indices follow iteration order.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = Map<String, Value>>,
    {
        let rows = records
            .into_iter()
            .enumerate()
            .map(|(index, fields)| Row::new(index, fields))
            .collect();
        Self { rows }
    }

    /// Build a dataset from a JSON array of objects.
    ///
    /// `null` is reported as a missing dataset rather than an empty one.
    pub fn from_json(value: Value) -> Result<Self, DatasetError> {
        let items = match value {
            Value::Null => return Err(ValidationError::MissingDataset.into()),
            Value::Array(items) => items,
            other => return Err(DatasetError::NotAnArray(json_kind(&other))),
        };

        let mut records = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            match item {
                Value::Object(fields) => records.push(fields),
                other => {
                    return Err(DatasetError::InvalidRecord {
                        index,
                        kind: json_kind(&other),
                    })
                }
            }
        }

        Ok(Self::from_records(records))
    }

    /// Build a dataset from JSON Lines input, one object per non-blank line.
    pub fn from_jsonl_reader<R: BufRead>(reader: R) -> Result<Self, DatasetError> {
        let mut records = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let value: Value = serde_json::from_str(trimmed).map_err(|source| {
                DatasetError::Json {
                    line: idx + 1,
                    source,
                }
            })?;
            match value {
                Value::Object(fields) => records.push(fields),
                other => {
                    return Err(DatasetError::InvalidRecord {
                        index: records.len(),
                        kind: json_kind(&other),
                    })
                }
            }
        }
        Ok(Self::from_records(records))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// Number of batches produced by [`Dataset::batches`]: `ceil(len / batch_size)`.
    pub fn batch_count(&self, batch_size: NonZeroUsize) -> usize {
        self.rows.len().div_ceil(batch_size.get())
    }

    /// Contiguous, non-overlapping batches of at most `batch_size` rows, in
    /// dataset order.
    pub fn batches(&self, batch_size: NonZeroUsize) -> Batches<'_> {
        Batches {
            chunks: self.rows.chunks(batch_size.get()),
            next_index: 0,
        }
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// A contiguous slice of the dataset.
#[derive(Debug, Clone, Copy)]
pub struct Batch<'a> {
    index: usize,
    rows: &'a [Row],
}

impl<'a> Batch<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn rows(&self) -> &'a [Row] {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub struct Batches<'a> {
    chunks: Chunks<'a, Row>,
    next_index: usize,
}

impl<'a> Iterator for Batches<'a> {
    type Item = Batch<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let rows = self.chunks.next()?;
        let batch = Batch {
            index: self.next_index,
            rows,
        };
        self.next_index += 1;
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl ExactSizeIterator for Batches<'_> {}
