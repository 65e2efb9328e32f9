//! Row-level transforms: duplicate removal.

use std::{collections::HashSet, sync::Arc};

use arrow::{
    array::{Array, RecordBatch},
    util::display::array_value_to_string,
};

use super::Transform;
use crate::error::{Error, Result};

/// One cell of a row key. Keys are compared part by part, so no cell value
/// can run into its neighbour.
#[derive(Debug, PartialEq, Eq, Hash)]
enum KeyPart<'a> {
    Null,
    Int(i64),
    Float(u64),
    Bool(bool),
    Text(&'a str),
    Display(String),
}

impl KeyPart<'_> {
    /// Floats compare by bit pattern, with `-0.0` folded into `0.0`.
    fn float(value: f64) -> Self {
        let value = if value == 0.0 { 0.0 } else { value };
        Self::Float(value.to_bits())
    }
}

/// A transform that removes duplicate rows, keeping the first occurrence.
///
/// Two rows are duplicates when every key column holds the same value. Nulls
/// compare equal to nulls; floats compare by bit pattern, except that `-0.0`
/// equals `0.0`. Surviving rows keep
/// their original relative order.
///
/// # Example
///
/// ```ignore
/// use depurar::Unique;
///
/// // Remove exact duplicate rows
/// let unique = Unique::all();
///
/// // Remove rows with a repeated id
/// let unique = Unique::by(vec!["id"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Unique {
    columns: Option<Vec<String>>,
}

impl Unique {
    /// Creates a Unique transform that considers all columns.
    pub fn all() -> Self {
        Self { columns: None }
    }

    /// Creates a Unique transform that considers specific columns.
    pub fn by<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: Some(columns.into_iter().map(Into::into).collect()),
        }
    }

    /// Returns the columns used for the uniqueness check (None means all).
    pub fn columns(&self) -> Option<&[String]> {
        self.columns.as_deref()
    }

    /// Counts rows that would be removed from `batch`.
    ///
    /// # Errors
    ///
    /// Returns an error if a key column is missing.
    pub fn count_duplicates(&self, batch: &RecordBatch) -> Result<usize> {
        let keep = self.first_occurrences(batch)?;
        Ok(batch.num_rows() - keep.len())
    }

    fn key_indices(&self, batch: &RecordBatch) -> Result<Vec<usize>> {
        let schema = batch.schema();
        match &self.columns {
            Some(cols) => cols
                .iter()
                .map(|name| {
                    schema
                        .column_with_name(name)
                        .map(|(idx, _)| idx)
                        .ok_or_else(|| Error::column_not_found(name))
                })
                .collect(),
            None => Ok((0..schema.fields().len()).collect()),
        }
    }

    fn first_occurrences(&self, batch: &RecordBatch) -> Result<Vec<usize>> {
        let key_indices = self.key_indices(batch)?;
        let mut seen: HashSet<Vec<KeyPart<'_>>> = HashSet::with_capacity(batch.num_rows());
        let mut keep = Vec::with_capacity(batch.num_rows());

        for row_idx in 0..batch.num_rows() {
            if seen.insert(Self::row_key(batch, row_idx, &key_indices)?) {
                keep.push(row_idx);
            }
        }

        Ok(keep)
    }

    fn row_key<'a>(
        batch: &'a RecordBatch,
        row_idx: usize,
        key_indices: &[usize],
    ) -> Result<Vec<KeyPart<'a>>> {
        use arrow::array::{
            BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
        };

        key_indices
            .iter()
            .map(|&col_idx| {
                let col = batch.column(col_idx);
                if col.is_null(row_idx) {
                    return Ok(KeyPart::Null);
                }

                let any = col.as_any();
                let part = if let Some(arr) = any.downcast_ref::<Int64Array>() {
                    KeyPart::Int(arr.value(row_idx))
                } else if let Some(arr) = any.downcast_ref::<Int32Array>() {
                    KeyPart::Int(i64::from(arr.value(row_idx)))
                } else if let Some(arr) = any.downcast_ref::<Float64Array>() {
                    KeyPart::float(arr.value(row_idx))
                } else if let Some(arr) = any.downcast_ref::<Float32Array>() {
                    KeyPart::float(f64::from(arr.value(row_idx)))
                } else if let Some(arr) = any.downcast_ref::<StringArray>() {
                    KeyPart::Text(arr.value(row_idx))
                } else if let Some(arr) = any.downcast_ref::<BooleanArray>() {
                    KeyPart::Bool(arr.value(row_idx))
                } else {
                    let value = array_value_to_string(col.as_ref(), row_idx)?;
                    KeyPart::Display(value)
                };
                Ok(part)
            })
            .collect()
    }
}

impl Transform for Unique {
    fn apply(&self, batch: RecordBatch) -> Result<RecordBatch> {
        let num_rows = batch.num_rows();
        let keep_indices = self.first_occurrences(&batch)?;

        if keep_indices.len() == num_rows {
            return Ok(batch);
        }

        tracing::debug!(
            removed = num_rows - keep_indices.len(),
            remaining = keep_indices.len(),
            "removed duplicate rows"
        );

        let indices_array = arrow::array::UInt64Array::from_iter_values(
            keep_indices.iter().map(|&i| i as u64),
        );

        let new_columns: Vec<Arc<dyn Array>> = batch
            .columns()
            .iter()
            .map(|col| {
                arrow::compute::take(col.as_ref(), &indices_array, None).map_err(Error::Arrow)
            })
            .collect::<Result<Vec<_>>>()?;

        RecordBatch::try_new(batch.schema(), new_columns).map_err(Error::Arrow)
    }
}
