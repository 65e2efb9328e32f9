//! Numeric transforms: coercion, missing-value imputation, truncation and
//! rounding.
//!
//! Imputed numeric columns are always Float64; [`Truncate`] and [`Round`]
//! then give them their final storage type.

use std::{collections::HashMap, sync::Arc};

use arrow::{
    array::{Array, ArrayRef, Float64Array, Int64Array, RecordBatch, StringArray},
    datatypes::{DataType, Field, FieldRef, Schema},
};
use serde::{Deserialize, Serialize};

use super::Transform;
use crate::error::{Error, Result};

fn find_column(batch: &RecordBatch, name: &str) -> Result<(usize, FieldRef)> {
    let schema = batch.schema();
    let (idx, _) = schema
        .column_with_name(name)
        .ok_or_else(|| Error::column_not_found(name))?;
    Ok((idx, Arc::clone(&schema.fields()[idx])))
}

fn replace_column(
    batch: &RecordBatch,
    idx: usize,
    field: &Field,
    array: ArrayRef,
) -> Result<RecordBatch> {
    let schema = batch.schema();
    let mut fields: Vec<FieldRef> = schema.fields().iter().cloned().collect();
    fields[idx] = Arc::new(Field::new(
        field.name(),
        array.data_type().clone(),
        field.is_nullable(),
    ));

    let mut arrays = batch.columns().to_vec();
    arrays[idx] = array;

    let new_schema = Arc::new(Schema::new_with_metadata(
        fields,
        schema.metadata().clone(),
    ));
    RecordBatch::try_new(new_schema, arrays).map_err(Error::Arrow)
}

fn is_numeric_type(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float16
            | DataType::Float32
            | DataType::Float64
    )
}

/// Casts a numeric column to Float64.
fn numeric_as_f64(column: &str, array: &dyn Array) -> Result<Float64Array> {
    if !is_numeric_type(array.data_type()) {
        return Err(Error::transform(format!(
            "column '{}' has type {:?}, expected a numeric column",
            column,
            array.data_type()
        )));
    }

    let cast = arrow::compute::cast(array, &DataType::Float64)?;
    cast.as_any()
        .downcast_ref::<Float64Array>()
        .cloned()
        .ok_or_else(|| Error::transform("Expected Float64Array after cast"))
}

/// A transform that coerces a column to Float64.
///
/// Numeric columns are cast. Text columns are parsed value by value; a value
/// that does not parse as a finite number becomes null. Parse failures are
/// recovered here and never reach the caller.
///
/// # Example
///
/// ```ignore
/// use depurar::ToNumeric;
///
/// // "9876512345" -> 9876512345.0, "n/a" -> null
/// let coerce = ToNumeric::new("phone");
/// ```
#[derive(Debug, Clone)]
pub struct ToNumeric {
    column: String,
}

impl ToNumeric {
    /// Creates a coercion transform for the specified column.
    pub fn new<S: Into<String>>(column: S) -> Self {
        Self {
            column: column.into(),
        }
    }

    /// Returns the column name.
    pub fn column(&self) -> &str {
        &self.column
    }

    fn parse_strings(&self, array: &StringArray) -> Float64Array {
        array
            .iter()
            .enumerate()
            .map(|(row, value)| {
                let value = value?;
                match value.trim().parse::<f64>() {
                    Ok(v) if v.is_finite() => Some(v),
                    _ => {
                        tracing::trace!(
                            column = %self.column,
                            row,
                            value,
                            "value is not numeric, treating as missing"
                        );
                        None
                    }
                }
            })
            .collect()
    }
}

impl Transform for ToNumeric {
    fn apply(&self, batch: RecordBatch) -> Result<RecordBatch> {
        let (idx, field) = find_column(&batch, &self.column)?;
        let col = batch.column(idx);

        let coerced: Float64Array = match field.data_type() {
            DataType::Float64 => {
                // NaN and infinities are not usable values either.
                let arr = numeric_as_f64(&self.column, col.as_ref())?;
                if arr.iter().flatten().all(f64::is_finite) {
                    return Ok(batch);
                }
                arr.iter().map(|v| v.filter(|x| x.is_finite())).collect()
            }
            DataType::Utf8 => {
                let arr = col
                    .as_any()
                    .downcast_ref::<StringArray>()
                    .ok_or_else(|| Error::transform("Expected StringArray for Utf8 column"))?;
                self.parse_strings(arr)
            }
            DataType::LargeUtf8 => {
                let cast = arrow::compute::cast(col.as_ref(), &DataType::Utf8)?;
                let arr = cast
                    .as_any()
                    .downcast_ref::<StringArray>()
                    .ok_or_else(|| Error::transform("Expected StringArray after cast"))?;
                self.parse_strings(arr)
            }
            dtype if is_numeric_type(dtype) => numeric_as_f64(&self.column, col.as_ref())?,
            dtype => {
                return Err(Error::transform(format!(
                    "Cannot coerce column '{}' of type {:?} to a number",
                    self.column, dtype
                )));
            }
        };

        replace_column(&batch, idx, &field, Arc::new(coerced))
    }
}

/// A constant used to fill missing values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FillValue {
    /// A numeric constant (numeric columns).
    Number(f64),
    /// A text constant (text columns).
    Text(String),
}

impl FillValue {
    /// The numeric zero.
    pub const ZERO: Self = Self::Number(0.0);
}

impl std::fmt::Display for FillValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{}", v),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Strategy for filling missing values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputeStrategy {
    /// Arithmetic mean of the non-missing values.
    Mean,
    /// Most common non-missing value; ties go to the value seen first.
    MostFrequent,
    /// A fixed value, with no statistics computed.
    Constant(FillValue),
}

impl ImputeStrategy {
    fn statistic_name(&self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::MostFrequent => "most frequent value",
            Self::Constant(_) => "constant",
        }
    }
}

/// A transform that replaces nulls in one column using an [`ImputeStrategy`].
///
/// The fill value is computed over the column as given ([`Impute::fit`]), then
/// substituted for every null ([`Impute::fill`]). Numeric columns come out as
/// Float64; text columns stay Utf8.
///
/// # Example
///
/// ```ignore
/// use depurar::{FillValue, Impute, ImputeStrategy};
///
/// let grade = Impute::new("grade", ImputeStrategy::Mean);
/// let department = Impute::new("department", ImputeStrategy::MostFrequent);
/// let phone = Impute::new("phone", ImputeStrategy::Constant(FillValue::ZERO));
/// ```
#[derive(Debug, Clone)]
pub struct Impute {
    column: String,
    strategy: ImputeStrategy,
}

impl Impute {
    /// Creates an Impute transform for the specified column.
    pub fn new<S: Into<String>>(column: S, strategy: ImputeStrategy) -> Self {
        Self {
            column: column.into(),
            strategy,
        }
    }

    /// Returns the column name.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Returns the imputation strategy.
    pub fn strategy(&self) -> &ImputeStrategy {
        &self.strategy
    }

    /// Computes the value that will replace nulls in the column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Computation`] when the strategy needs a statistic and
    /// the column has no non-missing values, [`Error::ColumnNotFound`] when
    /// the column is absent, and a transform error when the strategy does not
    /// apply to the column type.
    pub fn fit(&self, batch: &RecordBatch) -> Result<FillValue> {
        let (idx, field) = find_column(batch, &self.column)?;
        let col = batch.column(idx);

        match &self.strategy {
            ImputeStrategy::Mean => {
                let values = numeric_as_f64(&self.column, col.as_ref())?;
                Self::mean(&values)
                    .map(FillValue::Number)
                    .ok_or_else(|| Error::computation(&self.column, self.strategy.statistic_name()))
            }
            ImputeStrategy::MostFrequent => {
                let mode = if field.data_type() == &DataType::Utf8 {
                    let values = col
                        .as_any()
                        .downcast_ref::<StringArray>()
                        .ok_or_else(|| Error::transform("Expected StringArray for Utf8 column"))?;
                    Self::most_frequent_text(values).map(|s| FillValue::Text(s.to_string()))
                } else {
                    let values = numeric_as_f64(&self.column, col.as_ref())?;
                    Self::most_frequent_number(&values).map(FillValue::Number)
                };
                mode.ok_or_else(|| {
                    Error::computation(&self.column, self.strategy.statistic_name())
                })
            }
            ImputeStrategy::Constant(value) => Ok(value.clone()),
        }
    }

    /// Replaces every null in the column with `value`.
    ///
    /// # Errors
    ///
    /// Returns an error if the column is absent or `value` does not match the
    /// column type.
    pub fn fill(&self, batch: RecordBatch, value: &FillValue) -> Result<RecordBatch> {
        let (idx, field) = find_column(&batch, &self.column)?;
        let col = batch.column(idx);

        let filled: ArrayRef = match (field.data_type(), value) {
            (DataType::Utf8, FillValue::Text(text)) => {
                let arr = col
                    .as_any()
                    .downcast_ref::<StringArray>()
                    .ok_or_else(|| Error::transform("Expected StringArray for Utf8 column"))?;
                let values: StringArray = arr
                    .iter()
                    .map(|v| Some(v.unwrap_or(text.as_str())))
                    .collect();
                Arc::new(values)
            }
            (dtype, FillValue::Number(fill)) if is_numeric_type(dtype) => {
                let arr = numeric_as_f64(&self.column, col.as_ref())?;
                let values: Float64Array = arr.iter().map(|v| Some(v.unwrap_or(*fill))).collect();
                Arc::new(values)
            }
            (dtype, value) => {
                return Err(Error::transform(format!(
                    "Cannot fill column '{}' of type {:?} with {:?}",
                    self.column, dtype, value
                )));
            }
        };

        replace_column(&batch, idx, &field, filled)
    }

    #[allow(clippy::cast_precision_loss)]
    fn mean(values: &Float64Array) -> Option<f64> {
        let (sum, count) = values
            .iter()
            .flatten()
            .fold((0.0_f64, 0_usize), |(sum, count), v| (sum + v, count + 1));

        (count > 0).then(|| sum / count as f64)
    }

    /// Picks the highest count; among equal counts the value whose first
    /// occurrence comes earliest wins.
    fn pick_mode<K: Eq + std::hash::Hash + Copy>(
        values: impl Iterator<Item = Option<K>>,
    ) -> Option<K> {
        let mut order: Vec<K> = Vec::new();
        let mut counts: HashMap<K, usize> = HashMap::new();

        for value in values.flatten() {
            let count = counts.entry(value).or_insert_with(|| {
                order.push(value);
                0
            });
            *count += 1;
        }

        let mut best: Option<(K, usize)> = None;
        for value in order {
            let count = counts[&value];
            if best.map_or(true, |(_, best_count)| count > best_count) {
                best = Some((value, count));
            }
        }
        best.map(|(value, _)| value)
    }

    fn most_frequent_text(values: &StringArray) -> Option<&str> {
        Self::pick_mode(values.iter())
    }

    fn most_frequent_number(values: &Float64Array) -> Option<f64> {
        Self::pick_mode(values.iter().map(|v| v.map(f64::to_bits))).map(f64::from_bits)
    }
}

impl Transform for Impute {
    fn apply(&self, batch: RecordBatch) -> Result<RecordBatch> {
        let value = self.fit(&batch)?;
        self.fill(batch, &value)
    }
}

/// -2^63, the smallest i64.
const I64_LOWER: f64 = -9_223_372_036_854_775_808.0;
/// 2^63, one past the largest i64.
const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;

/// A transform that stores a numeric column as Int64, truncating toward zero.
///
/// `2.9` becomes `2` and `-2.9` becomes `-2`. Nulls stay null.
#[derive(Debug, Clone)]
pub struct Truncate {
    column: String,
}

impl Truncate {
    /// Creates a Truncate transform for the specified column.
    pub fn new<S: Into<String>>(column: S) -> Self {
        Self {
            column: column.into(),
        }
    }

    /// Returns the column name.
    pub fn column(&self) -> &str {
        &self.column
    }
}

impl Transform for Truncate {
    #[allow(clippy::cast_possible_truncation)]
    fn apply(&self, batch: RecordBatch) -> Result<RecordBatch> {
        let (idx, field) = find_column(&batch, &self.column)?;
        let col = batch.column(idx);

        if field.data_type() == &DataType::Int64 {
            return Ok(batch);
        }

        let values = numeric_as_f64(&self.column, col.as_ref())?;
        let truncated = values
            .iter()
            .map(|v| match v {
                None => Ok(None),
                Some(x) if (I64_LOWER..I64_UPPER).contains(&x.trunc()) => {
                    Ok(Some(x.trunc() as i64))
                }
                Some(x) => Err(Error::transform(format!(
                    "Value {} in column '{}' cannot be stored as an integer",
                    x, self.column
                ))),
            })
            .collect::<Result<Int64Array>>()?;

        replace_column(&batch, idx, &field, Arc::new(truncated))
    }
}

/// A transform that rounds a numeric column to a number of decimal places.
///
/// Halfway cases round to even, so `0.125` becomes `0.12`. The column is
/// stored as Float64.
#[derive(Debug, Clone)]
pub struct Round {
    column: String,
    decimals: u32,
}

impl Round {
    /// Creates a Round transform for the specified column.
    pub fn new<S: Into<String>>(column: S, decimals: u32) -> Self {
        Self {
            column: column.into(),
            decimals,
        }
    }

    /// Returns the column name.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Returns the number of decimal places kept.
    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    fn round(value: f64, scale: f64) -> f64 {
        let rounded = (value * scale).round_ties_even() / scale;
        // Scaling can overflow for huge magnitudes; those have no fraction left.
        if rounded.is_finite() {
            rounded
        } else {
            value
        }
    }
}

impl Transform for Round {
    fn apply(&self, batch: RecordBatch) -> Result<RecordBatch> {
        let (idx, field) = find_column(&batch, &self.column)?;
        let col = batch.column(idx);

        let decimals = i32::try_from(self.decimals)
            .map_err(|_| Error::transform(format!("Too many decimals: {}", self.decimals)))?;
        let scale = 10_f64.powi(decimals);

        let values = numeric_as_f64(&self.column, col.as_ref())?;
        let rounded: Float64Array = values
            .iter()
            .map(|v| v.map(|x| Self::round(x, scale)))
            .collect();

        replace_column(&batch, idx, &field, Arc::new(rounded))
    }
}
