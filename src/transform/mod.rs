//! Table transforms for depurar.
//!
//! Every stage of the pipeline is a [`Transform`]: it takes ownership of a
//! RecordBatch and produces a new one. Transforms compose with [`Chain`].

use arrow::array::RecordBatch;

use crate::error::Result;

mod numeric;
mod row_ops;
mod selection;

pub use numeric::{FillValue, Impute, ImputeStrategy, Round, ToNumeric, Truncate};
pub use row_ops::Unique;
pub use selection::{Rename, Select};

/// A transform that can be applied to RecordBatches.
///
/// Transforms take a RecordBatch by value and return a new RecordBatch with
/// the transformation applied. The input is never observed again by the
/// caller, so stages cannot alias each other's tables.
pub trait Transform: Send + Sync {
    /// Applies the transform to a RecordBatch.
    ///
    /// # Errors
    ///
    /// Returns an error if the transform cannot be applied to the batch.
    fn apply(&self, batch: RecordBatch) -> Result<RecordBatch>;
}

/// A transform that returns its input unchanged.
///
/// This is the column router stage: every column is passed through with no
/// scaling or encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Transform for Passthrough {
    fn apply(&self, batch: RecordBatch) -> Result<RecordBatch> {
        Ok(batch)
    }
}

/// A chain of transforms applied in sequence.
///
/// # Example
///
/// ```ignore
/// use depurar::{Chain, Rename, Select};
///
/// let chain = Chain::new()
///     .then(Rename::from_pairs(vec![("phone", "phone number")]))
///     .then(Select::new(vec!["name", "phone number"]));
/// ```
pub struct Chain {
    transforms: Vec<Box<dyn Transform>>,
}

impl Chain {
    /// Creates a new empty transform chain.
    pub fn new() -> Self {
        Self {
            transforms: Vec::new(),
        }
    }

    /// Adds a transform to the chain.
    #[must_use]
    pub fn then<T: Transform + 'static>(mut self, transform: T) -> Self {
        self.transforms.push(Box::new(transform));
        self
    }

    /// Returns the number of transforms in the chain.
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Returns true if the chain has no transforms.
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field("len", &self.transforms.len())
            .finish()
    }
}

impl Transform for Chain {
    fn apply(&self, batch: RecordBatch) -> Result<RecordBatch> {
        let mut result = batch;
        for transform in &self.transforms {
            result = transform.apply(result)?;
        }
        Ok(result)
    }
}

impl Transform for Box<dyn Transform> {
    fn apply(&self, batch: RecordBatch) -> Result<RecordBatch> {
        (**self).apply(batch)
    }
}
