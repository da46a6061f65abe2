use super::traits::Dataset;
use crate::batch::Batch;
use std::ops::Range;
use tinyfit_core::{Tensor, TinyfitError};

/// Pairs an input tensor `[N, ...]` with a target tensor `[N]` or `[N, ...]`.
///
/// Both tensors share their first dimension, which indexes examples. The
/// dataset is immutable and clones share storage.
#[derive(Debug, Clone)]
pub struct TensorDataset {
    inputs: Tensor,
    targets: Tensor,
    length: usize,
}

impl TensorDataset {
    /// Creates a new `TensorDataset`.
    ///
    /// # Errors
    ///
    /// Returns `TinyfitError::ShapeMismatch` if either tensor is a scalar or
    /// the first dimensions differ.
    pub fn new(inputs: Tensor, targets: Tensor) -> Result<Self, TinyfitError> {
        let input_shape = inputs.shape();
        let target_shape = targets.shape();
        let (Some(&n_inputs), Some(&n_targets)) = (input_shape.first(), target_shape.first()) else {
            return Err(TinyfitError::ShapeMismatch {
                expected: "tensors with a leading example dimension".to_string(),
                actual: format!("{:?} and {:?}", input_shape, target_shape),
                operation: "TensorDataset::new".to_string(),
            });
        };
        if n_inputs != n_targets {
            return Err(TinyfitError::ShapeMismatch {
                expected: format!("First dimension of size {}", n_inputs),
                actual: format!("First dimension of size {} for targets", n_targets),
                operation: "TensorDataset::new".to_string(),
            });
        }
        Ok(TensorDataset {
            inputs,
            targets,
            length: n_inputs,
        })
    }

    pub fn inputs(&self) -> &Tensor {
        &self.inputs
    }

    pub fn targets(&self) -> &Tensor {
        &self.targets
    }

    /// Examples `range`, inputs and targets sliced in lock-step.
    pub fn get_range(&self, range: Range<usize>) -> Result<Batch, TinyfitError> {
        Ok(Batch::new(
            self.inputs.slice_rows(range.clone())?,
            self.targets.slice_rows(range)?,
        ))
    }

    /// Examples at `indices`, in that order.
    pub fn gather(&self, indices: &[usize]) -> Result<Batch, TinyfitError> {
        Ok(Batch::new(
            self.inputs.gather_rows(indices)?,
            self.targets.gather_rows(indices)?,
        ))
    }
}

impl Dataset for TensorDataset {
    type Item = (Tensor, Tensor);

    fn get(&self, index: usize) -> Result<Self::Item, TinyfitError> {
        if index >= self.length {
            return Err(TinyfitError::IndexOutOfBounds {
                index: vec![index],
                shape: vec![self.length],
            });
        }
        Ok((self.inputs.get_row(index)?, self.targets.get_row(index)?))
    }

    fn len(&self) -> usize {
        self.length
    }
}

#[cfg(test)]
#[path = "tensor_dataset_test.rs"]
mod tests;
