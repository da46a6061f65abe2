// src/tensor_data.rs
use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::device::StorageDevice;
use crate::error::TinyfitError;
use crate::tensor::Tensor;

/// Internal storage and metadata for a Tensor.
///
/// Holds the data buffer, shape, device and autograd bookkeeping. It is
/// wrapped in `Arc<RwLock<TensorData>>` by [`Tensor`] so handles can share it
/// and update gradients through an immutable reference.
///
/// Data is always contiguous and row-major; reshapes share the buffer `Arc`.
#[derive(Debug)]
pub struct TensorData {
    /// Flat row-major `f32` storage. Shared (copy-on-write) between views.
    pub(crate) buffer: Arc<Vec<f32>>,
    /// The device where the buffer resides.
    pub(crate) device: StorageDevice,
    /// The shape (dimensions) of the tensor. Empty for scalars.
    pub(crate) shape: Vec<usize>,

    /// If true, operations involving this tensor are recorded for backward.
    pub(crate) requires_grad: bool,
    /// Accumulated gradient, same shape as the tensor. Only leaves receive one.
    pub(crate) grad: Option<Tensor>,
    /// Operation that produced this tensor. `None` for leaves.
    pub(crate) grad_fn: Option<Arc<dyn BackwardOp>>,
}

impl TensorData {
    /// Creates CPU-resident data from a flat vector and a shape.
    ///
    /// # Errors
    /// Returns `TinyfitError::TensorCreationError` if the length of `data_vec`
    /// does not match the number of elements implied by `shape`.
    pub fn new(data_vec: Vec<f32>, shape: Vec<usize>) -> Result<Self, TinyfitError> {
        let numel: usize = shape.iter().product();
        let data_len = data_vec.len();
        if data_len != numel {
            return Err(TinyfitError::TensorCreationError { data_len, shape });
        }

        Ok(TensorData {
            buffer: Arc::new(data_vec),
            device: StorageDevice::CPU,
            shape,
            requires_grad: false,
            grad: None,
            grad_fn: None,
        })
    }

    /// Creates data that shares an existing buffer under a new shape.
    /// Used by reshape; the element count must already match.
    pub(crate) fn new_view(
        buffer: Arc<Vec<f32>>,
        device: StorageDevice,
        shape: Vec<usize>,
    ) -> Result<Self, TinyfitError> {
        let numel: usize = shape.iter().product();
        if buffer.len() != numel {
            return Err(TinyfitError::TensorCreationError {
                data_len: buffer.len(),
                shape,
            });
        }
        Ok(TensorData {
            buffer,
            device,
            shape,
            requires_grad: false,
            grad: None,
            grad_fn: None,
        })
    }

    /// Immutable access to the flat data.
    pub fn as_slice(&self) -> &[f32] {
        self.buffer.as_slice()
    }

    /// Mutable access to the flat data. Clones the buffer first if a view
    /// still shares it.
    pub(crate) fn as_mut_slice(&mut self) -> &mut [f32] {
        Arc::make_mut(&mut self.buffer).as_mut_slice()
    }

    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }
}
