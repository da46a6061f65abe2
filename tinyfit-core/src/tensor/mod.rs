// src/tensor/mod.rs

use crate::device::StorageDevice;
use crate::error::TinyfitError;
use crate::tensor_data::TensorData;
use std::fmt;
use std::ops::Range;
use std::sync::{Arc, RwLock};

mod autograd_methods;
pub mod create;
pub mod utils;

pub use create::{full, ones, rand_uniform, randn, zeros, zeros_like};

/// Represents a multi-dimensional array of `f32` values.
///
/// `Tensor` is a cheap handle around `Arc<RwLock<TensorData>>`:
/// 1.  **Shared Ownership:** cloning a tensor clones the handle, not the data.
///     A model and an optimizer holding the same parameter see the same values.
/// 2.  **Interior Mutability:** `requires_grad`, `grad` and the data itself can be
///     updated through `&Tensor`, which is what the optimizer and backward rely on.
#[derive(Clone)]
pub struct Tensor {
    pub(crate) data: Arc<RwLock<TensorData>>,
}

impl Tensor {
    /// Creates a new Tensor with the given data and shape on the CPU.
    pub fn new(data_vec: Vec<f32>, shape: Vec<usize>) -> Result<Self, TinyfitError> {
        let tensor_data = TensorData::new(data_vec, shape)?;
        Ok(Tensor::from_data(tensor_data))
    }

    /// Creates a rank-0 tensor holding `value`.
    pub fn scalar(value: f32) -> Self {
        Tensor::from_data(TensorData {
            buffer: Arc::new(vec![value]),
            device: StorageDevice::CPU,
            shape: Vec::new(),
            requires_grad: false,
            grad: None,
            grad_fn: None,
        })
    }

    pub(crate) fn from_data(tensor_data: TensorData) -> Self {
        Tensor {
            data: Arc::new(RwLock::new(tensor_data)),
        }
    }

    /// Acquires a read lock on the tensor's data.
    ///
    /// Panics if the RwLock is poisoned.
    pub fn read_data(&self) -> std::sync::RwLockReadGuard<'_, TensorData> {
        self.data.read().expect("RwLock poisoned")
    }

    /// Acquires a write lock on the tensor's data.
    ///
    /// Panics if the RwLock is poisoned.
    pub fn write_data(&self) -> std::sync::RwLockWriteGuard<'_, TensorData> {
        self.data.write().expect("RwLock poisoned")
    }

    /// Returns the device where the tensor's data resides.
    pub fn device(&self) -> StorageDevice {
        self.read_data().device
    }

    /// Returns a clone of the tensor's shape.
    pub fn shape(&self) -> Vec<usize> {
        self.read_data().shape.clone()
    }

    pub fn rank(&self) -> usize {
        self.read_data().shape.len()
    }

    pub fn numel(&self) -> usize {
        self.read_data().numel()
    }

    /// Returns a copy of the tensor data.
    pub fn get_f32_data(&self) -> Result<Vec<f32>, TinyfitError> {
        let guard = self.read_data();
        if guard.device != StorageDevice::CPU {
            return Err(TinyfitError::DeviceMismatch {
                expected: StorageDevice::CPU,
                actual: guard.device,
                operation: "get_f32_data".to_string(),
            });
        }
        Ok(guard.as_slice().to_vec())
    }

    /// Extracts the value of a single-element tensor.
    pub fn item_f32(&self) -> Result<f32, TinyfitError> {
        let guard = self.read_data();
        if guard.numel() != 1 {
            return Err(TinyfitError::ShapeMismatch {
                expected: "a single element".to_string(),
                actual: format!("{:?}", guard.shape),
                operation: "item_f32".to_string(),
            });
        }
        Ok(guard.as_slice()[0])
    }

    /// Stable identity of the underlying storage node, used by the autograd graph.
    pub fn node_id(&self) -> usize {
        Arc::as_ptr(&self.data) as *const () as usize
    }

    /// True if both handles point at the same tensor.
    pub fn ptr_eq(&self, other: &Tensor) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Returns a new leaf tensor with the same data, cut from the graph.
    pub fn detach(&self) -> Tensor {
        let guard = self.read_data();
        Tensor::from_data(TensorData {
            buffer: Arc::clone(&guard.buffer),
            device: guard.device,
            shape: guard.shape.clone(),
            requires_grad: false,
            grad: None,
            grad_fn: None,
        })
    }

    /// Moves the tensor to `device`.
    ///
    /// Same-device moves return a shallow clone. Moving to a device that is
    /// not available fails with `DeviceUnavailable`.
    pub fn to_device(&self, device: StorageDevice) -> Result<Tensor, TinyfitError> {
        if self.device() == device {
            return Ok(self.clone());
        }
        if !device.is_available() {
            return Err(TinyfitError::DeviceUnavailable {
                requested: device,
                operation: "Tensor::to_device".to_string(),
            });
        }
        Err(TinyfitError::InternalError(format!(
            "no transfer path from {:?} to {:?}",
            self.device(),
            device
        )))
    }

    /// Moves the storage behind this handle to `device`, in place.
    ///
    /// Every clone of the handle sees the move, so a parameter held by both a
    /// model and an optimizer stays shared. The gradient is dropped; graph
    /// state and `requires_grad` are kept. On error nothing changes.
    pub fn move_to_device_(&self, device: StorageDevice) -> Result<(), TinyfitError> {
        if self.device() == device {
            return Ok(());
        }
        let moved = self.to_device(device)?;
        let buffer = Arc::clone(&moved.read_data().buffer);
        let mut guard = self.write_data();
        guard.buffer = buffer;
        guard.device = device;
        guard.grad = None;
        Ok(())
    }

    /// Copies rows `range` along the first dimension into a new leaf tensor.
    pub fn slice_rows(&self, range: Range<usize>) -> Result<Tensor, TinyfitError> {
        let guard = self.read_data();
        let (rows, row_len) = split_leading(&guard.shape, "slice_rows")?;
        if range.start > range.end || range.end > rows {
            return Err(TinyfitError::IndexOutOfBounds {
                index: vec![range.start, range.end],
                shape: guard.shape.clone(),
            });
        }
        let data = guard.as_slice()[range.start * row_len..range.end * row_len].to_vec();
        let mut shape = guard.shape.clone();
        shape[0] = range.end - range.start;
        Tensor::new(data, shape)
    }

    /// Copies the rows at `indices` (in that order) into a new leaf tensor.
    pub fn gather_rows(&self, indices: &[usize]) -> Result<Tensor, TinyfitError> {
        let guard = self.read_data();
        let (rows, row_len) = split_leading(&guard.shape, "gather_rows")?;
        let src = guard.as_slice();
        let mut data = Vec::with_capacity(indices.len() * row_len);
        for &index in indices {
            if index >= rows {
                return Err(TinyfitError::IndexOutOfBounds {
                    index: vec![index],
                    shape: guard.shape.clone(),
                });
            }
            data.extend_from_slice(&src[index * row_len..(index + 1) * row_len]);
        }
        let mut shape = guard.shape.clone();
        shape[0] = indices.len();
        Tensor::new(data, shape)
    }

    /// Returns row `index` with the leading dimension removed.
    pub fn get_row(&self, index: usize) -> Result<Tensor, TinyfitError> {
        let guard = self.read_data();
        let (rows, row_len) = split_leading(&guard.shape, "get_row")?;
        if index >= rows {
            return Err(TinyfitError::IndexOutOfBounds {
                index: vec![index],
                shape: guard.shape.clone(),
            });
        }
        let data = guard.as_slice()[index * row_len..(index + 1) * row_len].to_vec();
        Tensor::new(data, guard.shape[1..].to_vec())
    }

    /// Applies `f` to the raw data in place.
    ///
    /// Bypasses autograd entirely; used by optimizers and initialisers on leaf
    /// parameters.
    pub fn update_data<F>(&self, f: F) -> Result<(), TinyfitError>
    where
        F: FnOnce(&mut [f32]) -> Result<(), TinyfitError>,
    {
        let mut guard = self.write_data();
        if guard.device != StorageDevice::CPU {
            return Err(TinyfitError::DeviceUnavailable {
                requested: guard.device,
                operation: "update_data".to_string(),
            });
        }
        f(guard.as_mut_slice())
    }
}

fn split_leading(shape: &[usize], operation: &str) -> Result<(usize, usize), TinyfitError> {
    match shape.split_first() {
        Some((&rows, rest)) => Ok((rows, rest.iter().product())),
        None => Err(TinyfitError::ShapeMismatch {
            expected: "a tensor with at least one dimension".to_string(),
            actual: "a scalar".to_string(),
            operation: operation.to_string(),
        }),
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.read_data();
        const PREVIEW: usize = 8;
        let data = guard.as_slice();
        let mut s = f.debug_struct("Tensor");
        s.field("shape", &guard.shape)
            .field("device", &guard.device)
            .field("requires_grad", &guard.requires_grad)
            .field("is_leaf", &guard.grad_fn.is_none());
        if data.len() <= PREVIEW {
            s.field("data", &data);
        } else {
            s.field("data", &format_args!("{:?}...", &data[..PREVIEW]));
        }
        s.finish()
    }
}
