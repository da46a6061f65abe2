use crate::device::StorageDevice;
use thiserror::Error;

/// Error type shared by every tinyfit crate.
///
/// Errors are never swallowed by the training loop: whatever a model, loss or
/// optimizer returns is handed back to the caller unchanged.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum TinyfitError {
    #[error("Shape mismatch: expected {expected}, got {actual} during operation {operation}")]
    ShapeMismatch {
        expected: String,
        actual: String,
        operation: String,
    },

    #[error("Incompatible shapes for operation {operation}: {shape1:?} and {shape2:?}")]
    IncompatibleShapes {
        shape1: Vec<usize>,
        shape2: Vec<usize>,
        operation: String,
    },

    #[error("Class index {value} at position {position} is out of range for {num_classes} classes")]
    ClassIndexOutOfRange {
        value: f32,
        position: usize,
        num_classes: usize,
    },

    #[error("Index out of bounds: index {index:?} for shape {shape:?}")]
    IndexOutOfBounds {
        index: Vec<usize>,
        shape: Vec<usize>,
    },

    #[error("Tensor creation error: data length {data_len} does not match shape {shape:?}")]
    TensorCreationError { data_len: usize, shape: Vec<usize> },

    #[error("Batch size must be a positive integer, got {0}")]
    InvalidBatchSize(usize),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Dataset is empty: {0}")]
    EmptyDataset(String),

    #[error("Backward called on non-scalar tensor of shape {0:?} without explicit gradient.")]
    BackwardNonScalar(Vec<usize>),

    #[error("Device {requested:?} is not available for operation '{operation}'")]
    DeviceUnavailable {
        requested: StorageDevice,
        operation: String,
    },

    #[error("Device mismatch for operation '{operation}': expected {expected:?}, got {actual:?}")]
    DeviceMismatch {
        expected: StorageDevice,
        actual: StorageDevice,
        operation: String,
    },

    #[error("Failed to acquire {lock_type} lock: {reason}")]
    LockError { lock_type: String, reason: String },

    #[error("Internal error: {0}")]
    InternalError(String),
}
