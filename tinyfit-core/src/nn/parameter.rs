use crate::device::StorageDevice;
use crate::error::TinyfitError;
use crate::tensor::Tensor;
use std::fmt;
use std::ops::Deref;

/// A learnable tensor owned by a [`Module`](crate::nn::Module).
///
/// The wrapped tensor always requires gradients. Cloning a `Parameter` clones
/// the handle, so an optimizer built from `model.parameters()` updates the
/// very values the model reads in `forward`.
#[derive(Clone)]
pub struct Parameter {
    tensor: Tensor,
    name: Option<String>,
}

impl Parameter {
    /// Wraps `tensor` and marks it as requiring gradients.
    pub fn new(tensor: Tensor, name: Option<String>) -> Self {
        tensor.set_requires_grad(true);
        Parameter { tensor, name }
    }

    pub fn new_unnamed(tensor: Tensor) -> Self {
        Self::new(tensor, None)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn tensor(&self) -> &Tensor {
        &self.tensor
    }

    pub fn into_inner(self) -> Tensor {
        self.tensor
    }

    /// Moves the parameter's storage to `device` in place.
    ///
    /// Clones handed to an optimizer before the move keep pointing at the
    /// same storage and therefore follow it.
    pub fn to_device(&mut self, device: StorageDevice) -> Result<(), TinyfitError> {
        self.tensor.move_to_device_(device)
    }
}

impl Deref for Parameter {
    type Target = Tensor;

    fn deref(&self) -> &Self::Target {
        &self.tensor
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "Parameter({}: {:?})", name, self.tensor),
            None => write!(f, "Parameter({:?})", self.tensor),
        }
    }
}

#[cfg(test)]
#[path = "parameter_test.rs"]
mod tests;
