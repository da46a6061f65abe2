//! Reverse-mode gradient machinery.
//!
//! Operations that produce a tensor from inputs requiring gradients attach a
//! [`BackwardOp`] to their output. [`Tensor::backward`](crate::Tensor::backward)
//! walks those nodes in reverse topological order and accumulates gradients
//! into leaf tensors.
//!
//! Recording can be suspended for a scope with [`no_grad`], which is how
//! inference batches run without building a graph.

use crate::error::TinyfitError;
use crate::tensor::Tensor;
use std::cell::Cell;
use std::fmt::Debug;
use std::sync::Arc;

pub mod graph;

/// Defines the backward pass of a differentiable tensor operation.
///
/// An implementation is stored in the output tensor's `grad_fn` and holds
/// whatever it needs from the forward pass (inputs, shapes, masks).
pub trait BackwardOp: Debug + Send + Sync {
    /// Given dL/dOutput, returns dL/dInput for every input.
    ///
    /// The returned vector must have the same length and order as
    /// [`inputs`](Self::inputs). Each gradient has the shape of its input.
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, TinyfitError>;

    /// The tensors that took part in the forward operation.
    fn inputs(&self) -> Vec<Tensor>;
}

thread_local! {
    static GRAD_ENABLED: Cell<bool> = const { Cell::new(true) };
}

/// Whether operations on the current thread record a graph.
pub fn is_grad_enabled() -> bool {
    GRAD_ENABLED.with(|flag| flag.get())
}

/// Restores the previous recording state when dropped.
#[derive(Debug)]
pub struct NoGradGuard {
    previous: bool,
}

impl NoGradGuard {
    pub fn new() -> Self {
        let previous = GRAD_ENABLED.with(|flag| flag.replace(false));
        NoGradGuard { previous }
    }
}

impl Default for NoGradGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for NoGradGuard {
    fn drop(&mut self) {
        GRAD_ENABLED.with(|flag| flag.set(self.previous));
    }
}

/// Runs `f` with graph recording disabled on this thread.
///
/// Tensors produced inside the scope never carry a `grad_fn` and never
/// require gradients. The previous state is restored on return, including
/// when `f` returns an error or panics.
pub fn no_grad<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = NoGradGuard::new();
    f()
}

/// True if an op over `inputs` must record a backward node.
pub(crate) fn needs_grad(inputs: &[&Tensor]) -> bool {
    is_grad_enabled() && inputs.iter().any(|t| t.requires_grad())
}

/// Marks `output` as produced by `op`.
pub(crate) fn attach_grad_fn(output: &Tensor, op: Arc<dyn BackwardOp>) {
    let mut guard = output.write_data();
    guard.requires_grad = true;
    guard.grad_fn = Some(op);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_grad_restores_previous_state() {
        assert!(is_grad_enabled());
        no_grad(|| {
            assert!(!is_grad_enabled());
            no_grad(|| assert!(!is_grad_enabled()));
            assert!(!is_grad_enabled());
        });
        assert!(is_grad_enabled());
    }

    #[test]
    fn test_no_grad_restores_after_error() {
        let result: Result<(), TinyfitError> =
            no_grad(|| Err(TinyfitError::InternalError("boom".to_string())));
        assert!(result.is_err());
        assert!(is_grad_enabled());
    }

    #[test]
    fn test_needs_grad() -> Result<(), TinyfitError> {
        let a = Tensor::new(vec![1.0], vec![1])?;
        let b = Tensor::new(vec![1.0], vec![1])?;
        assert!(!needs_grad(&[&a, &b]));
        b.set_requires_grad(true);
        assert!(needs_grad(&[&a, &b]));
        assert!(!no_grad(|| needs_grad(&[&a, &b])));
        Ok(())
    }
}
