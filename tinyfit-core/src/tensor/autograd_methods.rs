use crate::autograd::graph::{topological_sort, NodeId};
use crate::autograd::BackwardOp;
use crate::error::TinyfitError;
use crate::tensor::utils::add_untracked;
use crate::tensor::Tensor;
use std::collections::HashMap;
use std::sync::Arc;

impl Tensor {
    /// Checks if this tensor requires gradient computation.
    pub fn requires_grad(&self) -> bool {
        self.read_data().requires_grad
    }

    /// Sets the `requires_grad` flag for this tensor.
    pub fn set_requires_grad(&self, requires_grad: bool) {
        let mut guard = self.write_data();
        if requires_grad && guard.grad_fn.is_some() {
            log::warn!(
                "Setting requires_grad=true on a non-leaf tensor; gradients will not accumulate here. Did you mean to use .detach()?"
            );
        }
        guard.requires_grad = requires_grad;
    }

    /// A leaf was created directly rather than computed by a recorded op.
    pub fn is_leaf(&self) -> bool {
        self.read_data().grad_fn.is_none()
    }

    /// Returns a handle to the accumulated gradient, if any.
    pub fn grad(&self) -> Option<Tensor> {
        self.read_data().grad.clone()
    }

    /// Adds `grad_to_add` into this tensor's gradient.
    pub fn acc_grad(&self, grad_to_add: Tensor) -> Result<(), TinyfitError> {
        let mut guard = self.write_data();

        if guard.device != grad_to_add.device() {
            return Err(TinyfitError::DeviceMismatch {
                expected: guard.device,
                actual: grad_to_add.device(),
                operation: "acc_grad".to_string(),
            });
        }
        if grad_to_add.shape() != guard.shape {
            return Err(TinyfitError::ShapeMismatch {
                expected: format!("{:?}", guard.shape),
                actual: format!("{:?}", grad_to_add.shape()),
                operation: "acc_grad".to_string(),
            });
        }

        let summed = match guard.grad.take() {
            Some(existing) => add_untracked(&existing, &grad_to_add)?,
            None => grad_to_add.detach(),
        };
        guard.grad = Some(summed);
        Ok(())
    }

    /// Resets an existing gradient to zeros. A tensor without a gradient is
    /// left untouched, so calling this repeatedly has no further effect.
    pub fn zero_grad(&self) -> Result<(), TinyfitError> {
        let grad = self.grad();
        match grad {
            Some(g) => g.update_data(|d| {
                d.fill(0.0);
                Ok(())
            }),
            None => Ok(()),
        }
    }

    /// Returns the backward node that produced this tensor.
    pub fn grad_fn(&self) -> Option<Arc<dyn BackwardOp>> {
        self.read_data().grad_fn.clone()
    }

    /// Computes gradients of this tensor with respect to every leaf that
    /// requires them, accumulating into the leaves' `grad`.
    ///
    /// # Arguments
    /// * `gradient`: dL/dself. May be `None` only when this tensor holds a
    ///   single element, in which case `1.0` is used.
    ///
    /// # Errors
    /// * `BackwardNonScalar` if `gradient` is `None` for a multi-element tensor.
    /// * `ShapeMismatch` if `gradient` has the wrong shape.
    /// * Any error raised by a node's backward computation.
    pub fn backward(&self, gradient: Option<Tensor>) -> Result<(), TinyfitError> {
        if !self.requires_grad() {
            return Ok(());
        }

        let grad_init = match gradient {
            Some(g) => {
                if g.shape() != self.shape() {
                    return Err(TinyfitError::ShapeMismatch {
                        expected: format!("{:?}", self.shape()),
                        actual: format!("{:?}", g.shape()),
                        operation: "backward".to_string(),
                    });
                }
                g
            }
            None => {
                if self.numel() != 1 {
                    return Err(TinyfitError::BackwardNonScalar(self.shape()));
                }
                Tensor::new(vec![1.0], self.shape())?
            }
        };

        let mut grad_map: HashMap<NodeId, Tensor> = HashMap::new();
        grad_map.insert(self.node_id(), grad_init);

        let sorted_nodes = topological_sort(self);

        for node in sorted_nodes.iter().rev() {
            let Some(accumulated) = grad_map.remove(&node.node_id()) else {
                continue;
            };

            match node.grad_fn() {
                Some(op) => {
                    let input_grads = op.backward(&accumulated)?;
                    let inputs = op.inputs();
                    if input_grads.len() != inputs.len() {
                        return Err(TinyfitError::InternalError(format!(
                            "BackwardOp returned {} gradients, but expected {} (for op: {:?})",
                            input_grads.len(),
                            inputs.len(),
                            op
                        )));
                    }
                    for (input, grad) in inputs.iter().zip(input_grads) {
                        if !input.requires_grad() {
                            continue;
                        }
                        let id = input.node_id();
                        let merged = match grad_map.remove(&id) {
                            Some(existing) => add_untracked(&existing, &grad)?,
                            None => grad,
                        };
                        grad_map.insert(id, merged);
                    }
                }
                None => {
                    if node.requires_grad() {
                        node.acc_grad(accumulated)?;
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::TinyfitError;
    use crate::tensor::Tensor;

    #[test]
    fn test_acc_grad_accumulates() -> Result<(), TinyfitError> {
        let t = Tensor::new(vec![1.0, 1.0], vec![2])?;
        t.set_requires_grad(true);
        t.acc_grad(Tensor::new(vec![0.5, 1.0], vec![2])?)?;
        t.acc_grad(Tensor::new(vec![0.5, 1.0], vec![2])?)?;
        assert_eq!(t.grad().map(|g| g.get_f32_data()).transpose()?, Some(vec![1.0, 2.0]));
        Ok(())
    }

    #[test]
    fn test_acc_grad_shape_mismatch() -> Result<(), TinyfitError> {
        let t = Tensor::new(vec![1.0, 1.0], vec![2])?;
        let result = t.acc_grad(Tensor::new(vec![1.0], vec![1])?);
        assert!(matches!(result, Err(TinyfitError::ShapeMismatch { .. })));
        Ok(())
    }

    #[test]
    fn test_zero_grad_is_idempotent() -> Result<(), TinyfitError> {
        let t = Tensor::new(vec![1.0, 2.0], vec![2])?;
        t.set_requires_grad(true);
        t.acc_grad(Tensor::new(vec![3.0, -4.0], vec![2])?)?;

        t.zero_grad()?;
        let once = t.grad().map(|g| g.get_f32_data()).transpose()?;
        t.zero_grad()?;
        let twice = t.grad().map(|g| g.get_f32_data()).transpose()?;

        assert_eq!(once, Some(vec![0.0, 0.0]));
        assert_eq!(once, twice);
        Ok(())
    }

    #[test]
    fn test_backward_through_shared_input() -> Result<(), TinyfitError> {
        // y = sum(x * x + x) ; dy/dx = 2x + 1
        let x = Tensor::new(vec![1.0, -2.0, 3.0], vec![3])?;
        x.set_requires_grad(true);
        let y = x.mul(&x)?.add(&x)?.sum()?;
        y.backward(None)?;
        let grad = x.grad().map(|g| g.get_f32_data()).transpose()?;
        assert_eq!(grad, Some(vec![3.0, -3.0, 7.0]));
        Ok(())
    }

    #[test]
    fn test_backward_non_scalar_requires_gradient() -> Result<(), TinyfitError> {
        let x = Tensor::new(vec![1.0, 2.0], vec![2])?;
        x.set_requires_grad(true);
        let y = x.relu()?;
        assert_eq!(y.backward(None), Err(TinyfitError::BackwardNonScalar(vec![2])));
        y.backward(Some(Tensor::new(vec![1.0, 1.0], vec![2])?))?;
        assert!(x.grad().is_some());
        Ok(())
    }

    #[test]
    fn test_backward_on_untracked_tensor_is_noop() -> Result<(), TinyfitError> {
        let x = Tensor::new(vec![1.0], vec![1])?;
        x.backward(None)?;
        assert!(x.grad().is_none());
        Ok(())
    }
}
