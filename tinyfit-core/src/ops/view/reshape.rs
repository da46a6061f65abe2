use crate::autograd::{attach_grad_fn, needs_grad, BackwardOp};
use crate::error::TinyfitError;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;
use std::sync::Arc;

#[derive(Debug)]
struct ReshapeBackward {
    input: Tensor,
    input_shape: Vec<usize>,
}

impl BackwardOp for ReshapeBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, TinyfitError> {
        Ok(vec![Tensor::new(
            grad_output.get_f32_data()?,
            self.input_shape.clone(),
        )?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

/// Returns a tensor with the same data under `new_shape`. The buffer is shared.
///
/// # Errors
/// `ShapeMismatch` if the element counts differ.
pub fn reshape_op(input: &Tensor, new_shape: Vec<usize>) -> Result<Tensor, TinyfitError> {
    let (buffer, device, old_shape) = {
        let guard = input.read_data();
        (Arc::clone(&guard.buffer), guard.device, guard.shape.clone())
    };
    let old_numel: usize = old_shape.iter().product();
    let new_numel: usize = new_shape.iter().product();
    if old_numel != new_numel {
        return Err(TinyfitError::ShapeMismatch {
            expected: format!("{} elements", old_numel),
            actual: format!("{:?} ({} elements)", new_shape, new_numel),
            operation: "reshape".to_string(),
        });
    }

    let output = Tensor::from_data(TensorData::new_view(buffer, device, new_shape)?);
    if needs_grad(&[input]) {
        attach_grad_fn(
            &output,
            Arc::new(ReshapeBackward {
                input: input.clone(),
                input_shape: old_shape,
            }),
        );
    }
    Ok(output)
}

impl Tensor {
    pub fn reshape(&self, new_shape: Vec<usize>) -> Result<Tensor, TinyfitError> {
        reshape_op(self, new_shape)
    }

    /// Reshapes to `[batch, tail...]`, inferring `batch` from the element count.
    pub fn view_batch(&self, tail: &[usize]) -> Result<Tensor, TinyfitError> {
        let inner: usize = tail.iter().product();
        let numel = self.numel();
        if inner == 0 || numel % inner != 0 {
            return Err(TinyfitError::ShapeMismatch {
                expected: format!("a multiple of {} elements", inner),
                actual: format!("{} elements", numel),
                operation: "view_batch".to_string(),
            });
        }
        let mut shape = Vec::with_capacity(tail.len() + 1);
        shape.push(numel / inner);
        shape.extend_from_slice(tail);
        reshape_op(self, shape)
    }

    /// Collapses every dimension after the first: `[B, ...] -> [B, prod(...)]`.
    pub fn flatten_batch(&self) -> Result<Tensor, TinyfitError> {
        let shape = self.shape();
        let batch = shape.first().copied().unwrap_or(1);
        let inner = shape.iter().skip(1).product();
        reshape_op(self, vec![batch, inner])
    }
}
