use crate::autograd::{attach_grad_fn, needs_grad, BackwardOp};
use crate::error::TinyfitError;
use crate::tensor::utils::{is_shape_suffix, reduce_gradient};
use crate::tensor::Tensor;
use std::sync::Arc;

#[derive(Debug)]
struct AddBackward {
    a: Tensor,
    b: Tensor,
    a_shape: Vec<usize>,
    b_shape: Vec<usize>,
}

impl BackwardOp for AddBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, TinyfitError> {
        let grad = grad_output.get_f32_data()?;
        let grad_a = Tensor::new(reduce_gradient(&grad, &self.a_shape), self.a_shape.clone())?;
        let grad_b = Tensor::new(reduce_gradient(&grad, &self.b_shape), self.b_shape.clone())?;
        Ok(vec![grad_a, grad_b])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone(), self.b.clone()]
    }
}

/// Element-wise addition with suffix broadcasting.
///
/// Shapes must be equal, or one must match the trailing dimensions of the
/// other (e.g. a `[N]` bias added to a `[B, N]` activation).
pub fn add_op(a: &Tensor, b: &Tensor) -> Result<Tensor, TinyfitError> {
    let a_shape = a.shape();
    let b_shape = b.shape();

    let output_shape = if is_shape_suffix(&a_shape, &b_shape) {
        a_shape.clone()
    } else if is_shape_suffix(&b_shape, &a_shape) {
        b_shape.clone()
    } else {
        return Err(TinyfitError::IncompatibleShapes {
            shape1: a_shape,
            shape2: b_shape,
            operation: "add".to_string(),
        });
    };

    let a_data = a.get_f32_data()?;
    let b_data = b.get_f32_data()?;
    let numel: usize = output_shape.iter().product();
    let output_data: Vec<f32> = (0..numel)
        .map(|i| a_data[i % a_data.len().max(1)] + b_data[i % b_data.len().max(1)])
        .collect();

    let output = Tensor::new(output_data, output_shape)?;
    if needs_grad(&[a, b]) {
        attach_grad_fn(
            &output,
            Arc::new(AddBackward {
                a: a.clone(),
                b: b.clone(),
                a_shape,
                b_shape,
            }),
        );
    }
    Ok(output)
}

impl Tensor {
    pub fn add(&self, other: &Tensor) -> Result<Tensor, TinyfitError> {
        add_op(self, other)
    }
}
