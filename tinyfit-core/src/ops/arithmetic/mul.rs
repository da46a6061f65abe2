use crate::autograd::{attach_grad_fn, needs_grad, BackwardOp};
use crate::error::TinyfitError;
use crate::tensor::Tensor;
use std::sync::Arc;

#[derive(Debug)]
struct MulBackward {
    a: Tensor,
    b: Tensor,
}

impl BackwardOp for MulBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, TinyfitError> {
        let grad = grad_output.get_f32_data()?;
        let a_data = self.a.get_f32_data()?;
        let b_data = self.b.get_f32_data()?;
        let shape = grad_output.shape();
        // dL/da = g * b, dL/db = g * a
        let grad_a = grad.iter().zip(&b_data).map(|(g, b)| g * b).collect();
        let grad_b = grad.iter().zip(&a_data).map(|(g, a)| g * a).collect();
        Ok(vec![
            Tensor::new(grad_a, shape.clone())?,
            Tensor::new(grad_b, shape)?,
        ])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone(), self.b.clone()]
    }
}

/// Element-wise product of two tensors of identical shape.
pub fn mul_op(a: &Tensor, b: &Tensor) -> Result<Tensor, TinyfitError> {
    let a_shape = a.shape();
    let b_shape = b.shape();
    if a_shape != b_shape {
        return Err(TinyfitError::IncompatibleShapes {
            shape1: a_shape,
            shape2: b_shape,
            operation: "mul".to_string(),
        });
    }

    let a_data = a.get_f32_data()?;
    let b_data = b.get_f32_data()?;
    let output_data = a_data.iter().zip(&b_data).map(|(x, y)| x * y).collect();

    let output = Tensor::new(output_data, a_shape)?;
    if needs_grad(&[a, b]) {
        attach_grad_fn(
            &output,
            Arc::new(MulBackward {
                a: a.clone(),
                b: b.clone(),
            }),
        );
    }
    Ok(output)
}

impl Tensor {
    pub fn mul(&self, other: &Tensor) -> Result<Tensor, TinyfitError> {
        mul_op(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_forward_and_backward() -> Result<(), TinyfitError> {
        let a = Tensor::new(vec![1.0, 2.0, 3.0], vec![3])?;
        let mask = Tensor::new(vec![0.0, 2.0, 2.0], vec![3])?;
        a.set_requires_grad(true);

        let y = mul_op(&a, &mask)?;
        assert_eq!(y.get_f32_data()?, vec![0.0, 4.0, 6.0]);

        y.sum()?.backward(None)?;
        let grad = a.grad().map(|g| g.get_f32_data()).transpose()?;
        assert_eq!(grad, Some(vec![0.0, 2.0, 2.0]));
        Ok(())
    }

    #[test]
    fn test_mul_shape_mismatch() -> Result<(), TinyfitError> {
        let a = Tensor::new(vec![1.0, 2.0], vec![2])?;
        let b = Tensor::new(vec![1.0, 2.0], vec![1, 2])?;
        assert!(mul_op(&a, &b).is_err());
        Ok(())
    }
}
