use crate::autograd::{attach_grad_fn, needs_grad, BackwardOp};
use crate::error::TinyfitError;
use crate::ops::linalg::matmul::transpose_raw;
use crate::tensor::Tensor;
use std::sync::Arc;

#[derive(Debug)]
struct TransposeBackward {
    input: Tensor,
}

impl BackwardOp for TransposeBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, TinyfitError> {
        let shape = grad_output.shape();
        let grad = transpose_raw(&grad_output.get_f32_data()?, shape[0], shape[1]);
        Ok(vec![Tensor::new(grad, vec![shape[1], shape[0]])?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

/// Swaps the two dimensions of a 2D tensor. The result is a copy.
pub fn transpose_op(input: &Tensor) -> Result<Tensor, TinyfitError> {
    let shape = input.shape();
    if shape.len() != 2 {
        return Err(TinyfitError::ShapeMismatch {
            expected: "a 2D tensor".to_string(),
            actual: format!("{:?}", shape),
            operation: "transpose".to_string(),
        });
    }
    let data = transpose_raw(&input.get_f32_data()?, shape[0], shape[1]);
    let output = Tensor::new(data, vec![shape[1], shape[0]])?;
    if needs_grad(&[input]) {
        attach_grad_fn(&output, Arc::new(TransposeBackward { input: input.clone() }));
    }
    Ok(output)
}

impl Tensor {
    /// Matrix transpose, `.t()` in the usual notation.
    pub fn t(&self) -> Result<Tensor, TinyfitError> {
        transpose_op(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transpose_forward_and_backward() -> Result<(), TinyfitError> {
        let w = Tensor::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3])?;
        w.set_requires_grad(true);
        let wt = w.t()?;
        assert_eq!(wt.shape(), vec![3, 2]);
        assert_eq!(wt.get_f32_data()?, vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);

        let upstream = Tensor::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![3, 2])?;
        wt.backward(Some(upstream))?;
        let grad = w.grad().map(|g| g.get_f32_data()).transpose()?;
        assert_eq!(grad, Some(vec![1.0, 3.0, 5.0, 2.0, 4.0, 6.0]));
        Ok(())
    }

    #[test]
    fn test_transpose_rejects_non_2d() -> Result<(), TinyfitError> {
        let x = Tensor::new(vec![1.0, 2.0], vec![2])?;
        assert!(x.t().is_err());
        Ok(())
    }
}
