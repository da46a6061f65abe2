use crate::autograd::{attach_grad_fn, needs_grad, BackwardOp};
use crate::error::TinyfitError;
use crate::tensor::Tensor;
use std::sync::Arc;

#[derive(Debug)]
struct ReluBackward {
    input: Tensor,
}

impl BackwardOp for ReluBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, TinyfitError> {
        // grad = upstream * (input > 0)
        let input_data = self.input.get_f32_data()?;
        let grad = grad_output.get_f32_data()?;
        let local: Vec<f32> = grad
            .iter()
            .zip(&input_data)
            .map(|(&g, &x)| if x > 0.0 { g } else { 0.0 })
            .collect();
        Ok(vec![Tensor::new(local, self.input.shape())?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

/// Applies the Rectified Linear Unit element-wise: `max(0, x)`.
pub fn relu_op(input: &Tensor) -> Result<Tensor, TinyfitError> {
    let data: Vec<f32> = input
        .get_f32_data()?
        .into_iter()
        .map(|x| if x > 0.0 { x } else { 0.0 })
        .collect();
    let output = Tensor::new(data, input.shape())?;
    if needs_grad(&[input]) {
        attach_grad_fn(&output, Arc::new(ReluBackward { input: input.clone() }));
    }
    Ok(output)
}

impl Tensor {
    pub fn relu(&self) -> Result<Tensor, TinyfitError> {
        relu_op(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relu_forward() -> Result<(), TinyfitError> {
        let t = Tensor::new(vec![-2.0, -1.0, 0.0, 1.0, 2.0], vec![5])?;
        let result = t.relu()?;
        assert_eq!(result.get_f32_data()?, vec![0.0, 0.0, 0.0, 1.0, 2.0]);
        assert_eq!(result.shape(), vec![5]);
        assert!(!result.requires_grad());
        Ok(())
    }

    #[test]
    fn test_relu_backward_masks_negatives() -> Result<(), TinyfitError> {
        let t = Tensor::new(vec![-1.0, 0.0, 3.0], vec![3])?;
        t.set_requires_grad(true);
        let result = t.relu()?;
        assert!(result.requires_grad());
        assert!(result.grad_fn().is_some());

        result.backward(Some(Tensor::new(vec![5.0, 5.0, 5.0], vec![3])?))?;
        let grad = t.grad().map(|g| g.get_f32_data()).transpose()?;
        assert_eq!(grad, Some(vec![0.0, 0.0, 5.0]));
        Ok(())
    }
}
