use crate::autograd::{attach_grad_fn, needs_grad, BackwardOp};
use crate::error::TinyfitError;
use crate::tensor::Tensor;
use std::sync::Arc;

/// Backward for full reductions: every input element receives
/// `grad_output * scale`.
#[derive(Debug)]
struct ReduceAllBackward {
    input: Tensor,
    scale: f32,
}

impl BackwardOp for ReduceAllBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, TinyfitError> {
        let g = grad_output.item_f32()? * self.scale;
        let shape = self.input.shape();
        let numel = shape.iter().product();
        Ok(vec![Tensor::new(vec![g; numel], shape)?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

fn reduce_all(input: &Tensor, scale: f32) -> Result<Tensor, TinyfitError> {
    let total: f32 = input.get_f32_data()?.iter().sum();
    let output = Tensor::scalar(total * scale);
    if needs_grad(&[input]) {
        attach_grad_fn(
            &output,
            Arc::new(ReduceAllBackward {
                input: input.clone(),
                scale,
            }),
        );
    }
    Ok(output)
}

/// Sums every element into a scalar.
pub fn sum_op(input: &Tensor) -> Result<Tensor, TinyfitError> {
    reduce_all(input, 1.0)
}

/// Averages every element into a scalar.
///
/// # Errors
/// `EmptyDataset` if the tensor has no elements.
pub fn mean_op(input: &Tensor) -> Result<Tensor, TinyfitError> {
    let numel = input.numel();
    if numel == 0 {
        return Err(TinyfitError::EmptyDataset(
            "mean of a tensor with no elements".to_string(),
        ));
    }
    reduce_all(input, 1.0 / numel as f32)
}

impl Tensor {
    pub fn sum(&self) -> Result<Tensor, TinyfitError> {
        sum_op(self)
    }

    pub fn mean(&self) -> Result<Tensor, TinyfitError> {
        mean_op(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_backward_spreads_evenly() -> Result<(), TinyfitError> {
        let x = Tensor::new(vec![1.0, 2.0, 3.0, 6.0], vec![2, 2])?;
        x.set_requires_grad(true);
        let m = x.mean()?;
        assert_eq!(m.item_f32()?, 3.0);
        m.backward(None)?;
        let grad = x.grad().map(|g| g.get_f32_data()).transpose()?;
        assert_eq!(grad, Some(vec![0.25; 4]));
        Ok(())
    }

    #[test]
    fn test_mean_of_empty_fails() -> Result<(), TinyfitError> {
        let x = Tensor::new(vec![], vec![0, 3])?;
        assert!(matches!(x.mean(), Err(TinyfitError::EmptyDataset(_))));
        assert_eq!(x.sum()?.item_f32()?, 0.0);
        Ok(())
    }
}
