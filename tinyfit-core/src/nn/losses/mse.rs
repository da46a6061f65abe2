use super::{check_batch_len, LossFunction};
use crate::autograd::{attach_grad_fn, needs_grad, BackwardOp};
use crate::error::TinyfitError;
use crate::tensor::Tensor;
use std::str::FromStr;
use std::sync::Arc;

/// How per-element losses are combined into one scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reduction {
    #[default]
    Mean,
    Sum,
}

impl FromStr for Reduction {
    type Err = TinyfitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mean" => Ok(Reduction::Mean),
            "sum" => Ok(Reduction::Sum),
            _ => Err(TinyfitError::InvalidConfiguration(format!(
                "Unsupported reduction type: {}",
                s
            ))),
        }
    }
}

#[derive(Debug)]
struct MseBackward {
    input: Tensor,
    diff: Vec<f32>,
    scale: f32,
}

impl BackwardOp for MseBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, TinyfitError> {
        let factor = 2.0 * self.scale * grad_output.item_f32()?;
        let grad = self.diff.iter().map(|d| d * factor).collect();
        Ok(vec![Tensor::new(grad, self.input.shape())?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

/// Squared error between predictions and targets of identical shape.
///
/// Gradients flow to `predictions` only; targets are treated as constants.
#[derive(Debug, Clone, Copy, Default)]
pub struct MSELoss {
    reduction: Reduction,
}

impl MSELoss {
    pub fn new(reduction: Reduction) -> Self {
        MSELoss { reduction }
    }

    pub fn reduction(&self) -> Reduction {
        self.reduction
    }

    pub fn calculate(&self, predictions: &Tensor, targets: &Tensor) -> Result<Tensor, TinyfitError> {
        check_batch_len(predictions, targets, "mse_loss")?;
        if predictions.shape() != targets.shape() {
            return Err(TinyfitError::ShapeMismatch {
                expected: format!("{:?}", predictions.shape()),
                actual: format!("{:?}", targets.shape()),
                operation: "mse_loss".to_string(),
            });
        }
        let pred = predictions.get_f32_data()?;
        let target = targets.get_f32_data()?;
        if pred.is_empty() {
            return Err(TinyfitError::EmptyDataset("mse_loss over an empty batch".to_string()));
        }
        let diff: Vec<f32> = pred.iter().zip(target.iter()).map(|(p, t)| p - t).collect();
        let scale = match self.reduction {
            Reduction::Mean => 1.0 / diff.len() as f32,
            Reduction::Sum => 1.0,
        };
        let total: f32 = diff.iter().map(|d| d * d).sum();

        let output = Tensor::scalar(total * scale);
        if needs_grad(&[predictions]) {
            attach_grad_fn(
                &output,
                Arc::new(MseBackward {
                    input: predictions.clone(),
                    diff,
                    scale,
                }),
            );
        }
        Ok(output)
    }
}

impl LossFunction for MSELoss {
    fn loss(&self, predictions: &Tensor, targets: &Tensor) -> Result<Tensor, TinyfitError> {
        self.calculate(predictions, targets)
    }
}

#[cfg(test)]
#[path = "mse_test.rs"]
mod tests;
