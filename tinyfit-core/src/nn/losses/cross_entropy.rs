use super::{check_batch_len, LossFunction};
use crate::autograd::{attach_grad_fn, needs_grad, BackwardOp};
use crate::error::TinyfitError;
use crate::tensor::Tensor;
use num_traits::ToPrimitive;
use std::sync::Arc;

#[derive(Debug)]
struct CrossEntropyBackward {
    input: Tensor,
    /// Row-wise softmax of the logits, `[B, C]` flattened.
    probs: Vec<f32>,
    classes: Vec<usize>,
    num_classes: usize,
}

impl BackwardOp for CrossEntropyBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, TinyfitError> {
        let scale = grad_output.item_f32()? / self.classes.len() as f32;
        let mut grad = self.probs.clone();
        for (row, &class) in self.classes.iter().enumerate() {
            grad[row * self.num_classes + class] -= 1.0;
        }
        grad.iter_mut().for_each(|g| *g *= scale);
        Ok(vec![Tensor::new(grad, self.input.shape())?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

/// Converts float-encoded class labels to indices in `0..num_classes`.
fn class_indices(targets: &[f32], num_classes: usize) -> Result<Vec<usize>, TinyfitError> {
    targets
        .iter()
        .enumerate()
        .map(|(position, &value)| {
            let out_of_range = TinyfitError::ClassIndexOutOfRange {
                value,
                position,
                num_classes,
            };
            if value.fract() != 0.0 {
                return Err(out_of_range);
            }
            match value.to_usize() {
                Some(class) if class < num_classes => Ok(class),
                _ => Err(out_of_range),
            }
        })
        .collect()
}

/// Cross-entropy between scores `[B, C]` and class indices `[B]`,
/// averaged over the batch.
///
/// Log-softmax and negative log-likelihood are fused. Log-softmax is
/// invariant to a per-row shift, so raw logits and log-probabilities give
/// the same loss.
///
/// # Errors
/// * `ShapeMismatch` if predictions are not `[B, C]`, targets are not `[B]`,
///   or the batch sizes differ.
/// * `ClassIndexOutOfRange` if a target is not an integer in `0..C`.
/// * `EmptyDataset` for a batch of zero examples.
pub fn cross_entropy_op(predictions: &Tensor, targets: &Tensor) -> Result<Tensor, TinyfitError> {
    let batch = check_batch_len(predictions, targets, "cross_entropy")?;
    let pred_shape = predictions.shape();
    if pred_shape.len() != 2 || targets.rank() != 1 {
        return Err(TinyfitError::ShapeMismatch {
            expected: "predictions [B, C] and targets [B]".to_string(),
            actual: format!("{:?} and {:?}", pred_shape, targets.shape()),
            operation: "cross_entropy".to_string(),
        });
    }
    if batch == 0 {
        return Err(TinyfitError::EmptyDataset(
            "cross_entropy over an empty batch".to_string(),
        ));
    }
    let num_classes = pred_shape[1];
    let classes = class_indices(&targets.get_f32_data()?, num_classes)?;
    let logits = predictions.get_f32_data()?;

    let mut probs = Vec::with_capacity(logits.len());
    let mut total = 0.0f32;
    for (row, &class) in logits.chunks(num_classes).zip(classes.iter()) {
        let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let sum_exp: f32 = row.iter().map(|&v| (v - max).exp()).sum();
        let log_sum_exp = max + sum_exp.ln();
        total += log_sum_exp - row[class];
        probs.extend(row.iter().map(|&v| (v - log_sum_exp).exp()));
    }

    let output = Tensor::scalar(total / batch as f32);
    if needs_grad(&[predictions]) {
        attach_grad_fn(
            &output,
            Arc::new(CrossEntropyBackward {
                input: predictions.clone(),
                probs,
                classes,
                num_classes,
            }),
        );
    }
    Ok(output)
}

/// [`LossFunction`] wrapper around [`cross_entropy_op`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossEntropyLoss;

impl CrossEntropyLoss {
    pub fn new() -> Self {
        CrossEntropyLoss
    }
}

impl LossFunction for CrossEntropyLoss {
    fn loss(&self, predictions: &Tensor, targets: &Tensor) -> Result<Tensor, TinyfitError> {
        cross_entropy_op(predictions, targets)
    }
}

#[cfg(test)]
#[path = "cross_entropy_test.rs"]
mod tests;
