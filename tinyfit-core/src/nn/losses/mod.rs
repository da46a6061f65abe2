//! Loss functions: map `(predictions, targets)` to a scalar that can be
//! back-propagated.

pub mod cross_entropy;
pub mod mse;

pub use cross_entropy::CrossEntropyLoss;
pub use mse::{MSELoss, Reduction};

use crate::error::TinyfitError;
use crate::tensor::Tensor;

/// Scores a batch of predictions against its targets.
///
/// The returned tensor holds a single element. While gradients are being
/// recorded it carries a backward node leading to `predictions`.
pub trait LossFunction {
    fn loss(&self, predictions: &Tensor, targets: &Tensor) -> Result<Tensor, TinyfitError>;
}

/// Plain functions and closures are loss functions too.
impl<F> LossFunction for F
where
    F: Fn(&Tensor, &Tensor) -> Result<Tensor, TinyfitError>,
{
    fn loss(&self, predictions: &Tensor, targets: &Tensor) -> Result<Tensor, TinyfitError> {
        self(predictions, targets)
    }
}

/// Checks that both tensors describe the same number of examples.
pub(crate) fn check_batch_len(
    predictions: &Tensor,
    targets: &Tensor,
    operation: &str,
) -> Result<usize, TinyfitError> {
    let pred_shape = predictions.shape();
    let target_shape = targets.shape();
    let (Some(&pred_len), Some(&target_len)) = (pred_shape.first(), target_shape.first()) else {
        return Err(TinyfitError::ShapeMismatch {
            expected: "tensors with a batch dimension".to_string(),
            actual: format!("{:?} and {:?}", pred_shape, target_shape),
            operation: operation.to_string(),
        });
    };
    if pred_len != target_len {
        return Err(TinyfitError::ShapeMismatch {
            expected: format!("{} targets", pred_len),
            actual: format!("{} targets", target_len),
            operation: operation.to_string(),
        });
    }
    Ok(pred_len)
}
