use crate::error::TinyfitError;
use crate::nn::losses::check_batch_len;
use crate::tensor::Tensor;

/// Fraction of rows of `predictions` `[B, C]` whose arg-max equals the class
/// index in `targets` `[B]`. Ties resolve to the lowest index.
pub fn accuracy(predictions: &Tensor, targets: &Tensor) -> Result<f32, TinyfitError> {
    let batch = check_batch_len(predictions, targets, "accuracy")?;
    let shape = predictions.shape();
    if shape.len() != 2 || shape[1] == 0 {
        return Err(TinyfitError::ShapeMismatch {
            expected: "predictions [B, C] with C > 0".to_string(),
            actual: format!("{:?}", shape),
            operation: "accuracy".to_string(),
        });
    }
    if batch == 0 {
        return Err(TinyfitError::EmptyDataset("accuracy over an empty batch".to_string()));
    }
    let scores = predictions.get_f32_data()?;
    let labels = targets.get_f32_data()?;
    let correct = scores
        .chunks(shape[1])
        .zip(labels.iter())
        .filter(|(row, label)| argmax(row) as f32 == **label)
        .count();
    Ok(correct as f32 / batch as f32)
}

fn argmax(row: &[f32]) -> usize {
    row.iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |(best, best_v), (i, &v)| {
            if v > best_v {
                (i, v)
            } else {
                (best, best_v)
            }
        })
        .0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::create_test_tensor;

    #[test]
    fn test_accuracy() -> Result<(), TinyfitError> {
        let preds = create_test_tensor(vec![0.1, 0.9, 0.8, 0.2, 0.5, 0.5, 0.0, 1.0], vec![4, 2]);
        let targets = create_test_tensor(vec![1.0, 0.0, 1.0, 1.0], vec![4]);
        assert_eq!(accuracy(&preds, &targets)?, 0.75);
        Ok(())
    }

    #[test]
    fn test_accuracy_batch_mismatch() {
        let preds = create_test_tensor(vec![0.0; 4], vec![2, 2]);
        let targets = create_test_tensor(vec![0.0], vec![1]);
        assert!(accuracy(&preds, &targets).is_err());
    }
}
