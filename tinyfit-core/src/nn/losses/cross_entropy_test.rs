use super::*;
use crate::utils::testing::{check_tensor_near, create_test_tensor, create_test_tensor_with_grad};
use approx::assert_relative_eq;

#[test]
fn test_uniform_logits_give_log_num_classes() -> Result<(), TinyfitError> {
    let logits = create_test_tensor(vec![0.0; 20], vec![2, 10]);
    let targets = create_test_tensor(vec![3.0, 7.0], vec![2]);
    let loss = CrossEntropyLoss::new().loss(&logits, &targets)?;
    assert_relative_eq!(loss.item_f32()?, 10f32.ln(), epsilon = 1e-6);
    Ok(())
}

#[test]
fn test_known_value_and_gradient() -> Result<(), TinyfitError> {
    // softmax([0, ln 3]) = [0.25, 0.75]
    let logits = create_test_tensor_with_grad(vec![0.0, 3f32.ln()], vec![1, 2]);
    let targets = create_test_tensor(vec![1.0], vec![1]);
    let loss = cross_entropy_op(&logits, &targets)?;
    assert_relative_eq!(loss.item_f32()?, -(0.75f32.ln()), epsilon = 1e-6);

    loss.backward(None)?;
    let grad = logits.grad().ok_or(TinyfitError::InternalError("no grad".into()))?;
    check_tensor_near(&grad, &[1, 2], &[0.25, -0.25], 1e-6);
    Ok(())
}

#[test]
fn test_gradient_is_averaged_over_batch() -> Result<(), TinyfitError> {
    let logits = create_test_tensor_with_grad(vec![0.0; 4], vec![2, 2]);
    let targets = create_test_tensor(vec![0.0, 1.0], vec![2]);
    cross_entropy_op(&logits, &targets)?.backward(None)?;
    let grad = logits.grad().ok_or(TinyfitError::InternalError("no grad".into()))?;
    check_tensor_near(&grad, &[2, 2], &[-0.25, 0.25, 0.25, -0.25], 1e-6);
    Ok(())
}

#[test]
fn test_large_logits_stay_finite() -> Result<(), TinyfitError> {
    let logits = create_test_tensor(vec![1000.0, 0.0], vec![1, 2]);
    let targets = create_test_tensor(vec![0.0], vec![1]);
    let loss = cross_entropy_op(&logits, &targets)?.item_f32()?;
    assert!(loss.is_finite());
    assert_relative_eq!(loss, 0.0, epsilon = 1e-6);
    Ok(())
}

#[test]
fn test_logits_and_log_probabilities_agree() -> Result<(), TinyfitError> {
    let raw = vec![1.0f32, 2.0, 3.0, 0.5, -1.0, 2.0];
    let mut log_probs = Vec::with_capacity(raw.len());
    for row in raw.chunks(3) {
        let log_sum_exp = row.iter().map(|v| v.exp()).sum::<f32>().ln();
        log_probs.extend(row.iter().map(|v| v - log_sum_exp));
    }
    let targets = create_test_tensor(vec![2.0, 0.0], vec![2]);
    let loss_fn = CrossEntropyLoss::new();
    let from_logits = loss_fn.loss(&create_test_tensor(raw, vec![2, 3]), &targets)?;
    let from_log_probs = loss_fn.loss(&create_test_tensor(log_probs, vec![2, 3]), &targets)?;
    assert_relative_eq!(from_logits.item_f32()?, from_log_probs.item_f32()?, epsilon = 1e-5);
    Ok(())
}

#[test]
fn test_class_index_out_of_range() -> Result<(), TinyfitError> {
    let logits = create_test_tensor(vec![0.0; 20], vec![2, 10]);
    let targets = create_test_tensor(vec![3.0, 10.0], vec![2]);
    assert_eq!(
        cross_entropy_op(&logits, &targets).err(),
        Some(TinyfitError::ClassIndexOutOfRange {
            value: 10.0,
            position: 1,
            num_classes: 10
        })
    );

    let fractional = create_test_tensor(vec![1.5, 0.0], vec![2]);
    assert!(matches!(
        cross_entropy_op(&logits, &fractional),
        Err(TinyfitError::ClassIndexOutOfRange { position: 0, .. })
    ));
    let negative = create_test_tensor(vec![-1.0, 0.0], vec![2]);
    assert!(matches!(
        cross_entropy_op(&logits, &negative),
        Err(TinyfitError::ClassIndexOutOfRange { .. })
    ));
    Ok(())
}

#[test]
fn test_batch_length_mismatch() -> Result<(), TinyfitError> {
    let logits = create_test_tensor(vec![0.0; 30], vec![3, 10]);
    let targets = create_test_tensor(vec![0.0, 1.0], vec![2]);
    assert!(matches!(
        cross_entropy_op(&logits, &targets),
        Err(TinyfitError::ShapeMismatch { .. })
    ));
    Ok(())
}

#[test]
fn test_closure_is_a_loss_function() -> Result<(), TinyfitError> {
    let loss_fn = |p: &Tensor, t: &Tensor| cross_entropy_op(p, t);
    let logits = create_test_tensor(vec![0.0; 2], vec![1, 2]);
    let targets = create_test_tensor(vec![0.0], vec![1]);
    assert_relative_eq!(loss_fn.loss(&logits, &targets)?.item_f32()?, 2f32.ln(), epsilon = 1e-6);
    Ok(())
}
