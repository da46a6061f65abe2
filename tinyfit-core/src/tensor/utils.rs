use crate::error::TinyfitError;
use crate::tensor::Tensor;

/// Element-wise sum of two same-shaped tensors, outside of autograd.
/// Used to accumulate gradients.
pub(crate) fn add_untracked(a: &Tensor, b: &Tensor) -> Result<Tensor, TinyfitError> {
    let (a_shape, b_shape) = (a.shape(), b.shape());
    if a_shape != b_shape {
        return Err(TinyfitError::ShapeMismatch {
            expected: format!("{:?}", a_shape),
            actual: format!("{:?}", b_shape),
            operation: "gradient accumulation".to_string(),
        });
    }
    let mut data = a.get_f32_data()?;
    let b_data = b.get_f32_data()?;
    for (x, y) in data.iter_mut().zip(&b_data) {
        *x += y;
    }
    Tensor::new(data, a_shape)
}

/// Sums `grad` over its leading dimensions so it matches `target_shape`,
/// which must be a suffix of `grad`'s shape. Inverse of suffix broadcasting.
pub(crate) fn reduce_gradient(grad: &[f32], target_shape: &[usize]) -> Vec<f32> {
    let inner: usize = target_shape.iter().product();
    let mut reduced = vec![0.0; inner];
    if inner == 0 {
        return reduced;
    }
    for chunk in grad.chunks(inner) {
        for (r, g) in reduced.iter_mut().zip(chunk) {
            *r += g;
        }
    }
    reduced
}

/// True if `suffix` equals the trailing dimensions of `shape`.
pub(crate) fn is_shape_suffix(shape: &[usize], suffix: &[usize]) -> bool {
    suffix.len() <= shape.len() && shape[shape.len() - suffix.len()..] == *suffix
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduce_gradient_sums_leading_dims() {
        let grad = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        assert_eq!(reduce_gradient(&grad, &[3]), vec![5.0, 7.0, 9.0]);
        assert_eq!(reduce_gradient(&grad, &[2, 3]), grad);
    }

    #[test]
    fn test_is_shape_suffix() {
        assert!(is_shape_suffix(&[4, 3], &[3]));
        assert!(is_shape_suffix(&[4, 3], &[4, 3]));
        assert!(!is_shape_suffix(&[4, 3], &[4]));
        assert!(!is_shape_suffix(&[3], &[2, 3]));
    }
}
