use crate::error::TinyfitError;
use crate::tensor::Tensor;

/// Stacks same-shaped tensors along a new leading dimension.
///
/// Used to collate samples into batches. The result is a fresh leaf: stacking
/// is a data-preparation step and is not recorded for backward.
///
/// # Errors
/// * `EmptyDataset` if `tensors` is empty.
/// * `ShapeMismatch` if the shapes differ.
pub fn stack_op(tensors: &[Tensor]) -> Result<Tensor, TinyfitError> {
    let first = tensors
        .first()
        .ok_or_else(|| TinyfitError::EmptyDataset("cannot stack an empty list of tensors".to_string()))?;
    let item_shape = first.shape();
    let item_numel: usize = item_shape.iter().product();

    let mut data = Vec::with_capacity(item_numel * tensors.len());
    for (i, tensor) in tensors.iter().enumerate() {
        let shape = tensor.shape();
        if shape != item_shape {
            return Err(TinyfitError::ShapeMismatch {
                expected: format!("{:?}", item_shape),
                actual: format!("{:?} for tensor at index {}", shape, i),
                operation: "stack".to_string(),
            });
        }
        data.extend(tensor.get_f32_data()?);
    }

    let mut shape = Vec::with_capacity(item_shape.len() + 1);
    shape.push(tensors.len());
    shape.extend(item_shape);
    Tensor::new(data, shape)
}
