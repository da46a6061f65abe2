use tinyfit_core::ops::stack::stack_op;
use tinyfit_core::{StorageDevice, Tensor, TinyfitError};

/// A group of examples: inputs and their targets, aligned on the first dimension.
#[derive(Debug, Clone)]
pub struct Batch {
    pub inputs: Tensor,
    pub targets: Tensor,
}

impl Batch {
    pub fn new(inputs: Tensor, targets: Tensor) -> Self {
        Batch { inputs, targets }
    }

    /// Number of examples, the leading dimension of `inputs`.
    pub fn len(&self) -> usize {
        self.inputs.shape().first().copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_device(self, device: StorageDevice) -> Result<Batch, TinyfitError> {
        Ok(Batch {
            inputs: self.inputs.to_device(device)?,
            targets: self.targets.to_device(device)?,
        })
    }
}

/// Default collation for `(input, target)` items: stacks each side along a
/// new leading dimension.
pub fn stack_collate(items: Vec<(Tensor, Tensor)>) -> Result<Batch, TinyfitError> {
    let (inputs, targets): (Vec<Tensor>, Vec<Tensor>) = items.into_iter().unzip();
    Ok(Batch::new(stack_op(&inputs)?, stack_op(&targets)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_collate() -> Result<(), TinyfitError> {
        let items = vec![
            (Tensor::new(vec![1.0, 2.0], vec![2])?, Tensor::scalar(0.0)),
            (Tensor::new(vec![3.0, 4.0], vec![2])?, Tensor::scalar(1.0)),
            (Tensor::new(vec![5.0, 6.0], vec![2])?, Tensor::scalar(2.0)),
        ];
        let batch = stack_collate(items)?;
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.inputs.shape(), vec![3, 2]);
        assert_eq!(batch.targets.get_f32_data()?, vec![0.0, 1.0, 2.0]);
        Ok(())
    }

    #[test]
    fn test_batch_to_device() -> Result<(), TinyfitError> {
        let batch = Batch::new(Tensor::new(vec![1.0], vec![1])?, Tensor::new(vec![0.0], vec![1])?);
        let moved = batch.clone().to_device(StorageDevice::CPU)?;
        assert!(moved.inputs.ptr_eq(&batch.inputs));
        assert!(batch.to_device(StorageDevice::GPU).is_err());
        Ok(())
    }
}
