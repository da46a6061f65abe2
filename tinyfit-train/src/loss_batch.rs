use tinyfit_core::nn::{LossFunction, Module};
use tinyfit_core::optim::Optimizer;
use tinyfit_core::{no_grad, TinyfitError};
use tinyfit_data::Batch;

/// Loss of one batch and the number of examples it covered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchLoss {
    pub loss: f32,
    pub count: usize,
}

/// Evaluates `loss_fn(model(batch.inputs), batch.targets)`.
///
/// With an optimizer this is a training step: the loss is back-propagated,
/// the optimizer steps and gradients are zeroed. Without one the whole
/// computation runs under [`no_grad`], so no graph is recorded and no
/// gradient accumulates.
pub fn loss_batch<M, L>(
    model: &M,
    loss_fn: &L,
    batch: &Batch,
    opt: Option<&mut dyn Optimizer>,
) -> Result<BatchLoss, TinyfitError>
where
    M: Module + ?Sized,
    L: LossFunction + ?Sized,
{
    let count = batch.len();
    let loss = match opt {
        Some(opt) => {
            let loss = loss_fn.loss(&model.forward(&batch.inputs)?, &batch.targets)?;
            loss.backward(None)?;
            opt.step()?;
            opt.zero_grad()?;
            loss.item_f32()?
        }
        None => no_grad(|| {
            loss_fn
                .loss(&model.forward(&batch.inputs)?, &batch.targets)?
                .item_f32()
        })?,
    };
    log::debug!("batch of {} examples, loss {:.6}", count, loss);
    Ok(BatchLoss { loss, count })
}
