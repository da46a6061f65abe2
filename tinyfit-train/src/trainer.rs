use crate::config::FitConfig;
use crate::loss_batch::{loss_batch, BatchLoss};
use crate::report::{EpochReport, EpochReporter, FitHistory, LogReporter};
use tinyfit_core::nn::{LossFunction, Mode, Module};
use tinyfit_core::optim::Optimizer;
use tinyfit_core::TinyfitError;
use tinyfit_data::BatchSource;

/// Runs epochs of training followed by validation.
///
/// Each epoch puts the model in [`Mode::Train`] and steps the optimizer on
/// every training batch, then switches to [`Mode::Eval`] and computes the
/// size-weighted validation loss without recording gradients. The two phases
/// never overlap and the first error aborts the run.
pub struct Trainer<'r> {
    config: FitConfig,
    reporter: Box<dyn EpochReporter + 'r>,
}

impl<'r> Trainer<'r> {
    pub fn new(config: FitConfig) -> Self {
        Trainer {
            config,
            reporter: Box::new(LogReporter),
        }
    }

    /// Replaces the default [`LogReporter`].
    pub fn with_reporter<R: EpochReporter + 'r>(mut self, reporter: R) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    pub fn config(&self) -> &FitConfig {
        &self.config
    }

    /// Trains `model` for the configured number of epochs.
    ///
    /// The model is first moved to the configured device. Parameters move in
    /// place, so an optimizer built from `model.parameters()` beforehand keeps
    /// updating the model's own storage. Batches are used as
    /// the sources yield them; wrap a source in a `WrappedDataLoader` to
    /// preprocess or relocate them.
    ///
    /// # Errors
    /// * `DeviceUnavailable` if the device cannot be used and fallback is off.
    /// * `EmptyDataset` if the validation source yields no examples.
    /// * Any error raised by the sources, the model, the loss or the optimizer,
    ///   unchanged.
    pub fn fit<M, L>(
        &mut self,
        model: &mut M,
        loss_fn: &L,
        opt: &mut dyn Optimizer,
        train: &dyn BatchSource,
        valid: &dyn BatchSource,
    ) -> Result<FitHistory, TinyfitError>
    where
        M: Module + ?Sized,
        L: LossFunction + ?Sized,
    {
        let device = self.config.resolve_device()?;
        model.to_device(device)?;
        log::info!(
            "training for {} epochs on {:?} ({} train / {} valid batches per epoch)",
            self.config.epochs,
            device,
            train.num_batches(),
            valid.num_batches()
        );

        let mut history = FitHistory::new();
        for epoch in 0..self.config.epochs {
            model.set_mode(Mode::Train);
            for batch in train.batches() {
                loss_batch(&*model, loss_fn, &batch?, Some(&mut *opt))?;
            }

            model.set_mode(Mode::Eval);
            let valid_loss = evaluate(&*model, loss_fn, valid)?;

            let report = EpochReport { epoch, valid_loss };
            self.reporter.report(&report);
            history.push(report);
        }
        Ok(history)
    }
}

/// Size-weighted mean loss of `model` over one traversal of `source`.
///
/// Runs without an optimizer, so nothing is recorded. The caller decides the
/// model's mode; the trainer puts it in [`Mode::Eval`] first.
pub fn evaluate<M, L>(model: &M, loss_fn: &L, source: &dyn BatchSource) -> Result<f32, TinyfitError>
where
    M: Module + ?Sized,
    L: LossFunction + ?Sized,
{
    let losses = source
        .batches()
        .map(|batch| loss_batch(model, loss_fn, &batch?, None))
        .collect::<Result<Vec<_>, _>>()?;
    weighted_mean(&losses)
}

/// `Σ loss·count / Σ count`.
///
/// # Errors
/// `EmptyDataset` when the batches cover no examples.
pub fn weighted_mean(losses: &[BatchLoss]) -> Result<f32, TinyfitError> {
    let (weighted, total) = losses.iter().fold((0.0f64, 0usize), |(sum, n), b| {
        (sum + b.loss as f64 * b.count as f64, n + b.count)
    });
    if total == 0 {
        return Err(TinyfitError::EmptyDataset(
            "validation produced no examples; the weighted loss is undefined".to_string(),
        ));
    }
    Ok((weighted / total as f64) as f32)
}

/// Trains for `epochs` epochs on the CPU, reporting through [`LogReporter`].
pub fn fit<M, L>(
    epochs: usize,
    model: &mut M,
    loss_fn: &L,
    opt: &mut dyn Optimizer,
    train: &dyn BatchSource,
    valid: &dyn BatchSource,
) -> Result<FitHistory, TinyfitError>
where
    M: Module + ?Sized,
    L: LossFunction + ?Sized,
{
    Trainer::new(FitConfig::new(epochs)).fit(model, loss_fn, opt, train, valid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tinyfit_core::nn::{Linear, MSELoss};
    use tinyfit_core::optim::SgdOptimizer;
    use tinyfit_core::{StorageDevice, Tensor};
    use tinyfit_data::Batch;

    #[test]
    fn test_weighted_mean_law() -> Result<(), TinyfitError> {
        let losses = [
            BatchLoss { loss: 2.0, count: 10 },
            BatchLoss { loss: 4.0, count: 5 },
        ];
        assert_relative_eq!(weighted_mean(&losses)?, 40.0 / 15.0, epsilon = 1e-6);
        Ok(())
    }

    #[test]
    fn test_weighted_mean_is_order_independent() -> Result<(), TinyfitError> {
        let a = [
            BatchLoss { loss: 0.3, count: 7 },
            BatchLoss { loss: 1.1, count: 64 },
            BatchLoss { loss: 0.9, count: 64 },
        ];
        let b = [a[2], a[0], a[1]];
        assert_relative_eq!(weighted_mean(&a)?, weighted_mean(&b)?, epsilon = 1e-6);
        Ok(())
    }

    #[test]
    fn test_weighted_mean_of_nothing_is_an_error() {
        assert!(matches!(weighted_mean(&[]), Err(TinyfitError::EmptyDataset(_))));
        assert!(matches!(
            weighted_mean(&[BatchLoss { loss: 1.0, count: 0 }]),
            Err(TinyfitError::EmptyDataset(_))
        ));
    }

    #[test]
    fn test_zero_epochs_returns_empty_history() -> Result<(), TinyfitError> {
        let mut model = tiny_linear()?;
        let before = model.weight().get_f32_data()?;
        let mut opt = SgdOptimizer::new(model.parameters().into_iter().cloned(), 0.1, 0.0, 0.0, false)?;
        let batches = regression_batches()?;
        let history = fit(0, &mut model, &MSELoss::default(), &mut opt, &batches, &batches)?;
        assert!(history.is_empty());
        assert_eq!(model.weight().get_f32_data()?, before);
        Ok(())
    }

    fn tiny_linear() -> Result<Linear, TinyfitError> {
        Linear::from_tensors(Tensor::new(vec![1.0, -1.0], vec![1, 2])?, None)
    }

    fn regression_batches() -> Result<Vec<Batch>, TinyfitError> {
        Ok(vec![Batch::new(
            Tensor::new(vec![1.0, 0.0, 0.0, 1.0], vec![2, 2])?,
            Tensor::new(vec![0.5, 0.5], vec![2, 1])?,
        )])
    }

    #[test]
    fn test_empty_validation_is_an_error() -> Result<(), TinyfitError> {
        let mut model = tiny_linear()?;
        let mut opt = SgdOptimizer::new(model.parameters().into_iter().cloned(), 0.1, 0.0, 0.0, false)?;
        let train = regression_batches()?;
        let valid: Vec<Batch> = Vec::new();
        let result = fit(1, &mut model, &MSELoss::default(), &mut opt, &train, &valid);
        assert!(matches!(result, Err(TinyfitError::EmptyDataset(_))));
        Ok(())
    }

    #[test]
    fn test_unavailable_device_aborts_before_training() -> Result<(), TinyfitError> {
        let mut model = tiny_linear()?;
        let before = model.weight().get_f32_data()?;
        let mut opt = SgdOptimizer::new(model.parameters().into_iter().cloned(), 0.1, 0.0, 0.0, false)?;
        let batches = regression_batches()?;
        let mut trainer = Trainer::new(FitConfig::new(2).device(StorageDevice::GPU));
        let result = trainer.fit(&mut model, &MSELoss::default(), &mut opt, &batches, &batches);
        assert!(matches!(result, Err(TinyfitError::DeviceUnavailable { .. })));
        assert_eq!(model.weight().get_f32_data()?, before);
        Ok(())
    }

    #[test]
    fn test_reporter_sees_every_epoch_and_model_ends_in_eval() -> Result<(), TinyfitError> {
        let mut model = tiny_linear()?;
        let mut opt = SgdOptimizer::new(model.parameters().into_iter().cloned(), 0.1, 0.0, 0.0, false)?;
        let batches = regression_batches()?;
        let mut seen = Vec::new();
        let history = {
            let mut trainer = Trainer::new(FitConfig::new(3).allow_fallback(true))
                .with_reporter(|r: &EpochReport| seen.push(*r));
            trainer.fit(&mut model, &MSELoss::default(), &mut opt, &batches, &batches)?
        };
        assert_eq!(seen.len(), 3);
        assert_eq!(history.reports(), seen.as_slice());
        assert_eq!(seen.iter().map(|r| r.epoch).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(model.mode(), Mode::Eval);
        Ok(())
    }
}
