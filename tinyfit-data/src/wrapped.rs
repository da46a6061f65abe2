use crate::batch::Batch;
use crate::dataloader::BatchSource;
use tinyfit_core::TinyfitError;

/// Applies a transform to every batch of an inner [`BatchSource`], e.g. to
/// reshape flat images to `[B, 1, 28, 28]` or move batches to a device.
///
/// Restartable and finite whenever the inner source is.
pub struct WrappedDataLoader<L, F> {
    loader: L,
    func: F,
}

impl<L, F> WrappedDataLoader<L, F>
where
    L: BatchSource,
    F: Fn(Batch) -> Result<Batch, TinyfitError>,
{
    pub fn new(loader: L, func: F) -> Self {
        WrappedDataLoader { loader, func }
    }

    pub fn inner(&self) -> &L {
        &self.loader
    }
}

impl<L, F> BatchSource for WrappedDataLoader<L, F>
where
    L: BatchSource,
    F: Fn(Batch) -> Result<Batch, TinyfitError>,
{
    fn batches(&self) -> Box<dyn Iterator<Item = Result<Batch, TinyfitError>> + '_> {
        Box::new(
            self.loader
                .batches()
                .map(move |batch| batch.and_then(|b| (self.func)(b))),
        )
    }

    fn num_batches(&self) -> usize {
        self.loader.num_batches()
    }
}
