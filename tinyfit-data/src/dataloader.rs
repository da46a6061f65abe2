//! # DataLoader
//!
//! Batching and sampling over any [`Dataset`].
//!
//! ```rust
//! use tinyfit_core::Tensor;
//! use tinyfit_data::{BatchSource, DataLoader, TensorDataset};
//!
//! let inputs = Tensor::new((0..10).map(|v| v as f32).collect(), vec![5, 2]).unwrap();
//! let targets = Tensor::new(vec![0.0, 1.0, 0.0, 1.0, 0.0], vec![5]).unwrap();
//! let dataset = TensorDataset::new(inputs, targets).unwrap();
//! let loader = DataLoader::for_tensors(dataset, 2, false).unwrap();
//! assert_eq!(loader.num_batches(), 3);
//! for batch in loader.batches() {
//!     let batch = batch.unwrap();
//!     assert!(batch.len() <= 2);
//! }
//! ```

use crate::batch::{stack_collate, Batch};
use crate::datasets::{Dataset, TensorDataset};
use crate::samplers::{RandomSampler, Sampler, SequentialSampler};
use tinyfit_core::TinyfitError;

/// Anything that can produce a finite, restartable sequence of batches.
///
/// Every call to [`batches`](BatchSource::batches) starts a new traversal.
pub trait BatchSource {
    fn batches(&self) -> Box<dyn Iterator<Item = Result<Batch, TinyfitError>> + '_>;

    /// Number of batches one traversal yields.
    fn num_batches(&self) -> usize;
}

/// Pre-built batches, replayed in order on every traversal.
impl BatchSource for Vec<Batch> {
    fn batches(&self) -> Box<dyn Iterator<Item = Result<Batch, TinyfitError>> + '_> {
        Box::new(self.iter().cloned().map(Ok))
    }

    fn num_batches(&self) -> usize {
        self.len()
    }
}

/// Assembles the items of one batch into a [`Batch`].
pub type CollateFn<D> =
    Box<dyn Fn(Vec<<D as Dataset>::Item>) -> Result<Batch, TinyfitError> + Send + Sync>;

/// Groups the items of a dataset into batches, in the order given by a sampler.
///
/// # Type Parameters
/// - `D`: the dataset, implementing [`Dataset`].
/// - `S`: the sampler, implementing [`Sampler`].
pub struct DataLoader<D: Dataset, S: Sampler> {
    dataset: D,
    batch_size: usize,
    sampler: S,
    drop_last: bool,
    collate_fn: CollateFn<D>,
}

impl<D: Dataset, S: Sampler> DataLoader<D, S> {
    /// Creates a new DataLoader.
    ///
    /// # Arguments
    /// - `dataset`: the dataset to draw from.
    /// - `batch_size`: maximum number of items per batch.
    /// - `sampler`: the index order.
    /// - `drop_last`: if true, a short final batch is skipped.
    /// - `collate_fn`: turns the items of a batch into a [`Batch`].
    ///
    /// # Errors
    /// `InvalidBatchSize` if `batch_size` is zero.
    pub fn new(
        dataset: D,
        batch_size: usize,
        sampler: S,
        drop_last: bool,
        collate_fn: CollateFn<D>,
    ) -> Result<Self, TinyfitError> {
        if batch_size == 0 {
            return Err(TinyfitError::InvalidBatchSize(batch_size));
        }
        Ok(DataLoader {
            dataset,
            batch_size,
            sampler,
            drop_last,
            collate_fn,
        })
    }

    pub fn dataset(&self) -> &D {
        &self.dataset
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn drop_last(&self) -> bool {
        self.drop_last
    }

    /// Starts a new traversal.
    pub fn iter(&self) -> Batches<'_, D, S> {
        Batches {
            loader: self,
            indices: self.sampler.iter(self.dataset.len()),
        }
    }
}

impl<D, S> DataLoader<D, S>
where
    D: Dataset<Item = (tinyfit_core::Tensor, tinyfit_core::Tensor)>,
    S: Sampler,
{
    /// Creates a DataLoader that stacks `(input, target)` items with [`stack_collate`].
    pub fn with_default_collate(
        dataset: D,
        batch_size: usize,
        sampler: S,
        drop_last: bool,
    ) -> Result<Self, TinyfitError> {
        Self::new(dataset, batch_size, sampler, drop_last, Box::new(stack_collate))
    }
}

impl DataLoader<TensorDataset, Box<dyn Sampler>> {
    /// The common case: a tensor dataset, sequential or shuffled order, every
    /// example used once per traversal.
    pub fn for_tensors(
        dataset: TensorDataset,
        batch_size: usize,
        shuffle: bool,
    ) -> Result<Self, TinyfitError> {
        let sampler: Box<dyn Sampler> = if shuffle {
            Box::new(RandomSampler::new())
        } else {
            Box::new(SequentialSampler::new())
        };
        Self::with_default_collate(dataset, batch_size, sampler, false)
    }
}

impl<D: Dataset, S: Sampler> BatchSource for DataLoader<D, S> {
    fn batches(&self) -> Box<dyn Iterator<Item = Result<Batch, TinyfitError>> + '_> {
        Box::new(self.iter())
    }

    fn num_batches(&self) -> usize {
        let samples = self.sampler.len(self.dataset.len());
        if self.drop_last {
            samples / self.batch_size
        } else {
            samples.div_ceil(self.batch_size)
        }
    }
}

/// One traversal of a [`DataLoader`].
pub struct Batches<'a, D: Dataset, S: Sampler> {
    loader: &'a DataLoader<D, S>,
    indices: Box<dyn Iterator<Item = usize> + Send + Sync>,
}

impl<D: Dataset, S: Sampler> Iterator for Batches<'_, D, S> {
    type Item = Result<Batch, TinyfitError>;

    /// Returns the next batch.
    ///
    /// - `Some(Ok(batch))`: a batch of at most `batch_size` items.
    /// - `Some(Err(e))`: fetching an item or collating failed.
    /// - `None`: the traversal is over.
    fn next(&mut self) -> Option<Self::Item> {
        let batch_size = self.loader.batch_size;
        let mut items = Vec::with_capacity(batch_size);
        for idx in self.indices.by_ref().take(batch_size) {
            match self.loader.dataset.get(idx) {
                Ok(item) => items.push(item),
                Err(e) => return Some(Err(e)),
            }
        }
        if items.is_empty() || (self.loader.drop_last && items.len() < batch_size) {
            return None;
        }
        log::debug!("collating batch of {} items", items.len());
        Some((self.loader.collate_fn)(items))
    }
}

#[cfg(test)]
#[path = "dataloader_test.rs"]
mod tests;
