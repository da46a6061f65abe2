//! Datasets, samplers and batch sources.
//!
//! A [`DataLoader`] turns a [`Dataset`] into a restartable sequence of
//! [`Batch`]es; anything that can do that implements [`BatchSource`], which
//! is what the training loop consumes.

pub mod batch;
pub mod dataloader;
pub mod datasets;
pub mod samplers;
pub mod wrapped;

pub use batch::{stack_collate, Batch};
pub use dataloader::{BatchSource, CollateFn, DataLoader};
pub use datasets::{Dataset, TensorDataset};
pub use samplers::{RandomSampler, Sampler, SequentialSampler};
pub use wrapped::WrappedDataLoader;
