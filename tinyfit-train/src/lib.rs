//! Epoch orchestration for tinyfit models.
//!
//! [`loss_batch`] evaluates one batch, optionally updating the model;
//! [`Trainer`] alternates a training and a validation traversal per epoch
//! and reports the size-weighted validation loss.

pub mod config;
pub mod loss_batch;
pub mod report;
pub mod trainer;

pub use config::FitConfig;
pub use loss_batch::{loss_batch, BatchLoss};
pub use report::{EpochReport, EpochReporter, FitHistory, LogReporter};
pub use trainer::{evaluate, fit, weighted_mean, Trainer};
