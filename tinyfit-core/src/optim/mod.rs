//! Optimizers for training neural networks.
//!
//! This module provides the [`Optimizer`] trait, the [`ParamGroup`] structure
//! for per-group hyperparameters, and stochastic gradient descent.

pub mod optimizer_trait;
pub mod param_group;
pub mod sgd;

pub use optimizer_trait::Optimizer;
pub use param_group::{ParamGroup, ParamGroupOptions};
pub use sgd::SgdOptimizer;
