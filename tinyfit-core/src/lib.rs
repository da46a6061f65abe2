//! Tensor, autograd, layers, losses and optimizers for tinyfit.
//!
//! The training loop in `tinyfit-train` consumes this crate only through the
//! [`nn::Module`], [`nn::losses::LossFunction`] and [`optim::Optimizer`]
//! traits.

pub mod autograd;
pub mod device;
pub mod error;
pub mod model;
pub mod nn;
pub mod ops;
pub mod optim;
pub mod tensor;
pub mod tensor_data;
pub mod utils;

pub use autograd::{is_grad_enabled, no_grad, NoGradGuard};
pub use device::{select_device, StorageDevice};
pub use error::TinyfitError;
pub use tensor::Tensor;
// Re-export traits required by public functions
pub use num_traits;
