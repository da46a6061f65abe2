//! Neural network building blocks: the [`Module`] trait, parameters,
//! layers, initialisers, losses and metrics.

pub mod init;
pub mod layers;
pub mod losses;
pub mod metrics;
pub mod module;
pub mod parameter;

pub use layers::{AvgPool2d, Conv2d, Dropout, Flatten, Lambda, Linear, ReLU};
pub use losses::{CrossEntropyLoss, LossFunction, MSELoss};
pub use metrics::accuracy;
pub use module::{Mode, Module};
pub use parameter::Parameter;
