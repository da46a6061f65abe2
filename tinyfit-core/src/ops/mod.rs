//! Differentiable tensor operations.
//!
//! Each op validates shapes, computes its output eagerly on the CPU and, when
//! gradients are being recorded, attaches a backward node to the result.

pub mod activation;
pub mod arithmetic;
pub mod conv;
pub mod linalg;
pub mod pooling;
pub mod reduction;
pub mod stack;
pub mod view;
