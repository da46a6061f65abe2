//! In-place initialisers for parameters.
//!
//! They write through [`Tensor::update_data`] and therefore bypass autograd;
//! they are meant for freshly created leaves.

use crate::error::TinyfitError;
use crate::tensor::Tensor;
use rand::Rng;
use rand_distr::{Distribution, Uniform};

/// Fills `tensor` with zeros.
pub fn zeros_(tensor: &Tensor) -> Result<(), TinyfitError> {
    fill_(tensor, 0.0)
}

/// Fills `tensor` with ones.
pub fn ones_(tensor: &Tensor) -> Result<(), TinyfitError> {
    fill_(tensor, 1.0)
}

fn fill_(tensor: &Tensor, value: f32) -> Result<(), TinyfitError> {
    tensor.update_data(|d| {
        d.fill(value);
        Ok(())
    })
}

/// Samples every element from `U(-bound, bound)`.
pub fn uniform_<R: Rng + ?Sized>(tensor: &Tensor, bound: f32, rng: &mut R) -> Result<(), TinyfitError> {
    if !(bound > 0.0) {
        return Err(TinyfitError::InvalidConfiguration(format!(
            "uniform_ bound must be positive, got {}",
            bound
        )));
    }
    let dist = Uniform::new(-bound, bound);
    tensor.update_data(|d| {
        for v in d.iter_mut() {
            *v = dist.sample(rng);
        }
        Ok(())
    })
}

/// Number of inputs feeding one output unit: `shape[1] * prod(shape[2..])`.
///
/// # Errors
/// `ShapeMismatch` for tensors of rank below 2.
pub fn fan_in(shape: &[usize]) -> Result<usize, TinyfitError> {
    if shape.len() < 2 {
        return Err(TinyfitError::ShapeMismatch {
            expected: "a weight of rank >= 2".to_string(),
            actual: format!("{:?}", shape),
            operation: "fan_in".to_string(),
        });
    }
    Ok(shape[1..].iter().product())
}

/// Kaiming-uniform initialisation with a leaky-ReLU slope of `sqrt(5)`,
/// the default for linear and convolution weights: `U(-1/sqrt(fan_in), 1/sqrt(fan_in))`.
pub fn kaiming_uniform_<R: Rng + ?Sized>(tensor: &Tensor, rng: &mut R) -> Result<(), TinyfitError> {
    let fan_in = fan_in(&tensor.shape())?;
    let negative_slope = 5.0f32.sqrt();
    let gain = (2.0 / (1.0 + negative_slope * negative_slope)).sqrt();
    let std = gain / (fan_in as f32).sqrt();
    uniform_(tensor, 3.0f32.sqrt() * std, rng)
}

/// Bias initialisation matching [`kaiming_uniform_`] for a layer with `fan_in` inputs.
pub fn bias_uniform_<R: Rng + ?Sized>(tensor: &Tensor, fan_in: usize, rng: &mut R) -> Result<(), TinyfitError> {
    if fan_in == 0 {
        return zeros_(tensor);
    }
    uniform_(tensor, 1.0 / (fan_in as f32).sqrt(), rng)
}

#[cfg(test)]
#[path = "init_test.rs"]
mod tests;
