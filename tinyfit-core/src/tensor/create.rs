use crate::error::TinyfitError;
use crate::tensor::Tensor;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal, Uniform};

pub fn zeros(shape: &[usize]) -> Result<Tensor, TinyfitError> {
    full(shape, 0.0)
}

pub fn ones(shape: &[usize]) -> Result<Tensor, TinyfitError> {
    full(shape, 1.0)
}

pub fn full(shape: &[usize], value: f32) -> Result<Tensor, TinyfitError> {
    let numel = shape.iter().product();
    Tensor::new(vec![value; numel], shape.to_vec())
}

/// Creates a zero tensor with the shape of `tensor`.
pub fn zeros_like(tensor: &Tensor) -> Result<Tensor, TinyfitError> {
    zeros(&tensor.shape())
}

/// Samples every element from `U(low, high)` using `rng`.
pub fn rand_uniform<R: Rng + ?Sized>(
    shape: &[usize],
    low: f32,
    high: f32,
    rng: &mut R,
) -> Result<Tensor, TinyfitError> {
    if !(low < high) {
        return Err(TinyfitError::InvalidConfiguration(format!(
            "uniform bounds must satisfy low < high, got [{}, {})",
            low, high
        )));
    }
    let numel = shape.iter().product();
    let dist = Uniform::new(low, high);
    let data_vec: Vec<f32> = (0..numel).map(|_| dist.sample(rng)).collect();
    Tensor::new(data_vec, shape.to_vec())
}

/// Samples every element from the standard normal distribution using `rng`.
pub fn randn<R: Rng + ?Sized>(shape: &[usize], rng: &mut R) -> Result<Tensor, TinyfitError> {
    let numel = shape.iter().product();
    let data_vec: Vec<f32> = (0..numel).map(|_| StandardNormal.sample(rng)).collect();
    Tensor::new(data_vec, shape.to_vec())
}
