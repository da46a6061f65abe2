use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use tinyfit_core::{Tensor, TinyfitError};
use tinyfit_data::TensorDataset;

// Shared by several integration test binaries; not every binary uses every helper.
#[allow(dead_code)]
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// `n` noisy `side x side` images flattened to rows: class 0 is bright on the
/// left half, class 1 on the right half.
#[allow(dead_code)]
pub fn half_bright_images(n: usize, side: usize, seed: u64) -> Result<TensorDataset, TinyfitError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0f32, 0.3)
        .map_err(|e| TinyfitError::InvalidConfiguration(e.to_string()))?;
    let mut pixels = Vec::with_capacity(n * side * side);
    let mut labels = Vec::with_capacity(n);
    for i in 0..n {
        let class = i % 2;
        for _y in 0..side {
            for x in 0..side {
                let lit = (x < side / 2) == (class == 0);
                pixels.push(if lit { 1.0 } else { 0.0 } + noise.sample(&mut rng));
            }
        }
        labels.push(class as f32);
    }
    TensorDataset::new(Tensor::new(pixels, vec![n, side * side])?, Tensor::new(labels, vec![n])?)
}

/// `per_class` noisy points around one centre per class, labels `0..classes`.
///
/// Class `c` sits at `+3` on axis `c % features`, so the classes are linearly
/// separable with high probability.
#[allow(dead_code)]
pub fn gaussian_blobs(
    classes: usize,
    features: usize,
    per_class: usize,
    seed: u64,
) -> Result<TensorDataset, TinyfitError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0f32, 0.7)
        .map_err(|e| TinyfitError::InvalidConfiguration(e.to_string()))?;
    let mut inputs = Vec::with_capacity(classes * per_class * features);
    let mut labels = Vec::with_capacity(classes * per_class);
    for i in 0..classes * per_class {
        let class = i % classes;
        for f in 0..features {
            let centre = if f == class % features { 3.0 } else { 0.0 };
            inputs.push(centre + noise.sample(&mut rng));
        }
        labels.push(class as f32);
    }
    let n = labels.len();
    TensorDataset::new(Tensor::new(inputs, vec![n, features])?, Tensor::new(labels, vec![n])?)
}
