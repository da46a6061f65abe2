use super::traits::Sampler;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::Mutex;

/// Visits every index exactly once, in a fresh random order per traversal.
#[derive(Debug)]
pub struct RandomSampler {
    /// `None` draws from the thread-local generator.
    rng: Option<Mutex<StdRng>>,
}

impl RandomSampler {
    pub fn new() -> Self {
        RandomSampler { rng: None }
    }

    /// A sampler whose sequence of permutations is reproducible.
    ///
    /// Successive traversals still differ from one another.
    pub fn with_seed(seed: u64) -> Self {
        RandomSampler {
            rng: Some(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }
}

impl Default for RandomSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for RandomSampler {
    fn iter(&self, dataset_len: usize) -> Box<dyn Iterator<Item = usize> + Send + Sync> {
        let mut indices: Vec<usize> = (0..dataset_len).collect();
        match &self.rng {
            Some(rng) => {
                let mut guard = match rng.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => {
                        log::warn!("RandomSampler rng mutex was poisoned. Recovering.");
                        poisoned.into_inner()
                    }
                };
                indices.shuffle(&mut *guard);
            }
            None => indices.shuffle(&mut rand::thread_rng()),
        }
        Box::new(indices.into_iter())
    }

    fn len(&self, dataset_len: usize) -> usize {
        dataset_len
    }
}

#[cfg(test)]
#[path = "random_sampler_test.rs"]
mod tests;
