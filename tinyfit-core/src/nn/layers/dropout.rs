use crate::error::TinyfitError;
use crate::nn::module::{Mode, Module};
use crate::nn::parameter::Parameter;
use crate::tensor::Tensor;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Zeroes each element with probability `p` during training and scales the
/// survivors by `1 / (1 - p)`. In `Eval` mode it is the identity.
#[derive(Debug)]
pub struct Dropout {
    p: f32,
    rng: Mutex<StdRng>,
    mode: Mode,
}

impl Dropout {
    pub fn new(p: f32) -> Result<Self, TinyfitError> {
        Self::with_rng(p, StdRng::from_entropy())
    }

    pub fn with_seed(p: f32, seed: u64) -> Result<Self, TinyfitError> {
        Self::with_rng(p, StdRng::seed_from_u64(seed))
    }

    fn with_rng(p: f32, rng: StdRng) -> Result<Self, TinyfitError> {
        if !(0.0..1.0).contains(&p) {
            return Err(TinyfitError::InvalidConfiguration(format!(
                "dropout probability must be in [0, 1), got {}",
                p
            )));
        }
        Ok(Dropout {
            p,
            rng: Mutex::new(rng),
            mode: Mode::default(),
        })
    }

    pub fn p(&self) -> f32 {
        self.p
    }
}

impl Module for Dropout {
    fn forward(&self, input: &Tensor) -> Result<Tensor, TinyfitError> {
        if self.mode == Mode::Eval || self.p == 0.0 {
            return Ok(input.clone());
        }
        let keep = 1.0 - self.p;
        let mask: Vec<f32> = {
            let mut rng = self.rng.lock().map_err(|e| TinyfitError::LockError {
                lock_type: "mutex".to_string(),
                reason: format!("dropout rng: {}", e),
            })?;
            (0..input.numel())
                .map(|_| if rng.gen::<f32>() < keep { 1.0 / keep } else { 0.0 })
                .collect()
        };
        input.mul(&Tensor::new(mask, input.shape())?)
    }

    fn parameters(&self) -> Vec<&Parameter> {
        Vec::new()
    }

    fn named_parameters(&self) -> Vec<(String, &Parameter)> {
        Vec::new()
    }

    fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    fn mode(&self) -> Mode {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::ones;

    #[test]
    fn test_dropout_eval_is_identity() -> Result<(), TinyfitError> {
        let mut dropout = Dropout::with_seed(0.5, 11)?;
        dropout.set_mode(Mode::Eval);
        let x = ones(&[4, 8])?;
        let first = dropout.forward(&x)?.get_f32_data()?;
        let second = dropout.forward(&x)?.get_f32_data()?;
        assert_eq!(first, x.get_f32_data()?);
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn test_dropout_train_masks_and_scales() -> Result<(), TinyfitError> {
        let dropout = Dropout::with_seed(0.5, 11)?;
        let out = dropout.forward(&ones(&[1000])?)?.get_f32_data()?;
        assert!(out.iter().all(|&v| v == 0.0 || v == 2.0));
        let zeros = out.iter().filter(|&&v| v == 0.0).count();
        assert!(zeros > 350 && zeros < 650, "dropped {} of 1000", zeros);
        Ok(())
    }

    #[test]
    fn test_dropout_rejects_bad_probability() {
        assert!(Dropout::new(1.0).is_err());
        assert!(Dropout::new(-0.1).is_err());
    }
}
