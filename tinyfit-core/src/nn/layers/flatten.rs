use crate::error::TinyfitError;
use crate::nn::module::{Mode, Module};
use crate::nn::parameter::Parameter;
use crate::tensor::Tensor;

/// Collapses every dimension after the batch dimension: `[B, ...] -> [B, F]`.
#[derive(Debug, Default)]
pub struct Flatten {
    mode: Mode,
}

impl Flatten {
    pub fn new() -> Self {
        Flatten::default()
    }
}

impl Module for Flatten {
    fn forward(&self, input: &Tensor) -> Result<Tensor, TinyfitError> {
        input.flatten_batch()
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
