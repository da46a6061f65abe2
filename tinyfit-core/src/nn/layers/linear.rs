use crate::device::StorageDevice;
use crate::error::TinyfitError;
use crate::nn::init::{bias_uniform_, kaiming_uniform_};
use crate::nn::module::{Mode, Module};
use crate::nn::parameter::Parameter;
use crate::tensor::{zeros, Tensor};
use rand::Rng;

/// Applies an affine transformation to the incoming data: `y = x Wᵀ + b`.
///
/// Input is `[B, in_features]`, output `[B, out_features]`. The weight is
/// stored as `[out_features, in_features]`.
#[derive(Debug)]
pub struct Linear {
    weight: Parameter,
    bias: Option<Parameter>,
    in_features: usize,
    out_features: usize,
    mode: Mode,
}

impl Linear {
    /// Creates a layer with Kaiming-uniform weights and a matching uniform bias.
    pub fn new(in_features: usize, out_features: usize, has_bias: bool) -> Result<Self, TinyfitError> {
        Self::with_rng(in_features, out_features, has_bias, &mut rand::thread_rng())
    }

    /// Same as [`Linear::new`] with an explicit random source.
    pub fn with_rng<R: Rng + ?Sized>(
        in_features: usize,
        out_features: usize,
        has_bias: bool,
        rng: &mut R,
    ) -> Result<Self, TinyfitError> {
        if in_features == 0 || out_features == 0 {
            return Err(TinyfitError::InvalidConfiguration(format!(
                "Linear needs positive feature counts, got {} -> {}",
                in_features, out_features
            )));
        }
        let weight = zeros(&[out_features, in_features])?;
        kaiming_uniform_(&weight, rng)?;
        let bias = if has_bias {
            let b = zeros(&[out_features])?;
            bias_uniform_(&b, in_features, rng)?;
            Some(b)
        } else {
            None
        };
        Self::from_tensors(weight, bias)
    }

    /// Builds a layer around existing weight `[out, in]` and bias `[out]` tensors.
    pub fn from_tensors(weight: Tensor, bias: Option<Tensor>) -> Result<Self, TinyfitError> {
        let shape = weight.shape();
        if shape.len() != 2 {
            return Err(TinyfitError::ShapeMismatch {
                expected: "[out_features, in_features]".to_string(),
                actual: format!("{:?}", shape),
                operation: "Linear::from_tensors".to_string(),
            });
        }
        let (out_features, in_features) = (shape[0], shape[1]);
        if let Some(b) = &bias {
            if b.shape() != [out_features] {
                return Err(TinyfitError::ShapeMismatch {
                    expected: format!("[{}]", out_features),
                    actual: format!("{:?}", b.shape()),
                    operation: "Linear::from_tensors bias".to_string(),
                });
            }
        }
        Ok(Linear {
            weight: Parameter::new(weight, Some("weight".to_string())),
            bias: bias.map(|b| Parameter::new(b, Some("bias".to_string()))),
            in_features,
            out_features,
            mode: Mode::default(),
        })
    }

    pub fn weight(&self) -> &Parameter {
        &self.weight
    }

    pub fn bias(&self) -> Option<&Parameter> {
        self.bias.as_ref()
    }

    pub fn in_features(&self) -> usize {
        self.in_features
    }

    pub fn out_features(&self) -> usize {
        self.out_features
    }
}

impl Module for Linear {
    fn forward(&self, input: &Tensor) -> Result<Tensor, TinyfitError> {
        let output = input.matmul(&self.weight.t()?)?;
        match &self.bias {
            Some(bias) => output.add(bias),
            None => Ok(output),
        }
    }

    fn parameters(&self) -> Vec<&Parameter> {
        let mut params = vec![&self.weight];
        params.extend(self.bias.as_ref());
        params
    }

    fn named_parameters(&self) -> Vec<(String, &Parameter)> {
        self.parameters()
            .into_iter()
            .map(|p| (p.name().unwrap_or("param").to_string(), p))
            .collect()
    }

    fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    fn mode(&self) -> Mode {
        self.mode
    }

    fn to_device(&mut self, device: StorageDevice) -> Result<(), TinyfitError> {
        self.weight.to_device(device)?;
        if let Some(bias) = self.bias.as_mut() {
            bias.to_device(device)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "linear_test.rs"]
mod tests;
