use crate::device::StorageDevice;
use crate::error::TinyfitError;
use crate::nn::init::{bias_uniform_, fan_in, kaiming_uniform_};
use crate::nn::module::{Mode, Module};
use crate::nn::parameter::Parameter;
use crate::ops::conv::{conv2d_op, Conv2dGeometry};
use crate::tensor::{zeros, Tensor};
use rand::Rng;

/// 2D convolution layer over `[N, C_in, H, W]` inputs with square kernels.
#[derive(Debug)]
pub struct Conv2d {
    weight: Parameter,
    bias: Option<Parameter>,
    geometry: Conv2dGeometry,
    mode: Mode,
}

impl Conv2d {
    pub fn new(
        in_channels: usize,
        out_channels: usize,
        kernel_size: usize,
        geometry: Conv2dGeometry,
    ) -> Result<Self, TinyfitError> {
        Self::with_rng(in_channels, out_channels, kernel_size, geometry, &mut rand::thread_rng())
    }

    pub fn with_rng<R: Rng + ?Sized>(
        in_channels: usize,
        out_channels: usize,
        kernel_size: usize,
        geometry: Conv2dGeometry,
        rng: &mut R,
    ) -> Result<Self, TinyfitError> {
        if in_channels == 0 || out_channels == 0 || kernel_size == 0 || geometry.stride == 0 {
            return Err(TinyfitError::InvalidConfiguration(format!(
                "Conv2d({}, {}, kernel_size={}, stride={}) has a zero dimension",
                in_channels, out_channels, kernel_size, geometry.stride
            )));
        }
        let weight = zeros(&[out_channels, in_channels, kernel_size, kernel_size])?;
        kaiming_uniform_(&weight, rng)?;
        let bias = zeros(&[out_channels])?;
        bias_uniform_(&bias, fan_in(&weight.shape())?, rng)?;
        Ok(Conv2d {
            weight: Parameter::new(weight, Some("weight".to_string())),
            bias: Some(Parameter::new(bias, Some("bias".to_string()))),
            geometry,
            mode: Mode::default(),
        })
    }

    pub fn weight(&self) -> &Parameter {
        &self.weight
    }

    pub fn geometry(&self) -> Conv2dGeometry {
        self.geometry
    }
}

impl Module for Conv2d {
    fn forward(&self, input: &Tensor) -> Result<Tensor, TinyfitError> {
        conv2d_op(input, &self.weight, self.bias.as_deref(), self.geometry)
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
