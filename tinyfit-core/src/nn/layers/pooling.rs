use crate::error::TinyfitError;
use crate::nn::module::{Mode, Module};
use crate::nn::parameter::Parameter;
use crate::ops::pooling::avg_pool2d_op;
use crate::tensor::Tensor;

/// Average pooling over square windows of `[N, C, H, W]` inputs.
#[derive(Debug)]
pub struct AvgPool2d {
    kernel_size: usize,
    stride: usize,
    mode: Mode,
}

impl AvgPool2d {
    /// Non-overlapping windows: the stride equals the kernel size.
    pub fn new(kernel_size: usize) -> Self {
        Self::with_stride(kernel_size, kernel_size)
    }

    pub fn with_stride(kernel_size: usize, stride: usize) -> Self {
        AvgPool2d {
            kernel_size,
            stride,
            mode: Mode::default(),
        }
    }
}

impl Module for AvgPool2d {
    fn forward(&self, input: &Tensor) -> Result<Tensor, TinyfitError> {
        avg_pool2d_op(input, self.kernel_size, self.stride)
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
