use crate::autograd::{attach_grad_fn, needs_grad, BackwardOp};
use crate::error::TinyfitError;
use crate::tensor::Tensor;
use std::sync::Arc;

/// Stride and zero-padding of a 2D convolution, applied to both spatial axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conv2dGeometry {
    pub stride: usize,
    pub padding: usize,
}

impl Default for Conv2dGeometry {
    fn default() -> Self {
        Conv2dGeometry { stride: 1, padding: 0 }
    }
}

/// Resolved sizes of one convolution call.
#[derive(Debug, Clone, Copy)]
struct ConvDims {
    batch: usize,
    in_channels: usize,
    in_h: usize,
    in_w: usize,
    out_channels: usize,
    k_h: usize,
    k_w: usize,
    out_h: usize,
    out_w: usize,
    stride: usize,
    padding: usize,
}

impl ConvDims {
    fn resolve(
        input_shape: &[usize],
        weight_shape: &[usize],
        geometry: Conv2dGeometry,
    ) -> Result<Self, TinyfitError> {
        let incompatible = || TinyfitError::IncompatibleShapes {
            shape1: input_shape.to_vec(),
            shape2: weight_shape.to_vec(),
            operation: "conv2d".to_string(),
        };
        if input_shape.len() != 4 || weight_shape.len() != 4 {
            return Err(incompatible());
        }
        if input_shape[1] != weight_shape[1] {
            return Err(incompatible());
        }
        if geometry.stride == 0 {
            return Err(TinyfitError::InvalidConfiguration(
                "conv2d stride must be positive".to_string(),
            ));
        }
        let (in_h, in_w) = (input_shape[2], input_shape[3]);
        let (k_h, k_w) = (weight_shape[2], weight_shape[3]);
        let padded_h = in_h + 2 * geometry.padding;
        let padded_w = in_w + 2 * geometry.padding;
        if k_h == 0 || k_w == 0 || k_h > padded_h || k_w > padded_w {
            return Err(incompatible());
        }
        Ok(ConvDims {
            batch: input_shape[0],
            in_channels: input_shape[1],
            in_h,
            in_w,
            out_channels: weight_shape[0],
            k_h,
            k_w,
            out_h: (padded_h - k_h) / geometry.stride + 1,
            out_w: (padded_w - k_w) / geometry.stride + 1,
            stride: geometry.stride,
            padding: geometry.padding,
        })
    }

    /// Maps an output position plus kernel offset to an input coordinate,
    /// or `None` when it falls in the zero padding.
    #[inline]
    fn source(&self, out: usize, k: usize, limit: usize) -> Option<usize> {
        let pos = (out * self.stride + k).checked_sub(self.padding)?;
        (pos < limit).then_some(pos)
    }

    /// Visits every (input index, weight index, output index) triple.
    fn for_each_tap<F: FnMut(usize, usize, usize)>(&self, mut f: F) {
        for n in 0..self.batch {
            for o in 0..self.out_channels {
                for oy in 0..self.out_h {
                    for ox in 0..self.out_w {
                        let out_idx = ((n * self.out_channels + o) * self.out_h + oy) * self.out_w + ox;
                        for c in 0..self.in_channels {
                            for ky in 0..self.k_h {
                                let Some(iy) = self.source(oy, ky, self.in_h) else {
                                    continue;
                                };
                                for kx in 0..self.k_w {
                                    let Some(ix) = self.source(ox, kx, self.in_w) else {
                                        continue;
                                    };
                                    let in_idx = ((n * self.in_channels + c) * self.in_h + iy) * self.in_w + ix;
                                    let w_idx = ((o * self.in_channels + c) * self.k_h + ky) * self.k_w + kx;
                                    f(in_idx, w_idx, out_idx);
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    fn output_shape(&self) -> Vec<usize> {
        vec![self.batch, self.out_channels, self.out_h, self.out_w]
    }
}

#[derive(Debug)]
struct Conv2dBackward {
    input: Tensor,
    weight: Tensor,
    bias: Option<Tensor>,
    dims: ConvDims,
}

impl BackwardOp for Conv2dBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, TinyfitError> {
        let grad = grad_output.get_f32_data()?;
        let input_data = self.input.get_f32_data()?;
        let weight_data = self.weight.get_f32_data()?;

        let mut grad_input = vec![0.0; input_data.len()];
        let mut grad_weight = vec![0.0; weight_data.len()];
        self.dims.for_each_tap(|in_idx, w_idx, out_idx| {
            let g = grad[out_idx];
            grad_input[in_idx] += g * weight_data[w_idx];
            grad_weight[w_idx] += g * input_data[in_idx];
        });

        let mut grads = vec![
            Tensor::new(grad_input, self.input.shape())?,
            Tensor::new(grad_weight, self.weight.shape())?,
        ];
        if self.bias.is_some() {
            let plane = self.dims.out_h * self.dims.out_w;
            let mut grad_bias = vec![0.0; self.dims.out_channels];
            for (i, g) in grad.iter().enumerate() {
                grad_bias[(i / plane) % self.dims.out_channels] += g;
            }
            grads.push(Tensor::new(grad_bias, vec![self.dims.out_channels])?);
        }
        Ok(grads)
    }

    fn inputs(&self) -> Vec<Tensor> {
        let mut inputs = vec![self.input.clone(), self.weight.clone()];
        if let Some(bias) = &self.bias {
            inputs.push(bias.clone());
        }
        inputs
    }
}

/// 2D cross-correlation over `[N, C, H, W]` input with `[O, C, KH, KW]` weights
/// and an optional `[O]` bias. Output is `[N, O, H', W']`.
pub fn conv2d_op(
    input: &Tensor,
    weight: &Tensor,
    bias: Option<&Tensor>,
    geometry: Conv2dGeometry,
) -> Result<Tensor, TinyfitError> {
    let dims = ConvDims::resolve(&input.shape(), &weight.shape(), geometry)?;
    if let Some(b) = bias {
        if b.shape() != [dims.out_channels] {
            return Err(TinyfitError::ShapeMismatch {
                expected: format!("[{}]", dims.out_channels),
                actual: format!("{:?}", b.shape()),
                operation: "conv2d bias".to_string(),
            });
        }
    }

    let input_data = input.get_f32_data()?;
    let weight_data = weight.get_f32_data()?;
    let output_shape = dims.output_shape();
    let mut output_data = vec![0.0; output_shape.iter().product()];
    dims.for_each_tap(|in_idx, w_idx, out_idx| {
        output_data[out_idx] += input_data[in_idx] * weight_data[w_idx];
    });
    if let Some(b) = bias {
        let bias_data = b.get_f32_data()?;
        let plane = dims.out_h * dims.out_w;
        for (i, v) in output_data.iter_mut().enumerate() {
            *v += bias_data[(i / plane) % dims.out_channels];
        }
    }

    let output = Tensor::new(output_data, output_shape)?;
    let mut tracked = vec![input, weight];
    tracked.extend(bias);
    if needs_grad(&tracked) {
        attach_grad_fn(
            &output,
            Arc::new(Conv2dBackward {
                input: input.clone(),
                weight: weight.clone(),
                bias: bias.cloned(),
                dims,
            }),
        );
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::check_tensor_near;

    #[test]
    fn test_conv2d_identity_kernel() -> Result<(), TinyfitError> {
        let input = Tensor::new((1..=9).map(|v| v as f32).collect(), vec![1, 1, 3, 3])?;
        let weight = Tensor::new(vec![1.0], vec![1, 1, 1, 1])?;
        let out = conv2d_op(&input, &weight, None, Conv2dGeometry::default())?;
        assert_eq!(out.get_f32_data()?, input.get_f32_data()?);
        Ok(())
    }

    #[test]
    fn test_conv2d_stride_padding_shape() -> Result<(), TinyfitError> {
        // 28x28, k=3, stride 2, padding 1 -> 14x14
        let input = Tensor::new(vec![0.0; 28 * 28], vec![1, 1, 28, 28])?;
        let weight = Tensor::new(vec![0.0; 16 * 9], vec![16, 1, 3, 3])?;
        let geometry = Conv2dGeometry { stride: 2, padding: 1 };
        let out = conv2d_op(&input, &weight, None, geometry)?;
        assert_eq!(out.shape(), vec![1, 16, 14, 14]);
        Ok(())
    }

    #[test]
    fn test_conv2d_sum_kernel_with_bias() -> Result<(), TinyfitError> {
        let input = Tensor::new((1..=9).map(|v| v as f32).collect(), vec![1, 1, 3, 3])?;
        let weight = Tensor::new(vec![1.0; 4], vec![1, 1, 2, 2])?;
        let bias = Tensor::new(vec![0.5], vec![1])?;
        let out = conv2d_op(&input, &weight, Some(&bias), Conv2dGeometry::default())?;
        check_tensor_near(&out, &[1, 1, 2, 2], &[12.5, 16.5, 24.5, 28.5], 1e-6);
        Ok(())
    }

    #[test]
    fn test_conv2d_backward() -> Result<(), TinyfitError> {
        let input = Tensor::new((1..=9).map(|v| v as f32).collect(), vec![1, 1, 3, 3])?;
        let weight = Tensor::new(vec![1.0, 0.0, 0.0, -1.0], vec![1, 1, 2, 2])?;
        let bias = Tensor::new(vec![0.0], vec![1])?;
        input.set_requires_grad(true);
        weight.set_requires_grad(true);
        bias.set_requires_grad(true);

        conv2d_op(&input, &weight, Some(&bias), Conv2dGeometry::default())?
            .sum()?
            .backward(None)?;

        let no_grad = || TinyfitError::InternalError("missing grad".into());
        // Each weight tap sees a 2x2 window of the input.
        check_tensor_near(
            &weight.grad().ok_or_else(no_grad)?,
            &[1, 1, 2, 2],
            &[12.0, 16.0, 24.0, 28.0],
            1e-6,
        );
        check_tensor_near(&bias.grad().ok_or_else(no_grad)?, &[1], &[4.0], 1e-6);
        check_tensor_near(
            &input.grad().ok_or_else(no_grad)?,
            &[1, 1, 3, 3],
            &[1.0, 1.0, 0.0, 1.0, 0.0, -1.0, 0.0, -1.0, -1.0],
            1e-6,
        );
        Ok(())
    }

    #[test]
    fn test_conv2d_channel_mismatch() -> Result<(), TinyfitError> {
        let input = Tensor::new(vec![0.0; 18], vec![1, 2, 3, 3])?;
        let weight = Tensor::new(vec![0.0; 4], vec![1, 1, 2, 2])?;
        assert!(conv2d_op(&input, &weight, None, Conv2dGeometry::default()).is_err());
        Ok(())
    }
}
