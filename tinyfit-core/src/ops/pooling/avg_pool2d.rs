use crate::autograd::{attach_grad_fn, needs_grad, BackwardOp};
use crate::error::TinyfitError;
use crate::tensor::Tensor;
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
struct PoolDims {
    planes: usize,
    in_h: usize,
    in_w: usize,
    kernel: usize,
    stride: usize,
    out_h: usize,
    out_w: usize,
}

impl PoolDims {
    /// Calls `f(input_index, output_index)` for every element of every window.
    fn for_each_window_element<F: FnMut(usize, usize)>(&self, mut f: F) {
        for p in 0..self.planes {
            for oy in 0..self.out_h {
                for ox in 0..self.out_w {
                    let out_idx = (p * self.out_h + oy) * self.out_w + ox;
                    for ky in 0..self.kernel {
                        for kx in 0..self.kernel {
                            let iy = oy * self.stride + ky;
                            let ix = ox * self.stride + kx;
                            f((p * self.in_h + iy) * self.in_w + ix, out_idx);
                        }
                    }
                }
            }
        }
    }
}

#[derive(Debug)]
struct AvgPool2dBackward {
    input: Tensor,
    dims: PoolDims,
}

impl BackwardOp for AvgPool2dBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, TinyfitError> {
        let grad = grad_output.get_f32_data()?;
        let scale = 1.0 / (self.dims.kernel * self.dims.kernel) as f32;
        let mut grad_input = vec![0.0; self.input.numel()];
        self.dims.for_each_window_element(|in_idx, out_idx| {
            grad_input[in_idx] += grad[out_idx] * scale;
        });
        Ok(vec![Tensor::new(grad_input, self.input.shape())?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

/// Average pooling over the last two dimensions of a `[N, C, H, W]` tensor
/// with a square `kernel` and the given `stride` (no padding).
pub fn avg_pool2d_op(input: &Tensor, kernel: usize, stride: usize) -> Result<Tensor, TinyfitError> {
    let shape = input.shape();
    if shape.len() != 4 {
        return Err(TinyfitError::ShapeMismatch {
            expected: "[N, C, H, W]".to_string(),
            actual: format!("{:?}", shape),
            operation: "avg_pool2d".to_string(),
        });
    }
    let (in_h, in_w) = (shape[2], shape[3]);
    if kernel == 0 || stride == 0 || kernel > in_h || kernel > in_w {
        return Err(TinyfitError::InvalidConfiguration(format!(
            "avg_pool2d kernel {} / stride {} do not fit a {}x{} input",
            kernel, stride, in_h, in_w
        )));
    }
    let dims = PoolDims {
        planes: shape[0] * shape[1],
        in_h,
        in_w,
        kernel,
        stride,
        out_h: (in_h - kernel) / stride + 1,
        out_w: (in_w - kernel) / stride + 1,
    };

    let input_data = input.get_f32_data()?;
    let scale = 1.0 / (kernel * kernel) as f32;
    let mut output_data = vec![0.0; dims.planes * dims.out_h * dims.out_w];
    dims.for_each_window_element(|in_idx, out_idx| {
        output_data[out_idx] += input_data[in_idx] * scale;
    });

    let output = Tensor::new(output_data, vec![shape[0], shape[1], dims.out_h, dims.out_w])?;
    if needs_grad(&[input]) {
        attach_grad_fn(
            &output,
            Arc::new(AvgPool2dBackward {
                input: input.clone(),
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
    fn test_avg_pool_forward() -> Result<(), TinyfitError> {
        let input = Tensor::new((0..16).map(|v| v as f32).collect(), vec![1, 1, 4, 4])?;
        let out = avg_pool2d_op(&input, 2, 2)?;
        check_tensor_near(&out, &[1, 1, 2, 2], &[2.5, 4.5, 10.5, 12.5], 1e-6);
        Ok(())
    }

    #[test]
    fn test_avg_pool_backward_spreads_gradient() -> Result<(), TinyfitError> {
        let input = Tensor::new(vec![1.0; 16], vec![1, 1, 4, 4])?;
        input.set_requires_grad(true);
        avg_pool2d_op(&input, 4, 4)?.sum()?.backward(None)?;
        let grad = input.grad().ok_or(TinyfitError::InternalError("no grad".into()))?;
        check_tensor_near(&grad, &[1, 1, 4, 4], &[1.0 / 16.0; 16], 1e-7);
        Ok(())
    }

    #[test]
    fn test_avg_pool_kernel_too_large() -> Result<(), TinyfitError> {
        let input = Tensor::new(vec![0.0; 9], vec![1, 1, 3, 3])?;
        assert!(avg_pool2d_op(&input, 4, 4).is_err());
        Ok(())
    }
}
