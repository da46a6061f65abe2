use crate::autograd::{attach_grad_fn, needs_grad, BackwardOp};
use crate::error::TinyfitError;
use crate::tensor::Tensor;
use std::sync::Arc;

/// Row-major `[m, k] x [k, n]` product.
pub(crate) fn matmul_raw(a: &[f32], b: &[f32], m: usize, k: usize, n: usize) -> Vec<f32> {
    let mut out = vec![0.0; m * n];
    for i in 0..m {
        for l in 0..k {
            let a_il = a[i * k + l];
            if a_il == 0.0 {
                continue;
            }
            let b_row = &b[l * n..(l + 1) * n];
            let out_row = &mut out[i * n..(i + 1) * n];
            for (o, &b_lj) in out_row.iter_mut().zip(b_row) {
                *o += a_il * b_lj;
            }
        }
    }
    out
}

pub(crate) fn transpose_raw(data: &[f32], rows: usize, cols: usize) -> Vec<f32> {
    let mut out = vec![0.0; rows * cols];
    for r in 0..rows {
        for c in 0..cols {
            out[c * rows + r] = data[r * cols + c];
        }
    }
    out
}

#[derive(Debug)]
struct MatMulBackward {
    a: Tensor,
    b: Tensor,
    m: usize,
    k: usize,
    n: usize,
}

impl BackwardOp for MatMulBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, TinyfitError> {
        let (m, k, n) = (self.m, self.k, self.n);
        let grad = grad_output.get_f32_data()?;
        let a_data = self.a.get_f32_data()?;
        let b_data = self.b.get_f32_data()?;

        // dA = dC @ B^T, dB = A^T @ dC
        let grad_a = matmul_raw(&grad, &transpose_raw(&b_data, k, n), m, n, k);
        let grad_b = matmul_raw(&transpose_raw(&a_data, m, k), &grad, k, m, n);
        Ok(vec![
            Tensor::new(grad_a, vec![m, k])?,
            Tensor::new(grad_b, vec![k, n])?,
        ])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone(), self.b.clone()]
    }
}

/// Performs matrix multiplication C = A @ B.
/// Supports 2D tensors only: A: [M, K], B: [K, N] -> C: [M, N]
pub fn matmul_op(a: &Tensor, b: &Tensor) -> Result<Tensor, TinyfitError> {
    let a_shape = a.shape();
    let b_shape = b.shape();
    if a_shape.len() != 2 || b_shape.len() != 2 || a_shape[1] != b_shape[0] {
        return Err(TinyfitError::IncompatibleShapes {
            shape1: a_shape,
            shape2: b_shape,
            operation: "matmul".to_string(),
        });
    }
    let (m, k, n) = (a_shape[0], a_shape[1], b_shape[1]);

    let a_data = a.get_f32_data()?;
    let b_data = b.get_f32_data()?;
    let output = Tensor::new(matmul_raw(&a_data, &b_data, m, k, n), vec![m, n])?;

    if needs_grad(&[a, b]) {
        attach_grad_fn(
            &output,
            Arc::new(MatMulBackward {
                a: a.clone(),
                b: b.clone(),
                m,
                k,
                n,
            }),
        );
    }
    Ok(output)
}

impl Tensor {
    pub fn matmul(&self, other: &Tensor) -> Result<Tensor, TinyfitError> {
        matmul_op(self, other)
    }
}
