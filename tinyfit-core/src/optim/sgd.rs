use crate::error::TinyfitError;
use crate::nn::parameter::Parameter;
use crate::optim::optimizer_trait::Optimizer;
use crate::optim::param_group::{ParamGroup, ParamGroupOptions};
use std::collections::HashMap;

/// Resolved hyperparameters for one group.
#[derive(Debug, Clone, Copy)]
struct SgdSettings {
    lr: f32,
    momentum: f32,
    weight_decay: f32,
    nesterov: bool,
}

impl SgdSettings {
    fn validate(&self) -> Result<(), TinyfitError> {
        if !(self.lr >= 0.0) {
            return Err(TinyfitError::InvalidConfiguration(format!(
                "SGD learning rate must be non-negative, got {}",
                self.lr
            )));
        }
        if !(self.momentum >= 0.0) || !(self.weight_decay >= 0.0) {
            return Err(TinyfitError::InvalidConfiguration(format!(
                "SGD momentum ({}) and weight decay ({}) must be non-negative",
                self.momentum, self.weight_decay
            )));
        }
        if self.nesterov && self.momentum == 0.0 {
            return Err(TinyfitError::InvalidConfiguration(
                "Nesterov momentum requires a non-zero momentum".to_string(),
            ));
        }
        if self.lr == 0.0 {
            log::warn!("SGD configured with a learning rate of 0; steps will not change parameters");
        }
        Ok(())
    }
}

/// Implements the Stochastic Gradient Descent (SGD) optimizer.
///
/// Supports momentum, weight decay, and Nesterov momentum. For each parameter
/// with gradient `g`:
///
/// ```text
/// d   = g + weight_decay * p
/// buf = momentum * buf + d            (when momentum > 0)
/// d   = d + momentum * buf  (Nesterov) or buf
/// p   = p - lr * d
/// ```
#[derive(Debug)]
pub struct SgdOptimizer {
    param_groups: Vec<ParamGroup>,
    defaults: SgdSettings,
    /// Keyed by the parameter's node id.
    momentum_buffers: HashMap<usize, Vec<f32>>,
}

impl SgdOptimizer {
    /// Creates a new `SgdOptimizer`.
    ///
    /// # Arguments
    ///
    /// * `params`: The parameters to optimize, placed in a default group.
    /// * `lr`: The learning rate.
    /// * `momentum`: Momentum factor (0.0 disables momentum).
    /// * `weight_decay`: L2 penalty factor.
    /// * `nesterov`: Enables Nesterov momentum.
    ///
    /// These values are also the defaults for groups added later through
    /// [`Optimizer::add_param_group`].
    ///
    /// # Errors
    /// `InvalidConfiguration` for negative hyperparameters or Nesterov without momentum.
    pub fn new(
        params: impl IntoIterator<Item = Parameter>,
        lr: f32,
        momentum: f32,
        weight_decay: f32,
        nesterov: bool,
    ) -> Result<Self, TinyfitError> {
        let defaults = SgdSettings {
            lr,
            momentum,
            weight_decay,
            nesterov,
        };
        defaults.validate()?;
        Ok(SgdOptimizer {
            param_groups: vec![ParamGroup::new(params.into_iter().collect())],
            defaults,
            momentum_buffers: HashMap::new(),
        })
    }

    fn resolve(&self, options: &ParamGroupOptions) -> SgdSettings {
        SgdSettings {
            lr: options.lr.unwrap_or(self.defaults.lr),
            momentum: options.momentum.unwrap_or(self.defaults.momentum),
            weight_decay: options.weight_decay.unwrap_or(self.defaults.weight_decay),
            nesterov: options.nesterov.unwrap_or(self.defaults.nesterov),
        }
    }
}

impl Optimizer for SgdOptimizer {
    fn step(&mut self) -> Result<(), TinyfitError> {
        let settings: Vec<SgdSettings> = self
            .param_groups
            .iter()
            .map(|g| self.resolve(&g.options))
            .collect();
        let buffers = &mut self.momentum_buffers;

        for (group, settings) in self.param_groups.iter().zip(settings) {
            for param in group.params.iter() {
                if !param.requires_grad() {
                    continue;
                }
                let Some(grad) = param.grad() else {
                    continue;
                };
                let grad = grad.get_f32_data()?;
                if grad.len() != param.numel() {
                    return Err(TinyfitError::ShapeMismatch {
                        expected: format!("{:?}", param.shape()),
                        actual: format!("{} gradient elements", grad.len()),
                        operation: "SGD step".to_string(),
                    });
                }

                let buffer = if settings.momentum != 0.0 {
                    Some(
                        buffers
                            .entry(param.node_id())
                            .or_insert_with(|| vec![0.0; grad.len()]),
                    )
                } else {
                    None
                };

                param.update_data(|p| {
                    let mut d = grad;
                    if settings.weight_decay != 0.0 {
                        for (d_i, p_i) in d.iter_mut().zip(p.iter()) {
                            *d_i += settings.weight_decay * p_i;
                        }
                    }
                    if let Some(buf) = buffer {
                        for (b_i, d_i) in buf.iter_mut().zip(d.iter_mut()) {
                            *b_i = settings.momentum * *b_i + *d_i;
                            if settings.nesterov {
                                *d_i += settings.momentum * *b_i;
                            } else {
                                *d_i = *b_i;
                            }
                        }
                    }
                    for (p_i, d_i) in p.iter_mut().zip(d.iter()) {
                        *p_i -= settings.lr * d_i;
                    }
                    Ok(())
                })?;
            }
        }
        Ok(())
    }

    fn zero_grad(&mut self) -> Result<(), TinyfitError> {
        for group in self.param_groups.iter() {
            for param in group.params.iter() {
                param.zero_grad()?;
            }
        }
        Ok(())
    }

    fn add_param_group(&mut self, param_group: ParamGroup) -> Result<(), TinyfitError> {
        self.resolve(&param_group.options).validate()?;
        self.param_groups.push(param_group);
        Ok(())
    }

    fn param_groups(&self) -> &[ParamGroup] {
        &self.param_groups
    }

    fn param_groups_mut(&mut self) -> &mut [ParamGroup] {
        &mut self.param_groups
    }
}
