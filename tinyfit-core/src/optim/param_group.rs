use crate::nn::parameter::Parameter;

/// A set of parameters sharing optimizer hyperparameters.
///
/// This allows applying different settings (like learning rate or weight
/// decay) to different parts of a model.
#[derive(Clone, Debug)]
pub struct ParamGroup {
    /// Shallow handles to the optimized tensors.
    pub params: Vec<Parameter>,

    /// Overrides for this group. Unset fields fall back to the optimizer's defaults.
    pub options: ParamGroupOptions,
}

/// Per-group hyperparameter overrides.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParamGroupOptions {
    pub lr: Option<f32>,
    pub momentum: Option<f32>,
    pub weight_decay: Option<f32>,
    pub nesterov: Option<bool>,
}

impl ParamGroupOptions {
    pub fn lr(mut self, lr: f32) -> Self {
        self.lr = Some(lr);
        self
    }

    pub fn momentum(mut self, momentum: f32) -> Self {
        self.momentum = Some(momentum);
        self
    }

    pub fn weight_decay(mut self, weight_decay: f32) -> Self {
        self.weight_decay = Some(weight_decay);
        self
    }

    pub fn nesterov(mut self, nesterov: bool) -> Self {
        self.nesterov = Some(nesterov);
        self
    }
}

impl ParamGroup {
    /// Creates a group that uses the optimizer's defaults.
    pub fn new(params: Vec<Parameter>) -> Self {
        ParamGroup {
            params,
            options: ParamGroupOptions::default(),
        }
    }

    pub fn with_options(params: Vec<Parameter>, options: ParamGroupOptions) -> Self {
        ParamGroup { params, options }
    }

    pub fn set_lr(&mut self, lr: f32) {
        self.options.lr = Some(lr);
    }

    pub fn get_lr(&self) -> Option<f32> {
        self.options.lr
    }
}
