use crate::error::TinyfitError;
use crate::nn::module::{Mode, Module};
use crate::nn::parameter::Parameter;
use crate::tensor::Tensor;
use std::fmt;

type LambdaFn = Box<dyn Fn(&Tensor) -> Result<Tensor, TinyfitError> + Send + Sync>;

/// Wraps a parameter-free tensor function as a module, e.g. a reshape at the
/// head of a `Sequential`.
pub struct Lambda {
    name: String,
    func: LambdaFn,
    mode: Mode,
}

impl Lambda {
    pub fn new<F>(name: &str, func: F) -> Self
    where
        F: Fn(&Tensor) -> Result<Tensor, TinyfitError> + Send + Sync + 'static,
    {
        Lambda {
            name: name.to_string(),
            func: Box::new(func),
            mode: Mode::default(),
        }
    }

    /// A lambda that reshapes its input to `[B, tail...]`.
    pub fn view_batch(tail: Vec<usize>) -> Self {
        let name = format!("view(-1, {:?})", tail);
        Lambda::new(&name, move |x| x.view_batch(&tail))
    }
}

impl fmt::Debug for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lambda({})", self.name)
    }
}

impl Module for Lambda {
    fn forward(&self, input: &Tensor) -> Result<Tensor, TinyfitError> {
        (self.func)(input)
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
