use crate::device::{select_device, StorageDevice};
use crate::error::TinyfitError;
use crate::nn::Parameter;
use crate::tensor::Tensor;

/// Whether a module behaves as during training or as during inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Train,
    Eval,
}

/// The base trait for all neural network modules (layers, containers, models).
///
/// This is the capability set the training loop relies on: a forward pass,
/// access to the learnable parameters, a train/eval switch and device
/// placement.
pub trait Module: std::fmt::Debug {
    /// Performs a forward pass of the module.
    ///
    /// # Arguments
    /// * `input`: A reference to the input `Tensor` for the module.
    ///
    /// # Returns
    /// A `Result` containing the output `Tensor` of the module, or a `TinyfitError`
    /// if an error occurs during the forward pass.
    fn forward(&self, input: &Tensor) -> Result<Tensor, TinyfitError>;

    /// Returns every learnable parameter, including those of sub-modules.
    fn parameters(&self) -> Vec<&Parameter>;

    /// Returns every learnable parameter together with a hierarchical name
    /// (e.g. `"1.weight"` inside a `Sequential`).
    fn named_parameters(&self) -> Vec<(String, &Parameter)>;

    /// Direct child modules. Leaves have none.
    fn children(&self) -> Vec<&dyn Module> {
        Vec::new()
    }

    /// Switches between training and inference behaviour.
    fn set_mode(&mut self, mode: Mode);

    fn mode(&self) -> Mode;

    fn train(&mut self) {
        self.set_mode(Mode::Train);
    }

    fn eval(&mut self) {
        self.set_mode(Mode::Eval);
    }

    /// Resets the gradient of every parameter to zeros.
    fn zero_grad(&self) -> Result<(), TinyfitError> {
        for param in self.parameters() {
            param.zero_grad()?;
        }
        Ok(())
    }

    /// Moves all parameters to `device`.
    ///
    /// The default suits modules without parameters: it only checks that the
    /// device can be used.
    ///
    /// # Errors
    /// `DeviceUnavailable` if `device` cannot be used in this build.
    fn to_device(&mut self, device: StorageDevice) -> Result<(), TinyfitError> {
        select_device(device, false).map(|_| ())
    }
}
