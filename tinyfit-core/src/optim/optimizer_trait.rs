use super::param_group::ParamGroup;
use crate::error::TinyfitError;

/// Common interface for all optimizers.
///
/// Optimizers update the parameters they hold, in place, from the gradients
/// accumulated on those parameters by `backward()`.
pub trait Optimizer {
    /// Performs a single optimization step.
    ///
    /// Parameters without a gradient are skipped, so stepping an optimizer
    /// over an empty parameter set does nothing.
    fn step(&mut self) -> Result<(), TinyfitError>;

    /// Resets the gradient of every managed parameter to zeros.
    ///
    /// Calling it twice in a row is the same as calling it once.
    fn zero_grad(&mut self) -> Result<(), TinyfitError>;

    /// Adds a group of parameters with its own hyperparameters.
    ///
    /// # Errors
    /// `InvalidConfiguration` if the group's settings, combined with the
    /// optimizer defaults, would be rejected by the optimizer's constructor.
    /// The group is not added in that case.
    fn add_param_group(&mut self, param_group: ParamGroup) -> Result<(), TinyfitError>;

    fn param_groups(&self) -> &[ParamGroup];

    /// Mutable access, e.g. to change a group's learning rate between epochs.
    fn param_groups_mut(&mut self) -> &mut [ParamGroup];
}
