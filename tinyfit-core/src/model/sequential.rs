use crate::device::StorageDevice;
use crate::error::TinyfitError;
use crate::nn::module::{Mode, Module};
use crate::nn::parameter::Parameter;
use crate::tensor::Tensor;

/// Chains modules: the output of each is the input of the next.
///
/// Children are named by insertion index unless a name is given, and
/// parameter names are prefixed with the child's name (`"0.weight"`).
#[derive(Debug, Default)]
pub struct Sequential {
    modules: Vec<(String, Box<dyn Module>)>,
    mode: Mode,
}

impl Sequential {
    pub fn new() -> Self {
        Sequential::default()
    }

    pub fn from_modules(modules: Vec<Box<dyn Module>>) -> Self {
        let mut seq = Sequential::new();
        for module in modules {
            seq.push(module);
        }
        seq
    }

    /// Appends `module` under its index.
    pub fn push(&mut self, module: Box<dyn Module>) {
        let name = self.modules.len().to_string();
        self.add_module(&name, module);
    }

    /// Appends `module` under `name`. The child adopts the container's mode.
    pub fn add_module(&mut self, name: &str, mut module: Box<dyn Module>) {
        module.set_mode(self.mode);
        self.modules.push((name.to_string(), module));
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl Module for Sequential {
    fn forward(&self, input: &Tensor) -> Result<Tensor, TinyfitError> {
        let mut current = input.clone();
        for (_, module) in &self.modules {
            current = module.forward(&current)?;
        }
        Ok(current)
    }

    fn parameters(&self) -> Vec<&Parameter> {
        self.modules
            .iter()
            .flat_map(|(_, module)| module.parameters())
            .collect()
    }

    fn named_parameters(&self) -> Vec<(String, &Parameter)> {
        let mut params = Vec::new();
        for (name, module) in &self.modules {
            for (param_name, param) in module.named_parameters() {
                params.push((format!("{}.{}", name, param_name), param));
            }
        }
        params
    }

    fn children(&self) -> Vec<&dyn Module> {
        self.modules.iter().map(|(_, m)| m.as_ref()).collect()
    }

    fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        for (_, module) in self.modules.iter_mut() {
            module.set_mode(mode);
        }
    }

    fn mode(&self) -> Mode {
        self.mode
    }

    fn to_device(&mut self, device: StorageDevice) -> Result<(), TinyfitError> {
        for (_, module) in self.modules.iter_mut() {
            module.to_device(device)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nn::layers::{Dropout, Flatten, Linear, ReLU};
    use crate::utils::testing::create_test_tensor;

    fn two_layer() -> Result<Sequential, TinyfitError> {
        let first = Linear::from_tensors(
            create_test_tensor(vec![1.0, -1.0, 2.0, 0.5], vec![2, 2]),
            Some(create_test_tensor(vec![0.0, 0.0], vec![2])),
        )?;
        let second = Linear::from_tensors(create_test_tensor(vec![1.0, 1.0], vec![1, 2]), None)?;
        Ok(Sequential::from_modules(vec![
            Box::new(first),
            Box::new(ReLU::new()),
            Box::new(second),
        ]))
    }

    #[test]
    fn test_forward_chains_children() -> Result<(), TinyfitError> {
        let model = two_layer()?;
        let x = create_test_tensor(vec![1.0, 2.0], vec![1, 2]);
        // first: [1 - 2, 2 + 1] = [-1, 3]; relu: [0, 3]; second: 3
        assert_eq!(model.forward(&x)?.get_f32_data()?, vec![3.0]);
        Ok(())
    }

    #[test]
    fn test_named_parameters_are_prefixed() -> Result<(), TinyfitError> {
        let model = two_layer()?;
        let names: Vec<String> = model.named_parameters().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["0.weight", "0.bias", "2.weight"]);
        assert_eq!(model.parameters().len(), 3);
        assert_eq!(model.children().len(), 3);
        Ok(())
    }

    #[test]
    fn test_set_mode_reaches_children() -> Result<(), TinyfitError> {
        let mut model = Sequential::new();
        model.add_module("drop", Box::new(Dropout::with_seed(0.5, 1)?));
        model.add_module("flat", Box::new(Flatten::new()));
        model.set_mode(Mode::Eval);
        assert!(model.children().iter().all(|c| c.mode() == Mode::Eval));

        let x = create_test_tensor(vec![1.0; 8], vec![2, 2, 2]);
        let a = model.forward(&x)?.get_f32_data()?;
        let b = model.forward(&x)?.get_f32_data()?;
        assert_eq!(a, vec![1.0; 8]);
        assert_eq!(a, b);
        Ok(())
    }
}
