use tinyfit_core::{select_device, StorageDevice, TinyfitError};

/// Settings of a training run.
#[derive(Debug, Clone, PartialEq)]
pub struct FitConfig {
    /// Number of train + validate cycles. Zero runs nothing.
    pub epochs: usize,
    /// Device the model should live on.
    pub device: StorageDevice,
    /// Use the CPU, with a warning, when `device` is unavailable.
    pub allow_fallback: bool,
}

impl Default for FitConfig {
    fn default() -> Self {
        FitConfig {
            epochs: 1,
            device: StorageDevice::CPU,
            allow_fallback: false,
        }
    }
}

impl FitConfig {
    pub fn new(epochs: usize) -> Self {
        FitConfig {
            epochs,
            ..Default::default()
        }
    }

    pub fn epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn device(mut self, device: StorageDevice) -> Self {
        self.device = device;
        self
    }

    pub fn allow_fallback(mut self, allow_fallback: bool) -> Self {
        self.allow_fallback = allow_fallback;
        self
    }

    /// The device the run will actually use.
    pub fn resolve_device(&self) -> Result<StorageDevice, TinyfitError> {
        select_device(self.device, self.allow_fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_and_builders() {
        let config = FitConfig::default();
        assert_eq!(config.epochs, 1);
        assert_eq!(config.device, StorageDevice::CPU);
        assert!(!config.allow_fallback);

        let config = FitConfig::new(5).device(StorageDevice::GPU).allow_fallback(true);
        assert_eq!(config.epochs, 5);
        assert_eq!(config.device, StorageDevice::GPU);
        assert!(config.allow_fallback);
    }

    #[test]
    fn test_device_resolution() -> Result<(), TinyfitError> {
        let strict = FitConfig::new(1).device(StorageDevice::GPU);
        assert!(matches!(
            strict.resolve_device(),
            Err(TinyfitError::DeviceUnavailable { .. })
        ));
        let lenient = strict.allow_fallback(true);
        assert_eq!(lenient.resolve_device()?, StorageDevice::CPU);
        Ok(())
    }
}
