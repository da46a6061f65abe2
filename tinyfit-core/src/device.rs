use crate::error::TinyfitError;

/// Represents the physical location where tensor data is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StorageDevice {
    /// Main system memory. The only device this build can compute on.
    #[default]
    CPU,
    /// An accelerator. Requests for it fail unless a fallback is allowed.
    GPU,
}

impl StorageDevice {
    /// Whether computations can actually run on this device in the current build.
    pub fn is_available(&self) -> bool {
        match self {
            StorageDevice::CPU => true,
            StorageDevice::GPU => accelerator_available(),
        }
    }
}

/// Reports whether an accelerator backend is compiled in and usable.
///
/// The `gpu` feature only reserves the name; no backend ships with it yet.
pub fn accelerator_available() -> bool {
    false
}

/// Resolves the device a run should use.
///
/// Asking for an unavailable device is an error unless `allow_fallback` is
/// set, in which case the CPU is returned and a warning is logged.
pub fn select_device(
    requested: StorageDevice,
    allow_fallback: bool,
) -> Result<StorageDevice, TinyfitError> {
    if requested.is_available() {
        return Ok(requested);
    }
    if allow_fallback {
        log::warn!(
            "Device {:?} requested but unavailable, falling back to CPU",
            requested
        );
        return Ok(StorageDevice::CPU);
    }
    Err(TinyfitError::DeviceUnavailable {
        requested,
        operation: "select_device".to_string(),
    })
}
