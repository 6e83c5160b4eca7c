//! Device configuration.

use crate::backend::BackendType;

/// Level of API validation requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ValidationMode {
    /// No validation layers.
    #[default]
    Disabled,
    /// Standard validation layers.
    Enabled,
    /// Validation with informational messages.
    Verbose,
    /// Validation including GPU-assisted checks.
    Gpu,
}

/// Adapter preference when several GPUs are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PowerPreference {
    /// Let the backend decide.
    #[default]
    Default,
    /// Prefer an integrated, power-saving adapter.
    LowPower,
    /// Prefer a discrete, high-performance adapter.
    HighPerformance,
}

/// Descriptor for creating a [`GraphicsDevice`](crate::GraphicsDevice).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct GraphicsDeviceDescriptor {
    /// Debug label for the device.
    pub label: Option<String>,
    /// Backend to use. `None` searches the registry in priority order.
    pub preferred_backend: Option<BackendType>,
    /// Validation level.
    pub validation_mode: ValidationMode,
    /// Adapter preference.
    pub power_preference: PowerPreference,
}

impl GraphicsDeviceDescriptor {
    /// Create a descriptor with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Request a specific backend.
    pub fn with_backend(mut self, backend: BackendType) -> Self {
        self.preferred_backend = Some(backend);
        self
    }

    /// Set the validation level.
    pub fn with_validation(mut self, mode: ValidationMode) -> Self {
        self.validation_mode = mode;
        self
    }

    /// Set the adapter preference.
    pub fn with_power_preference(mut self, preference: PowerPreference) -> Self {
        self.power_preference = preference;
        self
    }

    /// Request the backend named by environment variable `var`, if it is set.
    ///
    /// Unknown names are logged and ignored.
    pub fn with_backend_from_env(self, var: &str) -> Self {
        match std::env::var(var) {
            Ok(value) => self.with_backend_name(&value),
            Err(_) => self,
        }
    }

    fn with_backend_name(self, value: &str) -> Self {
        match value.parse::<BackendType>() {
            Ok(backend) => self.with_backend(backend),
            Err(e) => {
                log::warn!("Ignoring backend override: {e}");
                self
            }
        }
    }
}
