//! Runtime backend registry and selection.

use std::fmt;
use std::sync::{Arc, OnceLock};

use super::{BackendError, BackendType, GpuBackend, NullBackendFactory};
use crate::config::GraphicsDeviceDescriptor;
use crate::error::GraphicsError;
use crate::object::ObjectKind;

/// Creates backends of one [`BackendType`].
pub trait BackendFactory: Send + Sync {
    /// Backend this factory creates.
    fn backend_type(&self) -> BackendType;

    /// Check whether the backend can run on this host.
    ///
    /// Called at most once per registry; the result is cached.
    fn is_supported(&self) -> bool;

    /// Create the backend.
    fn create(
        &self,
        descriptor: &GraphicsDeviceDescriptor,
    ) -> Result<Arc<dyn GpuBackend>, BackendError>;
}

struct RegisteredFactory {
    factory: Box<dyn BackendFactory>,
    supported: OnceLock<bool>,
}

impl RegisteredFactory {
    fn is_supported(&self) -> bool {
        *self.supported.get_or_init(|| {
            let supported = self.factory.is_supported();
            log::debug!(
                "Backend support: {} {}",
                self.factory.backend_type(),
                if supported { "supported" } else { "unavailable" }
            );
            supported
        })
    }
}

/// Set of backend factories a device can be created from.
///
/// Unsupported backends are simply absent, or report `false` from their support check.
#[derive(Default)]
pub struct BackendRegistry {
    factories: Vec<RegisteredFactory>,
}

impl BackendRegistry {
    /// Selection order used when no backend is requested. Null is the fallback.
    pub const PRIORITY: [BackendType; 3] =
        [BackendType::D3D12, BackendType::Metal, BackendType::Vulkan];

    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry containing the null backend.
    pub fn with_null() -> Self {
        Self::new().with_factory(NullBackendFactory)
    }

    /// Registry of the backends built into this crate.
    pub fn builtin() -> &'static BackendRegistry {
        static BUILTIN: OnceLock<BackendRegistry> = OnceLock::new();
        BUILTIN.get_or_init(BackendRegistry::with_null)
    }

    /// Register a factory, replacing any factory for the same backend type.
    pub fn register(&mut self, factory: impl BackendFactory + 'static) -> &mut Self {
        let backend = factory.backend_type();
        self.factories
            .retain(|f| f.factory.backend_type() != backend);
        self.factories.push(RegisteredFactory {
            factory: Box::new(factory),
            supported: OnceLock::new(),
        });
        self
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_factory(mut self, factory: impl BackendFactory + 'static) -> Self {
        self.register(factory);
        self
    }

    fn find(&self, backend: BackendType) -> Option<&RegisteredFactory> {
        self.factories
            .iter()
            .find(|f| f.factory.backend_type() == backend)
    }

    /// Returns true if `backend` is registered and its support check succeeds.
    pub fn is_supported(&self, backend: BackendType) -> bool {
        self.find(backend).is_some_and(RegisteredFactory::is_supported)
    }

    /// Supported backends, in [`BackendType::ALL`] order.
    pub fn supported_backends(&self) -> Vec<BackendType> {
        BackendType::ALL
            .into_iter()
            .filter(|b| self.is_supported(*b))
            .collect()
    }

    /// Pick the backend a device would use, without creating it.
    pub fn select(&self, preferred: Option<BackendType>) -> Result<BackendType, GraphicsError> {
        if let Some(backend) = preferred {
            return if self.is_supported(backend) {
                Ok(backend)
            } else {
                Err(GraphicsError::UnsupportedBackend(Some(backend)))
            };
        }

        Self::PRIORITY
            .into_iter()
            .chain(std::iter::once(BackendType::Null))
            .find(|b| self.is_supported(*b))
            .ok_or(GraphicsError::UnsupportedBackend(None))
    }

    /// Create a backend for `descriptor`.
    ///
    /// An explicitly preferred backend is created or reported as an error.
    /// Otherwise supported backends are tried in [`PRIORITY`](Self::PRIORITY)
    /// order, then the null backend; a backend whose creation fails is skipped.
    pub fn create(
        &self,
        descriptor: &GraphicsDeviceDescriptor,
    ) -> Result<Arc<dyn GpuBackend>, GraphicsError> {
        if let Some(preferred) = descriptor.preferred_backend {
            let backend = self.select(Some(preferred))?;
            return self.create_backend(backend, descriptor).map_err(|source| {
                GraphicsError::BackendCreationFailure {
                    backend,
                    object: ObjectKind::Device,
                    source,
                }
            });
        }

        let candidates = Self::PRIORITY
            .into_iter()
            .chain(std::iter::once(BackendType::Null))
            .filter(|b| self.is_supported(*b));

        for backend in candidates {
            match self.create_backend(backend, descriptor) {
                Ok(created) => return Ok(created),
                Err(e) => log::warn!("Failed to create {backend} backend: {e}"),
            }
        }

        Err(GraphicsError::UnsupportedBackend(None))
    }

    fn create_backend(
        &self,
        backend: BackendType,
        descriptor: &GraphicsDeviceDescriptor,
    ) -> Result<Arc<dyn GpuBackend>, BackendError> {
        let registered = self
            .find(backend)
            .ok_or_else(|| BackendError::Unsupported(format!("{backend} is not registered")))?;
        let created = registered.factory.create(descriptor)?;
        log::info!("Using {} backend ({})", backend, created.name());
        Ok(created)
    }
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.factories.iter().map(|r| r.factory.backend_type()))
            .finish()
    }
}

// Ensure BackendRegistry is Send + Sync
static_assertions::assert_impl_all!(BackendRegistry: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubFactory {
        backend: BackendType,
        supported: bool,
        checks: Arc<AtomicUsize>,
    }

    impl BackendFactory for StubFactory {
        fn backend_type(&self) -> BackendType {
            self.backend
        }

        fn is_supported(&self) -> bool {
            self.checks.fetch_add(1, Ordering::Relaxed);
            self.supported
        }

        fn create(
            &self,
            _descriptor: &GraphicsDeviceDescriptor,
        ) -> Result<Arc<dyn GpuBackend>, BackendError> {
            Err(BackendError::native("stub only"))
        }
    }

    fn stub(backend: BackendType, supported: bool) -> (StubFactory, Arc<AtomicUsize>) {
        let checks = Arc::new(AtomicUsize::new(0));
        (
            StubFactory {
                backend,
                supported,
                checks: checks.clone(),
            },
            checks,
        )
    }

    #[test]
    fn test_builtin_registry_has_null_only() {
        let registry = BackendRegistry::builtin();
        assert_eq!(registry.supported_backends(), vec![BackendType::Null]);
        assert_eq!(registry.select(None), Ok(BackendType::Null));
        assert_eq!(
            registry.select(Some(BackendType::Metal)),
            Err(GraphicsError::UnsupportedBackend(Some(BackendType::Metal)))
        );
    }

    #[test]
    fn test_priority_order() {
        let (vulkan, _) = stub(BackendType::Vulkan, true);
        let (metal, _) = stub(BackendType::Metal, true);
        let (d3d12, _) = stub(BackendType::D3D12, false);
        let registry = BackendRegistry::with_null()
            .with_factory(vulkan)
            .with_factory(metal)
            .with_factory(d3d12);

        assert_eq!(registry.select(None), Ok(BackendType::Metal));
        assert_eq!(
            registry.select(Some(BackendType::Vulkan)),
            Ok(BackendType::Vulkan)
        );
    }

    #[test]
    fn test_support_check_is_cached() {
        let (vulkan, checks) = stub(BackendType::Vulkan, true);
        let registry = BackendRegistry::new().with_factory(vulkan);

        assert!(registry.is_supported(BackendType::Vulkan));
        assert!(registry.is_supported(BackendType::Vulkan));
        assert_eq!(checks.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_empty_registry_selects_nothing() {
        let registry = BackendRegistry::new();
        assert_eq!(registry.select(None), Err(GraphicsError::UnsupportedBackend(None)));
        assert!(matches!(
            registry.create(&GraphicsDeviceDescriptor::default()),
            Err(GraphicsError::UnsupportedBackend(None))
        ));
    }

    #[test]
    fn test_failed_creation_falls_back_to_null() {
        let (vulkan, _) = stub(BackendType::Vulkan, true);
        let registry = BackendRegistry::with_null().with_factory(vulkan);

        let backend = registry
            .create(&GraphicsDeviceDescriptor::default())
            .unwrap();
        assert_eq!(backend.backend_type(), BackendType::Null);

        let err = registry
            .create(&GraphicsDeviceDescriptor::default().with_backend(BackendType::Vulkan))
            .err()
            .unwrap();
        assert!(matches!(
            err,
            GraphicsError::BackendCreationFailure {
                backend: BackendType::Vulkan,
                object: ObjectKind::Device,
                ..
            }
        ));
    }

    #[test]
    fn test_register_replaces_same_type() {
        let (first, _) = stub(BackendType::Vulkan, false);
        let (second, _) = stub(BackendType::Vulkan, true);
        let mut registry = BackendRegistry::new();
        registry.register(first).register(second);

        assert!(registry.is_supported(BackendType::Vulkan));
        assert_eq!(format!("{registry:?}"), "[Vulkan]");
    }
}
