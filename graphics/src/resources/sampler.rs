//! Texture sampler resource.

use std::sync::Weak;

use crate::backend::NativeObject;
use crate::device::GraphicsDevice;
use crate::object::{
    GraphicsObject, GraphicsObjectBase, NativeHolder, ObjectKind, apply_label, resource_parts,
};
use crate::types::SamplerDescriptor;

/// A texture sampler.
///
/// Samplers are created by [`GraphicsDevice::create_sampler`].
pub struct Sampler {
    base: GraphicsObjectBase,
    native: NativeHolder,
    descriptor: SamplerDescriptor,
}

impl Sampler {
    pub(crate) fn new(
        device: Weak<GraphicsDevice>,
        descriptor: SamplerDescriptor,
        native: Box<dyn NativeObject>,
    ) -> Self {
        let (base, native) = resource_parts(
            ObjectKind::Sampler,
            device,
            descriptor.label.as_deref(),
            native,
        );
        Self {
            base,
            native,
            descriptor,
        }
    }

    /// Get the sampler descriptor.
    pub fn descriptor(&self) -> &SamplerDescriptor {
        &self.descriptor
    }

    /// Change the debug label.
    pub fn set_label(&self, label: Option<&str>) {
        apply_label(&self.base, &self.native, label);
    }
}

impl GraphicsObject for Sampler {
    fn base(&self) -> &GraphicsObjectBase {
        &self.base
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        self.native.release(self.base.weak_device());
    }
}

impl std::fmt::Debug for Sampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sampler")
            .field("min_filter", &self.descriptor.min_filter)
            .field("mag_filter", &self.descriptor.mag_filter)
            .field("label", &self.base.label())
            .finish()
    }
}

// Ensure Sampler is Send + Sync
static_assertions::assert_impl_all!(Sampler: Send, Sync);
