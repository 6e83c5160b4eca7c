//! GPU texture resource.

use std::sync::Weak;

use crate::backend::NativeObject;
use crate::device::GraphicsDevice;
use crate::object::{
    GraphicsObject, GraphicsObjectBase, NativeHolder, ObjectKind, apply_label, resource_parts,
};
use crate::types::{Extent3d, TextureDescriptor, TextureDimension, TextureFormat, TextureUsage};

/// A GPU texture resource.
///
/// Textures are created by [`GraphicsDevice::create_texture`] and are reference-counted.
/// They hold a weak reference back to their parent device.
pub struct Texture {
    base: GraphicsObjectBase,
    native: NativeHolder,
    descriptor: TextureDescriptor,
}

impl Texture {
    /// Create a new texture (called by GraphicsDevice).
    pub(crate) fn new(
        device: Weak<GraphicsDevice>,
        descriptor: TextureDescriptor,
        native: Box<dyn NativeObject>,
    ) -> Self {
        let (base, native) = resource_parts(
            ObjectKind::Texture,
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

    /// Get the texture descriptor.
    pub fn descriptor(&self) -> &TextureDescriptor {
        &self.descriptor
    }

    /// Get the texture size.
    pub fn size(&self) -> Extent3d {
        self.descriptor.size()
    }

    /// Get the texture dimensionality.
    pub fn dimension(&self) -> TextureDimension {
        self.descriptor.dimension
    }

    /// Get the texture format.
    pub fn format(&self) -> TextureFormat {
        self.descriptor.format
    }

    /// Get the texture usage flags.
    pub fn usage(&self) -> TextureUsage {
        self.descriptor.usage
    }

    /// Get the mip level count.
    pub fn mip_level_count(&self) -> u32 {
        self.descriptor.mip_level_count
    }

    /// Get the sample count.
    pub fn sample_count(&self) -> u32 {
        self.descriptor.sample_count
    }

    /// Change the debug label.
    pub fn set_label(&self, label: Option<&str>) {
        apply_label(&self.base, &self.native, label);
    }
}

impl GraphicsObject for Texture {
    fn base(&self) -> &GraphicsObjectBase {
        &self.base
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        self.native.release(self.base.weak_device());
    }
}

impl std::fmt::Debug for Texture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture")
            .field("size", &self.size())
            .field("format", &self.descriptor.format)
            .field("usage", &self.descriptor.usage)
            .field("label", &self.base.label())
            .finish()
    }
}

// Ensure Texture is Send + Sync
static_assertions::assert_impl_all!(Texture: Send, Sync);
