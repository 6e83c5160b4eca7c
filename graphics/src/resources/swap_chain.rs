//! Swap chain resource.

use std::sync::Weak;

use crate::backend::NativeObject;
use crate::device::GraphicsDevice;
use crate::object::{
    GraphicsObject, GraphicsObjectBase, NativeHolder, ObjectKind, apply_label, resource_parts,
};
use crate::types::{PresentMode, SwapChainDescriptor, SwapChainSurface, TextureFormat};

/// Back buffer rotation presenting to a window surface.
pub struct SwapChain {
    base: GraphicsObjectBase,
    native: NativeHolder,
    surface: SwapChainSurface,
    descriptor: SwapChainDescriptor,
}

impl SwapChain {
    pub(crate) fn new(
        device: Weak<GraphicsDevice>,
        surface: SwapChainSurface,
        descriptor: SwapChainDescriptor,
        native: Box<dyn NativeObject>,
    ) -> Self {
        let (base, native) = resource_parts(
            ObjectKind::SwapChain,
            device,
            descriptor.label.as_deref(),
            native,
        );
        Self {
            base,
            native,
            surface,
            descriptor,
        }
    }

    /// Surface the swap chain presents to.
    pub fn surface(&self) -> &SwapChainSurface {
        &self.surface
    }

    /// Get the swap chain descriptor.
    pub fn descriptor(&self) -> &SwapChainDescriptor {
        &self.descriptor
    }

    /// Back buffer size in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.descriptor.width, self.descriptor.height)
    }

    /// Back buffer format.
    pub fn format(&self) -> TextureFormat {
        self.descriptor.format
    }

    /// Presentation mode.
    pub fn present_mode(&self) -> PresentMode {
        self.descriptor.present_mode
    }

    /// Change the debug label.
    pub fn set_label(&self, label: Option<&str>) {
        apply_label(&self.base, &self.native, label);
    }
}

impl GraphicsObject for SwapChain {
    fn base(&self) -> &GraphicsObjectBase {
        &self.base
    }
}

impl Drop for SwapChain {
    fn drop(&mut self) {
        self.native.release(self.base.weak_device());
    }
}

impl std::fmt::Debug for SwapChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwapChain")
            .field("size", &self.size())
            .field("format", &self.descriptor.format)
            .field("present_mode", &self.descriptor.present_mode)
            .field("label", &self.base.label())
            .finish()
    }
}

// Ensure SwapChain is Send + Sync
static_assertions::assert_impl_all!(SwapChain: Send, Sync);
