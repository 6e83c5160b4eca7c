//! GPU buffer resource.

use std::sync::Weak;

use crate::backend::NativeObject;
use crate::device::GraphicsDevice;
use crate::object::{
    GraphicsObject, GraphicsObjectBase, NativeHolder, ObjectKind, apply_label, resource_parts,
};
use crate::types::{BufferDescriptor, BufferUsage, CpuAccessMode};

/// A GPU buffer resource.
///
/// Buffers are created by [`GraphicsDevice::create_buffer`] and are reference-counted.
/// They hold a weak reference back to their parent device.
///
/// # Example
///
/// ```ignore
/// let buffer = device.create_buffer(&BufferDescriptor::new(1024, BufferUsage::VERTEX), None)?;
/// println!("Buffer size: {}", buffer.size());
/// ```
pub struct Buffer {
    base: GraphicsObjectBase,
    native: NativeHolder,
    descriptor: BufferDescriptor,
}

impl Buffer {
    /// Create a new buffer (called by GraphicsDevice).
    pub(crate) fn new(
        device: Weak<GraphicsDevice>,
        descriptor: BufferDescriptor,
        native: Box<dyn NativeObject>,
    ) -> Self {
        let (base, native) = resource_parts(
            ObjectKind::Buffer,
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

    /// Get the buffer descriptor.
    pub fn descriptor(&self) -> &BufferDescriptor {
        &self.descriptor
    }

    /// Get the buffer size in bytes.
    pub fn size(&self) -> u64 {
        self.descriptor.size
    }

    /// Get the buffer usage flags.
    pub fn usage(&self) -> BufferUsage {
        self.descriptor.usage
    }

    /// Get the CPU access mode.
    pub fn cpu_access(&self) -> CpuAccessMode {
        self.descriptor.cpu_access
    }

    /// Change the debug label.
    pub fn set_label(&self, label: Option<&str>) {
        apply_label(&self.base, &self.native, label);
    }

    /// Native object backing the buffer, for backend crates.
    pub fn native(&self) -> Option<&dyn NativeObject> {
        self.native.get()
    }
}

impl GraphicsObject for Buffer {
    fn base(&self) -> &GraphicsObjectBase {
        &self.base
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        self.native.release(self.base.weak_device());
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("size", &self.descriptor.size)
            .field("usage", &self.descriptor.usage)
            .field("label", &self.base.label())
            .finish()
    }
}

// Ensure Buffer is Send + Sync
static_assertions::assert_impl_all!(Buffer: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{GpuBackend, NullBackend};

    fn buffer(desc: BufferDescriptor) -> Buffer {
        let native = NullBackend::new().create_buffer(&desc, None).unwrap();
        Buffer::new(Weak::new(), desc, native)
    }

    #[test]
    fn test_buffer_debug() {
        let buffer = buffer(BufferDescriptor::new(1024, BufferUsage::VERTEX));
        let debug = format!("{:?}", buffer);
        assert!(debug.contains("Buffer"));
        assert!(debug.contains("1024"));
    }

    #[test]
    fn test_buffer_accessors() {
        let buffer = buffer(
            BufferDescriptor::new(2048, BufferUsage::CONSTANT)
                .with_cpu_access(CpuAccessMode::Write)
                .with_label("constants"),
        );
        assert_eq!(buffer.size(), 2048);
        assert_eq!(buffer.usage(), BufferUsage::CONSTANT);
        assert_eq!(buffer.cpu_access(), CpuAccessMode::Write);
        assert_eq!(buffer.kind(), ObjectKind::Buffer);
        assert_eq!(buffer.label().as_deref(), Some("constants"));

        buffer.set_label(Some("renamed"));
        assert_eq!(buffer.label().as_deref(), Some("renamed"));
        assert!(buffer.native().is_some());
        assert!(buffer.device().is_none());
    }
}
