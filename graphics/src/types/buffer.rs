//! Buffer types and descriptors.

use bitflags::bitflags;

bitflags! {
    /// Usage flags for buffers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        /// Buffer can be used as a vertex buffer.
        const VERTEX = 1 << 0;
        /// Buffer can be used as an index buffer.
        const INDEX = 1 << 1;
        /// Buffer can be bound as a constant (uniform) buffer.
        const CONSTANT = 1 << 2;
        /// Buffer can be read from shaders.
        const SHADER_READ = 1 << 3;
        /// Buffer can be written from shaders.
        const SHADER_WRITE = 1 << 4;
        /// Buffer can hold indirect draw/dispatch arguments.
        const INDIRECT = 1 << 5;
        /// Buffer can be used for predication.
        const PREDICATION = 1 << 6;

        /// Shader read and write access.
        const SHADER_READ_WRITE = Self::SHADER_READ.bits() | Self::SHADER_WRITE.bits();
    }
}

impl Default for BufferUsage {
    fn default() -> Self {
        Self::SHADER_READ_WRITE
    }
}

/// CPU visibility of a buffer's memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CpuAccessMode {
    /// Device-local memory, no CPU mapping.
    #[default]
    None,
    /// Host-visible memory for GPU-to-CPU readback.
    Read,
    /// Host-visible memory for CPU-to-GPU uploads.
    Write,
}

/// Descriptor for creating a buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BufferDescriptor {
    /// Debug label for the buffer.
    pub label: Option<String>,
    /// Size in bytes. Must be at least 4.
    pub size: u64,
    /// Usage flags.
    pub usage: BufferUsage,
    /// CPU access mode.
    pub cpu_access: CpuAccessMode,
}

impl BufferDescriptor {
    /// Smallest buffer size accepted by the device.
    pub const MIN_SIZE: u64 = 4;

    /// Create a new buffer descriptor.
    pub fn new(size: u64, usage: BufferUsage) -> Self {
        Self {
            label: None,
            size,
            usage,
            cpu_access: CpuAccessMode::None,
        }
    }

    /// Set the CPU access mode.
    pub fn with_cpu_access(mut self, cpu_access: CpuAccessMode) -> Self {
        self.cpu_access = cpu_access;
        self
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}
