//! Adapter information, device limits and optional features.

use std::fmt;

/// Information about a graphics adapter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AdapterInfo {
    /// Adapter name.
    pub name: String,
    /// Adapter vendor.
    pub vendor: String,
    /// PCI vendor id, zero when unknown.
    pub vendor_id: u32,
    /// PCI device id, zero when unknown.
    pub device_id: u32,
    /// Device type (discrete, integrated, etc.).
    pub device_type: AdapterType,
}

impl AdapterInfo {
    /// Adapter info for a software implementation.
    pub fn software(name: impl Into<String>, vendor: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vendor: vendor.into(),
            vendor_id: 0,
            device_id: 0,
            device_type: AdapterType::Software,
        }
    }
}

/// Type of graphics adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdapterType {
    /// Discrete GPU (dedicated graphics card).
    Discrete,
    /// Integrated GPU (shared with CPU).
    Integrated,
    /// Software renderer.
    Software,
    /// Unknown adapter type.
    Unknown,
}

/// Resource limits reported by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceLimits {
    /// Maximum buffer size in bytes.
    pub max_buffer_size: u64,
    /// Maximum width of a 1D texture.
    pub max_texture_dimension_1d: u32,
    /// Maximum width and height of a 2D texture.
    pub max_texture_dimension_2d: u32,
    /// Maximum extent of a 3D texture along any axis.
    pub max_texture_dimension_3d: u32,
    /// Maximum array layer count.
    pub max_texture_array_layers: u32,
    /// Maximum number of bind groups a pipeline may use.
    pub max_bind_groups: u32,
    /// Maximum compute workgroup count per dimension.
    pub max_compute_workgroups_per_dimension: u32,
    /// Number of simultaneous color render targets.
    pub max_color_attachments: u32,
}

impl Default for DeviceLimits {
    fn default() -> Self {
        Self {
            max_buffer_size: 1 << 30, // 1 GB
            max_texture_dimension_1d: 16384,
            max_texture_dimension_2d: 16384,
            max_texture_dimension_3d: 2048,
            max_texture_array_layers: 2048,
            max_bind_groups: 4,
            max_compute_workgroups_per_dimension: 65535,
            max_color_attachments: 8,
        }
    }
}

/// Optional device features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Depth bounds testing.
    DepthBoundsTest,
    /// GPU timestamp queries.
    TimestampQuery,
    /// Pipeline statistics queries.
    PipelineStatisticsQuery,
    /// BC compressed texture formats.
    TextureCompressionBC,
    /// ETC2 compressed texture formats.
    TextureCompressionETC2,
    /// ASTC compressed texture formats.
    TextureCompressionASTC,
    /// 16-bit floats in shaders.
    ShaderFloat16,
    /// Geometry shaders.
    GeometryShader,
    /// Tessellation shaders.
    TessellationShader,
    /// Conservative rasterization.
    ConservativeRasterization,
    /// Non-zero first instance in indirect draws.
    IndirectFirstInstance,
    /// Disabling depth clipping.
    DepthClipControl,
    /// The `Depth32FloatStencil8` format.
    Depth32FloatStencil8,
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
