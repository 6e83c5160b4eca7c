//! Bind group layout descriptions.
//!
//! A layout lists the resources a pipeline expects in one bind group. Entries
//! are supplied sorted by binding register; the device compiles them into
//! descriptor ranges with [`build_descriptor_table`](crate::build_descriptor_table).

use crate::error::GraphicsError;

/// Kind of resource bound at a binding register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorType {
    /// Constant (uniform) buffer view.
    ConstantBuffer,
    /// Read-only structured buffer.
    StructuredBuffer,
    /// Read-only typed (formatted) buffer.
    TypedBuffer,
    /// Sampled texture.
    Texture,
    /// Read-write structured buffer.
    StorageBuffer,
    /// Read-write typed (formatted) buffer.
    TypedBufferUav,
    /// Read-write storage texture.
    StorageTexture,
    /// Texture sampler.
    Sampler,
}

impl DescriptorType {
    /// Returns true for read-only shader resource views.
    pub fn is_shader_resource(self) -> bool {
        matches!(
            self,
            Self::StructuredBuffer | Self::TypedBuffer | Self::Texture
        )
    }

    /// Returns true for read-write unordered access views.
    pub fn is_unordered_access(self) -> bool {
        matches!(
            self,
            Self::StorageBuffer | Self::TypedBufferUav | Self::StorageTexture
        )
    }

    /// Returns true for samplers.
    pub fn is_sampler(self) -> bool {
        self == Self::Sampler
    }
}

bitflags::bitflags! {
    /// Shader stages that can access a binding.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShaderStages: u32 {
        /// Vertex shader stage.
        const VERTEX = 1 << 0;
        /// Hull (tessellation control) shader stage.
        const HULL = 1 << 1;
        /// Domain (tessellation evaluation) shader stage.
        const DOMAIN = 1 << 2;
        /// Geometry shader stage.
        const GEOMETRY = 1 << 3;
        /// Fragment shader stage.
        const FRAGMENT = 1 << 4;
        /// Compute shader stage.
        const COMPUTE = 1 << 5;
        /// Every graphics stage.
        const ALL_GRAPHICS = Self::VERTEX.bits()
            | Self::HULL.bits()
            | Self::DOMAIN.bits()
            | Self::GEOMETRY.bits()
            | Self::FRAGMENT.bits();
    }
}

/// Describes a single binding slot in a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindGroupLayoutEntry {
    /// Type of resource expected at this binding.
    pub descriptor_type: DescriptorType,
    /// Binding register within the group.
    pub binding: u32,
    /// Shader stages that can access this binding.
    pub visibility: ShaderStages,
}

impl BindGroupLayoutEntry {
    /// Create a new entry visible to every stage.
    pub fn new(descriptor_type: DescriptorType, binding: u32) -> Self {
        Self {
            descriptor_type,
            binding,
            visibility: ShaderStages::all(),
        }
    }

    /// Set the shader stage visibility.
    pub fn with_visibility(mut self, visibility: ShaderStages) -> Self {
        self.visibility = visibility;
        self
    }
}

/// Description of a bind group layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BindGroupLayoutDescription {
    /// Entries sorted by ascending binding register.
    pub entries: Vec<BindGroupLayoutEntry>,
    /// Register space the ranges are placed in, usually the bind group index.
    pub register_space: u32,
    /// Optional label for debugging.
    pub label: Option<String>,
}

impl BindGroupLayoutDescription {
    /// Create a layout description from a non-empty entry list.
    ///
    /// Entries must already be sorted by binding register.
    pub fn new(entries: impl Into<Vec<BindGroupLayoutEntry>>) -> Result<Self, GraphicsError> {
        let entries = entries.into();
        if entries.is_empty() {
            return Err(GraphicsError::invalid_argument(
                "entries",
                "bind group layout needs at least one entry",
            ));
        }
        Ok(Self {
            entries,
            register_space: 0,
            label: None,
        })
    }

    /// Create a layout description without entries.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Set the register space.
    pub fn with_register_space(mut self, register_space: u32) -> Self {
        self.register_space = register_space;
        self
    }

    /// Set a debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the description has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
