//! GPU backend abstraction layer.
//!
//! A backend realizes the device contract on one native API. The core only
//! talks to it through the traits in this module:
//!
//! - [`GpuBackend`]: capability queries, native object factories, queue submission
//! - [`NativeObject`]: a native resource owned by a core resource wrapper
//! - [`NativeCommandEncoder`]: a native command list bound to one queue and frame slot
//!
//! Backends are created at runtime by [`BackendFactory`]s registered in a
//! [`BackendRegistry`]. The crate ships only the [`NullBackend`]; native
//! backends live in their own crates and register a factory.

mod error;
mod null;
mod registry;

use std::any::Any;
use std::fmt;
use std::str::FromStr;

pub use error::BackendError;
pub use null::{NullBackend, NullBackendFactory};
pub use registry::{BackendFactory, BackendRegistry};

use crate::capabilities::{AdapterInfo, DeviceLimits, Feature};
use crate::command::QueueType;
use crate::descriptor_table::{DescriptorAliasing, DescriptorTableLayout};
use crate::object::ObjectKind;
use crate::types::{
    BindGroupLayoutDescription, BufferDescriptor, ComputePipelineDescriptor, QueryHeapDescriptor,
    SamplerDescriptor, ScissorRect, SwapChainDescriptor, SwapChainSurface, TextureDescriptor,
};

// ============================================================================
// Backend identification
// ============================================================================

/// Native API a backend is built on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BackendType {
    /// No-op backend. Always available.
    Null,
    /// Vulkan.
    Vulkan,
    /// Direct3D 12.
    D3D12,
    /// Direct3D 11.
    D3D11,
    /// Metal.
    Metal,
}

impl BackendType {
    /// Every backend type.
    pub const ALL: [BackendType; 5] = [
        BackendType::Null,
        BackendType::Vulkan,
        BackendType::D3D12,
        BackendType::D3D11,
        BackendType::Metal,
    ];

    /// Display name of the backend.
    pub fn name(self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Vulkan => "Vulkan",
            Self::D3D12 => "D3D12",
            Self::D3D11 => "D3D11",
            Self::Metal => "Metal",
        }
    }

    /// Returns true for backends that talk to a real GPU API.
    pub fn is_native(self) -> bool {
        self != Self::Null
    }
}

impl fmt::Display for BackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown backend name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown graphics backend `{0}`")]
pub struct ParseBackendTypeError(String);

impl FromStr for BackendType {
    type Err = ParseBackendTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "null" => Ok(Self::Null),
            "vulkan" | "vk" => Ok(Self::Vulkan),
            "d3d12" | "dx12" => Ok(Self::D3D12),
            "d3d11" | "dx11" => Ok(Self::D3D11),
            "metal" | "mtl" => Ok(Self::Metal),
            _ => Err(ParseBackendTypeError(s.to_string())),
        }
    }
}

// ============================================================================
// Native objects
// ============================================================================

/// A native GPU object owned by a core resource.
///
/// `destroy` consumes the object, so it can run at most once.
pub trait NativeObject: Send + Sync + fmt::Debug + 'static {
    /// Kind of core object this native object backs.
    fn kind(&self) -> ObjectKind;

    /// Forward a debug label to the native API.
    fn set_label(&self, label: &str);

    /// Release the native object.
    fn destroy(self: Box<Self>);

    /// Downcast support for backends.
    fn as_any(&self) -> &dyn Any;
}

/// A native command list bound to one queue and one frame slot.
///
/// The recording calls cannot fail; errors surface from `begin`, `end` and
/// submission.
pub trait NativeCommandEncoder: Send + fmt::Debug {
    /// Reset the command pool backing this encoder.
    fn reset(&mut self) -> Result<(), BackendError>;

    /// Open a recording scope.
    fn begin(&mut self) -> Result<(), BackendError>;

    /// Close the recording scope.
    fn end(&mut self) -> Result<(), BackendError>;

    /// Set scissor rectangles starting at slot 0.
    fn set_scissor_rects(&mut self, rects: &[ScissorRect]);

    /// Set blend constants.
    fn set_blend_constants(&mut self, constants: [f32; 4]);

    /// Set the stencil reference value.
    fn set_stencil_reference(&mut self, reference: u32);

    /// Set the depth bounds test range.
    fn set_depth_bounds(&mut self, min: f32, max: f32);

    /// Open a named debug group.
    fn push_debug_group(&mut self, name: &str, color: [f32; 4]);

    /// Close the innermost debug group.
    fn pop_debug_group(&mut self);

    /// Insert a single debug marker.
    fn insert_debug_marker(&mut self, name: &str, color: [f32; 4]);

    /// Bind a compute pipeline.
    fn set_compute_pipeline(&mut self, pipeline: &dyn NativeObject);

    /// Dispatch compute workgroups.
    fn dispatch(&mut self, x: u32, y: u32, z: u32);

    /// Write a GPU timestamp into a query heap slot.
    fn write_timestamp(&mut self, query_heap: &dyn NativeObject, index: u32);
}

// ============================================================================
// Backend
// ============================================================================

/// GPU backend trait for abstracting different GPU APIs.
///
/// The device validates every descriptor before calling a factory method, so
/// implementations may assume well-formed input.
pub trait GpuBackend: Send + Sync + 'static {
    /// Native API this backend is built on.
    fn backend_type(&self) -> BackendType;

    /// Human readable backend name.
    fn name(&self) -> &str {
        self.backend_type().name()
    }

    /// Adapter the backend runs on.
    fn adapter_info(&self) -> AdapterInfo;

    /// Resource limits.
    fn limits(&self) -> DeviceLimits;

    /// Ticks per second of GPU timestamps.
    fn timestamp_frequency(&self) -> u64;

    /// Returns true if an optional feature is available.
    fn query_feature(&self, feature: Feature) -> bool;

    /// Cross-kind descriptor aliasing allowed when building descriptor tables.
    fn descriptor_aliasing(&self) -> DescriptorAliasing {
        DescriptorAliasing::Strict
    }

    /// Returns true if debug groups and markers reach the native API.
    fn has_debug_labels(&self) -> bool;

    /// Create a buffer, optionally filled with `initial_data`.
    fn create_buffer(
        &self,
        descriptor: &BufferDescriptor,
        initial_data: Option<&[u8]>,
    ) -> Result<Box<dyn NativeObject>, BackendError>;

    /// Create a texture, optionally filled with `initial_data`.
    fn create_texture(
        &self,
        descriptor: &TextureDescriptor,
        initial_data: Option<&[u8]>,
    ) -> Result<Box<dyn NativeObject>, BackendError>;

    /// Create a sampler.
    fn create_sampler(
        &self,
        descriptor: &SamplerDescriptor,
    ) -> Result<Box<dyn NativeObject>, BackendError>;

    /// Create a bind group layout from its compiled descriptor table.
    fn create_bind_group_layout(
        &self,
        descriptor: &BindGroupLayoutDescription,
        table: &DescriptorTableLayout,
    ) -> Result<Box<dyn NativeObject>, BackendError>;

    /// Create a compute pipeline.
    fn create_compute_pipeline(
        &self,
        descriptor: &ComputePipelineDescriptor,
    ) -> Result<Box<dyn NativeObject>, BackendError>;

    /// Create a query heap.
    fn create_query_heap(
        &self,
        descriptor: &QueryHeapDescriptor,
    ) -> Result<Box<dyn NativeObject>, BackendError>;

    /// Create a swap chain presenting to `surface`.
    fn create_swap_chain(
        &self,
        surface: &SwapChainSurface,
        descriptor: &SwapChainDescriptor,
    ) -> Result<Box<dyn NativeObject>, BackendError>;

    /// Create a command encoder for `queue` in frame slot `frame_slot`.
    fn create_command_encoder(
        &self,
        queue: QueueType,
        frame_slot: usize,
    ) -> Result<Box<dyn NativeCommandEncoder>, BackendError>;

    /// Submit a closed encoder to its queue.
    fn submit(
        &self,
        queue: QueueType,
        encoder: &mut dyn NativeCommandEncoder,
    ) -> Result<(), BackendError>;

    /// Present and signal the end of the frame recorded in `frame_slot`.
    fn finish_frame(&self, frame_slot: usize) -> Result<(), BackendError>;

    /// Block until the GPU has finished all submitted work.
    fn wait_idle(&self) -> Result<(), BackendError>;
}
