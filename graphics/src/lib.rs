//! # RedLilium HAL
//!
//! Backend-independent core of the RedLilium GPU hardware abstraction layer.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`GraphicsDevice`] - Resource creation, frame pacing and deferred destruction
//! - [`CommandBuffer`] - Per-queue, per-frame-slot command recording
//! - [`build_descriptor_table`] - Compiles bind group layouts into descriptor ranges
//! - [`BackendRegistry`] - Runtime backend selection
//! - [`GpuBackend`] - Trait implemented by native backends, plus the [`NullBackend`]
//!
//! ## Example
//!
//! ```ignore
//! use redlilium_hal::{GraphicsDevice, GraphicsDeviceDescriptor, QueueType};
//!
//! let device = GraphicsDevice::create_default(&GraphicsDeviceDescriptor::default())?;
//! let cmd = device.begin_command_buffer(QueueType::Graphics, Some("frame"))?;
//! cmd.commit()?;
//! device.finish_frame()?;
//! ```

pub mod backend;
pub mod capabilities;
pub mod command;
pub mod config;
pub mod deferred;
pub mod descriptor_table;
pub mod device;
pub mod error;
pub mod object;
pub mod resources;
pub mod types;

// Re-export main types for convenience
pub use backend::{
    BackendError, BackendFactory, BackendRegistry, BackendType, GpuBackend, NativeCommandEncoder,
    NativeObject, NullBackend, NullBackendFactory, ParseBackendTypeError,
};
pub use capabilities::{AdapterInfo, AdapterType, DeviceLimits, Feature};
pub use command::{CommandBuffer, CommandBufferState, QueueType};
pub use config::{GraphicsDeviceDescriptor, PowerPreference, ValidationMode};
pub use deferred::DeferredDestructor;
pub use descriptor_table::{
    DescriptorAliasing, DescriptorRange, DescriptorRangeFlags, DescriptorRangeType,
    DescriptorTableLayout, build_descriptor_table,
};
pub use device::GraphicsDevice;
pub use error::GraphicsError;
pub use object::{GraphicsObject, GraphicsObjectBase, ObjectKind};
pub use resources::{
    BindGroupLayout, Buffer, Pipeline, PipelineKind, QueryHeap, Sampler, SwapChain, Texture,
};
pub use types::{
    AddressMode, BindGroupLayoutDescription, BindGroupLayoutEntry, BufferDescriptor, BufferUsage,
    CompareFunction, ComputePipelineDescriptor, CpuAccessMode, DescriptorType, Extent3d,
    FilterMode, MipFilterMode, PresentMode, QueryHeapDescriptor, QueryType, ReductionType,
    SamplerDescriptor, ScissorRect, ShaderBytecode, ShaderStages, SwapChainDescriptor,
    SwapChainSurface, TextureDescriptor, TextureDimension, TextureFormat, TextureUsage,
};

/// Number of frames the CPU may record ahead of the GPU.
///
/// Sizes the per-queue command pools and the deferred destruction delay.
pub const MAX_FRAMES_IN_FLIGHT: usize = 2;

/// Graphics library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the graphics subsystem.
///
/// This should be called before using any graphics functionality.
pub fn init() {
    log::info!("RedLilium HAL v{} initialized", VERSION);
}
