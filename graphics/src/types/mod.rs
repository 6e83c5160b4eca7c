//! Common types and descriptors for graphics resources.
//!
//! This module contains format enums, usage flags, and descriptor structs
//! used throughout the graphics system. Descriptors are plain data; the
//! [`GraphicsDevice`](crate::GraphicsDevice) validates them before any backend
//! sees them.

mod binding;
mod buffer;
mod common;
mod pipeline;
mod query;
mod sampler;
mod swapchain;
mod texture;

pub use binding::{BindGroupLayoutDescription, BindGroupLayoutEntry, DescriptorType, ShaderStages};
pub use buffer::{BufferDescriptor, BufferUsage, CpuAccessMode};
pub use common::{Extent3d, ScissorRect};
pub use pipeline::{ComputePipelineDescriptor, ShaderBytecode};
pub use query::{QueryHeapDescriptor, QueryType};
pub use sampler::{
    AddressMode, CompareFunction, FilterMode, MipFilterMode, ReductionType, SamplerDescriptor,
};
pub use swapchain::{PresentMode, SwapChainDescriptor, SwapChainSurface};
pub use texture::{TextureDescriptor, TextureDimension, TextureFormat, TextureUsage};
