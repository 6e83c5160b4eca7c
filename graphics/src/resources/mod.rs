//! GPU resources.
//!
//! This module contains the GPU resource types that are created by [`GraphicsDevice`]:
//! - [`Buffer`] - GPU memory buffer
//! - [`Texture`] - GPU texture/image
//! - [`Sampler`] - Texture sampler
//! - [`Pipeline`] - Compute pipeline
//! - [`BindGroupLayout`] - Compiled bind group layout
//! - [`QueryHeap`] - GPU query storage
//! - [`SwapChain`] - Presentable back buffer rotation
//!
//! Resources are reference-counted with [`Arc`] and can be shared across threads.
//! Each resource holds a weak reference back to its parent device and owns its
//! native object. Dropping the last reference queues the native object for
//! deferred destruction on the device.
//!
//! [`GraphicsDevice`]: crate::GraphicsDevice
//! [`Arc`]: std::sync::Arc

mod bind_group_layout;
mod buffer;
mod pipeline;
mod query_heap;
mod sampler;
mod swap_chain;
mod texture;

pub use bind_group_layout::BindGroupLayout;
pub use buffer::Buffer;
pub use pipeline::{Pipeline, PipelineKind};
pub use query_heap::QueryHeap;
pub use sampler::Sampler;
pub use swap_chain::SwapChain;
pub use texture::Texture;
