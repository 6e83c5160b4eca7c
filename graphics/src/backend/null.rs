//! Null GPU backend.
//!
//! This backend doesn't perform any GPU work or native allocation but provides
//! a valid implementation of every contract, so the core can run without GPU
//! hardware. It is always supported and serves as the selection fallback.

use std::any::Any;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{
    BackendError, BackendFactory, BackendType, GpuBackend, NativeCommandEncoder, NativeObject,
};
use crate::capabilities::{AdapterInfo, DeviceLimits, Feature};
use crate::command::QueueType;
use crate::config::GraphicsDeviceDescriptor;
use crate::descriptor_table::DescriptorTableLayout;
use crate::object::ObjectKind;
use crate::types::{
    BindGroupLayoutDescription, BufferDescriptor, ComputePipelineDescriptor, QueryHeapDescriptor,
    SamplerDescriptor, ScissorRect, SwapChainDescriptor, SwapChainSurface, TextureDescriptor,
};

/// Null GPU backend.
#[derive(Debug, Default)]
pub struct NullBackend {
    limits: DeviceLimits,
}

impl NullBackend {
    /// Create a new null backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a null backend reporting custom limits.
    pub fn with_limits(limits: DeviceLimits) -> Self {
        Self { limits }
    }

    fn object(kind: ObjectKind, label: Option<&str>) -> Box<dyn NativeObject> {
        Box::new(NullObject {
            kind,
            label: Mutex::new(label.map(str::to_owned)),
        })
    }
}

impl GpuBackend for NullBackend {
    fn backend_type(&self) -> BackendType {
        BackendType::Null
    }

    fn adapter_info(&self) -> AdapterInfo {
        AdapterInfo::software("Null Adapter", "RedLilium")
    }

    fn limits(&self) -> DeviceLimits {
        self.limits
    }

    fn timestamp_frequency(&self) -> u64 {
        1_000_000_000
    }

    fn query_feature(&self, _feature: Feature) -> bool {
        false
    }

    fn has_debug_labels(&self) -> bool {
        false
    }

    fn create_buffer(
        &self,
        descriptor: &BufferDescriptor,
        initial_data: Option<&[u8]>,
    ) -> Result<Box<dyn NativeObject>, BackendError> {
        log::trace!(
            "NullBackend: creating buffer {:?} (size: {}, initial data: {})",
            descriptor.label,
            descriptor.size,
            initial_data.map_or(0, <[u8]>::len)
        );
        Ok(Self::object(ObjectKind::Buffer, descriptor.label.as_deref()))
    }

    fn create_texture(
        &self,
        descriptor: &TextureDescriptor,
        initial_data: Option<&[u8]>,
    ) -> Result<Box<dyn NativeObject>, BackendError> {
        log::trace!(
            "NullBackend: creating texture {:?} ({}x{}x{}, initial data: {})",
            descriptor.label,
            descriptor.width,
            descriptor.height,
            descriptor.depth_or_array_layers,
            initial_data.map_or(0, <[u8]>::len)
        );
        Ok(Self::object(ObjectKind::Texture, descriptor.label.as_deref()))
    }

    fn create_sampler(
        &self,
        descriptor: &SamplerDescriptor,
    ) -> Result<Box<dyn NativeObject>, BackendError> {
        log::trace!("NullBackend: creating sampler {:?}", descriptor.label);
        Ok(Self::object(ObjectKind::Sampler, descriptor.label.as_deref()))
    }

    fn create_bind_group_layout(
        &self,
        descriptor: &BindGroupLayoutDescription,
        table: &DescriptorTableLayout,
    ) -> Result<Box<dyn NativeObject>, BackendError> {
        log::trace!(
            "NullBackend: creating bind group layout {:?} ({} resource ranges, {} sampler ranges)",
            descriptor.label,
            table.resource_ranges.len(),
            table.sampler_ranges.len()
        );
        Ok(Self::object(
            ObjectKind::BindGroupLayout,
            descriptor.label.as_deref(),
        ))
    }

    fn create_compute_pipeline(
        &self,
        descriptor: &ComputePipelineDescriptor,
    ) -> Result<Box<dyn NativeObject>, BackendError> {
        log::trace!(
            "NullBackend: creating compute pipeline {:?} (entry point: {})",
            descriptor.label,
            descriptor.compute_shader.entry_point
        );
        Ok(Self::object(ObjectKind::Pipeline, descriptor.label.as_deref()))
    }

    fn create_query_heap(
        &self,
        descriptor: &QueryHeapDescriptor,
    ) -> Result<Box<dyn NativeObject>, BackendError> {
        log::trace!(
            "NullBackend: creating query heap {:?} ({:?} x{})",
            descriptor.label,
            descriptor.query_type,
            descriptor.count
        );
        Ok(Self::object(ObjectKind::QueryHeap, descriptor.label.as_deref()))
    }

    fn create_swap_chain(
        &self,
        _surface: &SwapChainSurface,
        descriptor: &SwapChainDescriptor,
    ) -> Result<Box<dyn NativeObject>, BackendError> {
        log::trace!(
            "NullBackend: creating swap chain {:?} ({}x{})",
            descriptor.label,
            descriptor.width,
            descriptor.height
        );
        Ok(Self::object(ObjectKind::SwapChain, descriptor.label.as_deref()))
    }

    fn create_command_encoder(
        &self,
        queue: QueueType,
        frame_slot: usize,
    ) -> Result<Box<dyn NativeCommandEncoder>, BackendError> {
        log::trace!("NullBackend: creating {queue} command encoder for slot {frame_slot}");
        Ok(Box::new(NullCommandEncoder {
            queue,
            frame_slot,
            debug_depth: 0,
        }))
    }

    fn submit(
        &self,
        queue: QueueType,
        _encoder: &mut dyn NativeCommandEncoder,
    ) -> Result<(), BackendError> {
        log::trace!("NullBackend: submit to {queue} queue");
        Ok(())
    }

    fn finish_frame(&self, frame_slot: usize) -> Result<(), BackendError> {
        log::trace!("NullBackend: finish frame in slot {frame_slot}");
        Ok(())
    }

    fn wait_idle(&self) -> Result<(), BackendError> {
        log::trace!("NullBackend: wait idle");
        Ok(())
    }
}

/// Factory registering the [`NullBackend`].
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBackendFactory;

impl BackendFactory for NullBackendFactory {
    fn backend_type(&self) -> BackendType {
        BackendType::Null
    }

    fn is_supported(&self) -> bool {
        true
    }

    fn create(
        &self,
        descriptor: &GraphicsDeviceDescriptor,
    ) -> Result<Arc<dyn GpuBackend>, BackendError> {
        log::trace!("NullBackendFactory: creating backend for {:?}", descriptor.label);
        Ok(Arc::new(NullBackend::new()))
    }
}

/// Placeholder for a native object.
#[derive(Debug)]
struct NullObject {
    kind: ObjectKind,
    label: Mutex<Option<String>>,
}

impl NativeObject for NullObject {
    fn kind(&self) -> ObjectKind {
        self.kind
    }

    fn set_label(&self, label: &str) {
        *self.label.lock() = Some(label.to_owned());
    }

    fn destroy(self: Box<Self>) {
        log::trace!("NullBackend: destroying {} {:?}", self.kind, self.label.lock());
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug)]
struct NullCommandEncoder {
    queue: QueueType,
    frame_slot: usize,
    debug_depth: u32,
}

impl NativeCommandEncoder for NullCommandEncoder {
    fn reset(&mut self) -> Result<(), BackendError> {
        self.debug_depth = 0;
        Ok(())
    }

    fn begin(&mut self) -> Result<(), BackendError> {
        log::trace!(
            "NullBackend: begin {} encoder in slot {}",
            self.queue,
            self.frame_slot
        );
        Ok(())
    }

    fn end(&mut self) -> Result<(), BackendError> {
        if self.debug_depth != 0 {
            log::warn!(
                "NullBackend: {} encoder closed with {} open debug groups",
                self.queue,
                self.debug_depth
            );
        }
        Ok(())
    }

    fn set_scissor_rects(&mut self, _rects: &[ScissorRect]) {}

    fn set_blend_constants(&mut self, _constants: [f32; 4]) {}

    fn set_stencil_reference(&mut self, _reference: u32) {}

    fn set_depth_bounds(&mut self, _min: f32, _max: f32) {}

    fn push_debug_group(&mut self, _name: &str, _color: [f32; 4]) {
        self.debug_depth += 1;
    }

    fn pop_debug_group(&mut self) {
        self.debug_depth = self.debug_depth.saturating_sub(1);
    }

    fn insert_debug_marker(&mut self, _name: &str, _color: [f32; 4]) {}

    fn set_compute_pipeline(&mut self, _pipeline: &dyn NativeObject) {}

    fn dispatch(&mut self, x: u32, y: u32, z: u32) {
        log::trace!("NullBackend: dispatch {x}x{y}x{z}");
    }

    fn write_timestamp(&mut self, _query_heap: &dyn NativeObject, _index: u32) {}
}
