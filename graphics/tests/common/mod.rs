//! Common utilities for device integration tests.
//!
//! [`RecordingBackend`] implements every backend contract and logs each call,
//! so tests can assert on the exact sequence the core issues.

#![allow(dead_code)]

use std::any::Any;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Once};

use parking_lot::Mutex;

use redlilium_hal::{
    AdapterInfo, BackendError, BackendFactory, BackendType, BindGroupLayoutDescription,
    BufferDescriptor, ComputePipelineDescriptor, DescriptorAliasing, DescriptorTableLayout,
    DeviceLimits, Feature, GpuBackend, GraphicsDevice, GraphicsDeviceDescriptor,
    NativeCommandEncoder, NativeObject, ObjectKind, QueryHeapDescriptor, QueueType,
    SamplerDescriptor, ScissorRect, SwapChainDescriptor, SwapChainSurface, TextureDescriptor,
};

static INIT_LOGGER: Once = Once::new();

/// Route `log` output through env_logger once per test binary.
pub fn init_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

// ============================================================================
// Call log
// ============================================================================

/// A call observed by the recording backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create(ObjectKind, Option<String>),
    CreateBindGroupLayout {
        resource_ranges: usize,
        sampler_ranges: usize,
    },
    SetLabel(ObjectKind, String),
    Destroy(ObjectKind, Option<String>),
    CreateEncoder(QueueType, usize),
    Reset(QueueType, usize),
    Begin(QueueType, usize),
    End(QueueType, usize),
    ScissorRects(usize, ScissorRect),
    BlendConstants([f32; 4]),
    StencilReference(u32),
    DepthBounds(f32, f32),
    PushDebugGroup(String, [f32; 4]),
    PopDebugGroup,
    InsertDebugMarker(String, [f32; 4]),
    SetComputePipeline,
    Dispatch(u32, u32, u32),
    WriteTimestamp(u32),
    Submit(QueueType),
    FinishFrame(usize),
    WaitIdle,
}

/// Shared, ordered call log.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    pub fn push(&self, call: Call) {
        self.0.lock().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().clone()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.0.lock().iter().filter(|c| predicate(c)).count()
    }

    pub fn destroyed(&self) -> usize {
        self.count(|c| matches!(c, Call::Destroy(..)))
    }
}

// ============================================================================
// Recording backend
// ============================================================================

/// Backend that records every call instead of talking to a GPU.
#[derive(Debug)]
pub struct RecordingBackend {
    backend_type: BackendType,
    log: CallLog,
    features: HashSet<Feature>,
    debug_labels: bool,
    aliasing: DescriptorAliasing,
    limits: DeviceLimits,
    fail_creation: AtomicBool,
    fail_submit: AtomicBool,
    fail_encoder_creation: AtomicBool,
    fail_encoder_begin: Arc<AtomicBool>,
}

impl RecordingBackend {
    pub fn new(log: CallLog) -> Self {
        Self {
            backend_type: BackendType::Vulkan,
            log,
            features: HashSet::new(),
            debug_labels: true,
            aliasing: DescriptorAliasing::Strict,
            limits: DeviceLimits::default(),
            fail_creation: AtomicBool::new(false),
            fail_submit: AtomicBool::new(false),
            fail_encoder_creation: AtomicBool::new(false),
            fail_encoder_begin: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_backend_type(mut self, backend_type: BackendType) -> Self {
        self.backend_type = backend_type;
        self
    }

    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.features.insert(feature);
        self
    }

    pub fn with_debug_labels(mut self, enabled: bool) -> Self {
        self.debug_labels = enabled;
        self
    }

    pub fn with_aliasing(mut self, aliasing: DescriptorAliasing) -> Self {
        self.aliasing = aliasing;
        self
    }

    pub fn with_limits(mut self, limits: DeviceLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Make every following object creation fail with `OutOfMemory`.
    pub fn fail_creation(&self, fail: bool) {
        self.fail_creation.store(fail, Ordering::Release);
    }

    /// Make every following submission fail with `DeviceLost`.
    pub fn fail_submit(&self, fail: bool) {
        self.fail_submit.store(fail, Ordering::Release);
    }

    /// Make every following command encoder allocation fail with `OutOfMemory`.
    pub fn fail_encoder_creation(&self, fail: bool) {
        self.fail_encoder_creation.store(fail, Ordering::Release);
    }

    /// Make `begin` fail with `DeviceLost` on every encoder, existing ones included.
    pub fn fail_encoder_begin(&self, fail: bool) {
        self.fail_encoder_begin.store(fail, Ordering::Release);
    }

    fn object(
        &self,
        kind: ObjectKind,
        label: Option<&String>,
    ) -> Result<Box<dyn NativeObject>, BackendError> {
        if self.fail_creation.load(Ordering::Acquire) {
            return Err(BackendError::OutOfMemory);
        }
        self.log.push(Call::Create(kind, label.cloned()));
        Ok(Box::new(RecordingObject {
            kind,
            label: Mutex::new(label.cloned()),
            log: self.log.clone(),
        }))
    }
}

impl GpuBackend for RecordingBackend {
    fn backend_type(&self) -> BackendType {
        self.backend_type
    }

    fn adapter_info(&self) -> AdapterInfo {
        AdapterInfo::software("Recording Adapter", "RedLilium Tests")
    }

    fn limits(&self) -> DeviceLimits {
        self.limits
    }

    fn timestamp_frequency(&self) -> u64 {
        10_000_000
    }

    fn query_feature(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }

    fn descriptor_aliasing(&self) -> DescriptorAliasing {
        self.aliasing
    }

    fn has_debug_labels(&self) -> bool {
        self.debug_labels
    }

    fn create_buffer(
        &self,
        descriptor: &BufferDescriptor,
        _initial_data: Option<&[u8]>,
    ) -> Result<Box<dyn NativeObject>, BackendError> {
        self.object(ObjectKind::Buffer, descriptor.label.as_ref())
    }

    fn create_texture(
        &self,
        descriptor: &TextureDescriptor,
        _initial_data: Option<&[u8]>,
    ) -> Result<Box<dyn NativeObject>, BackendError> {
        self.object(ObjectKind::Texture, descriptor.label.as_ref())
    }

    fn create_sampler(
        &self,
        descriptor: &SamplerDescriptor,
    ) -> Result<Box<dyn NativeObject>, BackendError> {
        self.object(ObjectKind::Sampler, descriptor.label.as_ref())
    }

    fn create_bind_group_layout(
        &self,
        descriptor: &BindGroupLayoutDescription,
        table: &DescriptorTableLayout,
    ) -> Result<Box<dyn NativeObject>, BackendError> {
        let object = self.object(ObjectKind::BindGroupLayout, descriptor.label.as_ref())?;
        self.log.push(Call::CreateBindGroupLayout {
            resource_ranges: table.resource_ranges.len(),
            sampler_ranges: table.sampler_ranges.len(),
        });
        Ok(object)
    }

    fn create_compute_pipeline(
        &self,
        descriptor: &ComputePipelineDescriptor,
    ) -> Result<Box<dyn NativeObject>, BackendError> {
        self.object(ObjectKind::Pipeline, descriptor.label.as_ref())
    }

    fn create_query_heap(
        &self,
        descriptor: &QueryHeapDescriptor,
    ) -> Result<Box<dyn NativeObject>, BackendError> {
        self.object(ObjectKind::QueryHeap, descriptor.label.as_ref())
    }

    fn create_swap_chain(
        &self,
        _surface: &SwapChainSurface,
        descriptor: &SwapChainDescriptor,
    ) -> Result<Box<dyn NativeObject>, BackendError> {
        self.object(ObjectKind::SwapChain, descriptor.label.as_ref())
    }

    fn create_command_encoder(
        &self,
        queue: QueueType,
        frame_slot: usize,
    ) -> Result<Box<dyn NativeCommandEncoder>, BackendError> {
        if self.fail_encoder_creation.load(Ordering::Acquire) {
            return Err(BackendError::OutOfMemory);
        }
        self.log.push(Call::CreateEncoder(queue, frame_slot));
        Ok(Box::new(RecordingEncoder {
            queue,
            frame_slot,
            log: self.log.clone(),
            fail_begin: Arc::clone(&self.fail_encoder_begin),
        }))
    }

    fn submit(
        &self,
        queue: QueueType,
        _encoder: &mut dyn NativeCommandEncoder,
    ) -> Result<(), BackendError> {
        if self.fail_submit.load(Ordering::Acquire) {
            return Err(BackendError::DeviceLost);
        }
        self.log.push(Call::Submit(queue));
        Ok(())
    }

    fn finish_frame(&self, frame_slot: usize) -> Result<(), BackendError> {
        self.log.push(Call::FinishFrame(frame_slot));
        Ok(())
    }

    fn wait_idle(&self) -> Result<(), BackendError> {
        self.log.push(Call::WaitIdle);
        Ok(())
    }
}

#[derive(Debug)]
struct RecordingObject {
    kind: ObjectKind,
    label: Mutex<Option<String>>,
    log: CallLog,
}

impl NativeObject for RecordingObject {
    fn kind(&self) -> ObjectKind {
        self.kind
    }

    fn set_label(&self, label: &str) {
        *self.label.lock() = Some(label.to_owned());
        self.log.push(Call::SetLabel(self.kind, label.to_owned()));
    }

    fn destroy(self: Box<Self>) {
        let label = self.label.lock().clone();
        self.log.push(Call::Destroy(self.kind, label));
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug)]
struct RecordingEncoder {
    queue: QueueType,
    frame_slot: usize,
    log: CallLog,
    fail_begin: Arc<AtomicBool>,
}

impl NativeCommandEncoder for RecordingEncoder {
    fn reset(&mut self) -> Result<(), BackendError> {
        self.log.push(Call::Reset(self.queue, self.frame_slot));
        Ok(())
    }

    fn begin(&mut self) -> Result<(), BackendError> {
        if self.fail_begin.load(Ordering::Acquire) {
            return Err(BackendError::DeviceLost);
        }
        self.log.push(Call::Begin(self.queue, self.frame_slot));
        Ok(())
    }

    fn end(&mut self) -> Result<(), BackendError> {
        self.log.push(Call::End(self.queue, self.frame_slot));
        Ok(())
    }

    fn set_scissor_rects(&mut self, rects: &[ScissorRect]) {
        if let Some(first) = rects.first() {
            self.log.push(Call::ScissorRects(rects.len(), *first));
        }
    }

    fn set_blend_constants(&mut self, constants: [f32; 4]) {
        self.log.push(Call::BlendConstants(constants));
    }

    fn set_stencil_reference(&mut self, reference: u32) {
        self.log.push(Call::StencilReference(reference));
    }

    fn set_depth_bounds(&mut self, min: f32, max: f32) {
        self.log.push(Call::DepthBounds(min, max));
    }

    fn push_debug_group(&mut self, name: &str, color: [f32; 4]) {
        self.log.push(Call::PushDebugGroup(name.to_owned(), color));
    }

    fn pop_debug_group(&mut self) {
        self.log.push(Call::PopDebugGroup);
    }

    fn insert_debug_marker(&mut self, name: &str, color: [f32; 4]) {
        self.log.push(Call::InsertDebugMarker(name.to_owned(), color));
    }

    fn set_compute_pipeline(&mut self, pipeline: &dyn NativeObject) {
        assert_eq!(pipeline.kind(), ObjectKind::Pipeline);
        self.log.push(Call::SetComputePipeline);
    }

    fn dispatch(&mut self, x: u32, y: u32, z: u32) {
        self.log.push(Call::Dispatch(x, y, z));
    }

    fn write_timestamp(&mut self, query_heap: &dyn NativeObject, index: u32) {
        assert_eq!(query_heap.kind(), ObjectKind::QueryHeap);
        self.log.push(Call::WriteTimestamp(index));
    }
}

// ============================================================================
// Factories and helpers
// ============================================================================

/// Factory for [`RecordingBackend`]s sharing one call log.
pub struct RecordingFactory {
    pub backend_type: BackendType,
    pub supported: bool,
    pub fails: bool,
    pub log: CallLog,
}

impl RecordingFactory {
    pub fn new(backend_type: BackendType, log: CallLog) -> Self {
        Self {
            backend_type,
            supported: true,
            fails: false,
            log,
        }
    }
}

impl BackendFactory for RecordingFactory {
    fn backend_type(&self) -> BackendType {
        self.backend_type
    }

    fn is_supported(&self) -> bool {
        self.supported
    }

    fn create(
        &self,
        _descriptor: &GraphicsDeviceDescriptor,
    ) -> Result<Arc<dyn GpuBackend>, BackendError> {
        if self.fails {
            return Err(BackendError::native("adapter enumeration failed"));
        }
        Ok(Arc::new(
            RecordingBackend::new(self.log.clone()).with_backend_type(self.backend_type),
        ))
    }
}

/// Device over a recording backend, plus handles to inspect it.
pub struct TestContext {
    pub device: Arc<GraphicsDevice>,
    pub backend: Arc<RecordingBackend>,
    pub log: CallLog,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_backend(|backend| backend)
    }

    /// Build the backend through `configure` before creating the device.
    pub fn with_backend(configure: impl FnOnce(RecordingBackend) -> RecordingBackend) -> Self {
        init_logging();
        let log = CallLog::default();
        let backend = Arc::new(configure(RecordingBackend::new(log.clone())));
        let device = GraphicsDevice::from_backend(
            backend.clone(),
            &GraphicsDeviceDescriptor::new().with_label("test device"),
        );
        Self {
            device,
            backend,
            log,
        }
    }

    /// Advance `n` frames with [`GraphicsDevice::finish_frame`].
    pub fn finish_frames(&self, n: usize) {
        for _ in 0..n {
            self.device.finish_frame().expect("finish_frame failed");
        }
    }
}
