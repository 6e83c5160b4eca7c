//! Graphics device.
//!
//! The [`GraphicsDevice`] is the main interface of the crate. It owns the
//! selected backend and is responsible for:
//!
//! - validating descriptors and creating resources through the backend
//! - frame pacing: the frame counter and the current frame slot
//! - deferred destruction of native objects dropped while frames are in flight
//! - per-queue command buffer pools
//!
//! # Frame loop
//!
//! ```ignore
//! let device = GraphicsDevice::create_default(&GraphicsDeviceDescriptor::default())?;
//!
//! loop {
//!     let mut cmd = device.begin_command_buffer(QueueType::Graphics, Some("frame"))?;
//!     // ... record ...
//!     cmd.commit()?;
//!     device.finish_frame()?; // present, advance_frame, process_deletion_queue
//! }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytemuck::Pod;

use crate::backend::{BackendError, BackendRegistry, BackendType, GpuBackend, NativeObject};
use crate::capabilities::{AdapterInfo, DeviceLimits, Feature};
use crate::command::{CommandBuffer, CommandBufferState, CommandPool, QueueType, frame_slot};
use crate::config::{GraphicsDeviceDescriptor, ValidationMode};
use crate::deferred::DeferredDestructor;
use crate::descriptor_table::build_descriptor_table;
use crate::error::GraphicsError;
use crate::object::ObjectKind;
use crate::resources::{BindGroupLayout, Buffer, Pipeline, QueryHeap, Sampler, SwapChain, Texture};
use crate::types::{
    BindGroupLayoutDescription, BufferDescriptor, BufferUsage, ComputePipelineDescriptor,
    CpuAccessMode, QueryHeapDescriptor, SamplerDescriptor, SwapChainDescriptor,
    SwapChainSurface, TextureDescriptor, TextureDimension,
};

/// A graphics device for creating GPU resources.
///
/// # Thread Safety
///
/// `GraphicsDevice` is `Send + Sync` and can be safely shared across threads.
/// Resources may be created and dropped from any thread. [`advance_frame`],
/// [`finish_frame`] and [`process_deletion_queue`] belong to the thread that
/// drives the frame loop.
///
/// [`advance_frame`]: Self::advance_frame
/// [`finish_frame`]: Self::finish_frame
/// [`process_deletion_queue`]: Self::process_deletion_queue
pub struct GraphicsDevice {
    label: Option<String>,
    backend: Arc<dyn GpuBackend>,
    validation_mode: ValidationMode,
    adapter_info: AdapterInfo,
    limits: DeviceLimits,
    frame_counter: AtomicU64,
    deferred: DeferredDestructor,
    command_pools: [CommandPool; 3],
}

impl GraphicsDevice {
    // ========================================================================
    // Creation
    // ========================================================================

    /// Create a device from the built-in backend registry.
    ///
    /// Uses `descriptor.preferred_backend` if set, otherwise the first
    /// supported backend in [`BackendRegistry::PRIORITY`] order, falling back
    /// to the null backend.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::UnsupportedBackend`] if the requested backend
    /// is not available on this host.
    pub fn create_default(
        descriptor: &GraphicsDeviceDescriptor,
    ) -> Result<Arc<Self>, GraphicsError> {
        Self::create_with_registry(BackendRegistry::builtin(), descriptor)
    }

    /// Create a device from a caller-provided registry.
    pub fn create_with_registry(
        registry: &BackendRegistry,
        descriptor: &GraphicsDeviceDescriptor,
    ) -> Result<Arc<Self>, GraphicsError> {
        let backend = registry.create(descriptor)?;
        Ok(Self::from_backend(backend, descriptor))
    }

    /// Wrap an already created backend.
    pub fn from_backend(
        backend: Arc<dyn GpuBackend>,
        descriptor: &GraphicsDeviceDescriptor,
    ) -> Arc<Self> {
        let adapter_info = backend.adapter_info();
        let limits = backend.limits();

        log::info!(
            "Creating GraphicsDevice {:?} on {} ({}, validation: {:?})",
            descriptor.label,
            backend.name(),
            adapter_info.name,
            descriptor.validation_mode
        );

        Arc::new(Self {
            label: descriptor.label.clone(),
            backend,
            validation_mode: descriptor.validation_mode,
            adapter_info,
            limits,
            frame_counter: AtomicU64::new(0),
            deferred: DeferredDestructor::new(),
            command_pools: QueueType::ALL.map(CommandPool::new),
        })
    }

    /// Returns true if `backend` can be created by [`create_default`](Self::create_default).
    pub fn is_backend_supported(backend: BackendType) -> bool {
        BackendRegistry::builtin().is_supported(backend)
    }

    // ========================================================================
    // Properties
    // ========================================================================

    /// Get the device label.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Get the backend type.
    pub fn backend_type(&self) -> BackendType {
        self.backend.backend_type()
    }

    /// Get the backend.
    pub fn backend(&self) -> &Arc<dyn GpuBackend> {
        &self.backend
    }

    /// Get the adapter the device runs on.
    pub fn adapter_info(&self) -> &AdapterInfo {
        &self.adapter_info
    }

    /// Get the device limits.
    pub fn limits(&self) -> &DeviceLimits {
        &self.limits
    }

    /// Ticks per second of GPU timestamps.
    pub fn timestamp_frequency(&self) -> u64 {
        self.backend.timestamp_frequency()
    }

    /// Validation level the device was created with.
    pub fn validation_mode(&self) -> ValidationMode {
        self.validation_mode
    }

    /// Returns true if an optional feature is available.
    pub fn query_feature(&self, feature: Feature) -> bool {
        self.backend.query_feature(feature)
    }

    // ========================================================================
    // Frame pacing
    // ========================================================================

    /// Number of frames advanced so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_counter.load(Ordering::Acquire)
    }

    /// Current frame slot, `frame_count() % MAX_FRAMES_IN_FLIGHT`.
    pub fn frame_index(&self) -> usize {
        frame_slot(self.frame_count())
    }

    /// Advance the frame counter. Returns the new frame count.
    ///
    /// This is the only place the frame counter changes. Call it once per
    /// rendered frame, or use [`finish_frame`](Self::finish_frame).
    pub fn advance_frame(&self) -> u64 {
        let frame = self.frame_counter.fetch_add(1, Ordering::AcqRel) + 1;
        log::trace!(
            "GraphicsDevice: advanced to frame {frame} (slot {})",
            frame_slot(frame)
        );
        frame
    }

    /// Destroy queued native objects that are at least
    /// [`MAX_FRAMES_IN_FLIGHT`](crate::MAX_FRAMES_IN_FLIGHT) frames old.
    /// Returns how many were destroyed.
    pub fn process_deletion_queue(&self) -> usize {
        self.deferred.drain(self.frame_count())
    }

    /// Hand a native object over for destruction.
    ///
    /// The object is destroyed by [`process_deletion_queue`](Self::process_deletion_queue)
    /// once [`MAX_FRAMES_IN_FLIGHT`](crate::MAX_FRAMES_IN_FLIGHT) frames have
    /// elapsed, or right away once the device is shutting down.
    pub fn queue_destroy(&self, object: Box<dyn NativeObject>) {
        log::trace!("GraphicsDevice: queue destroy {}", object.kind());
        self.deferred.queue(object, &self.frame_counter);
    }

    /// Number of native objects awaiting destruction.
    pub fn pending_destruction_count(&self) -> usize {
        self.deferred.pending_count()
    }

    /// End the current frame: let the backend present, advance the frame
    /// counter and process the deletion queue.
    pub fn finish_frame(&self) -> Result<(), GraphicsError> {
        self.backend
            .finish_frame(self.frame_index())
            .map_err(|source| self.backend_failure(source))?;
        self.advance_frame();
        self.process_deletion_queue();
        Ok(())
    }

    /// Block until the GPU has finished all submitted work.
    pub fn wait_idle(&self) -> Result<(), GraphicsError> {
        self.backend
            .wait_idle()
            .map_err(|source| self.backend_failure(source))
    }

    /// Wait for the GPU, switch to immediate destruction and flush every
    /// pending native object.
    ///
    /// Idempotent. Runs automatically when the device is dropped. Resources
    /// must not be created after shutdown.
    pub fn shutdown(&self) -> Result<(), GraphicsError> {
        if self.deferred.is_shutting_down() {
            return Ok(());
        }

        let idle = self.wait_idle();
        if let Err(e) = &idle {
            log::warn!("GraphicsDevice: wait idle failed during shutdown: {e}");
        }

        if self.deferred.begin_shutdown() {
            let flushed = self.deferred.flush_all();
            log::info!(
                "GraphicsDevice {:?} shut down at frame {} ({flushed} objects flushed)",
                self.label,
                self.frame_count()
            );
        }
        idle
    }

    /// Returns true once [`shutdown`](Self::shutdown) has begun.
    pub fn is_shutting_down(&self) -> bool {
        self.deferred.is_shutting_down()
    }

    // ========================================================================
    // Resource creation
    // ========================================================================

    /// Create a GPU buffer, optionally filled with `initial_data`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::InvalidArgument`] if the size is below
    /// [`BufferDescriptor::MIN_SIZE`], above the device limit, or smaller than
    /// the initial data.
    pub fn create_buffer(
        self: &Arc<Self>,
        descriptor: &BufferDescriptor,
        initial_data: Option<&[u8]>,
    ) -> Result<Arc<Buffer>, GraphicsError> {
        validate_buffer(descriptor, initial_data, &self.limits)?;

        let native = self
            .backend
            .create_buffer(descriptor, initial_data)
            .map_err(|source| self.creation_failure(ObjectKind::Buffer, source))?;

        log::trace!(
            "GraphicsDevice: created buffer {:?}, size={}",
            descriptor.label,
            descriptor.size
        );

        Ok(Arc::new(Buffer::new(
            Arc::downgrade(self),
            descriptor.clone(),
            native,
        )))
    }

    /// Create a buffer sized for and filled with `data`.
    pub fn create_buffer_from_slice<T: Pod>(
        self: &Arc<Self>,
        data: &[T],
        usage: BufferUsage,
        cpu_access: CpuAccessMode,
        label: Option<&str>,
    ) -> Result<Arc<Buffer>, GraphicsError> {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        if bytes.is_empty() {
            return Err(GraphicsError::invalid_argument(
                "data",
                "initial data must not be empty",
            ));
        }

        let mut descriptor =
            BufferDescriptor::new(bytes.len() as u64, usage).with_cpu_access(cpu_access);
        descriptor.label = label.map(str::to_owned);
        self.create_buffer(&descriptor, Some(bytes))
    }

    /// Create a GPU texture.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::InvalidArgument`] if any extent, the mip level
    /// count or the sample count is zero, or an extent exceeds device limits.
    pub fn create_texture(
        self: &Arc<Self>,
        descriptor: &TextureDescriptor,
    ) -> Result<Arc<Texture>, GraphicsError> {
        self.create_texture_inner(descriptor, None)
    }

    /// Create a GPU texture filled with `data`.
    pub fn create_texture_with_data(
        self: &Arc<Self>,
        descriptor: &TextureDescriptor,
        data: &[u8],
    ) -> Result<Arc<Texture>, GraphicsError> {
        self.create_texture_inner(descriptor, Some(data))
    }

    fn create_texture_inner(
        self: &Arc<Self>,
        descriptor: &TextureDescriptor,
        initial_data: Option<&[u8]>,
    ) -> Result<Arc<Texture>, GraphicsError> {
        validate_texture(descriptor, &self.limits)?;

        let native = self
            .backend
            .create_texture(descriptor, initial_data)
            .map_err(|source| self.creation_failure(ObjectKind::Texture, source))?;

        log::trace!(
            "GraphicsDevice: created texture {:?}, size={}x{}x{}",
            descriptor.label,
            descriptor.width,
            descriptor.height,
            descriptor.depth_or_array_layers
        );

        Ok(Arc::new(Texture::new(
            Arc::downgrade(self),
            descriptor.clone(),
            native,
        )))
    }

    /// Create a texture sampler.
    pub fn create_sampler(
        self: &Arc<Self>,
        descriptor: &SamplerDescriptor,
    ) -> Result<Arc<Sampler>, GraphicsError> {
        validate_sampler(descriptor)?;

        let native = self
            .backend
            .create_sampler(descriptor)
            .map_err(|source| self.creation_failure(ObjectKind::Sampler, source))?;

        log::trace!("GraphicsDevice: created sampler {:?}", descriptor.label);

        Ok(Arc::new(Sampler::new(
            Arc::downgrade(self),
            descriptor.clone(),
            native,
        )))
    }

    /// Create a bind group layout.
    ///
    /// The entries are compiled into descriptor ranges using the backend's
    /// aliasing rules before the backend sees them. A description without
    /// entries yields an empty layout.
    pub fn create_bind_group_layout(
        self: &Arc<Self>,
        description: &BindGroupLayoutDescription,
    ) -> Result<Arc<BindGroupLayout>, GraphicsError> {
        let table = build_descriptor_table(
            &description.entries,
            description.register_space,
            self.backend.descriptor_aliasing(),
        );

        let native = self
            .backend
            .create_bind_group_layout(description, &table)
            .map_err(|source| self.creation_failure(ObjectKind::BindGroupLayout, source))?;

        log::trace!(
            "GraphicsDevice: created bind group layout {:?}, {} entries in {} ranges",
            description.label,
            description.entries.len(),
            table.resource_ranges.len() + table.sampler_ranges.len()
        );

        Ok(Arc::new(BindGroupLayout::new(
            Arc::downgrade(self),
            description.clone(),
            table,
            native,
        )))
    }

    /// Create a compute pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::InvalidArgument`] if the shader bytecode is empty.
    pub fn create_compute_pipeline(
        self: &Arc<Self>,
        descriptor: &ComputePipelineDescriptor,
    ) -> Result<Arc<Pipeline>, GraphicsError> {
        if descriptor.compute_shader.is_empty() {
            return Err(GraphicsError::invalid_argument(
                "compute_shader",
                "shader bytecode is empty",
            ));
        }

        let native = self
            .backend
            .create_compute_pipeline(descriptor)
            .map_err(|source| self.creation_failure(ObjectKind::Pipeline, source))?;

        log::trace!(
            "GraphicsDevice: created compute pipeline {:?}",
            descriptor.label
        );

        Ok(Arc::new(Pipeline::new_compute(
            Arc::downgrade(self),
            descriptor,
            native,
        )))
    }

    /// Create a query heap.
    pub fn create_query_heap(
        self: &Arc<Self>,
        descriptor: &QueryHeapDescriptor,
    ) -> Result<Arc<QueryHeap>, GraphicsError> {
        let native = self
            .backend
            .create_query_heap(descriptor)
            .map_err(|source| self.creation_failure(ObjectKind::QueryHeap, source))?;

        log::trace!(
            "GraphicsDevice: created query heap {:?} ({:?} x{})",
            descriptor.label,
            descriptor.query_type,
            descriptor.count
        );

        Ok(Arc::new(QueryHeap::new(
            Arc::downgrade(self),
            descriptor.clone(),
            native,
        )))
    }

    /// Create a swap chain presenting to `surface`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::InvalidArgument`] if `surface` is `None`.
    pub fn create_swap_chain(
        self: &Arc<Self>,
        surface: Option<&SwapChainSurface>,
        descriptor: &SwapChainDescriptor,
    ) -> Result<Arc<SwapChain>, GraphicsError> {
        let surface = surface
            .ok_or_else(|| GraphicsError::invalid_argument("surface", "a surface is required"))?;

        let native = self
            .backend
            .create_swap_chain(surface, descriptor)
            .map_err(|source| self.creation_failure(ObjectKind::SwapChain, source))?;

        log::trace!(
            "GraphicsDevice: created swap chain {:?}, size={}x{}",
            descriptor.label,
            descriptor.width,
            descriptor.height
        );

        Ok(Arc::new(SwapChain::new(
            Arc::downgrade(self),
            *surface,
            descriptor.clone(),
            native,
        )))
    }

    // ========================================================================
    // Command buffers
    // ========================================================================

    /// Begin recording a command buffer for `queue` in the current frame slot.
    ///
    /// A label brackets the recorded work in a debug group that is closed
    /// exactly once, whether the command buffer is committed or dropped.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::CommandBufferBusy`] if a command buffer for
    /// the same queue is still recording in this slot.
    pub fn begin_command_buffer(
        self: &Arc<Self>,
        queue: QueueType,
        label: Option<&str>,
    ) -> Result<CommandBuffer, GraphicsError> {
        CommandBuffer::begin(self, queue, label)
    }

    /// State of the command buffers of `queue` in `frame_slot`.
    pub fn command_buffer_state(&self, queue: QueueType, frame_slot: usize) -> CommandBufferState {
        self.command_pool(queue).state(frame_slot)
    }

    pub(crate) fn command_pool(&self, queue: QueueType) -> &CommandPool {
        &self.command_pools[queue.index()]
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn creation_failure(&self, object: ObjectKind, source: BackendError) -> GraphicsError {
        log::warn!(
            "GraphicsDevice: {} backend failed to create {object}: {source}",
            self.backend_type()
        );
        GraphicsError::BackendCreationFailure {
            backend: self.backend_type(),
            object,
            source,
        }
    }

    fn backend_failure(&self, source: BackendError) -> GraphicsError {
        GraphicsError::BackendFailure {
            backend: self.backend_type(),
            source,
        }
    }
}

impl Drop for GraphicsDevice {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            log::error!("GraphicsDevice: shutdown failed: {e}");
        }
    }
}

impl std::fmt::Debug for GraphicsDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphicsDevice")
            .field("label", &self.label)
            .field("backend", &self.backend_type())
            .field("frame_count", &self.frame_count())
            .field("pending_destructions", &self.pending_destruction_count())
            .finish()
    }
}

// Ensure GraphicsDevice is Send + Sync
static_assertions::assert_impl_all!(GraphicsDevice: Send, Sync);

// ============================================================================
// Validation
// ============================================================================

fn validate_buffer(
    descriptor: &BufferDescriptor,
    initial_data: Option<&[u8]>,
    limits: &DeviceLimits,
) -> Result<(), GraphicsError> {
    if descriptor.size < BufferDescriptor::MIN_SIZE {
        return Err(GraphicsError::invalid_argument(
            "size",
            format!(
                "must be at least {} bytes, got {}",
                BufferDescriptor::MIN_SIZE,
                descriptor.size
            ),
        ));
    }
    if descriptor.size > limits.max_buffer_size {
        return Err(GraphicsError::invalid_argument(
            "size",
            format!(
                "{} exceeds maximum buffer size {}",
                descriptor.size, limits.max_buffer_size
            ),
        ));
    }
    let data_len = initial_data.map_or(0, |data| data.len() as u64);
    if data_len > descriptor.size {
        return Err(GraphicsError::invalid_argument(
            "initial_data",
            format!(
                "{data_len} bytes do not fit in a buffer of {} bytes",
                descriptor.size
            ),
        ));
    }
    Ok(())
}

fn validate_texture(
    descriptor: &TextureDescriptor,
    limits: &DeviceLimits,
) -> Result<(), GraphicsError> {
    let extents = [
        ("width", descriptor.width),
        ("height", descriptor.height),
        ("depth_or_array_layers", descriptor.depth_or_array_layers),
        ("mip_level_count", descriptor.mip_level_count),
        ("sample_count", descriptor.sample_count),
    ];
    for (name, value) in extents {
        if value < 1 {
            return Err(GraphicsError::invalid_argument(
                name,
                "must be at least 1",
            ));
        }
    }

    let (max_width, max_height, max_depth) = match descriptor.dimension {
        TextureDimension::D1 => (
            limits.max_texture_dimension_1d,
            1,
            limits.max_texture_array_layers,
        ),
        TextureDimension::D2 => (
            limits.max_texture_dimension_2d,
            limits.max_texture_dimension_2d,
            limits.max_texture_array_layers,
        ),
        TextureDimension::D3 => (
            limits.max_texture_dimension_3d,
            limits.max_texture_dimension_3d,
            limits.max_texture_dimension_3d,
        ),
    };
    let bounded = [
        ("width", descriptor.width, max_width),
        ("height", descriptor.height, max_height),
        ("depth_or_array_layers", descriptor.depth_or_array_layers, max_depth),
    ];
    for (name, value, max) in bounded {
        if value > max {
            return Err(GraphicsError::invalid_argument(
                name,
                format!(
                    "{value} exceeds the {:?} texture limit {max}",
                    descriptor.dimension
                ),
            ));
        }
    }

    let full_chain = descriptor.full_mip_chain_len();
    if descriptor.mip_level_count > full_chain {
        return Err(GraphicsError::invalid_argument(
            "mip_level_count",
            format!(
                "{} exceeds the full mip chain of {full_chain} levels",
                descriptor.mip_level_count
            ),
        ));
    }
    Ok(())
}

fn validate_sampler(descriptor: &SamplerDescriptor) -> Result<(), GraphicsError> {
    let anisotropy = descriptor.max_anisotropy;
    if anisotropy == 0 || anisotropy > SamplerDescriptor::MAX_ANISOTROPY {
        return Err(GraphicsError::invalid_argument(
            "max_anisotropy",
            format!(
                "must be between 1 and {}, got {}",
                SamplerDescriptor::MAX_ANISOTROPY,
                descriptor.max_anisotropy
            ),
        ));
    }
    if descriptor.lod_min_clamp > descriptor.lod_max_clamp {
        return Err(GraphicsError::invalid_argument(
            "lod_min_clamp",
            format!(
                "{} is greater than lod_max_clamp {}",
                descriptor.lod_min_clamp, descriptor.lod_max_clamp
            ),
        ));
    }
    Ok(())
}
