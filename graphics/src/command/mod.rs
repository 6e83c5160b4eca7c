//! Command buffer recording.
//!
//! A [`CommandBuffer`] is bound to one [`QueueType`] and the frame slot that
//! was current when it began. Its slot moves through
//! [`CommandBufferState::Idle`] → `Recording` → `Submitted` and back to `Idle`
//! when the slot is reused [`MAX_FRAMES_IN_FLIGHT`](crate::MAX_FRAMES_IN_FLIGHT)
//! frames later. At most one command buffer per queue and slot records at a time.

mod pool;

pub(crate) use pool::{CommandPool, frame_slot};
use pool::backend_failure;

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::backend::NativeCommandEncoder;
use crate::capabilities::Feature;
use crate::device::GraphicsDevice;
use crate::error::GraphicsError;
use crate::object::{GraphicsObject, GraphicsObjectBase, ObjectKind};
use crate::resources::{Pipeline, QueryHeap};
use crate::types::{QueryType, ScissorRect};

/// Color used for every debug group and marker.
pub const DEBUG_MARKER_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// Number of scissor rectangles reset when a graphics command buffer begins.
pub const DEFAULT_SCISSOR_COUNT: usize = 16;

/// Extent of the default scissor rectangles.
pub const DEFAULT_SCISSOR_EXTENT: u32 = 65535;

/// Hardware queue a command buffer is submitted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueType {
    /// Graphics, compute and copy work.
    Graphics,
    /// Compute and copy work.
    Compute,
    /// Copy work only.
    Copy,
}

impl QueueType {
    /// Every queue type.
    pub const ALL: [QueueType; 3] = [QueueType::Graphics, QueueType::Compute, QueueType::Copy];

    pub(crate) fn index(self) -> usize {
        match self {
            Self::Graphics => 0,
            Self::Compute => 1,
            Self::Copy => 2,
        }
    }
}

impl fmt::Display for QueueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Graphics => "graphics",
            Self::Compute => "compute",
            Self::Copy => "copy",
        })
    }
}

/// Lifecycle state of a (queue, frame slot) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandBufferState {
    /// Nothing recorded or pending in the slot.
    Idle,
    /// A command buffer is recording.
    Recording,
    /// Work was submitted and may still execute.
    Submitted,
}

/// Records commands for one queue in one frame slot.
///
/// Consumed by [`commit`](Self::commit). Dropping an uncommitted command
/// buffer discards its work and frees the slot.
pub struct CommandBuffer {
    base: GraphicsObjectBase,
    device: Arc<GraphicsDevice>,
    queue: QueueType,
    frame_slot: usize,
    encoder: Option<Mutex<Box<dyn NativeCommandEncoder>>>,
    debug_labels: bool,
    label_pushed: bool,
}

impl CommandBuffer {
    /// Begin recording on `queue` in the device's current frame slot.
    pub(crate) fn begin(
        device: &Arc<GraphicsDevice>,
        queue: QueueType,
        label: Option<&str>,
    ) -> Result<Self, GraphicsError> {
        let label = label.filter(|label| !label.is_empty());
        let backend = device.backend();
        let pool = device.command_pool(queue);
        let (frame_slot, mut encoder) = pool.acquire(device.frame_count(), backend.as_ref())?;

        if let Err(source) = encoder.reset().and_then(|()| encoder.begin()) {
            pool.discard(frame_slot, encoder);
            return Err(backend_failure(backend.as_ref(), source));
        }

        if queue == QueueType::Graphics {
            let scissor =
                ScissorRect::from_dimensions(DEFAULT_SCISSOR_EXTENT, DEFAULT_SCISSOR_EXTENT);
            encoder.set_scissor_rects(&[scissor; DEFAULT_SCISSOR_COUNT]);
            encoder.set_blend_constants([1.0; 4]);
            encoder.set_stencil_reference(u32::MAX);
            if backend.query_feature(Feature::DepthBoundsTest) {
                encoder.set_depth_bounds(0.0, 1.0);
            }
        }

        let debug_labels = backend.has_debug_labels();
        let label_pushed = match label {
            Some(label) if debug_labels => {
                encoder.push_debug_group(label, DEBUG_MARKER_COLOR);
                true
            }
            _ => false,
        };

        log::trace!("CommandBuffer: begin {queue} in slot {frame_slot} ({label:?})");

        Ok(Self {
            base: GraphicsObjectBase::new(
                ObjectKind::CommandBuffer,
                Arc::downgrade(device),
                label.map(str::to_owned),
            ),
            device: Arc::clone(device),
            queue,
            frame_slot,
            encoder: Some(Mutex::new(encoder)),
            debug_labels,
            label_pushed,
        })
    }

    /// Queue this command buffer records for.
    pub fn queue(&self) -> QueueType {
        self.queue
    }

    /// Frame slot this command buffer is bound to.
    pub fn frame_slot(&self) -> usize {
        self.frame_slot
    }

    fn encoder(&mut self) -> Option<&mut Box<dyn NativeCommandEncoder>> {
        self.encoder.as_mut().map(Mutex::get_mut)
    }

    fn debug_encoder(&mut self) -> Option<&mut Box<dyn NativeCommandEncoder>> {
        if self.debug_labels {
            self.encoder()
        } else {
            None
        }
    }

    /// Open a named debug group. No-op without debug label support.
    pub fn push_debug_group(&mut self, name: &str) {
        if let Some(encoder) = self.debug_encoder() {
            encoder.push_debug_group(name, DEBUG_MARKER_COLOR);
        }
    }

    /// Close the innermost debug group. No-op without debug label support.
    pub fn pop_debug_group(&mut self) {
        if let Some(encoder) = self.debug_encoder() {
            encoder.pop_debug_group();
        }
    }

    /// Insert a debug marker. No-op without debug label support.
    pub fn insert_debug_marker(&mut self, name: &str) {
        if let Some(encoder) = self.debug_encoder() {
            encoder.insert_debug_marker(name, DEBUG_MARKER_COLOR);
        }
    }

    /// Bind a compute pipeline.
    pub fn set_compute_pipeline(&mut self, pipeline: &Pipeline) {
        let Some(native) = pipeline.native() else {
            return;
        };
        if let Some(encoder) = self.encoder() {
            encoder.set_compute_pipeline(native);
        }
    }

    /// Dispatch compute workgroups.
    pub fn dispatch(&mut self, x: u32, y: u32, z: u32) {
        if let Some(encoder) = self.encoder() {
            encoder.dispatch(x, y, z);
        }
    }

    /// Write a GPU timestamp into slot `index` of a timestamp query heap.
    pub fn write_timestamp(
        &mut self,
        query_heap: &QueryHeap,
        index: u32,
    ) -> Result<(), GraphicsError> {
        let descriptor = query_heap.descriptor();
        if descriptor.query_type != QueryType::Timestamp {
            return Err(GraphicsError::invalid_argument(
                "query_heap",
                format!("expected a timestamp heap, got {:?}", descriptor.query_type),
            ));
        }
        if index >= descriptor.count {
            return Err(GraphicsError::invalid_argument(
                "index",
                format!("query {index} out of range for heap of {}", descriptor.count),
            ));
        }
        if let (Some(native), Some(encoder)) = (query_heap.native(), self.encoder()) {
            encoder.write_timestamp(native, index);
        }
        Ok(())
    }

    /// Close recording and submit to the queue.
    ///
    /// The encoder is stamped with the device's current frame, which may be
    /// later than the frame recording began in.
    pub fn commit(mut self) -> Result<(), GraphicsError> {
        let Some(encoder) = self.encoder.take() else {
            return Ok(());
        };
        let mut encoder = encoder.into_inner();
        if std::mem::take(&mut self.label_pushed) {
            encoder.pop_debug_group();
        }

        let backend = self.device.backend();
        let pool = self.device.command_pool(self.queue);
        let result = encoder
            .end()
            .and_then(|()| backend.submit(self.queue, encoder.as_mut()));

        match result {
            Ok(()) => {
                let frame = self.device.frame_count();
                log::trace!(
                    "CommandBuffer: committed {} in slot {} at frame {frame}",
                    self.queue,
                    self.frame_slot
                );
                pool.submitted(self.frame_slot, frame, encoder);
                Ok(())
            }
            Err(source) => {
                pool.discard(self.frame_slot, encoder);
                Err(backend_failure(backend.as_ref(), source))
            }
        }
    }
}

impl GraphicsObject for CommandBuffer {
    fn base(&self) -> &GraphicsObjectBase {
        &self.base
    }
}

impl Drop for CommandBuffer {
    fn drop(&mut self) {
        let Some(encoder) = self.encoder.take() else {
            return;
        };
        let mut encoder = encoder.into_inner();
        if self.label_pushed {
            encoder.pop_debug_group();
        }
        if let Err(e) = encoder.end() {
            log::warn!("CommandBuffer: failed to close discarded {} encoder: {e}", self.queue);
        }
        log::debug!(
            "CommandBuffer: discarded uncommitted {} command buffer in slot {}",
            self.queue,
            self.frame_slot
        );
        self.device
            .command_pool(self.queue)
            .discard(self.frame_slot, encoder);
    }
}

impl fmt::Debug for CommandBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandBuffer")
            .field("id", &self.base.id())
            .field("label", &self.base.label())
            .field("queue", &self.queue)
            .field("frame_slot", &self.frame_slot)
            .field("recording", &self.encoder.is_some())
            .finish()
    }
}

// Ensure CommandBuffer is Send + Sync
static_assertions::assert_impl_all!(CommandBuffer: Send, Sync);
