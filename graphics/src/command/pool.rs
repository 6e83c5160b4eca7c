//! Per-queue command encoder pools.
//!
//! Each queue owns one [`CommandPool`] with [`MAX_FRAMES_IN_FLIGHT`] slots,
//! reused round-robin as the frame counter advances:
//!
//! ```text
//! frame:   0      1      2      3      4
//! slot:    0      1      0      1      0
//!          │             ▲
//!          └─ submitted ─┘ recycled on first begin in frame 2
//! ```
//!
//! A submitted encoder is stamped with the frame counter at submission and
//! returns to the idle list once [`MAX_FRAMES_IN_FLIGHT`] frames have passed
//! since that stamp. A buffer begun in one frame and committed in the next
//! therefore stays parked one frame longer than its slot would suggest.

use parking_lot::Mutex;

use super::{CommandBufferState, QueueType};
use crate::MAX_FRAMES_IN_FLIGHT;
use crate::backend::{BackendError, GpuBackend, NativeCommandEncoder};
use crate::error::GraphicsError;
use crate::object::ObjectKind;

#[derive(Debug, Default)]
struct PoolSlot {
    idle: Vec<Box<dyn NativeCommandEncoder>>,
    /// Encoders handed to the GPU, with the frame they were submitted in.
    submitted: Vec<(u64, Box<dyn NativeCommandEncoder>)>,
    recording: bool,
}

impl PoolSlot {
    /// Move encoders submitted at least [`MAX_FRAMES_IN_FLIGHT`] frames
    /// before `frame` back to the idle list.
    fn recycle(&mut self, frame: u64) -> usize {
        let mut recycled = 0;
        let mut index = 0;
        while index < self.submitted.len() {
            let submitted_in = self.submitted[index].0;
            if frame.saturating_sub(submitted_in) >= MAX_FRAMES_IN_FLIGHT as u64 {
                let (_, encoder) = self.submitted.swap_remove(index);
                self.idle.push(encoder);
                recycled += 1;
            } else {
                index += 1;
            }
        }
        recycled
    }

    fn state(&self) -> CommandBufferState {
        if self.recording {
            CommandBufferState::Recording
        } else if !self.submitted.is_empty() {
            CommandBufferState::Submitted
        } else {
            CommandBufferState::Idle
        }
    }
}

/// Command encoders of one queue, one slot per frame in flight.
#[derive(Debug)]
pub(crate) struct CommandPool {
    queue: QueueType,
    slots: [Mutex<PoolSlot>; MAX_FRAMES_IN_FLIGHT],
}

impl CommandPool {
    pub(crate) fn new(queue: QueueType) -> Self {
        Self {
            queue,
            slots: Default::default(),
        }
    }

    /// Take an encoder for `frame` and mark its slot as recording.
    ///
    /// The encoder is neither reset nor begun.
    pub(crate) fn acquire(
        &self,
        frame: u64,
        backend: &dyn GpuBackend,
    ) -> Result<(usize, Box<dyn NativeCommandEncoder>), GraphicsError> {
        let slot_index = frame_slot(frame);
        let mut slot = self.slots[slot_index].lock();

        if slot.recording {
            return Err(GraphicsError::CommandBufferBusy {
                queue: self.queue,
                slot: slot_index,
            });
        }

        let recycled = slot.recycle(frame);
        if recycled > 0 {
            log::trace!(
                "CommandPool: recycled {recycled} {} encoders in slot {slot_index}",
                self.queue
            );
        }

        let encoder = match slot.idle.pop() {
            Some(encoder) => encoder,
            None => backend
                .create_command_encoder(self.queue, slot_index)
                .map_err(|source| GraphicsError::BackendCreationFailure {
                    backend: backend.backend_type(),
                    object: ObjectKind::CommandBuffer,
                    source,
                })?,
        };

        slot.recording = true;
        Ok((slot_index, encoder))
    }

    /// Park an encoder submitted during `frame` until the GPU is done with it.
    pub(crate) fn submitted(
        &self,
        slot_index: usize,
        frame: u64,
        encoder: Box<dyn NativeCommandEncoder>,
    ) {
        let mut slot = self.slots[slot_index].lock();
        slot.submitted.push((frame, encoder));
        slot.recording = false;
    }

    /// Return an encoder whose recording was abandoned.
    pub(crate) fn discard(&self, slot_index: usize, encoder: Box<dyn NativeCommandEncoder>) {
        let mut slot = self.slots[slot_index].lock();
        slot.idle.push(encoder);
        slot.recording = false;
    }

    pub(crate) fn state(&self, slot_index: usize) -> CommandBufferState {
        self.slots
            .get(slot_index)
            .map_or(CommandBufferState::Idle, |slot| slot.lock().state())
    }
}

pub(crate) fn frame_slot(frame: u64) -> usize {
    (frame % MAX_FRAMES_IN_FLIGHT as u64) as usize
}

pub(crate) fn backend_failure(backend: &dyn GpuBackend, source: BackendError) -> GraphicsError {
    GraphicsError::BackendFailure {
        backend: backend.backend_type(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::NullBackend;

    #[test]
    fn test_slot_lifecycle() {
        let backend = NullBackend::new();
        let pool = CommandPool::new(QueueType::Compute);

        let (slot, encoder) = pool.acquire(0, &backend).unwrap();
        assert_eq!(slot, 0);
        assert_eq!(pool.state(0), CommandBufferState::Recording);

        pool.submitted(slot, 0, encoder);
        assert_eq!(pool.state(0), CommandBufferState::Submitted);

        // Same slot, next use after MAX_FRAMES_IN_FLIGHT frames.
        let (slot, encoder) = pool.acquire(MAX_FRAMES_IN_FLIGHT as u64, &backend).unwrap();
        assert_eq!(slot, 0);
        pool.discard(slot, encoder);
        assert_eq!(pool.state(0), CommandBufferState::Idle);
    }

    #[test]
    fn test_busy_slot_rejected() {
        let backend = NullBackend::new();
        let pool = CommandPool::new(QueueType::Graphics);

        let (slot, encoder) = pool.acquire(3, &backend).unwrap();
        let err = pool.acquire(3, &backend).unwrap_err();
        assert_eq!(
            err,
            GraphicsError::CommandBufferBusy {
                queue: QueueType::Graphics,
                slot,
            }
        );

        // A different slot is unaffected.
        let (other, second) = pool.acquire(4, &backend).unwrap();
        assert_ne!(other, slot);
        pool.discard(other, second);
        pool.discard(slot, encoder);
    }

    #[test]
    fn test_submitted_encoders_stay_until_next_frame() {
        let backend = NullBackend::new();
        let pool = CommandPool::new(QueueType::Copy);

        let (slot, first) = pool.acquire(1, &backend).unwrap();
        pool.submitted(slot, 1, first);
        let (slot, second) = pool.acquire(1, &backend).unwrap();
        pool.submitted(slot, 1, second);

        assert_eq!(pool.slots[slot].lock().submitted.len(), 2);
        let (slot, third) = pool.acquire(3, &backend).unwrap();
        assert_eq!(pool.slots[slot].lock().idle.len(), 1);
        pool.discard(slot, third);
        assert_eq!(pool.slots[slot].lock().idle.len(), 2);
    }

    #[test]
    fn test_late_submission_outlives_slot_reuse() {
        let backend = NullBackend::new();
        let pool = CommandPool::new(QueueType::Graphics);

        // Begun in frame 0, submitted in frame 1.
        let (slot, late) = pool.acquire(0, &backend).unwrap();
        pool.submitted(slot, 1, late);

        let (slot, fresh) = pool.acquire(2, &backend).unwrap();
        assert_eq!(slot, 0);
        assert_eq!(pool.slots[slot].lock().submitted.len(), 1);
        assert!(pool.slots[slot].lock().idle.is_empty());
        pool.discard(slot, fresh);
        assert_eq!(pool.state(0), CommandBufferState::Submitted);

        let (slot, reused) = pool.acquire(4, &backend).unwrap();
        assert!(pool.slots[slot].lock().submitted.is_empty());
        assert_eq!(pool.slots[slot].lock().idle.len(), 1);
        pool.discard(slot, reused);
        assert_eq!(pool.state(0), CommandBufferState::Idle);
    }
}
