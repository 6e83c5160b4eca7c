//! Deferred destruction of native GPU objects.
//!
//! GPU commands are executed asynchronously: when work is submitted, the CPU
//! continues while the GPU processes commands up to [`MAX_FRAMES_IN_FLIGHT`]
//! frames behind. A native object therefore can't be destroyed when its last
//! Rust owner goes away, as a frame still in flight may reference it.
//!
//! The [`DeferredDestructor`] holds such objects, stamped with the frame
//! counter at enqueue time, until enough frames have elapsed.
//!
//! ```text
//! queue(object)         drain(current)
//!     │                      │
//!     ▼                      ▼
//! ┌───────┬───────┬───────┬───────┐
//! │ f = 7 │ f = 7 │ f = 8 │ f = 9 │   stamps never decrease
//! └───────┴───────┴───────┴───────┘
//!   front                   back
//!
//! drain pops from the front while current - f >= MAX_FRAMES_IN_FLIGHT and
//! stops at the first entry that is too young.
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::MAX_FRAMES_IN_FLIGHT;
use crate::backend::NativeObject;

/// A native object pending destruction.
struct PendingDestruction {
    object: Box<dyn NativeObject>,
    frame: u64,
}

/// Multi-producer, single-consumer queue of native objects awaiting destruction.
///
/// Any thread may [`queue`](Self::queue) objects. The frame-pacing thread
/// calls [`drain`](Self::drain). Native destruction never runs under the
/// queue lock, so producers only wait for a push or a pop.
pub struct DeferredDestructor {
    pending: Mutex<VecDeque<PendingDestruction>>,
    shutting_down: AtomicBool,
}

impl DeferredDestructor {
    /// Create an empty deferred destructor.
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            shutting_down: AtomicBool::new(false),
        }
    }

    /// Queue a native object for destruction.
    ///
    /// The object is stamped with the value of `frame_counter` read under the
    /// queue lock. Once shutdown has begun the object is destroyed right away.
    pub fn queue(&self, object: Box<dyn NativeObject>, frame_counter: &AtomicU64) {
        let immediate = {
            let mut pending = self.pending.lock();
            if self.shutting_down.load(Ordering::Acquire) {
                Some(object)
            } else {
                let frame = frame_counter.load(Ordering::Acquire);
                pending.push_back(PendingDestruction { object, frame });
                None
            }
        };

        if let Some(object) = immediate {
            log::trace!("DeferredDestructor: destroying {} immediately", object.kind());
            object.destroy();
        }
    }

    /// Destroy every object enqueued at least [`MAX_FRAMES_IN_FLIGHT`] frames
    /// before `current_frame`.
    ///
    /// Returns the number of objects destroyed.
    pub fn drain(&self, current_frame: u64) -> usize {
        let eligible = {
            let mut pending = self.pending.lock();
            let mut eligible = Vec::new();
            while let Some(entry) = pending.front() {
                if current_frame.saturating_sub(entry.frame) < MAX_FRAMES_IN_FLIGHT as u64 {
                    break;
                }
                if let Some(entry) = pending.pop_front() {
                    eligible.push(entry.object);
                }
            }
            eligible
        };

        let count = eligible.len();
        for object in eligible {
            object.destroy();
        }
        if count > 0 {
            log::debug!("DeferredDestructor: destroyed {count} objects at frame {current_frame}");
        }
        count
    }

    /// Switch to immediate destruction. Returns false if already shutting down.
    pub fn begin_shutdown(&self) -> bool {
        !self.shutting_down.swap(true, Ordering::AcqRel)
    }

    /// Returns true once [`begin_shutdown`](Self::begin_shutdown) has been called.
    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::Acquire)
    }

    /// Destroy every pending object regardless of its age.
    ///
    /// Only sound once the GPU is idle.
    pub fn flush_all(&self) -> usize {
        let all: Vec<_> = self.pending.lock().drain(..).collect();
        let count = all.len();
        for entry in all {
            entry.object.destroy();
        }
        if count > 0 {
            log::debug!("DeferredDestructor: flushed {count} objects");
        }
        count
    }

    /// Number of objects waiting for destruction.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }
}

impl Default for DeferredDestructor {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DeferredDestructor {
    fn drop(&mut self) {
        for entry in self.pending.get_mut().drain(..) {
            entry.object.destroy();
        }
    }
}

impl fmt::Debug for DeferredDestructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredDestructor")
            .field("pending_count", &self.pending_count())
            .field("shutting_down", &self.is_shutting_down())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectKind;
    use std::any::Any;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    #[derive(Debug)]
    struct Tracked {
        destroyed: Arc<AtomicUsize>,
    }

    impl NativeObject for Tracked {
        fn kind(&self) -> ObjectKind {
            ObjectKind::Buffer
        }

        fn set_label(&self, _label: &str) {}

        fn destroy(self: Box<Self>) {
            self.destroyed.fetch_add(1, Ordering::SeqCst);
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn tracked(destroyed: &Arc<AtomicUsize>) -> Box<dyn NativeObject> {
        Box::new(Tracked {
            destroyed: destroyed.clone(),
        })
    }

    #[test]
    fn test_object_waits_for_frames_in_flight() {
        let destructor = DeferredDestructor::new();
        let frame = AtomicU64::new(10);
        let destroyed = Arc::new(AtomicUsize::new(0));

        destructor.queue(tracked(&destroyed), &frame);
        for _ in 0..MAX_FRAMES_IN_FLIGHT {
            assert_eq!(destructor.drain(frame.load(Ordering::SeqCst)), 0);
            frame.fetch_add(1, Ordering::SeqCst);
        }
        assert_eq!(destroyed.load(Ordering::SeqCst), 0);

        assert_eq!(destructor.drain(frame.load(Ordering::SeqCst)), 1);
        assert_eq!(destructor.drain(frame.load(Ordering::SeqCst) + 10), 0);
        assert_eq!(destroyed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drain_stops_at_first_young_entry() {
        let destructor = DeferredDestructor::new();
        let frame = AtomicU64::new(0);
        let destroyed = Arc::new(AtomicUsize::new(0));

        destructor.queue(tracked(&destroyed), &frame);
        destructor.queue(tracked(&destroyed), &frame);
        frame.store(1, Ordering::SeqCst);
        destructor.queue(tracked(&destroyed), &frame);

        assert_eq!(destructor.drain(MAX_FRAMES_IN_FLIGHT as u64), 2);
        assert_eq!(destructor.pending_count(), 1);
        assert_eq!(destructor.drain(MAX_FRAMES_IN_FLIGHT as u64 + 1), 1);
        assert_eq!(destroyed.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_shutdown_destroys_immediately() {
        let destructor = DeferredDestructor::new();
        let frame = AtomicU64::new(0);
        let destroyed = Arc::new(AtomicUsize::new(0));

        destructor.queue(tracked(&destroyed), &frame);
        assert!(destructor.begin_shutdown());
        assert!(!destructor.begin_shutdown());
        assert_eq!(destructor.flush_all(), 1);

        destructor.queue(tracked(&destroyed), &frame);
        assert_eq!(destructor.pending_count(), 0);
        assert_eq!(destroyed.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_drop_destroys_pending() {
        let destroyed = Arc::new(AtomicUsize::new(0));
        {
            let destructor = DeferredDestructor::new();
            destructor.queue(tracked(&destroyed), &AtomicU64::new(0));
        }
        assert_eq!(destroyed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_producers() {
        const THREADS: usize = 4;
        const PER_THREAD: usize = 250;

        let destructor = Arc::new(DeferredDestructor::new());
        let frame = Arc::new(AtomicU64::new(0));
        let destroyed = Arc::new(AtomicUsize::new(0));

        let producers: Vec<_> = (0..THREADS)
            .map(|_| {
                let destructor = destructor.clone();
                let frame = frame.clone();
                let destroyed = destroyed.clone();
                std::thread::spawn(move || {
                    for _ in 0..PER_THREAD {
                        destructor.queue(tracked(&destroyed), &frame);
                    }
                })
            })
            .collect();

        let mut drained = 0;
        for _ in 0..100 {
            let current = frame.fetch_add(1, Ordering::SeqCst) + 1;
            drained += destructor.drain(current);
        }
        for producer in producers {
            producer.join().unwrap();
        }

        drained += destructor.flush_all();
        assert_eq!(drained, THREADS * PER_THREAD);
        assert_eq!(destroyed.load(Ordering::SeqCst), THREADS * PER_THREAD);
    }
}
