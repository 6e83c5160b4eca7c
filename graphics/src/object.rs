//! Common identity shared by every GPU object.
//!
//! Every resource handed out by [`GraphicsDevice`] embeds a
//! [`GraphicsObjectBase`]: an optional debug label, a process-unique id and a
//! non-owning reference back to the device that created it. The native side of
//! the object lives in the backend and is released through the device's
//! deferred-destruction queue when the resource is dropped.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::backend::NativeObject;
use crate::device::GraphicsDevice;

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Kind of a GPU object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// The backend device itself.
    Device,
    /// Linear GPU memory.
    Buffer,
    /// Image with format, extent and mip chain.
    Texture,
    /// Texture filtering and addressing state.
    Sampler,
    /// Compiled shader pipeline.
    Pipeline,
    /// Descriptor ranges bound as one group.
    BindGroupLayout,
    /// Pool of GPU queries.
    QueryHeap,
    /// Presentable image chain for a surface.
    SwapChain,
    /// Recorded GPU commands for one queue.
    CommandBuffer,
}

impl ObjectKind {
    /// Lowercase name used in logs and error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::Device => "device",
            Self::Buffer => "buffer",
            Self::Texture => "texture",
            Self::Sampler => "sampler",
            Self::Pipeline => "pipeline",
            Self::BindGroupLayout => "bind group layout",
            Self::QueryHeap => "query heap",
            Self::SwapChain => "swap chain",
            Self::CommandBuffer => "command buffer",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Behaviour shared by every object created by a [`GraphicsDevice`].
pub trait GraphicsObject: Send + Sync {
    /// Shared identity of the object.
    fn base(&self) -> &GraphicsObjectBase;

    /// Kind of the object.
    fn kind(&self) -> ObjectKind {
        self.base().kind()
    }

    /// Process-unique object id.
    fn id(&self) -> u64 {
        self.base().id()
    }

    /// Current debug label, if any.
    fn label(&self) -> Option<String> {
        self.base().label()
    }

    /// The owning device, if it is still alive.
    fn device(&self) -> Option<Arc<GraphicsDevice>> {
        self.base().device()
    }
}

/// Identity embedded in every GPU object.
pub struct GraphicsObjectBase {
    id: u64,
    kind: ObjectKind,
    label: RwLock<Option<String>>,
    device: Weak<GraphicsDevice>,
}

impl GraphicsObjectBase {
    pub(crate) fn new(
        kind: ObjectKind,
        device: Weak<GraphicsDevice>,
        label: Option<String>,
    ) -> Self {
        Self {
            id: NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed),
            kind,
            label: RwLock::new(label),
            device,
        }
    }

    /// Process-unique id, assigned at creation.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Kind of the object.
    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// Current debug label.
    pub fn label(&self) -> Option<String> {
        self.label.read().clone()
    }

    /// Device that created the object, if it is still alive.
    pub fn device(&self) -> Option<Arc<GraphicsDevice>> {
        self.device.upgrade()
    }

    pub(crate) fn set_label(&self, label: Option<String>) {
        *self.label.write() = label;
    }

    pub(crate) fn weak_device(&self) -> &Weak<GraphicsDevice> {
        &self.device
    }
}

impl fmt::Debug for GraphicsObjectBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphicsObjectBase")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("label", &*self.label.read())
            .finish_non_exhaustive()
    }
}

/// Owns the native side of a resource and releases it on drop.
///
/// Dropping the holder while the device is alive hands the native object to
/// [`GraphicsDevice::queue_destroy`]; once the device is gone there is nothing
/// left that can reference it on the GPU and it is destroyed immediately.
pub(crate) struct NativeHolder {
    native: Option<Box<dyn NativeObject>>,
}

impl NativeHolder {
    pub(crate) fn new(native: Box<dyn NativeObject>) -> Self {
        Self {
            native: Some(native),
        }
    }

    pub(crate) fn get(&self) -> Option<&dyn NativeObject> {
        self.native.as_deref()
    }

    pub(crate) fn release(&mut self, device: &Weak<GraphicsDevice>) {
        let Some(native) = self.native.take() else {
            return;
        };
        match device.upgrade() {
            Some(device) => device.queue_destroy(native),
            None => native.destroy(),
        }
    }
}

impl fmt::Debug for NativeHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.native {
            Some(native) => fmt::Debug::fmt(native, f),
            None => f.write_str("<released>"),
        }
    }
}

/// Build the identity and native holder of a new resource.
///
/// The label, if any, is forwarded to the native object.
pub(crate) fn resource_parts(
    kind: ObjectKind,
    device: Weak<GraphicsDevice>,
    label: Option<&str>,
    native: Box<dyn NativeObject>,
) -> (GraphicsObjectBase, NativeHolder) {
    if let Some(label) = label {
        native.set_label(label);
    }
    (
        GraphicsObjectBase::new(kind, device, label.map(str::to_owned)),
        NativeHolder::new(native),
    )
}

/// Forward a label change to both the identity and the native object.
pub(crate) fn apply_label(base: &GraphicsObjectBase, native: &NativeHolder, label: Option<&str>) {
    base.set_label(label.map(str::to_owned));
    if let (Some(native), Some(label)) = (native.get(), label) {
        native.set_label(label);
    }
}
