//! Query heap resource.

use std::sync::Weak;

use crate::backend::NativeObject;
use crate::device::GraphicsDevice;
use crate::object::{
    GraphicsObject, GraphicsObjectBase, NativeHolder, ObjectKind, apply_label, resource_parts,
};
use crate::types::{QueryHeapDescriptor, QueryType};

/// Storage for GPU queries.
pub struct QueryHeap {
    base: GraphicsObjectBase,
    native: NativeHolder,
    descriptor: QueryHeapDescriptor,
}

impl QueryHeap {
    pub(crate) fn new(
        device: Weak<GraphicsDevice>,
        descriptor: QueryHeapDescriptor,
        native: Box<dyn NativeObject>,
    ) -> Self {
        let (base, native) = resource_parts(
            ObjectKind::QueryHeap,
            device,
            descriptor.label.as_deref(),
            native,
        );
        Self {
            base,
            native,
            descriptor,
        }
    }

    /// Get the query heap descriptor.
    pub fn descriptor(&self) -> &QueryHeapDescriptor {
        &self.descriptor
    }

    /// Kind of query stored in the heap.
    pub fn query_type(&self) -> QueryType {
        self.descriptor.query_type
    }

    /// Number of queries.
    pub fn count(&self) -> u32 {
        self.descriptor.count
    }

    /// Change the debug label.
    pub fn set_label(&self, label: Option<&str>) {
        apply_label(&self.base, &self.native, label);
    }

    pub(crate) fn native(&self) -> Option<&dyn NativeObject> {
        self.native.get()
    }
}

impl GraphicsObject for QueryHeap {
    fn base(&self) -> &GraphicsObjectBase {
        &self.base
    }
}

impl Drop for QueryHeap {
    fn drop(&mut self) {
        self.native.release(self.base.weak_device());
    }
}

impl std::fmt::Debug for QueryHeap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryHeap")
            .field("query_type", &self.descriptor.query_type)
            .field("count", &self.descriptor.count)
            .field("label", &self.base.label())
            .finish()
    }
}

// Ensure QueryHeap is Send + Sync
static_assertions::assert_impl_all!(QueryHeap: Send, Sync);
