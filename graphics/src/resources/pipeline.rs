//! Pipeline resource.

use std::sync::Weak;

use crate::backend::NativeObject;
use crate::device::GraphicsDevice;
use crate::object::{
    GraphicsObject, GraphicsObjectBase, NativeHolder, ObjectKind, apply_label, resource_parts,
};
use crate::types::ComputePipelineDescriptor;

/// Kind of work a pipeline runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineKind {
    /// Compute shader pipeline.
    Compute,
}

/// A compiled GPU pipeline.
///
/// Created by [`GraphicsDevice::create_compute_pipeline`] and bound with
/// [`CommandBuffer::set_compute_pipeline`](crate::CommandBuffer::set_compute_pipeline).
pub struct Pipeline {
    base: GraphicsObjectBase,
    native: NativeHolder,
    kind: PipelineKind,
    entry_point: String,
}

impl Pipeline {
    pub(crate) fn new_compute(
        device: Weak<GraphicsDevice>,
        descriptor: &ComputePipelineDescriptor,
        native: Box<dyn NativeObject>,
    ) -> Self {
        let (base, native) = resource_parts(
            ObjectKind::Pipeline,
            device,
            descriptor.label.as_deref(),
            native,
        );
        Self {
            base,
            native,
            kind: PipelineKind::Compute,
            entry_point: descriptor.compute_shader.entry_point.clone(),
        }
    }

    /// Kind of pipeline.
    pub fn pipeline_kind(&self) -> PipelineKind {
        self.kind
    }

    /// Shader entry point.
    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    /// Change the debug label.
    pub fn set_label(&self, label: Option<&str>) {
        apply_label(&self.base, &self.native, label);
    }

    pub(crate) fn native(&self) -> Option<&dyn NativeObject> {
        self.native.get()
    }
}

impl GraphicsObject for Pipeline {
    fn base(&self) -> &GraphicsObjectBase {
        &self.base
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        self.native.release(self.base.weak_device());
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("kind", &self.kind)
            .field("entry_point", &self.entry_point)
            .field("label", &self.base.label())
            .finish()
    }
}

// Ensure Pipeline is Send + Sync
static_assertions::assert_impl_all!(Pipeline: Send, Sync);
