//! Bind group layout resource.

use std::sync::Weak;

use crate::backend::NativeObject;
use crate::descriptor_table::{DescriptorRange, DescriptorTableLayout};
use crate::device::GraphicsDevice;
use crate::object::{
    GraphicsObject, GraphicsObjectBase, NativeHolder, ObjectKind, apply_label, resource_parts,
};
use crate::types::BindGroupLayoutDescription;

/// A bind group layout together with its compiled descriptor ranges.
///
/// Created by [`GraphicsDevice::create_bind_group_layout`].
pub struct BindGroupLayout {
    base: GraphicsObjectBase,
    native: NativeHolder,
    description: BindGroupLayoutDescription,
    table: DescriptorTableLayout,
}

impl BindGroupLayout {
    pub(crate) fn new(
        device: Weak<GraphicsDevice>,
        description: BindGroupLayoutDescription,
        table: DescriptorTableLayout,
        native: Box<dyn NativeObject>,
    ) -> Self {
        let (base, native) = resource_parts(
            ObjectKind::BindGroupLayout,
            device,
            description.label.as_deref(),
            native,
        );
        Self {
            base,
            native,
            description,
            table,
        }
    }

    /// The description the layout was built from.
    pub fn description(&self) -> &BindGroupLayoutDescription {
        &self.description
    }

    /// Compiled descriptor table.
    pub fn descriptor_table(&self) -> &DescriptorTableLayout {
        &self.table
    }

    /// Constant buffer, shader resource and unordered access ranges.
    pub fn resource_ranges(&self) -> &[DescriptorRange] {
        &self.table.resource_ranges
    }

    /// Sampler ranges.
    pub fn sampler_ranges(&self) -> &[DescriptorRange] {
        &self.table.sampler_ranges
    }

    /// Change the debug label.
    pub fn set_label(&self, label: Option<&str>) {
        apply_label(&self.base, &self.native, label);
    }
}

impl GraphicsObject for BindGroupLayout {
    fn base(&self) -> &GraphicsObjectBase {
        &self.base
    }
}

impl Drop for BindGroupLayout {
    fn drop(&mut self) {
        self.native.release(self.base.weak_device());
    }
}

impl std::fmt::Debug for BindGroupLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindGroupLayout")
            .field("entries", &self.description.entries.len())
            .field("resource_ranges", &self.table.resource_ranges.len())
            .field("sampler_ranges", &self.table.sampler_ranges.len())
            .field("label", &self.base.label())
            .finish()
    }
}

// Ensure BindGroupLayout is Send + Sync
static_assertions::assert_impl_all!(BindGroupLayout: Send, Sync);
