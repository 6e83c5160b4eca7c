//! Bind group layout compilation.
//!
//! Native descriptor-table APIs want bindings grouped into contiguous ranges of
//! one resource kind. [`build_descriptor_table`] walks a register-sorted entry
//! list once and emits the minimal set of ranges, keeping samplers in their own
//! list since native heaps segregate them.

use bitflags::bitflags;

use crate::types::{BindGroupLayoutEntry, DescriptorType};

/// Kind of descriptor range as seen by a native descriptor table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorRangeType {
    /// Constant buffer views.
    ConstantBuffer,
    /// Read-only shader resource views.
    ShaderResource,
    /// Read-write unordered access views.
    UnorderedAccess,
    /// Samplers.
    Sampler,
}

impl DescriptorRangeType {
    /// Usage flags every range of this kind carries.
    pub fn default_flags(self) -> DescriptorRangeFlags {
        match self {
            Self::ConstantBuffer => DescriptorRangeFlags::DATA_STATIC_WHILE_SET_AT_EXECUTE,
            Self::ShaderResource | Self::UnorderedAccess => {
                DescriptorRangeFlags::DESCRIPTORS_VOLATILE | DescriptorRangeFlags::DATA_VOLATILE
            }
            Self::Sampler => DescriptorRangeFlags::empty(),
        }
    }

    /// Returns true if ranges of this kind live in the sampler list.
    pub fn is_sampler(self) -> bool {
        self == Self::Sampler
    }
}

impl From<DescriptorType> for DescriptorRangeType {
    fn from(ty: DescriptorType) -> Self {
        match ty {
            DescriptorType::ConstantBuffer => Self::ConstantBuffer,
            DescriptorType::StructuredBuffer
            | DescriptorType::TypedBuffer
            | DescriptorType::Texture => Self::ShaderResource,
            DescriptorType::StorageBuffer
            | DescriptorType::TypedBufferUav
            | DescriptorType::StorageTexture => Self::UnorderedAccess,
            DescriptorType::Sampler => Self::Sampler,
        }
    }
}

bitflags! {
    /// Volatility hints attached to a descriptor range.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DescriptorRangeFlags: u32 {
        /// Descriptors may change after the table is bound.
        const DESCRIPTORS_VOLATILE = 1 << 0;
        /// Referenced data may change at any time.
        const DATA_VOLATILE = 1 << 1;
        /// Referenced data is static while the table is set during execution.
        const DATA_STATIC_WHILE_SET_AT_EXECUTE = 1 << 2;
        /// Referenced data never changes.
        const DATA_STATIC = 1 << 3;
    }
}

/// A contiguous run of same-kind descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DescriptorRange {
    /// Range kind.
    pub range_type: DescriptorRangeType,
    /// First shader register covered by the range.
    pub base_register: u32,
    /// Register space (the bind group slot).
    pub register_space: u32,
    /// Number of descriptors.
    pub count: u32,
    /// Usage flags, derived from `range_type`.
    pub flags: DescriptorRangeFlags,
}

impl DescriptorRange {
    fn single(range_type: DescriptorRangeType, base_register: u32, register_space: u32) -> Self {
        Self {
            range_type,
            base_register,
            register_space,
            count: 1,
            flags: range_type.default_flags(),
        }
    }

    /// One past the last register, widened so it cannot overflow.
    pub fn end_register(&self) -> u64 {
        u64::from(self.base_register) + u64::from(self.count)
    }

    /// Returns true if `register` falls inside the range.
    pub fn contains(&self, register: u32) -> bool {
        register >= self.base_register && u64::from(register) < self.end_register()
    }
}

/// Cross-kind compatibility classes a backend allows inside one range.
///
/// Identical descriptor types are always compatible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DescriptorAliasing {
    /// Only identical descriptor types share a range.
    #[default]
    Strict,
    /// Typed-buffer and texture views alias: read-only typed buffers with
    /// sampled textures, read-write typed buffers with storage textures.
    ViewClasses,
}

impl DescriptorAliasing {
    /// Returns true if `a` and `b` may share one descriptor range.
    pub fn are_compatible(self, a: DescriptorType, b: DescriptorType) -> bool {
        if a == b {
            return true;
        }
        match self {
            Self::Strict => false,
            Self::ViewClasses => matches!(
                (a, b),
                (DescriptorType::TypedBuffer, DescriptorType::Texture)
                    | (DescriptorType::Texture, DescriptorType::TypedBuffer)
                    | (DescriptorType::TypedBufferUav, DescriptorType::StorageTexture)
                    | (DescriptorType::StorageTexture, DescriptorType::TypedBufferUav)
            ),
        }
    }
}

/// Compiled descriptor table: resource ranges and sampler ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DescriptorTableLayout {
    /// Constant buffer, shader resource and unordered access ranges.
    pub resource_ranges: Vec<DescriptorRange>,
    /// Sampler ranges.
    pub sampler_ranges: Vec<DescriptorRange>,
}

impl DescriptorTableLayout {
    /// Total descriptors in the resource table.
    pub fn resource_descriptor_count(&self) -> u32 {
        self.resource_ranges.iter().map(|r| r.count).sum()
    }

    /// Total descriptors in the sampler table.
    pub fn sampler_descriptor_count(&self) -> u32 {
        self.sampler_ranges.iter().map(|r| r.count).sum()
    }

    /// Total descriptors across both tables.
    pub fn descriptor_count(&self) -> u32 {
        self.resource_descriptor_count() + self.sampler_descriptor_count()
    }

    /// Returns true if neither table has ranges.
    pub fn is_empty(&self) -> bool {
        self.resource_ranges.is_empty() && self.sampler_ranges.is_empty()
    }

    fn list_for(&mut self, range_type: DescriptorRangeType) -> &mut Vec<DescriptorRange> {
        if range_type.is_sampler() {
            &mut self.sampler_ranges
        } else {
            &mut self.resource_ranges
        }
    }
}

/// Compile register-sorted layout entries into descriptor ranges.
///
/// An entry extends the current range when its type is compatible with the
/// previous entry's type under `aliasing` and its register directly follows.
/// Otherwise it starts a new range, which first tries to fuse with the last
/// range of the same list when that range has the same kind and ends right at
/// the new register. Only the last range is considered for fusion.
///
/// Unsorted input is not detected; it produces valid but non-minimal ranges.
pub fn build_descriptor_table(
    entries: &[BindGroupLayoutEntry],
    register_space: u32,
    aliasing: DescriptorAliasing,
) -> DescriptorTableLayout {
    let mut layout = DescriptorTableLayout::default();
    let mut current: Option<(DescriptorType, u32)> = None;

    for entry in entries {
        let range_type = DescriptorRangeType::from(entry.descriptor_type);

        let extends = current.is_some_and(|(ty, binding)| {
            aliasing.are_compatible(entry.descriptor_type, ty)
                && binding.checked_add(1) == Some(entry.binding)
        });

        let list = layout.list_for(range_type);
        match list.last_mut() {
            Some(last) if extends => last.count += 1,
            Some(last)
                if last.range_type == range_type
                    && last.end_register() == u64::from(entry.binding) =>
            {
                last.count += 1;
            }
            _ => list.push(DescriptorRange::single(range_type, entry.binding, register_space)),
        }

        current = Some((entry.descriptor_type, entry.binding));
    }

    layout
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ShaderStages;

    fn entry(ty: DescriptorType, binding: u32) -> BindGroupLayoutEntry {
        BindGroupLayoutEntry::new(ty, binding)
    }

    fn build(entries: &[BindGroupLayoutEntry]) -> DescriptorTableLayout {
        build_descriptor_table(entries, 0, DescriptorAliasing::Strict)
    }

    #[test]
    fn test_consecutive_constant_buffers_merge() {
        let entries: Vec<_> = (0..4)
            .map(|b| entry(DescriptorType::ConstantBuffer, b).with_visibility(ShaderStages::VERTEX))
            .collect();
        let layout = build(&entries);

        assert_eq!(layout.resource_ranges.len(), 1);
        let range = layout.resource_ranges[0];
        assert_eq!(range.range_type, DescriptorRangeType::ConstantBuffer);
        assert_eq!(range.base_register, 0);
        assert_eq!(range.count, 4);
        assert!(layout.sampler_ranges.is_empty());
    }

    #[test]
    fn test_gap_splits_range() {
        let layout = build(&[
            entry(DescriptorType::ConstantBuffer, 0),
            entry(DescriptorType::ConstantBuffer, 1),
            entry(DescriptorType::ConstantBuffer, 3),
        ]);

        assert_eq!(layout.resource_ranges.len(), 2);
        assert_eq!(
            (layout.resource_ranges[0].base_register, layout.resource_ranges[0].count),
            (0, 2)
        );
        assert_eq!(
            (layout.resource_ranges[1].base_register, layout.resource_ranges[1].count),
            (3, 1)
        );
    }

    #[test]
    fn test_empty_entries() {
        let layout = build(&[]);
        assert!(layout.is_empty());
        assert_eq!(layout.descriptor_count(), 0);
    }

    #[test]
    fn test_samplers_extend_their_own_list() {
        let layout = build(&[
            entry(DescriptorType::ConstantBuffer, 0),
            entry(DescriptorType::Sampler, 1),
            entry(DescriptorType::Sampler, 2),
            entry(DescriptorType::Sampler, 3),
        ]);

        assert_eq!(layout.resource_ranges.len(), 1);
        assert_eq!(layout.resource_ranges[0].count, 1);
        assert_eq!(layout.sampler_ranges.len(), 1);
        assert_eq!(layout.sampler_ranges[0].base_register, 1);
        assert_eq!(layout.sampler_ranges[0].count, 3);
    }

    #[test]
    fn test_samplers_never_merge_with_resources() {
        let layout = build(&[
            entry(DescriptorType::Texture, 0),
            entry(DescriptorType::Sampler, 1),
            entry(DescriptorType::Texture, 2),
        ]);

        assert_eq!(layout.sampler_ranges.len(), 1);
        assert_eq!(layout.resource_ranges.len(), 2);
        assert!(layout.resource_ranges.iter().all(|r| !r.range_type.is_sampler()));
        assert!(layout.sampler_ranges.iter().all(|r| r.range_type.is_sampler()));
    }

    #[test]
    fn test_interleaved_sampler_fuses_resource_run() {
        // The sampler at register 0 breaks adjacency; fusion recovers the
        // constant buffer run 0..2.
        let layout = build(&[
            entry(DescriptorType::ConstantBuffer, 0),
            entry(DescriptorType::Sampler, 0),
            entry(DescriptorType::ConstantBuffer, 1),
        ]);

        assert_eq!(layout.resource_ranges.len(), 1);
        assert_eq!(layout.resource_ranges[0].count, 2);
        assert_eq!(layout.sampler_ranges.len(), 1);
    }

    #[test]
    fn test_fusion_only_looks_at_last_range() {
        let layout = build(&[
            entry(DescriptorType::ConstantBuffer, 0),
            entry(DescriptorType::Texture, 0),
            entry(DescriptorType::ConstantBuffer, 1),
        ]);

        let types: Vec<_> = layout.resource_ranges.iter().map(|r| r.range_type).collect();
        assert_eq!(
            types,
            [
                DescriptorRangeType::ConstantBuffer,
                DescriptorRangeType::ShaderResource,
                DescriptorRangeType::ConstantBuffer,
            ]
        );
    }

    #[test]
    fn test_fused_range_keeps_extending() {
        let layout = build(&[
            entry(DescriptorType::StorageBuffer, 0),
            entry(DescriptorType::Sampler, 0),
            entry(DescriptorType::StorageBuffer, 1),
            entry(DescriptorType::StorageBuffer, 2),
        ]);

        assert_eq!(layout.resource_ranges.len(), 1);
        assert_eq!(layout.resource_ranges[0].count, 3);
    }

    #[test]
    fn test_aliasing_classes() {
        let entries = [
            entry(DescriptorType::TypedBuffer, 0),
            entry(DescriptorType::Texture, 1),
        ];

        // Both map to shader resource ranges, so fusion merges them either way.
        assert_eq!(build(&entries).resource_ranges.len(), 1);
        assert_eq!(
            build_descriptor_table(&entries, 0, DescriptorAliasing::ViewClasses)
                .resource_ranges
                .len(),
            1
        );

        assert!(DescriptorAliasing::ViewClasses
            .are_compatible(DescriptorType::StorageTexture, DescriptorType::TypedBufferUav));
        assert!(!DescriptorAliasing::Strict
            .are_compatible(DescriptorType::StorageTexture, DescriptorType::TypedBufferUav));
        assert!(!DescriptorAliasing::ViewClasses
            .are_compatible(DescriptorType::Texture, DescriptorType::ConstantBuffer));
    }

    #[test]
    fn test_flags_follow_range_type() {
        let layout = build_descriptor_table(
            &[
                entry(DescriptorType::ConstantBuffer, 0),
                entry(DescriptorType::Texture, 1),
                entry(DescriptorType::StorageTexture, 2),
                entry(DescriptorType::Sampler, 3),
            ],
            2,
            DescriptorAliasing::Strict,
        );

        let flags: Vec<_> = layout.resource_ranges.iter().map(|r| r.flags).collect();
        assert_eq!(
            flags,
            [
                DescriptorRangeFlags::DATA_STATIC_WHILE_SET_AT_EXECUTE,
                DescriptorRangeFlags::DESCRIPTORS_VOLATILE | DescriptorRangeFlags::DATA_VOLATILE,
                DescriptorRangeFlags::DESCRIPTORS_VOLATILE | DescriptorRangeFlags::DATA_VOLATILE,
            ]
        );
        assert_eq!(layout.sampler_ranges[0].flags, DescriptorRangeFlags::empty());
        assert!(layout
            .resource_ranges
            .iter()
            .chain(&layout.sampler_ranges)
            .all(|r| r.register_space == 2));
    }

    #[test]
    fn test_max_register_does_not_overflow() {
        let layout = build(&[
            entry(DescriptorType::ConstantBuffer, u32::MAX - 1),
            entry(DescriptorType::ConstantBuffer, u32::MAX),
        ]);
        assert_eq!(layout.resource_ranges.len(), 1);
        assert_eq!(layout.resource_ranges[0].count, 2);
        assert!(layout.resource_ranges[0].contains(u32::MAX));
    }

    #[test]
    fn test_ranges_cover_every_binding_once() {
        let kinds = [
            DescriptorType::ConstantBuffer,
            DescriptorType::Texture,
            DescriptorType::StorageBuffer,
            DescriptorType::Sampler,
        ];

        // Deterministic pseudo-random layouts, registers strictly ascending.
        let mut seed = 0x2545_f491_u32;
        for _ in 0..200 {
            let mut entries = Vec::new();
            let mut binding = 0u32;
            for _ in 0..(seed % 12) {
                seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                binding += (seed >> 16) % 3;
                let ty = kinds[((seed >> 8) % kinds.len() as u32) as usize];
                entries.push(entry(ty, binding));
                binding += 1;
            }
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);

            let layout = build(&entries);
            assert_eq!(layout.descriptor_count() as usize, entries.len());

            for list in [&layout.resource_ranges, &layout.sampler_ranges] {
                for (i, a) in list.iter().enumerate() {
                    for b in &list[i + 1..] {
                        assert!(a.end_register() <= u64::from(b.base_register));
                    }
                }
            }

            for e in &entries {
                let covering = layout
                    .resource_ranges
                    .iter()
                    .chain(&layout.sampler_ranges)
                    .filter(|r| {
                        r.contains(e.binding)
                            && r.range_type == DescriptorRangeType::from(e.descriptor_type)
                    })
                    .count();
                assert_eq!(covering, 1, "binding {} in {:?}", e.binding, entries);
            }
        }
    }
}
