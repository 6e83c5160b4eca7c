//! Sampler types and descriptors.

/// Texture coordinate addressing outside the [0, 1] range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AddressMode {
    /// Tile the texture.
    #[default]
    Repeat,
    /// Tile the texture, mirroring every other tile.
    MirrorRepeat,
    /// Clamp to the edge texel.
    ClampToEdge,
    /// Return the border color.
    ClampToBorder,
    /// Mirror once around zero, then clamp.
    MirrorClampToEdge,
}

/// Texel filtering for magnification and minification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterMode {
    /// Nearest texel.
    #[default]
    Nearest,
    /// Linear interpolation between texels.
    Linear,
}

/// Filtering between mip levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MipFilterMode {
    /// Nearest mip level.
    #[default]
    Nearest,
    /// Linear interpolation between mip levels.
    Linear,
}

/// How filtered texels are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReductionType {
    /// Weighted average.
    #[default]
    Standard,
    /// Weighted average followed by a depth comparison.
    Comparison,
    /// Component-wise minimum.
    Minimum,
    /// Component-wise maximum.
    Maximum,
}

/// Comparison function for depth sampling and depth/stencil tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompareFunction {
    /// Never passes.
    #[default]
    Never,
    /// Passes if new < existing.
    Less,
    /// Passes if new == existing.
    Equal,
    /// Passes if new <= existing.
    LessEqual,
    /// Passes if new > existing.
    Greater,
    /// Passes if new != existing.
    NotEqual,
    /// Passes if new >= existing.
    GreaterEqual,
    /// Always passes.
    Always,
}

/// Descriptor for creating a sampler.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerDescriptor {
    /// Debug label for the sampler.
    pub label: Option<String>,
    /// Minification filter.
    pub min_filter: FilterMode,
    /// Magnification filter.
    pub mag_filter: FilterMode,
    /// Mipmap filter.
    pub mip_filter: MipFilterMode,
    /// Address mode for U coordinate.
    pub address_mode_u: AddressMode,
    /// Address mode for V coordinate.
    pub address_mode_v: AddressMode,
    /// Address mode for W coordinate.
    pub address_mode_w: AddressMode,
    /// Filter result reduction.
    pub reduction_type: ReductionType,
    /// Comparison function, used when `reduction_type` is `Comparison`.
    pub compare: CompareFunction,
    /// Minimum LOD clamp.
    pub lod_min_clamp: f32,
    /// Maximum LOD clamp.
    pub lod_max_clamp: f32,
    /// Maximum anisotropy level, 1 through [`SamplerDescriptor::MAX_ANISOTROPY`].
    pub max_anisotropy: u16,
}

impl SamplerDescriptor {
    /// Highest anisotropy level accepted by the device.
    pub const MAX_ANISOTROPY: u16 = 16;

    /// Create a new sampler descriptor with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a linear filtering sampler.
    pub fn linear() -> Self {
        Self {
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
            mip_filter: MipFilterMode::Linear,
            ..Default::default()
        }
    }

    /// Create a nearest neighbor filtering sampler.
    pub fn nearest() -> Self {
        Self::default()
    }

    /// Create a depth comparison sampler.
    pub fn comparison(compare: CompareFunction) -> Self {
        Self {
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
            address_mode_u: AddressMode::ClampToEdge,
            address_mode_v: AddressMode::ClampToEdge,
            address_mode_w: AddressMode::ClampToEdge,
            reduction_type: ReductionType::Comparison,
            compare,
            ..Default::default()
        }
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set address mode for all coordinates.
    pub fn with_address_mode(mut self, mode: AddressMode) -> Self {
        self.address_mode_u = mode;
        self.address_mode_v = mode;
        self.address_mode_w = mode;
        self
    }

    /// Set the LOD clamp range.
    pub fn with_lod_clamp(mut self, min: f32, max: f32) -> Self {
        self.lod_min_clamp = min;
        self.lod_max_clamp = max;
        self
    }

    /// Set anisotropic filtering level.
    pub fn with_anisotropy(mut self, level: u16) -> Self {
        self.max_anisotropy = level;
        self
    }

    /// Returns true if anisotropic filtering is requested.
    pub fn is_anisotropic(&self) -> bool {
        self.max_anisotropy > 1
    }
}

impl Default for SamplerDescriptor {
    fn default() -> Self {
        Self {
            label: None,
            min_filter: FilterMode::Nearest,
            mag_filter: FilterMode::Nearest,
            mip_filter: MipFilterMode::Nearest,
            address_mode_u: AddressMode::Repeat,
            address_mode_v: AddressMode::Repeat,
            address_mode_w: AddressMode::Repeat,
            reduction_type: ReductionType::Standard,
            compare: CompareFunction::Never,
            lod_min_clamp: 0.0,
            lod_max_clamp: f32::MAX,
            max_anisotropy: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sampler_defaults() {
        let desc = SamplerDescriptor::default();
        assert_eq!(desc.min_filter, FilterMode::Nearest);
        assert_eq!(desc.address_mode_w, AddressMode::Repeat);
        assert_eq!(desc.compare, CompareFunction::Never);
        assert_eq!(desc.lod_max_clamp, f32::MAX);
        assert!(!desc.is_anisotropic());
    }

    #[test]
    fn test_comparison_sampler() {
        let desc = SamplerDescriptor::comparison(CompareFunction::LessEqual).with_label("shadow");
        assert_eq!(desc.reduction_type, ReductionType::Comparison);
        assert_eq!(desc.address_mode_u, AddressMode::ClampToEdge);
        assert_eq!(desc.label.as_deref(), Some("shadow"));
    }
}
