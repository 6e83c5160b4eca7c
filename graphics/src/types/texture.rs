//! Texture types and descriptors.

use super::Extent3d;
use bitflags::bitflags;

/// Texture format enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum TextureFormat {
    // 8-bit formats
    /// 8-bit red channel, unsigned normalized.
    R8Unorm,
    /// 8-bit red channel, signed normalized.
    R8Snorm,
    /// 8-bit red channel, unsigned integer.
    R8Uint,
    /// 8-bit red channel, signed integer.
    R8Sint,

    // 16-bit formats
    /// 16-bit red channel, unsigned normalized.
    R16Unorm,
    /// 16-bit red channel, signed normalized.
    R16Snorm,
    /// 16-bit red channel, unsigned integer.
    R16Uint,
    /// 16-bit red channel, signed integer.
    R16Sint,
    /// 16-bit red channel, float.
    R16Float,
    /// 8-bit RG channels, unsigned normalized.
    Rg8Unorm,
    /// 8-bit RG channels, signed normalized.
    Rg8Snorm,
    /// 8-bit RG channels, unsigned integer.
    Rg8Uint,
    /// 8-bit RG channels, signed integer.
    Rg8Sint,

    // Packed 16-bit formats
    /// 4-bit BGRA channels, unsigned normalized.
    Bgra4Unorm,
    /// 5-6-5 BGR channels, unsigned normalized.
    B5G6R5Unorm,
    /// 5-5-5-1 BGRA channels, unsigned normalized.
    Bgr5A1Unorm,

    // 32-bit formats
    /// 32-bit red channel, unsigned integer.
    R32Uint,
    /// 32-bit red channel, signed integer.
    R32Sint,
    /// 32-bit red channel, float.
    R32Float,
    /// 16-bit RG channels, unsigned normalized.
    Rg16Unorm,
    /// 16-bit RG channels, signed normalized.
    Rg16Snorm,
    /// 16-bit RG channels, unsigned integer.
    Rg16Uint,
    /// 16-bit RG channels, signed integer.
    Rg16Sint,
    /// 16-bit RG channels, float.
    Rg16Float,
    /// 8-bit RGBA channels, unsigned normalized.
    #[default]
    Rgba8Unorm,
    /// 8-bit RGBA channels, sRGB.
    Rgba8UnormSrgb,
    /// 8-bit RGBA channels, signed normalized.
    Rgba8Snorm,
    /// 8-bit RGBA channels, unsigned integer.
    Rgba8Uint,
    /// 8-bit RGBA channels, signed integer.
    Rgba8Sint,
    /// 8-bit BGRA channels, unsigned normalized.
    Bgra8Unorm,
    /// 8-bit BGRA channels, sRGB.
    Bgra8UnormSrgb,

    // Packed 32-bit formats
    /// 10-10-10-2 RGBA channels, unsigned normalized.
    Rgb10A2Unorm,
    /// 10-10-10-2 RGBA channels, unsigned integer.
    Rgb10A2Uint,
    /// 11-11-10 RGB channels, unsigned float.
    Rg11B10Ufloat,
    /// Shared exponent RGB, unsigned float.
    Rgb9E5Ufloat,

    // 64-bit formats
    /// 32-bit RG channels, unsigned integer.
    Rg32Uint,
    /// 32-bit RG channels, signed integer.
    Rg32Sint,
    /// 32-bit RG channels, float.
    Rg32Float,
    /// 16-bit RGBA channels, unsigned normalized.
    Rgba16Unorm,
    /// 16-bit RGBA channels, signed normalized.
    Rgba16Snorm,
    /// 16-bit RGBA channels, unsigned integer.
    Rgba16Uint,
    /// 16-bit RGBA channels, signed integer.
    Rgba16Sint,
    /// 16-bit RGBA channels, float.
    Rgba16Float,

    // 128-bit formats
    /// 32-bit RGBA channels, unsigned integer.
    Rgba32Uint,
    /// 32-bit RGBA channels, signed integer.
    Rgba32Sint,
    /// 32-bit RGBA channels, float.
    Rgba32Float,

    // Depth/stencil formats
    /// 16-bit depth.
    Depth16Unorm,
    /// 24-bit depth with 8-bit stencil.
    Depth24UnormStencil8,
    /// 32-bit depth, float.
    Depth32Float,
    /// 32-bit depth float with 8-bit stencil.
    Depth32FloatStencil8,

    // BC compressed formats
    /// BC1 RGBA, unsigned normalized.
    Bc1RgbaUnorm,
    /// BC1 RGBA, sRGB.
    Bc1RgbaUnormSrgb,
    /// BC2 RGBA, unsigned normalized.
    Bc2RgbaUnorm,
    /// BC2 RGBA, sRGB.
    Bc2RgbaUnormSrgb,
    /// BC3 RGBA, unsigned normalized.
    Bc3RgbaUnorm,
    /// BC3 RGBA, sRGB.
    Bc3RgbaUnormSrgb,
    /// BC4 R, unsigned normalized.
    Bc4RUnorm,
    /// BC4 R, signed normalized.
    Bc4RSnorm,
    /// BC5 RG, unsigned normalized.
    Bc5RgUnorm,
    /// BC5 RG, signed normalized.
    Bc5RgSnorm,
    /// BC6H RGB, unsigned float.
    Bc6hRgbUfloat,
    /// BC6H RGB, signed float.
    Bc6hRgbFloat,
    /// BC7 RGBA, unsigned normalized.
    Bc7RgbaUnorm,
    /// BC7 RGBA, sRGB.
    Bc7RgbaUnormSrgb,
}

impl TextureFormat {
    /// Returns true if this is a depth or stencil format.
    pub fn is_depth_stencil(&self) -> bool {
        matches!(
            self,
            Self::Depth16Unorm
                | Self::Depth24UnormStencil8
                | Self::Depth32Float
                | Self::Depth32FloatStencil8
        )
    }

    /// Returns true if this format has a stencil component.
    pub fn has_stencil(&self) -> bool {
        matches!(self, Self::Depth24UnormStencil8 | Self::Depth32FloatStencil8)
    }

    /// Returns true if this format stores sRGB-encoded color.
    pub fn is_srgb(&self) -> bool {
        matches!(
            self,
            Self::Rgba8UnormSrgb
                | Self::Bgra8UnormSrgb
                | Self::Bc1RgbaUnormSrgb
                | Self::Bc2RgbaUnormSrgb
                | Self::Bc3RgbaUnormSrgb
                | Self::Bc7RgbaUnormSrgb
        )
    }

    /// Returns true if this is a block-compressed format.
    pub fn is_compressed(&self) -> bool {
        matches!(
            self,
            Self::Bc1RgbaUnorm
                | Self::Bc1RgbaUnormSrgb
                | Self::Bc2RgbaUnorm
                | Self::Bc2RgbaUnormSrgb
                | Self::Bc3RgbaUnorm
                | Self::Bc3RgbaUnormSrgb
                | Self::Bc4RUnorm
                | Self::Bc4RSnorm
                | Self::Bc5RgUnorm
                | Self::Bc5RgSnorm
                | Self::Bc6hRgbUfloat
                | Self::Bc6hRgbFloat
                | Self::Bc7RgbaUnorm
                | Self::Bc7RgbaUnormSrgb
        )
    }

    /// Returns the size in bytes per pixel, or per 4x4 block for compressed formats.
    pub fn block_size(&self) -> u32 {
        match self {
            Self::R8Unorm | Self::R8Snorm | Self::R8Uint | Self::R8Sint => 1,
            Self::R16Unorm
            | Self::R16Snorm
            | Self::R16Uint
            | Self::R16Sint
            | Self::R16Float
            | Self::Rg8Unorm
            | Self::Rg8Snorm
            | Self::Rg8Uint
            | Self::Rg8Sint
            | Self::Bgra4Unorm
            | Self::B5G6R5Unorm
            | Self::Bgr5A1Unorm
            | Self::Depth16Unorm => 2,
            Self::R32Uint
            | Self::R32Sint
            | Self::R32Float
            | Self::Rg16Unorm
            | Self::Rg16Snorm
            | Self::Rg16Uint
            | Self::Rg16Sint
            | Self::Rg16Float
            | Self::Rgba8Unorm
            | Self::Rgba8UnormSrgb
            | Self::Rgba8Snorm
            | Self::Rgba8Uint
            | Self::Rgba8Sint
            | Self::Bgra8Unorm
            | Self::Bgra8UnormSrgb
            | Self::Rgb10A2Unorm
            | Self::Rgb10A2Uint
            | Self::Rg11B10Ufloat
            | Self::Rgb9E5Ufloat
            | Self::Depth24UnormStencil8
            | Self::Depth32Float => 4,
            Self::Rg32Uint
            | Self::Rg32Sint
            | Self::Rg32Float
            | Self::Rgba16Unorm
            | Self::Rgba16Snorm
            | Self::Rgba16Uint
            | Self::Rgba16Sint
            | Self::Rgba16Float
            | Self::Depth32FloatStencil8
            | Self::Bc1RgbaUnorm
            | Self::Bc1RgbaUnormSrgb
            | Self::Bc4RUnorm
            | Self::Bc4RSnorm => 8,
            Self::Rgba32Uint
            | Self::Rgba32Sint
            | Self::Rgba32Float
            | Self::Bc2RgbaUnorm
            | Self::Bc2RgbaUnormSrgb
            | Self::Bc3RgbaUnorm
            | Self::Bc3RgbaUnormSrgb
            | Self::Bc5RgUnorm
            | Self::Bc5RgSnorm
            | Self::Bc6hRgbUfloat
            | Self::Bc6hRgbFloat
            | Self::Bc7RgbaUnorm
            | Self::Bc7RgbaUnormSrgb => 16,
        }
    }
}

/// Dimensionality of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureDimension {
    /// One-dimensional texture (optionally arrayed).
    D1,
    /// Two-dimensional texture (optionally arrayed or cube compatible).
    #[default]
    D2,
    /// Three-dimensional volume texture.
    D3,
}

bitflags! {
    /// Usage flags for textures.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureUsage: u32 {
        /// Texture can be sampled or read in a shader.
        const SHADER_READ = 1 << 0;
        /// Texture can be written as a storage image.
        const SHADER_WRITE = 1 << 1;
        /// Texture can be used as a color or depth-stencil attachment.
        const RENDER_TARGET = 1 << 2;
        /// Attachment contents never leave tile memory.
        const TRANSIENT = 1 << 3;
        /// Texture memory can be shared with another API or process.
        const SHARED = 1 << 4;
    }
}

impl Default for TextureUsage {
    fn default() -> Self {
        Self::SHADER_READ
    }
}

/// Descriptor for creating a texture.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureDescriptor {
    /// Debug label for the texture.
    pub label: Option<String>,
    /// Texture dimensionality.
    pub dimension: TextureDimension,
    /// Texture format.
    pub format: TextureFormat,
    /// Width in pixels. Must be at least 1.
    pub width: u32,
    /// Height in pixels. Must be at least 1.
    pub height: u32,
    /// Depth for 3D textures, array layer count otherwise. Must be at least 1.
    pub depth_or_array_layers: u32,
    /// Mip level count.
    pub mip_level_count: u32,
    /// Sample count for multisampling.
    pub sample_count: u32,
    /// Usage flags.
    pub usage: TextureUsage,
}

impl TextureDescriptor {
    /// Create a new 1D texture descriptor.
    pub fn new_1d(width: u32, format: TextureFormat, usage: TextureUsage) -> Self {
        Self {
            dimension: TextureDimension::D1,
            width,
            height: 1,
            format,
            usage,
            ..Default::default()
        }
    }

    /// Create a new 2D texture descriptor.
    pub fn new_2d(width: u32, height: u32, format: TextureFormat, usage: TextureUsage) -> Self {
        Self {
            dimension: TextureDimension::D2,
            width,
            height,
            format,
            usage,
            ..Default::default()
        }
    }

    /// Create a new 3D texture descriptor.
    pub fn new_3d(
        width: u32,
        height: u32,
        depth: u32,
        format: TextureFormat,
        usage: TextureUsage,
    ) -> Self {
        Self {
            dimension: TextureDimension::D3,
            width,
            height,
            depth_or_array_layers: depth,
            format,
            usage,
            ..Default::default()
        }
    }

    /// Set the array layer count (depth for 3D textures).
    pub fn with_array_layers(mut self, layers: u32) -> Self {
        self.depth_or_array_layers = layers;
        self
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the mip level count.
    pub fn with_mip_levels(mut self, count: u32) -> Self {
        self.mip_level_count = count;
        self
    }

    /// Set the sample count for multisampling.
    pub fn with_sample_count(mut self, count: u32) -> Self {
        self.sample_count = count;
        self
    }

    /// Size of the texture.
    pub fn size(&self) -> Extent3d {
        Extent3d::new_3d(self.width, self.height, self.depth_or_array_layers)
    }

    /// Number of mip levels in a full chain for this extent.
    pub fn full_mip_chain_len(&self) -> u32 {
        let depth = match self.dimension {
            TextureDimension::D3 => self.depth_or_array_layers,
            _ => 1,
        };
        let largest = self.width.max(self.height).max(depth).max(1);
        u32::BITS - largest.leading_zeros()
    }

    /// Returns true if the texture can be viewed as a cube map.
    pub fn is_cube_compatible(&self) -> bool {
        self.dimension == TextureDimension::D2
            && self.width == self.height
            && self.depth_or_array_layers >= 6
    }
}

impl Default for TextureDescriptor {
    fn default() -> Self {
        Self {
            label: None,
            dimension: TextureDimension::D2,
            format: TextureFormat::default(),
            width: 1,
            height: 1,
            depth_or_array_layers: 1,
            mip_level_count: 1,
            sample_count: 1,
            usage: TextureUsage::default(),
        }
    }
}
