/// Texture formats understood by the GPU layer
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    // Color, normalized
    R8_UNORM,
    R8G8_UNORM,
    R8G8B8_UNORM,
    R8G8B8A8_UNORM,
    R8G8B8A8_SRGB,
    R16G16B16A16_UNORM,

    // Color, float
    R16G16_SFLOAT,
    R16G16B16A16_SFLOAT,
    R32_SFLOAT,
    R32G32_SFLOAT,
    R32G32B32A32_SFLOAT,
    B10G11R11_UFLOAT,

    // Color, integer (picking, entity IDs)
    R8_UINT,
    R16_UINT,
    R32_UINT,
    R32_SINT,

    // Depth / stencil
    D32_FLOAT,
    D24_UNORM_S8_UINT,
    D32_FLOAT_S8_UINT,
}

impl TextureFormat {
    /// Default depth attachment format
    pub const DEPTH: TextureFormat = TextureFormat::D24_UNORM_S8_UINT;

    /// True for depth (and depth/stencil) formats
    pub fn is_depth(&self) -> bool {
        matches!(
            self,
            TextureFormat::D32_FLOAT
                | TextureFormat::D24_UNORM_S8_UINT
                | TextureFormat::D32_FLOAT_S8_UINT
        )
    }

    pub fn has_stencil(&self) -> bool {
        matches!(self, TextureFormat::D24_UNORM_S8_UINT | TextureFormat::D32_FLOAT_S8_UINT)
    }

    /// Size of one texel in bytes
    pub fn bytes_per_texel(&self) -> u32 {
        match self {
            TextureFormat::R8_UNORM | TextureFormat::R8_UINT => 1,
            TextureFormat::R8G8_UNORM | TextureFormat::R16_UINT => 2,
            TextureFormat::R8G8B8_UNORM => 3,
            TextureFormat::R8G8B8A8_UNORM
            | TextureFormat::R8G8B8A8_SRGB
            | TextureFormat::R16G16_SFLOAT
            | TextureFormat::R32_SFLOAT
            | TextureFormat::B10G11R11_UFLOAT
            | TextureFormat::R32_UINT
            | TextureFormat::R32_SINT
            | TextureFormat::D32_FLOAT
            | TextureFormat::D24_UNORM_S8_UINT => 4,
            TextureFormat::R16G16B16A16_UNORM
            | TextureFormat::R16G16B16A16_SFLOAT
            | TextureFormat::R32G32_SFLOAT
            | TextureFormat::D32_FLOAT_S8_UINT => 8,
            TextureFormat::R32G32B32A32_SFLOAT => 16,
        }
    }
}
