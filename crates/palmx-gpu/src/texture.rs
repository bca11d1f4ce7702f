use crate::GpuError;

/// Pixel layout of uploaded texture data, one byte per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    R8,
    Rgb8,
    Rgba8,
}

impl TextureFormat {
    /// Picks the format from a decoded image's channel count.
    pub fn from_channels(channels: u8) -> Option<Self> {
        match channels {
            1 => Some(Self::R8),
            3 => Some(Self::Rgb8),
            4 => Some(Self::Rgba8),
            _ => None,
        }
    }

    pub fn num_channels(&self) -> usize {
        match self {
            Self::R8 => 1,
            Self::Rgb8 => 3,
            Self::Rgba8 => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    Repeat,
    ClampToEdge,
}

impl From<WrapMode> for wgpu::AddressMode {
    fn from(mode: WrapMode) -> Self {
        match mode {
            WrapMode::Repeat => wgpu::AddressMode::Repeat,
            WrapMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Nearest,
    Linear,
}

impl From<FilterMode> for wgpu::FilterMode {
    fn from(mode: FilterMode) -> Self {
        match mode {
            FilterMode::Nearest => wgpu::FilterMode::Nearest,
            FilterMode::Linear => wgpu::FilterMode::Linear,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerDesc {
    pub wrap: WrapMode,
    pub mag_filter: FilterMode,
    pub min_filter: FilterMode,
    pub mipmap_filter: FilterMode,
    pub generate_mipmaps: bool,
}

impl SamplerDesc {
    /// Repeat wrapping, linear magnification and trilinear minification over a
    /// generated mip chain.
    pub const REPEAT_TRILINEAR: Self = Self {
        wrap: WrapMode::Repeat,
        mag_filter: FilterMode::Linear,
        min_filter: FilterMode::Linear,
        mipmap_filter: FilterMode::Linear,
        generate_mipmaps: true,
    };
}

impl Default for SamplerDesc {
    fn default() -> Self {
        Self::REPEAT_TRILINEAR
    }
}

pub struct TextureDesc<'a> {
    pub label: &'a str,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    /// Tightly packed rows, top row first.
    pub pixels: &'a [u8],
    pub sampler: SamplerDesc,
}

impl TextureDesc<'_> {
    pub(crate) fn validate(&self) -> Result<(), GpuError> {
        if self.width == 0 || self.height == 0 {
            return Err(GpuError::EmptyTexture {
                label: self.label.to_owned(),
            });
        }

        let expected = self.width as usize * self.height as usize * self.format.num_channels();
        if self.pixels.len() != expected {
            return Err(GpuError::TextureDataSize {
                label: self.label.to_owned(),
                expected,
                actual: self.pixels.len(),
            });
        }

        Ok(())
    }
}
