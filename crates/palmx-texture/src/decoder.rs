use std::path::{Path, PathBuf};

use image::DynamicImage;
use palmx_gpu::TextureFormat;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("unsupported channel count {channels}")]
    UnsupportedChannelCount { channels: u8 },
}

/// Decoded pixels, tightly packed, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn format(&self) -> Result<TextureFormat, TextureError> {
        TextureFormat::from_channels(self.channels).ok_or(TextureError::UnsupportedChannelCount {
            channels: self.channels,
        })
    }
}

/// Turns encoded image files into raw 8-bit pixels.
pub trait ImageDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedImage, TextureError>;

    fn decode_from_memory(&self, bytes: &[u8]) -> Result<DecodedImage, TextureError>;
}

/// [`ImageDecoder`] built on the `image` crate.
///
/// Grayscale stays single channel, RGB stays three channels, and
/// everything else is converted to 8-bit RGB or RGBA. Luma-alpha is expanded
/// to RGBA.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageCrateDecoder;

impl ImageDecoder for ImageCrateDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedImage, TextureError> {
        palmx_profiling::profile_function!();

        let bytes = std::fs::read(path).map_err(|source| TextureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.decode_from_memory(&bytes)
    }

    fn decode_from_memory(&self, bytes: &[u8]) -> Result<DecodedImage, TextureError> {
        palmx_profiling::profile_function!();

        let image = image::load_from_memory(bytes)?;
        let (width, height) = (image.width(), image.height());
        if !matches!(
            image,
            DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_)
        ) {
            log::debug!("Converting {:?} image to 8 bits per channel", image.color());
        }

        let (channels, pixels) = match image {
            DynamicImage::ImageLuma8(image) => (1, image.into_raw()),
            DynamicImage::ImageRgb8(image) => (3, image.into_raw()),
            DynamicImage::ImageRgba8(image) => (4, image.into_raw()),
            image if image.color().has_alpha() => (4, image.to_rgba8().into_raw()),
            image if image.color().channel_count() == 1 => (1, image.to_luma8().into_raw()),
            image => (3, image.to_rgb8().into_raw()),
        };

        Ok(DecodedImage {
            width,
            height,
            channels,
            pixels,
        })
    }
}
