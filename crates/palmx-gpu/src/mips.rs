//! CPU-side mip chain generation. wgpu has no equivalent of
//! `glGenerateMipmap`, so levels are downsampled here before upload.

use image::{imageops::FilterType, ImageBuffer, Luma, Pixel, Rgb, Rgba};

use crate::TextureFormat;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MipLevel {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Number of levels in a full chain down to 1x1.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Builds every level of the chain, level 0 being a copy of `pixels`.
///
/// Returns `None` when `pixels` does not hold `width * height` pixels of
/// `format`.
pub fn generate_mip_chain(
    width: u32,
    height: u32,
    format: TextureFormat,
    pixels: &[u8],
) -> Option<Vec<MipLevel>> {
    palmx_profiling::profile_function!();

    match format {
        TextureFormat::R8 => chain::<Luma<u8>>(width, height, pixels),
        TextureFormat::Rgb8 => chain::<Rgb<u8>>(width, height, pixels),
        TextureFormat::Rgba8 => chain::<Rgba<u8>>(width, height, pixels),
    }
}

fn chain<P>(width: u32, height: u32, pixels: &[u8]) -> Option<Vec<MipLevel>>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    let mut current = ImageBuffer::<P, Vec<u8>>::from_raw(width, height, pixels.to_vec())?;
    let mut levels = Vec::with_capacity(mip_level_count(width, height) as usize);

    loop {
        let (level_width, level_height) = current.dimensions();
        if level_width == 1 && level_height == 1 {
            levels.push(MipLevel {
                width: 1,
                height: 1,
                pixels: current.into_raw(),
            });
            break;
        }

        let next = image::imageops::resize(
            &current,
            (level_width / 2).max(1),
            (level_height / 2).max(1),
            FilterType::Triangle,
        );
        levels.push(MipLevel {
            width: level_width,
            height: level_height,
            pixels: current.into_raw(),
        });
        current = next;
    }

    Some(levels)
}
