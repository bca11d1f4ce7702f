use std::path::{Path, PathBuf};

use palmx_gpu::{TextureFormat, TextureHandle};

mod decoder;
pub use decoder::{DecodedImage, ImageCrateDecoder, ImageDecoder, TextureError};

pub struct TextureCreateDesc {
    pub name: String,
    pub path: Option<PathBuf>,
    pub handle: TextureHandle,
    pub format: Option<TextureFormat>,
    pub width: u32,
    pub height: u32,
}

/// A texture uploaded to the GPU, shared by every material that references
/// its logical name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    name: String,
    path: Option<PathBuf>,
    handle: TextureHandle,
    format: Option<TextureFormat>,
    width: u32,
    height: u32,
}

impl Texture {
    pub fn new(create_desc: TextureCreateDesc) -> Self {
        Self {
            name: create_desc.name,
            path: create_desc.path,
            handle: create_desc.handle,
            format: create_desc.format,
            width: create_desc.width,
            height: create_desc.height,
        }
    }

    /// Placeholder for a texture that could not be decoded or uploaded.
    pub fn invalid(name: &str, path: Option<&Path>) -> Self {
        Self {
            name: name.to_owned(),
            path: path.map(Path::to_path_buf),
            handle: TextureHandle::INVALID,
            format: None,
            width: 0,
            height: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn handle(&self) -> TextureHandle {
        self.handle
    }

    pub fn format(&self) -> Option<TextureFormat> {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_valid(&self) -> bool {
        self.handle.is_valid()
    }
}
