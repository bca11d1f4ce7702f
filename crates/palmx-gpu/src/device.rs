use thiserror::Error;

use crate::{
    Frame, ProgramDesc, ProgramHandle, ShaderError, TextureDesc, TextureHandle, VertexArrayHandle,
    VertexLayout,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GpuError {
    #[error("texture \"{label}\" has a zero dimension")]
    EmptyTexture { label: String },
    #[error("texture \"{label}\" has {actual} bytes of pixel data, expected {expected}")]
    TextureDataSize {
        label: String,
        expected: usize,
        actual: usize,
    },
}

pub struct VertexArrayDesc<'a> {
    pub label: &'a str,
    /// Interleaved vertices described by `layout`.
    pub vertex_data: &'a [u8],
    pub layout: &'static VertexLayout,
    /// Triangle list.
    pub indices: &'a [u32],
}

impl VertexArrayDesc<'_> {
    pub fn vertex_count(&self) -> usize {
        if self.layout.stride == 0 {
            0
        } else {
            self.vertex_data.len() / self.layout.stride as usize
        }
    }
}

/// Allocates GPU resources and hands back opaque handles.
///
/// Every call must be made from the thread that owns the graphics context.
/// Resources are immutable once created and live as long as the device.
pub trait GpuDevice {
    /// Uploads vertex and index data once into static buffers.
    fn create_vertex_array(&mut self, desc: &VertexArrayDesc<'_>) -> VertexArrayHandle;

    fn create_texture(&mut self, desc: &TextureDesc<'_>) -> Result<TextureHandle, GpuError>;

    fn create_program(&mut self, desc: &ProgramDesc<'_>) -> Result<ProgramHandle, ShaderError>;

    /// Renders the recorded draws. Draws referencing unknown or invalid
    /// programs or vertex arrays are skipped.
    fn submit(&mut self, frame: &Frame);
}
