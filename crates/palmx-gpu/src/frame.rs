use glam::{Mat4, Vec4};

use crate::{ProgramHandle, TextureHandle, VertexArrayHandle};

/// Size of the offscreen target the scene is rendered into before it is
/// scaled up, which gives the pixelated look.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTargetConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for RenderTargetConfig {
    /// The PS1's 320x240 display mode.
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
        }
    }
}

impl RenderTargetConfig {
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    pub program: ProgramHandle,
    pub vertex_array: VertexArrayHandle,
    pub index_count: u32,
    /// Devices bind a white fallback when this is invalid.
    pub albedo: TextureHandle,
    /// Devices bind a flat normal fallback when this is invalid.
    pub normal: TextureHandle,
    /// Multiplied with the albedo. With the white fallback albedo this draws
    /// a flat color.
    pub color: Vec4,
    pub model: Mat4,
}

/// Draw commands recorded for one frame, in submission order.
#[derive(Debug, Clone)]
pub struct Frame {
    pub view: Mat4,
    pub projection: Mat4,
    pub clear_color: [f32; 4],
    draws: Vec<DrawCommand>,
}

impl Frame {
    pub fn new(view: Mat4, projection: Mat4) -> Self {
        Self {
            view,
            projection,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            draws: Vec::new(),
        }
    }

    pub fn with_clear_color(mut self, clear_color: [f32; 4]) -> Self {
        self.clear_color = clear_color;
        self
    }

    pub fn push(&mut self, draw: DrawCommand) {
        self.draws.push(draw);
    }

    pub fn draws(&self) -> &[DrawCommand] {
        &self.draws
    }
}
