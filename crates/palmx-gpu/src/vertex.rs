use std::mem::{offset_of, size_of};

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

pub const MAX_BONE_INFLUENCE: usize = 4;

/// The single vertex format every mesh is uploaded with.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tex_coords: Vec2,
    pub tangent: Vec3,
    pub bitangent: Vec3,
    /// `-1` marks an unused influence slot.
    pub bone_ids: [i32; MAX_BONE_INFLUENCE],
    pub bone_weights: [f32; MAX_BONE_INFLUENCE],
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            normal: Vec3::ZERO,
            tex_coords: Vec2::ZERO,
            tangent: Vec3::ZERO,
            bitangent: Vec3::ZERO,
            bone_ids: [-1; MAX_BONE_INFLUENCE],
            bone_weights: [0.0; MAX_BONE_INFLUENCE],
        }
    }
}

impl Vertex {
    pub const LAYOUT: VertexLayout = VertexLayout {
        stride: size_of::<Vertex>() as u64,
        attributes: &[
            VertexAttribute {
                location: 0,
                format: VertexFormat::Float32x3,
                offset: offset_of!(Vertex, position) as u64,
            },
            VertexAttribute {
                location: 1,
                format: VertexFormat::Float32x3,
                offset: offset_of!(Vertex, normal) as u64,
            },
            VertexAttribute {
                location: 2,
                format: VertexFormat::Float32x2,
                offset: offset_of!(Vertex, tex_coords) as u64,
            },
            VertexAttribute {
                location: 3,
                format: VertexFormat::Float32x3,
                offset: offset_of!(Vertex, tangent) as u64,
            },
            VertexAttribute {
                location: 4,
                format: VertexFormat::Float32x3,
                offset: offset_of!(Vertex, bitangent) as u64,
            },
            VertexAttribute {
                location: 5,
                format: VertexFormat::Sint32x4,
                offset: offset_of!(Vertex, bone_ids) as u64,
            },
            VertexAttribute {
                location: 6,
                format: VertexFormat::Float32x4,
                offset: offset_of!(Vertex, bone_weights) as u64,
            },
        ],
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexFormat {
    Float32x2,
    Float32x3,
    Float32x4,
    /// Read as integers by the shader, never normalized.
    Sint32x4,
}

impl VertexFormat {
    pub const fn size(self) -> u64 {
        match self {
            Self::Float32x2 => 8,
            Self::Float32x3 => 12,
            Self::Float32x4 | Self::Sint32x4 => 16,
        }
    }
}

impl From<VertexFormat> for wgpu::VertexFormat {
    fn from(format: VertexFormat) -> Self {
        match format {
            VertexFormat::Float32x2 => wgpu::VertexFormat::Float32x2,
            VertexFormat::Float32x3 => wgpu::VertexFormat::Float32x3,
            VertexFormat::Float32x4 => wgpu::VertexFormat::Float32x4,
            VertexFormat::Sint32x4 => wgpu::VertexFormat::Sint32x4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub location: u32,
    pub format: VertexFormat,
    pub offset: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexLayout {
    pub stride: u64,
    pub attributes: &'static [VertexAttribute],
}

impl VertexLayout {
    pub(crate) fn wgpu_attributes(&self) -> Vec<wgpu::VertexAttribute> {
        self.attributes
            .iter()
            .map(|attribute| wgpu::VertexAttribute {
                format: attribute.format.into(),
                offset: attribute.offset,
                shader_location: attribute.location,
            })
            .collect()
    }
}
