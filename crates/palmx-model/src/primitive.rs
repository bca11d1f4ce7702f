use glam::{Vec2, Vec3, Vec4};
use palmx_gpu::{DrawCommand, Frame, GpuDevice, TextureHandle, Vertex};
use palmx_resources::Shader;
use palmx_transform::Transform;

use crate::{material::Material, mesh::Mesh};

/// Outward normal and tangent of each cube face.
const CUBE_FACES: [(Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::NEG_Z),
    (Vec3::NEG_X, Vec3::Z),
    (Vec3::Y, Vec3::X),
    (Vec3::NEG_Y, Vec3::X),
    (Vec3::Z, Vec3::X),
    (Vec3::NEG_Z, Vec3::NEG_X),
];

/// Unit cube centered on the origin, four vertices per face so every face
/// keeps its own normal. Faces wind counter-clockwise seen from outside.
pub fn cube_geometry() -> (Vec<Vertex>, Vec<u32>) {
    let mut vertices = Vec::with_capacity(CUBE_FACES.len() * 4);
    let mut indices = Vec::with_capacity(CUBE_FACES.len() * 6);

    for (normal, tangent) in CUBE_FACES {
        let bitangent = normal.cross(tangent);
        let base = vertices.len() as u32;

        for (u, v) in [(0.0, 1.0), (1.0, 1.0), (1.0, 0.0), (0.0, 0.0)] {
            vertices.push(Vertex {
                position: normal * 0.5 + tangent * (u - 0.5) + bitangent * (0.5 - v),
                normal,
                tex_coords: Vec2::new(u, v),
                tangent,
                bitangent,
                ..Default::default()
            });
        }
        indices.extend([base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    (vertices, indices)
}

/// An untextured mesh drawn in one flat color.
#[derive(Debug, Clone)]
pub struct Primitive {
    pub transform: Transform,
    pub color: Vec4,
    mesh: Mesh,
}

impl Primitive {
    pub fn new(mesh: Mesh) -> Self {
        Self {
            transform: Transform::default(),
            color: Vec4::ONE,
            mesh,
        }
    }

    pub fn cube(device: &mut dyn GpuDevice) -> Self {
        palmx_profiling::profile_function!();

        let (vertices, indices) = cube_geometry();
        Self::new(Mesh::new(
            device,
            "cube",
            vertices,
            indices,
            Material::default(),
        ))
    }

    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = color;
        self
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Records one draw without textures, so devices bind their white albedo
    /// and the color comes through unchanged.
    pub fn draw(&self, shader: &Shader, frame: &mut Frame) {
        if !shader.is_valid() {
            log::trace!("Skipping draw with invalid shader \"{}\"", shader.name());
            return;
        }

        frame.push(DrawCommand {
            program: shader.program(),
            vertex_array: self.mesh.vertex_array(),
            index_count: self.mesh.indices().len() as u32,
            albedo: TextureHandle::INVALID,
            normal: TextureHandle::INVALID,
            color: self.color,
            model: self.transform.matrix(),
        });
    }
}
