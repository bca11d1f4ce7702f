use std::path::{Path, PathBuf};

use glam::{Vec3, Vec4};
use palmx_gpu::{DrawCommand, Frame, TextureHandle};
use palmx_resources::Shader;
use palmx_transform::Transform;

use crate::{material::TextureKind, mesh::Mesh};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Meshes loaded from one model file, in scene traversal order.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub transform: Transform,
    meshes: Vec<Mesh>,
    directory: PathBuf,
}

impl Model {
    pub fn new(meshes: Vec<Mesh>, directory: PathBuf) -> Self {
        Self {
            transform: Transform::default(),
            meshes,
            directory,
        }
    }

    /// The result of a failed load. Draws nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    /// Directory relative texture paths were resolved against.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Records one draw per mesh, in mesh order. Nothing is recorded for a
    /// shader that failed to link.
    pub fn draw(&self, shader: &Shader, frame: &mut Frame) {
        palmx_profiling::profile_function!();

        if !shader.is_valid() {
            log::trace!("Skipping draw with invalid shader \"{}\"", shader.name());
            return;
        }

        let model = self.transform.matrix();
        for mesh in &self.meshes {
            let material = mesh.material();
            let handle = |kind| {
                material
                    .first(kind)
                    .map(|texture| texture.handle())
                    .unwrap_or(TextureHandle::INVALID)
            };

            frame.push(DrawCommand {
                program: shader.program(),
                vertex_array: mesh.vertex_array(),
                index_count: mesh.indices().len() as u32,
                albedo: handle(TextureKind::Diffuse),
                normal: handle(TextureKind::Normal),
                color: Vec4::ONE,
                model,
            });
        }
    }

    /// Object-space bounds of every vertex, `None` without vertices.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut positions = self
            .meshes
            .iter()
            .flat_map(|mesh| mesh.vertices().iter().map(|vertex| vertex.position));

        let first = positions.next()?;
        Some(positions.fold(
            Bounds {
                min: first,
                max: first,
            },
            |bounds, position| Bounds {
                min: bounds.min.min(position),
                max: bounds.max.max(position),
            },
        ))
    }
}
