use palmx_gpu::{GpuDevice, Vertex, VertexArrayDesc, VertexArrayHandle};

use crate::material::Material;

/// Geometry uploaded once into a static vertex/index buffer pair.
#[derive(Debug, Clone)]
pub struct Mesh {
    name: String,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    material: Material,
    vertex_array: VertexArrayHandle,
}

impl Mesh {
    /// Uploads `vertices` and `indices` to `device`. The buffers are never
    /// touched again.
    pub fn new(
        device: &mut dyn GpuDevice,
        name: &str,
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
        material: Material,
    ) -> Self {
        palmx_profiling::profile_function!();

        let vertex_array = device.create_vertex_array(&VertexArrayDesc {
            label: name,
            vertex_data: bytemuck::cast_slice(&vertices),
            layout: &Vertex::LAYOUT,
            indices: &indices,
        });

        Self {
            name: name.to_owned(),
            vertices,
            indices,
            material,
            vertex_array,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn vertex_array(&self) -> VertexArrayHandle {
        self.vertex_array
    }

    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }
}
