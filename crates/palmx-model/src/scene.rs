//! Importer-neutral scene records, filled in by a [`crate::SceneImporter`].

use std::collections::HashSet;

use glam::{Vec2, Vec3};

use crate::material::TextureKind;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneNode {
    pub name: String,
    /// Indices into [`Scene::meshes`].
    pub meshes: Vec<u32>,
    /// Indices into [`Scene::nodes`].
    pub children: Vec<u32>,
}

/// How the indices of a raw mesh's faces are to be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Topology {
    Points,
    Lines,
    /// Every face is a polygon. Faces with more than three indices are
    /// convex polygons.
    #[default]
    Triangles,
    /// A single face holding the whole strip.
    TriangleStrip,
    /// A single face holding the whole fan.
    TriangleFan,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Face {
    pub indices: Vec<u32>,
}

impl Face {
    pub fn new(indices: Vec<u32>) -> Self {
        Self { indices }
    }

    pub fn triangle(a: u32, b: u32, c: u32) -> Self {
        Self::new(vec![a, b, c])
    }

    pub fn is_triangle(&self) -> bool {
        self.indices.len() == 3
    }
}

/// Geometry as read from the file, one entry per attribute stream.
///
/// Optional streams are empty vectors or `None` when the file has no data
/// for them. Texture coordinates have their origin in the bottom-left corner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMesh {
    pub name: String,
    pub topology: Topology,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub tex_coords: Option<Vec<Vec2>>,
    pub tangents: Vec<Vec3>,
    pub bitangents: Vec<Vec3>,
    pub bone_ids: Option<Vec<[i32; 4]>>,
    pub bone_weights: Option<Vec<[f32; 4]>>,
    pub faces: Vec<Face>,
    /// Index into [`Scene::materials`].
    pub material_index: Option<usize>,
}

impl RawMesh {
    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    pub fn has_tangents(&self) -> bool {
        !self.tangents.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureSource {
    /// A path as written in the model file, relative to the model's
    /// directory unless absolute.
    File(String),
    /// An encoded image stored inside the model file.
    Embedded { name: String, bytes: Vec<u8> },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawMaterial {
    pub name: String,
    pub textures: Vec<(TextureKind, TextureSource)>,
}

impl RawMaterial {
    pub fn textures_of_kind(&self, kind: TextureKind) -> impl Iterator<Item = &TextureSource> {
        self.textures
            .iter()
            .filter(move |(texture_kind, _)| *texture_kind == kind)
            .map(|(_, source)| source)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub nodes: Vec<SceneNode>,
    pub root: Option<u32>,
    pub meshes: Vec<RawMesh>,
    pub materials: Vec<RawMaterial>,
    /// Set by the importer when the file could only be read partially.
    pub incomplete: bool,
}

impl Scene {
    pub fn root_node(&self) -> Option<&SceneNode> {
        self.root.and_then(|root| self.nodes.get(root as usize))
    }

    /// Mesh indices in depth-first pre-order: a node's own meshes first, then
    /// each child subtree in listed order.
    ///
    /// Nodes reached a second time are skipped, so a cyclic node arena still
    /// terminates.
    pub fn mesh_order(&self) -> Vec<usize> {
        palmx_profiling::profile_function!();

        let mut order = Vec::with_capacity(self.meshes.len());
        let Some(root) = self.root else {
            return order;
        };

        let mut visited = HashSet::new();
        let mut stack = vec![root];
        while let Some(node_index) = stack.pop() {
            let Some(node) = self.nodes.get(node_index as usize) else {
                log::warn!("Scene references missing node {}", node_index);
                continue;
            };
            if !visited.insert(node_index) {
                log::warn!("Node \"{}\" is reachable more than once, skipping", node.name);
                continue;
            }

            for &mesh_index in &node.meshes {
                if (mesh_index as usize) < self.meshes.len() {
                    order.push(mesh_index as usize);
                } else {
                    log::warn!("Node \"{}\" references missing mesh {}", node.name, mesh_index);
                }
            }
            stack.extend(node.children.iter().rev());
        }

        order
    }
}
