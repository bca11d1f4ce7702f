//! Model import and mesh building.
//!
//! A [`SceneImporter`] reads a file into an importer-neutral [`scene::Scene`],
//! [`post_process`] normalizes it, and the [`builder`] turns every raw mesh
//! into a GPU-resident [`Mesh`] with its textures resolved through the
//! resource cache. [`ModelLoader`] ties the steps together. [`Primitive`]
//! covers meshes built in code and drawn in a flat color.

pub mod builder;
mod importer;
mod loader;
pub mod material;
mod mesh;
mod model;
pub mod post_process;
mod primitive;
pub mod scene;

pub use importer::{GltfImporter, ImportError, SceneImporter};
pub use loader::ModelLoader;
pub use material::{Material, MaterialTexture, TextureKind};
pub use mesh::Mesh;
pub use model::{Bounds, Model};
pub use post_process::PostProcess;
pub use primitive::{cube_geometry, Primitive};
