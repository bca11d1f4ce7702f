use std::path::Path;

use palmx_asset_database::asset_directory;
use palmx_gpu::GpuDevice;
use palmx_resources::ResourceManager;
use palmx_texture::ImageDecoder;

use crate::{
    builder::build_mesh,
    importer::{GltfImporter, ImportError, SceneImporter},
    model::Model,
    post_process::PostProcess,
};

/// Imports model files and builds their meshes, resolving textures through a
/// [`ResourceManager`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelLoader<I = GltfImporter> {
    importer: I,
    post_process: PostProcess,
}

impl ModelLoader {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<I: SceneImporter> ModelLoader<I> {
    pub fn with_importer(importer: I) -> Self {
        Self {
            importer,
            post_process: PostProcess::default(),
        }
    }

    /// Extra steps to run on imported scenes. Triangulation always runs, the
    /// mesh builder only accepts triangle lists.
    pub fn with_post_process(mut self, post_process: PostProcess) -> Self {
        self.post_process = post_process | PostProcess::TRIANGULATE;
        self
    }

    pub fn post_process(&self) -> PostProcess {
        self.post_process
    }

    /// Loads `path`, logging a failure once and returning an empty model in
    /// its place.
    pub fn load<D: ImageDecoder>(
        &self,
        path: &Path,
        resources: &mut ResourceManager<D>,
        device: &mut dyn GpuDevice,
    ) -> Model {
        match self.try_load(path, resources, device) {
            Ok(model) => model,
            Err(error) => {
                log::error!("Failed to load model: {}", error);
                Model::empty()
            }
        }
    }

    pub fn try_load<D: ImageDecoder>(
        &self,
        path: &Path,
        resources: &mut ResourceManager<D>,
        device: &mut dyn GpuDevice,
    ) -> Result<Model, ImportError> {
        palmx_profiling::profile_function!();

        let scene = self
            .importer
            .import(path, self.post_process | PostProcess::TRIANGULATE)?;
        let directory = asset_directory(path);

        let mut meshes = Vec::with_capacity(scene.meshes.len());
        for mesh_index in scene.mesh_order() {
            let raw_mesh = &scene.meshes[mesh_index];
            if raw_mesh.faces.is_empty() {
                log::debug!("Mesh \"{}\" has no triangles, skipping", raw_mesh.name);
                continue;
            }

            meshes.push(build_mesh(
                resources,
                device,
                &directory,
                raw_mesh,
                &scene.materials,
            ));
        }

        log::info!("Loaded model {} ({} meshes)", path.display(), meshes.len());
        Ok(Model::new(meshes, directory))
    }
}
