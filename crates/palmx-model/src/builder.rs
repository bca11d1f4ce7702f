//! Turns raw scene meshes into GPU meshes.

use std::path::Path;

use glam::{Vec2, Vec3};
use palmx_asset_database::resolve_asset_path;
use palmx_gpu::{GpuDevice, Vertex, MAX_BONE_INFLUENCE};
use palmx_resources::ResourceManager;
use palmx_texture::ImageDecoder;

use crate::{
    material::{Material, MaterialTexture, TextureKind},
    mesh::Mesh,
    scene::{RawMaterial, RawMesh, TextureSource},
};

/// One [`Vertex`] per position. Streams the raw mesh lacks are filled with
/// zeros, and bone slots with `-1` ids and zero weights.
pub fn extract_vertices(mesh: &RawMesh) -> Vec<Vertex> {
    palmx_profiling::profile_function!();

    let tex_coords = mesh.tex_coords.as_deref().unwrap_or_default();
    let bone_ids = mesh.bone_ids.as_deref().unwrap_or_default();
    let bone_weights = mesh.bone_weights.as_deref().unwrap_or_default();

    mesh.positions
        .iter()
        .enumerate()
        .map(|(i, &position)| Vertex {
            position,
            normal: mesh.normals.get(i).copied().unwrap_or(Vec3::ZERO),
            tex_coords: tex_coords.get(i).copied().unwrap_or(Vec2::ZERO),
            tangent: mesh.tangents.get(i).copied().unwrap_or(Vec3::ZERO),
            bitangent: mesh.bitangents.get(i).copied().unwrap_or(Vec3::ZERO),
            bone_ids: bone_ids.get(i).copied().unwrap_or([-1; MAX_BONE_INFLUENCE]),
            bone_weights: bone_weights
                .get(i)
                .copied()
                .unwrap_or([0.0; MAX_BONE_INFLUENCE]),
        })
        .collect()
}

/// Flattens the faces in order. Faces are expected to be triangles already.
pub fn extract_indices(mesh: &RawMesh) -> Vec<u32> {
    palmx_profiling::profile_function!();

    debug_assert!(
        mesh.faces.iter().all(|face| face.is_triangle()),
        "mesh \"{}\" has non-triangular faces",
        mesh.name
    );

    mesh.faces
        .iter()
        .flat_map(|face| face.indices.iter().copied())
        .collect()
}

/// Loads the diffuse, specular and normal textures of `material` through the
/// resource cache. File paths are resolved against `directory` and the
/// resolved path is the cache key.
pub fn resolve_material<D: ImageDecoder>(
    resources: &mut ResourceManager<D>,
    device: &mut dyn GpuDevice,
    directory: &Path,
    material: Option<&RawMaterial>,
) -> Material {
    palmx_profiling::profile_function!();

    let Some(material) = material else {
        return Material::default();
    };
    log::info!("Material: {}", material.name);

    let mut textures = Vec::new();
    for kind in TextureKind::RESOLVED {
        for source in material.textures_of_kind(kind) {
            let texture = match source {
                TextureSource::File(reference) => {
                    let path = resolve_asset_path(directory, reference);
                    resources.load_texture(device, &path.to_string_lossy(), &path)
                }
                TextureSource::Embedded { name, bytes } => {
                    resources.load_texture_from_memory(device, name, bytes)
                }
            };
            log::debug!("{} {}: {}", material.name, kind, texture.name());
            textures.push(MaterialTexture { kind, texture });
        }
    }

    Material::new(&material.name, textures)
}

/// Extracts geometry, resolves the material and uploads the result.
pub fn build_mesh<D: ImageDecoder>(
    resources: &mut ResourceManager<D>,
    device: &mut dyn GpuDevice,
    directory: &Path,
    mesh: &RawMesh,
    materials: &[RawMaterial],
) -> Mesh {
    palmx_profiling::profile_function!();

    let vertices = extract_vertices(mesh);
    let indices = extract_indices(mesh);
    let material = resolve_material(
        resources,
        device,
        directory,
        mesh.material_index.and_then(|index| materials.get(index)),
    );

    Mesh::new(device, &mesh.name, vertices, indices, material)
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, sync::Arc};

    use palmx_gpu::HeadlessDevice;
    use palmx_texture::{DecodedImage, TextureError};

    use super::*;
    use crate::scene::Face;

    #[derive(Default)]
    struct CountingDecoder {
        calls: Cell<usize>,
    }

    impl CountingDecoder {
        fn image(&self) -> Result<DecodedImage, TextureError> {
            self.calls.set(self.calls.get() + 1);
            Ok(DecodedImage {
                width: 2,
                height: 2,
                channels: 4,
                pixels: vec![255; 16],
            })
        }
    }

    impl ImageDecoder for CountingDecoder {
        fn decode(&self, _path: &Path) -> Result<DecodedImage, TextureError> {
            self.image()
        }

        fn decode_from_memory(&self, _bytes: &[u8]) -> Result<DecodedImage, TextureError> {
            self.image()
        }
    }

    fn grid(size: u32) -> RawMesh {
        let mut mesh = RawMesh {
            name: "grid".to_owned(),
            ..Default::default()
        };
        for y in 0..=size {
            for x in 0..=size {
                mesh.positions.push(Vec3::new(x as f32, y as f32, 0.0));
            }
        }
        let row = size + 1;
        for y in 0..size {
            for x in 0..size {
                let i = y * row + x;
                mesh.faces.push(Face::triangle(i, i + 1, i + row));
                mesh.faces.push(Face::triangle(i + 1, i + row + 1, i + row));
            }
        }
        mesh
    }

    #[test]
    fn three_indices_per_face_in_range() {
        let mesh = grid(4);
        let indices = extract_indices(&mesh);

        assert_eq!(indices.len(), 3 * mesh.faces.len());
        assert!(indices
            .iter()
            .all(|&index| (index as usize) < mesh.positions.len()));
        assert_eq!(&indices[..3], &mesh.faces[0].indices[..]);
    }

    #[test]
    fn missing_streams_get_defaults() {
        let mesh = grid(1);
        let vertices = extract_vertices(&mesh);

        assert_eq!(vertices.len(), mesh.positions.len());
        for (vertex, position) in vertices.iter().zip(&mesh.positions) {
            assert_eq!(vertex.position, *position);
            assert_eq!(vertex.tex_coords, Vec2::ZERO);
            assert_eq!(vertex.normal, Vec3::ZERO);
            assert_eq!(vertex.bone_ids, [-1; MAX_BONE_INFLUENCE]);
            assert_eq!(vertex.bone_weights, [0.0; MAX_BONE_INFLUENCE]);
        }
    }

    #[test]
    fn copies_present_streams() {
        let mut mesh = grid(1);
        mesh.normals = vec![Vec3::Z; 4];
        mesh.tex_coords = Some(vec![Vec2::new(0.25, 0.75); 4]);
        mesh.bone_ids = Some(vec![[3, 1, -1, -1]; 4]);
        mesh.bone_weights = Some(vec![[0.5, 0.5, 0.0, 0.0]; 4]);

        let vertex = extract_vertices(&mesh)[2];
        assert_eq!(vertex.normal, Vec3::Z);
        assert_eq!(vertex.tex_coords, Vec2::new(0.25, 0.75));
        assert_eq!(vertex.bone_ids, [3, 1, -1, -1]);
        assert_eq!(vertex.bone_weights, [0.5, 0.5, 0.0, 0.0]);
    }

    #[test]
    fn resolves_only_diffuse_specular_and_normal() {
        let mut device = HeadlessDevice::new();
        let mut resources = ResourceManager::with_decoder(CountingDecoder::default());
        let material = RawMaterial {
            name: "crate".to_owned(),
            textures: vec![
                (TextureKind::Emissive, TextureSource::File("glow.png".to_owned())),
                (TextureKind::Normal, TextureSource::File("normal.png".to_owned())),
                (TextureKind::Diffuse, TextureSource::File("albedo.png".to_owned())),
                (
                    TextureKind::Specular,
                    TextureSource::Embedded {
                        name: "crate.glb#image0".to_owned(),
                        bytes: vec![1, 2, 3],
                    },
                ),
            ],
        };

        let resolved =
            resolve_material(&mut resources, &mut device, Path::new("models"), Some(&material));

        let kinds = resolved
            .textures()
            .iter()
            .map(|texture| texture.kind)
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            [TextureKind::Diffuse, TextureKind::Specular, TextureKind::Normal]
        );
        assert_eq!(resolved.name(), "crate");
        assert!(resources
            .get_texture(&Path::new("models").join("albedo.png").to_string_lossy())
            .is_some());
        assert!(resources.get_texture("crate.glb#image0").is_some());
        assert_eq!(resources.decoder().calls.get(), 3);
    }

    #[test]
    fn shared_textures_are_loaded_once() {
        let mut device = HeadlessDevice::new();
        let mut resources = ResourceManager::with_decoder(CountingDecoder::default());
        let material = RawMaterial {
            name: "brick".to_owned(),
            textures: vec![(TextureKind::Diffuse, TextureSource::File("brick.png".to_owned()))],
        };

        let first = resolve_material(&mut resources, &mut device, Path::new(""), Some(&material));
        let second = resolve_material(&mut resources, &mut device, Path::new(""), Some(&material));

        assert!(Arc::ptr_eq(
            first.first(TextureKind::Diffuse).unwrap(),
            second.first(TextureKind::Diffuse).unwrap()
        ));
        assert_eq!(resources.decoder().calls.get(), 1);
        assert_eq!(device.texture_count(), 1);
    }

    #[test]
    fn out_of_range_material_is_empty() {
        let mut device = HeadlessDevice::new();
        let mut resources = ResourceManager::with_decoder(CountingDecoder::default());
        let mut raw = grid(1);
        raw.material_index = Some(5);

        let mesh = build_mesh(&mut resources, &mut device, Path::new(""), &raw, &[]);

        assert!(mesh.material().is_empty());
        assert_eq!(mesh.indices().len(), 6);
        let record = device.vertex_array(mesh.vertex_array()).unwrap();
        assert_eq!(record.vertex_count, 4);
        assert_eq!(record.index_count, 6);
    }
}
