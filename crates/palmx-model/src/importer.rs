use std::path::{Path, PathBuf};

use glam::{Vec2, Vec3, Vec4, Vec4Swizzles};
use palmx_asset_database::asset_directory;
use thiserror::Error;

use crate::{
    material::TextureKind,
    post_process::{self, PostProcess},
    scene::{Face, RawMaterial, RawMesh, Scene, SceneNode, TextureSource, Topology},
};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },
    #[error("scene in {} is incomplete", .path.display())]
    Incomplete { path: PathBuf },
    #[error("scene in {} has no root node", .path.display())]
    MissingRootNode { path: PathBuf },
}

/// Reads a model file into an importer-neutral [`Scene`].
pub trait SceneImporter {
    fn read_file(&self, path: &Path) -> Result<Scene, ImportError>;

    /// Reads `path`, rejects incomplete scenes and scenes without a root node,
    /// then runs the requested post-processing steps.
    fn import(&self, path: &Path, steps: PostProcess) -> Result<Scene, ImportError> {
        palmx_profiling::profile_function!();

        let mut scene = self.read_file(path)?;
        if scene.incomplete {
            return Err(ImportError::Incomplete {
                path: path.to_path_buf(),
            });
        }
        if scene.root_node().is_none() {
            return Err(ImportError::MissingRootNode {
                path: path.to_path_buf(),
            });
        }

        post_process::apply(&mut scene, steps);
        Ok(scene)
    }
}

/// [`SceneImporter`] for `.gltf` and `.glb` files.
///
/// Every primitive becomes its own raw mesh. A synthetic root node at index 0
/// parents the root nodes of the default scene, or of the first scene when
/// the file names no default. Node transforms are not applied.
#[derive(Debug, Default, Clone, Copy)]
pub struct GltfImporter;

impl SceneImporter for GltfImporter {
    fn read_file(&self, path: &Path) -> Result<Scene, ImportError> {
        palmx_profiling::profile_function!();

        let gltf = gltf::Gltf::open(path).map_err(|error| match error {
            gltf::Error::Io(source) => ImportError::Io {
                path: path.to_path_buf(),
                source,
            },
            error => ImportError::Parse {
                path: path.to_path_buf(),
                reason: error.to_string(),
            },
        })?;

        let directory = asset_directory(path);
        let buffers = gltf::import_buffers(&gltf.document, Some(&directory), gltf.blob.clone())
            .map_err(|error| ImportError::Parse {
                path: path.to_path_buf(),
                reason: error.to_string(),
            })?;

        let document = &gltf.document;
        let materials = document
            .materials()
            .map(|material| read_material(path, &buffers, &material))
            .collect();

        let mut meshes = Vec::new();
        let mut primitive_meshes = Vec::with_capacity(document.meshes().len());
        for mesh in document.meshes() {
            let mut raw_meshes = Vec::new();
            for primitive in mesh.primitives() {
                if let Some(raw_mesh) = read_primitive(&buffers, &mesh, &primitive) {
                    raw_meshes.push(meshes.len() as u32);
                    meshes.push(raw_mesh);
                }
            }
            primitive_meshes.push(raw_meshes);
        }

        let mut nodes = Vec::with_capacity(document.nodes().len() + 1);
        nodes.push(SceneNode {
            name: "RootNode".to_owned(),
            ..Default::default()
        });
        nodes.extend(document.nodes().map(|node| SceneNode {
            name: node.name().unwrap_or_default().to_owned(),
            meshes: node
                .mesh()
                .and_then(|mesh| primitive_meshes.get(mesh.index()).cloned())
                .unwrap_or_default(),
            children: node.children().map(|child| child.index() as u32 + 1).collect(),
        }));

        let scene = document
            .default_scene()
            .or_else(|| document.scenes().next());
        let root = scene.map(|scene| {
            nodes[0].children = scene.nodes().map(|node| node.index() as u32 + 1).collect();
            0
        });

        log::debug!(
            "Read {} with {} nodes, {} meshes and {} materials",
            path.display(),
            nodes.len(),
            meshes.len(),
            document.materials().len()
        );

        Ok(Scene {
            incomplete: meshes.is_empty(),
            nodes,
            root,
            meshes,
            materials,
        })
    }
}

fn read_primitive(
    buffers: &[gltf::buffer::Data],
    mesh: &gltf::Mesh,
    primitive: &gltf::Primitive,
) -> Option<RawMesh> {
    palmx_profiling::profile_function!();

    let name = mesh.name().unwrap_or_default().to_owned();
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &data.0[..]));

    let Some(positions) = reader.read_positions() else {
        log::warn!(
            "Primitive {} of mesh \"{}\" has no positions, skipping",
            primitive.index(),
            name
        );
        return None;
    };
    let positions = positions.map(Vec3::from).collect::<Vec<_>>();

    let normals = reader
        .read_normals()
        .map(|normals| normals.map(Vec3::from).collect::<Vec<_>>())
        .unwrap_or_default();

    // glTF puts the texture origin in the top-left corner
    let tex_coords = reader.read_tex_coords(0).map(|tex_coords| {
        tex_coords
            .into_f32()
            .map(|[u, v]| Vec2::new(u, 1.0 - v))
            .collect()
    });

    let (tangents, bitangents) = match reader.read_tangents() {
        Some(tangents) if normals.len() == positions.len() => tangents
            .map(Vec4::from)
            .zip(&normals)
            .map(|(tangent, normal)| (tangent.xyz(), normal.cross(tangent.xyz()) * tangent.w))
            .unzip(),
        _ => (Vec::new(), Vec::new()),
    };

    let bone_ids = reader.read_joints(0).map(|joints| {
        joints
            .into_u16()
            .map(|joints| joints.map(i32::from))
            .collect()
    });
    let bone_weights = reader
        .read_weights(0)
        .map(|weights| weights.into_f32().collect());

    let indices = reader
        .read_indices()
        .map(|indices| indices.into_u32().collect::<Vec<_>>())
        .unwrap_or_else(|| (0..positions.len() as u32).collect());

    let (topology, faces) = match primitive.mode() {
        gltf::mesh::Mode::Points => (
            Topology::Points,
            indices.iter().map(|&index| Face::new(vec![index])).collect(),
        ),
        gltf::mesh::Mode::Lines => (
            Topology::Lines,
            indices
                .chunks_exact(2)
                .map(|line| Face::new(line.to_vec()))
                .collect(),
        ),
        gltf::mesh::Mode::LineStrip | gltf::mesh::Mode::LineLoop => {
            (Topology::Lines, vec![Face::new(indices)])
        }
        gltf::mesh::Mode::Triangles => (
            Topology::Triangles,
            indices
                .chunks_exact(3)
                .map(|triangle| Face::triangle(triangle[0], triangle[1], triangle[2]))
                .collect(),
        ),
        gltf::mesh::Mode::TriangleStrip => (Topology::TriangleStrip, vec![Face::new(indices)]),
        gltf::mesh::Mode::TriangleFan => (Topology::TriangleFan, vec![Face::new(indices)]),
    };

    Some(RawMesh {
        name,
        topology,
        positions,
        normals,
        tex_coords,
        tangents,
        bitangents,
        bone_ids,
        bone_weights,
        faces,
        material_index: primitive.material().index(),
    })
}

fn read_material(
    path: &Path,
    buffers: &[gltf::buffer::Data],
    material: &gltf::Material,
) -> RawMaterial {
    let pbr = material.pbr_metallic_roughness();

    let references = [
        (
            TextureKind::Diffuse,
            pbr.base_color_texture().map(|info| info.texture()),
        ),
        (
            TextureKind::Specular,
            material
                .specular()
                .and_then(|specular| specular.specular_texture())
                .map(|info| info.texture()),
        ),
        (
            TextureKind::Normal,
            material.normal_texture().map(|normal| normal.texture()),
        ),
        (
            TextureKind::Emissive,
            material.emissive_texture().map(|info| info.texture()),
        ),
        (
            TextureKind::AmbientOcclusion,
            material.occlusion_texture().map(|occlusion| occlusion.texture()),
        ),
        (
            TextureKind::MetallicRoughness,
            pbr.metallic_roughness_texture().map(|info| info.texture()),
        ),
    ];

    RawMaterial {
        name: material.name().unwrap_or_default().to_owned(),
        textures: references
            .into_iter()
            .filter_map(|(kind, texture)| {
                let source = texture_source(path, buffers, &texture?.source())?;
                Some((kind, source))
            })
            .collect(),
    }
}

fn texture_source(
    path: &Path,
    buffers: &[gltf::buffer::Data],
    image: &gltf::Image,
) -> Option<TextureSource> {
    let bytes = match image.source() {
        gltf::image::Source::Uri { uri, .. } if uri.starts_with("data:") => {
            let bytes = decode_data_uri(uri);
            if bytes.is_none() {
                log::warn!(
                    "Image {} in {} has a data URI that is not base64",
                    image.index(),
                    path.display()
                );
            }
            bytes?
        }
        gltf::image::Source::Uri { uri, .. } => return Some(TextureSource::File(uri.to_owned())),
        gltf::image::Source::View { view, .. } => {
            let bytes = buffers
                .get(view.buffer().index())
                .and_then(|data| data.0.get(view.offset()..view.offset() + view.length()));
            if bytes.is_none() {
                log::warn!(
                    "Image {} in {} points outside its buffer",
                    image.index(),
                    path.display()
                );
            }
            bytes?.to_vec()
        }
    };

    Some(TextureSource::Embedded {
        name: format!("{}#image{}", path.display(), image.index()),
        bytes,
    })
}

/// Payload of a `data:[<mime>];base64,<data>` URI.
fn decode_data_uri(uri: &str) -> Option<Vec<u8>> {
    let (header, data) = uri.strip_prefix("data:")?.split_once(',')?;
    if !header.ends_with(";base64") {
        return None;
    }
    base64::decode(data).ok()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    struct FixedImporter(Scene);

    impl SceneImporter for FixedImporter {
        fn read_file(&self, _path: &Path) -> Result<Scene, ImportError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn rejects_incomplete_scenes() {
        let importer = FixedImporter(Scene {
            incomplete: true,
            ..Default::default()
        });

        assert!(matches!(
            importer.import(Path::new("broken.gltf"), PostProcess::default()),
            Err(ImportError::Incomplete { .. })
        ));
    }

    #[test]
    fn rejects_scenes_without_root() {
        let importer = FixedImporter(Scene {
            meshes: vec![RawMesh::default()],
            ..Default::default()
        });

        assert!(matches!(
            importer.import(Path::new("rootless.gltf"), PostProcess::default()),
            Err(ImportError::MissingRootNode { .. })
        ));
    }

    #[test]
    fn missing_files_are_io_errors() {
        assert!(matches!(
            GltfImporter.read_file(Path::new("does/not/exist.gltf")),
            Err(ImportError::Io { .. })
        ));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.gltf");
        fs::write(&path, "{ this is not json").unwrap();

        let error = GltfImporter.read_file(&path).unwrap_err();
        assert!(matches!(error, ImportError::Parse { .. }));
        assert!(error.to_string().contains("garbage.gltf"));
    }

    #[test]
    fn scene_without_meshes_is_incomplete() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.gltf");
        fs::write(
            &path,
            r#"{
                "asset": { "version": "2.0" },
                "scene": 0,
                "scenes": [{ "nodes": [0] }],
                "nodes": [{ "name": "lonely" }]
            }"#,
        )
        .unwrap();

        let scene = GltfImporter.read_file(&path).unwrap();
        assert!(scene.incomplete);
        assert_eq!(scene.root, Some(0));
        assert_eq!(scene.nodes[0].children, [1]);
        assert_eq!(scene.nodes[1].name, "lonely");
    }

    #[test]
    fn decodes_base64_data_uris() {
        assert_eq!(
            decode_data_uri("data:image/png;base64,iVBORw=="),
            Some(vec![0x89, b'P', b'N', b'G'])
        );
        assert_eq!(decode_data_uri("data:image/png,%89PNG"), None);
        assert_eq!(decode_data_uri("data:image/png;base64,!!!"), None);
    }
}
