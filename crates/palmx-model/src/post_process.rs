//! Steps run on an imported [`Scene`] before meshes are built, independent of
//! the importer that produced it.

use glam::{Vec2, Vec3};

use crate::scene::{Face, RawMesh, Scene, Topology};

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PostProcess: u32 {
        /// Splits polygons, strips and fans into triangle lists and drops
        /// point and line primitives.
        const TRIANGULATE = 1 << 0;
        /// `v = 1 - v` on every texture coordinate.
        const FLIP_UVS = 1 << 1;
        /// Area-weighted smooth normals for meshes without normals.
        const GEN_SMOOTH_NORMALS = 1 << 2;
        /// MikkTSpace tangents and bitangents for meshes with normals and
        /// texture coordinates but no tangents.
        const CALC_TANGENT_SPACE = 1 << 3;
    }
}

impl Default for PostProcess {
    fn default() -> Self {
        Self::TRIANGULATE | Self::FLIP_UVS
    }
}

pub fn apply(scene: &mut Scene, steps: PostProcess) {
    palmx_profiling::profile_function!();

    for mesh in &mut scene.meshes {
        if steps.contains(PostProcess::TRIANGULATE) {
            triangulate(mesh);
        }
        if steps.contains(PostProcess::FLIP_UVS) {
            flip_uvs(mesh);
        }
        if steps.contains(PostProcess::GEN_SMOOTH_NORMALS) && !mesh.has_normals() {
            generate_smooth_normals(mesh);
        }
        if steps.contains(PostProcess::CALC_TANGENT_SPACE) && !mesh.has_tangents() {
            calculate_tangent_space(mesh);
        }
    }
}

pub fn triangulate(mesh: &mut RawMesh) {
    palmx_profiling::profile_function!();

    let faces = std::mem::take(&mut mesh.faces);
    mesh.faces = match mesh.topology {
        Topology::Points | Topology::Lines => {
            if !faces.is_empty() {
                log::warn!(
                    "Dropping {} {:?} faces of mesh \"{}\"",
                    faces.len(),
                    mesh.topology,
                    mesh.name
                );
            }
            Vec::new()
        }
        Topology::Triangles => faces
            .iter()
            .flat_map(|face| {
                let indices = &face.indices;
                (1..indices.len().saturating_sub(1))
                    .map(move |i| Face::triangle(indices[0], indices[i], indices[i + 1]))
            })
            .collect(),
        Topology::TriangleStrip => faces
            .iter()
            .flat_map(|face| {
                let strip = &face.indices;
                (0..strip.len().saturating_sub(2)).map(move |i| {
                    // every other triangle is reversed to keep a consistent winding
                    let odd = i % 2;
                    Face::triangle(strip[i], strip[i + 1 + odd], strip[i + 2 - odd])
                })
            })
            .collect(),
        Topology::TriangleFan => faces
            .iter()
            .flat_map(|face| {
                let fan = &face.indices;
                (0..fan.len().saturating_sub(2))
                    .map(move |i| Face::triangle(fan[0], fan[i + 1], fan[i + 2]))
            })
            .collect(),
    };
    mesh.topology = Topology::Triangles;
}

pub fn flip_uvs(mesh: &mut RawMesh) {
    if let Some(tex_coords) = &mut mesh.tex_coords {
        for tex_coord in tex_coords {
            tex_coord.y = 1.0 - tex_coord.y;
        }
    }
}

pub fn generate_smooth_normals(mesh: &mut RawMesh) {
    palmx_profiling::profile_function!();

    let mut normals = vec![Vec3::ZERO; mesh.positions.len()];
    for face in mesh.faces.iter().filter(|face| face.is_triangle()) {
        let [i0, i1, i2] = [0, 1, 2].map(|i| face.indices[i] as usize);
        let (Some(&p0), Some(&p1), Some(&p2)) = (
            mesh.positions.get(i0),
            mesh.positions.get(i1),
            mesh.positions.get(i2),
        ) else {
            continue;
        };

        // unnormalized, so larger faces weigh more
        let normal = (p1 - p0).cross(p2 - p0);
        normals[i0] += normal;
        normals[i1] += normal;
        normals[i2] += normal;
    }

    for normal in &mut normals {
        *normal = normal.normalize_or_zero();
    }
    mesh.normals = normals;
}

pub fn calculate_tangent_space(mesh: &mut RawMesh) {
    palmx_profiling::profile_function!();

    let vertex_count = mesh.positions.len();
    let Some(tex_coords) = mesh.tex_coords.as_deref() else {
        return;
    };
    if mesh.normals.len() != vertex_count || tex_coords.len() != vertex_count {
        return;
    }

    let faces_supported = mesh.faces.iter().all(|face| {
        matches!(face.indices.len(), 3 | 4)
            && face
                .indices
                .iter()
                .all(|&index| (index as usize) < vertex_count)
    });
    if !faces_supported {
        log::warn!(
            "Mesh \"{}\" has faces that are not triangles or quads, skipping tangent generation",
            mesh.name
        );
        return;
    }

    let mut geometry = TangentSpace {
        positions: &mesh.positions,
        normals: &mesh.normals,
        tex_coords,
        faces: &mesh.faces,
        tangents: vec![Vec3::ZERO; vertex_count],
        bitangents: vec![Vec3::ZERO; vertex_count],
    };

    if mikktspace::generate_tangents(&mut geometry) {
        let TangentSpace {
            tangents,
            bitangents,
            ..
        } = geometry;
        mesh.tangents = tangents;
        mesh.bitangents = bitangents;
    } else {
        log::warn!("Failed to generate tangents for mesh \"{}\"", mesh.name);
    }
}

struct TangentSpace<'a> {
    positions: &'a [Vec3],
    normals: &'a [Vec3],
    tex_coords: &'a [Vec2],
    faces: &'a [Face],
    tangents: Vec<Vec3>,
    bitangents: Vec<Vec3>,
}

impl TangentSpace<'_> {
    fn index(&self, face: usize, vert: usize) -> usize {
        self.faces[face].indices[vert] as usize
    }
}

impl mikktspace::Geometry for TangentSpace<'_> {
    fn num_faces(&self) -> usize {
        self.faces.len()
    }

    fn num_vertices_of_face(&self, face: usize) -> usize {
        self.faces[face].indices.len()
    }

    fn position(&self, face: usize, vert: usize) -> [f32; 3] {
        self.positions[self.index(face, vert)].into()
    }

    fn normal(&self, face: usize, vert: usize) -> [f32; 3] {
        self.normals[self.index(face, vert)].into()
    }

    fn tex_coord(&self, face: usize, vert: usize) -> [f32; 2] {
        self.tex_coords[self.index(face, vert)].into()
    }

    fn set_tangent_encoded(&mut self, tangent: [f32; 4], face: usize, vert: usize) {
        let i = self.index(face, vert);
        let [x, y, z, sign] = tangent;

        self.tangents[i] = Vec3::new(x, y, z);
        self.bitangents[i] = self.normals[i].cross(self.tangents[i]) * sign;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices(mesh: &RawMesh) -> Vec<[u32; 3]> {
        mesh.faces
            .iter()
            .map(|face| [face.indices[0], face.indices[1], face.indices[2]])
            .collect()
    }

    fn quad() -> RawMesh {
        RawMesh {
            name: "quad".to_owned(),
            positions: vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            tex_coords: Some(vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(0.0, 1.0),
            ]),
            faces: vec![Face::new(vec![0, 1, 2, 3])],
            ..Default::default()
        }
    }

    #[test]
    fn default_steps() {
        assert_eq!(
            PostProcess::default(),
            PostProcess::TRIANGULATE | PostProcess::FLIP_UVS
        );
    }

    #[test]
    fn fans_out_polygons() {
        let mut mesh = quad();
        triangulate(&mut mesh);

        assert_eq!(indices(&mesh), [[0, 1, 2], [0, 2, 3]]);
        assert!(mesh.faces.iter().all(Face::is_triangle));
    }

    #[test]
    fn converts_strips_and_fans() {
        let mut strip = RawMesh {
            topology: Topology::TriangleStrip,
            faces: vec![Face::new(vec![0, 1, 2, 3, 4])],
            ..Default::default()
        };
        triangulate(&mut strip);
        assert_eq!(indices(&strip), [[0, 1, 2], [1, 3, 2], [2, 3, 4]]);
        assert_eq!(strip.topology, Topology::Triangles);

        let mut fan = RawMesh {
            topology: Topology::TriangleFan,
            faces: vec![Face::new(vec![0, 1, 2, 3])],
            ..Default::default()
        };
        triangulate(&mut fan);
        assert_eq!(indices(&fan), [[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn drops_points_and_lines() {
        let mut lines = RawMesh {
            topology: Topology::Lines,
            faces: vec![Face::new(vec![0, 1]), Face::new(vec![1, 2])],
            ..Default::default()
        };
        triangulate(&mut lines);

        assert!(lines.faces.is_empty());
    }

    #[test]
    fn flips_v() {
        let mut mesh = quad();
        flip_uvs(&mut mesh);

        let tex_coords = mesh.tex_coords.unwrap();
        assert_eq!(tex_coords[0], Vec2::new(0.0, 1.0));
        assert_eq!(tex_coords[2], Vec2::new(1.0, 0.0));
    }

    #[test]
    fn smooth_normals_face_the_winding() {
        let mut mesh = quad();
        triangulate(&mut mesh);
        generate_smooth_normals(&mut mesh);

        assert_eq!(mesh.normals.len(), 4);
        assert!(mesh
            .normals
            .iter()
            .all(|normal| normal.abs_diff_eq(Vec3::Z, 1e-6)));
    }

    #[test]
    fn tangents_follow_the_uv_axes() {
        let mut mesh = quad();
        mesh.normals = vec![Vec3::Z; 4];
        triangulate(&mut mesh);
        calculate_tangent_space(&mut mesh);

        assert_eq!(mesh.tangents.len(), 4);
        for (tangent, bitangent) in mesh.tangents.iter().zip(&mesh.bitangents) {
            assert!(tangent.abs_diff_eq(Vec3::X, 1e-4), "{tangent}");
            assert!(bitangent.abs_diff_eq(Vec3::Y, 1e-4), "{bitangent}");
        }
    }

    #[test]
    fn apply_respects_existing_normals() {
        let mut mesh = quad();
        mesh.normals = vec![Vec3::NEG_Z; 4];
        let mut scene = Scene {
            meshes: vec![mesh],
            ..Default::default()
        };

        apply(
            &mut scene,
            PostProcess::TRIANGULATE | PostProcess::GEN_SMOOTH_NORMALS,
        );

        assert_eq!(scene.meshes[0].normals, vec![Vec3::NEG_Z; 4]);
        assert_eq!(scene.meshes[0].faces.len(), 2);
    }
}
