use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use clap::Parser;
use glam::{Quat, Vec3, Vec4};
use image::{imageops::FilterType, RgbaImage};
use palmx::palmx_camera::Camera;
use palmx::palmx_gpu::{Frame, GpuDevice, RenderTargetConfig, WgpuDevice};
use palmx::palmx_model::{Bounds, ModelLoader, PostProcess, Primitive};
use palmx::palmx_resources::ResourceManager;
use palmx::palmx_transform::{Transform, UP};
use palmx::Palmx;

const CLEAR_COLOR: [f32; 4] = [0.08, 0.06, 0.1, 1.0];
const FLOOR_COLOR: Vec4 = Vec4::new(0.35, 0.33, 0.3, 1.0);

#[derive(Parser, Debug)]
#[command(version, about = "Renders a model into the low-res target and saves it as a PNG", long_about = None)]
struct Args {
    /// glTF or GLB file to render
    model: PathBuf,

    /// Vertex shader, WGSL or GLSL by extension
    #[arg(long, default_value = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/shaders/model.vert.wgsl"))]
    vertex_shader: PathBuf,

    /// Fragment shader, WGSL or GLSL by extension
    #[arg(long, default_value = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/shaders/model.frag.wgsl"))]
    fragment_shader: PathBuf,

    /// Where to write the rendered image
    #[arg(short, long, default_value = "model-viewer.png")]
    output: PathBuf,

    /// Width of the low-res render target
    #[arg(long, default_value_t = 320)]
    width: u32,

    /// Height of the low-res render target
    #[arg(long, default_value_t = 240)]
    height: u32,

    /// Nearest-neighbour upscale factor applied before saving
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..=16))]
    scale: u32,

    /// Generate smooth normals for meshes without normals
    #[arg(long, default_value_t = false)]
    gen_normals: bool,

    /// Generate tangents for normal mapping
    #[arg(long, default_value_t = false)]
    tangents: bool,

    /// Draw a flat colored slab under the model
    #[arg(long, default_value_t = false)]
    floor: bool,

    /// Collect puffin profiling scopes
    #[arg(long, default_value_t = false)]
    profile: bool,
}

impl Args {
    fn post_process(&self) -> PostProcess {
        let mut post_process = PostProcess::default();
        post_process.set(PostProcess::GEN_SMOOTH_NORMALS, self.gen_normals);
        post_process.set(PostProcess::CALC_TANGENT_SPACE, self.tangents);
        post_process
    }

    fn render_target(&self) -> RenderTargetConfig {
        RenderTargetConfig {
            width: self.width.max(1),
            height: self.height.max(1),
        }
    }
}

/// Places a camera in front of `bounds`, slightly above, so the whole model
/// is in view.
fn frame_camera(bounds: &Bounds, aspect_ratio: f32) -> Camera {
    let center = bounds.center();
    let radius = (bounds.extent().length() * 0.5).max(0.01);

    let mut camera = Camera::default();
    let half_fov = (camera.get_fov() * 0.5).to_radians();
    let distance = radius / half_fov.sin() * 1.1;

    camera.transform = Transform::from_translation(
        center + Vec3::new(0.0, 0.35, 1.0).normalize() * distance,
    );
    camera.look_at(center, UP);
    camera.set_near((distance - radius * 1.05).max(radius * 0.01));
    camera.set_far(distance + radius * 2.0);
    camera.set_aspect_ratio(aspect_ratio);
    camera
}

/// A thin slab under `bounds`, a bit wider than the model.
fn floor_transform(bounds: &Bounds) -> Transform {
    let extent = bounds.extent().max(Vec3::splat(0.01));
    let size = extent.x.max(extent.z) * 1.5;
    let thickness = size * 0.02;
    let center = bounds.center();

    Transform::new(
        Vec3::new(center.x, bounds.min.y - thickness * 0.5, center.z),
        Quat::IDENTITY,
        Vec3::new(size, thickness, size),
    )
}

pub fn internal_main() -> Result<()> {
    let args = Args::parse();
    let _palmx = Palmx::new("Model Viewer");
    palmx::palmx_profiling::set_enabled(args.profile);

    let config = args.render_target();
    let mut device = WgpuDevice::new_headless(config)?;
    let mut resources = ResourceManager::new();

    let shader = resources.load_shader_from_files(
        &mut device,
        "model",
        &args.vertex_shader,
        &args.fragment_shader,
    );
    if !shader.is_valid() {
        bail!("Shader \"{}\" failed to load", shader.name());
    }

    let model = ModelLoader::new()
        .with_post_process(args.post_process())
        .load(&args.model, &mut resources, &mut device);
    let bounds = model
        .bounds()
        .ok_or_else(|| anyhow!("Nothing to render in {}", args.model.display()))?;

    let camera = frame_camera(&bounds, config.aspect_ratio());
    let mut frame = Frame::new(camera.view_matrix(), camera.projection_matrix())
        .with_clear_color(CLEAR_COLOR);
    model.draw(&shader, &mut frame);
    if args.floor {
        let mut floor = Primitive::cube(&mut device).with_color(FLOOR_COLOR);
        floor.transform = floor_transform(&bounds);
        floor.draw(&shader, &mut frame);
    }
    device.submit(&frame);
    palmx::palmx_profiling::new_frame();

    let pixels = device.read_render_target()?;
    let image = RgbaImage::from_raw(config.width, config.height, pixels)
        .ok_or_else(|| anyhow!("Render target readback has the wrong size"))?;
    let image = image::imageops::resize(
        &image,
        config.width * args.scale,
        config.height * args.scale,
        FilterType::Nearest,
    );
    image.save(&args.output)?;

    log::info!(
        "Rendered {} meshes ({} textures) to {}",
        model.meshes().len(),
        resources.texture_count(),
        args.output.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_defaults() {
        let args = Args::try_parse_from(["model-viewer", "scene.glb"]).unwrap();

        assert_eq!(args.model, PathBuf::from("scene.glb"));
        assert_eq!(args.render_target(), RenderTargetConfig::default());
        assert_eq!(args.scale, 3);
        assert_eq!(args.post_process(), PostProcess::default());
        assert!(args.vertex_shader.ends_with("model.vert.wgsl"));
    }

    #[test]
    fn post_process_toggles() {
        let args =
            Args::try_parse_from(["model-viewer", "scene.glb", "--gen-normals", "--tangents"])
                .unwrap();

        assert!(args.post_process().contains(
            PostProcess::TRIANGULATE
                | PostProcess::FLIP_UVS
                | PostProcess::GEN_SMOOTH_NORMALS
                | PostProcess::CALC_TANGENT_SPACE
        ));
    }

    #[test]
    fn rejects_zero_scale() {
        assert!(Args::try_parse_from(["model-viewer", "scene.glb", "--scale", "0"]).is_err());
    }

    #[test]
    fn framed_model_is_centered_and_inside_the_depth_range() {
        let bounds = Bounds {
            min: Vec3::new(-1.0, 0.0, -2.0),
            max: Vec3::new(3.0, 4.0, 2.0),
        };
        let camera = frame_camera(&bounds, 4.0 / 3.0);
        let view_projection = camera.projection_matrix() * camera.view_matrix();

        let center = view_projection.project_point3(bounds.center());
        assert!(center.x.abs() < 1e-4 && center.y.abs() < 1e-4);
        assert!(center.z > 0.0 && center.z < 1.0);

        for corner in [bounds.min, bounds.max] {
            let depth = view_projection.project_point3(corner).z;
            assert!((0.0..=1.0).contains(&depth), "{depth}");
        }
    }

    #[test]
    fn floor_sits_under_the_model() {
        let bounds = Bounds {
            min: Vec3::new(-1.0, 0.5, -2.0),
            max: Vec3::new(3.0, 4.0, 2.0),
        };
        let floor = floor_transform(&bounds).matrix();

        let top = floor.transform_point3(Vec3::new(0.0, 0.5, 0.0));
        assert!((top.y - bounds.min.y).abs() < 1e-5);
        let corner = floor.transform_point3(Vec3::splat(0.5));
        assert!(corner.x >= bounds.max.x && corner.z >= bounds.max.z);
    }

    #[test]
    fn bundled_shaders_link() {
        use palmx::palmx_gpu::HeadlessDevice;

        let args = Args::try_parse_from(["model-viewer", "scene.glb"]).unwrap();
        let mut device = HeadlessDevice::new();
        let mut resources = ResourceManager::new();
        let shader = resources.load_shader_from_files(
            &mut device,
            "model",
            &args.vertex_shader,
            &args.fragment_shader,
        );

        assert!(shader.is_valid());
    }
}
