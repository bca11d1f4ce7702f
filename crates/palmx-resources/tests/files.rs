use std::{fs, sync::Arc};

use image::{ImageFormat, RgbaImage};
use palmx_gpu::{HeadlessDevice, TextureFormat};
use palmx_resources::ResourceManager;

const VERTEX: &str = r#"
@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(position, 1.0);
}
"#;

const FRAGMENT: &str = r#"
@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(0.5, 0.5, 0.5, 1.0);
}
"#;

const GLSL_VERTEX: &str = "#version 440
layout(location = 0) in vec3 position;

void main() {
    gl_Position = vec4(position, 1.0);
}
";

const GLSL_FRAGMENT: &str = "#version 440
layout(location = 0) out vec4 color;

void main() {
    color = vec4(0.5, 0.5, 0.5, 1.0);
}
";

#[test]
fn loads_png_textures_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("checker.png");
    RgbaImage::from_fn(8, 4, |x, y| {
        if (x + y) % 2 == 0 {
            image::Rgba([255, 255, 255, 255])
        } else {
            image::Rgba([0, 0, 0, 255])
        }
    })
    .save_with_format(&path, ImageFormat::Png)
    .unwrap();

    let mut device = HeadlessDevice::new();
    let mut resources = ResourceManager::new();
    let texture = resources.load_texture(&mut device, "checker", &path);

    assert!(texture.is_valid());
    assert_eq!((texture.width(), texture.height()), (8, 4));
    assert_eq!(texture.format(), Some(TextureFormat::Rgba8));
    assert_eq!(texture.path(), Some(path.as_path()));
    assert_eq!(device.texture(texture.handle()).unwrap().mip_level_count, 4);

    let cached = resources.get_texture("checker").unwrap();
    assert!(Arc::ptr_eq(&texture, &cached));
}

#[test]
fn missing_texture_file_is_cached_invalid() {
    let dir = tempfile::tempdir().unwrap();

    let mut device = HeadlessDevice::new();
    let mut resources = ResourceManager::new();
    let texture = resources.load_texture(&mut device, "missing", &dir.path().join("missing.png"));

    assert!(!texture.is_valid());
    assert_eq!(resources.texture_count(), 1);
    assert_eq!(device.texture_count(), 0);
}

#[test]
fn loads_shaders_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let vertex_path = dir.path().join("flat.vert.wgsl");
    let fragment_path = dir.path().join("flat.frag.wgsl");
    fs::write(&vertex_path, VERTEX).unwrap();
    fs::write(&fragment_path, FRAGMENT).unwrap();

    let mut device = HeadlessDevice::new();
    let mut resources = ResourceManager::new();
    let shader = resources.load_shader_from_files(&mut device, "flat", &vertex_path, &fragment_path);

    assert!(shader.is_valid());
    assert_eq!(device.program(shader.program()).unwrap().label, "flat");

    let again = resources.load_shader_from_files(&mut device, "flat", &vertex_path, &fragment_path);
    assert!(Arc::ptr_eq(&shader, &again));
    assert_eq!(device.program_count(), 1);
}

#[test]
fn glsl_files_are_picked_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let vertex_path = dir.path().join("flat.vert");
    let fragment_path = dir.path().join("flat.frag");
    let broken_path = dir.path().join("broken.frag");
    fs::write(&vertex_path, GLSL_VERTEX).unwrap();
    fs::write(&fragment_path, GLSL_FRAGMENT).unwrap();
    fs::write(&broken_path, "#version 440\nvoid main( {\n").unwrap();

    let mut device = HeadlessDevice::new();
    let mut resources = ResourceManager::new();
    let shader = resources.load_shader_from_files(&mut device, "flat", &vertex_path, &fragment_path);
    assert!(shader.is_valid());

    let broken = resources.load_shader_from_files(&mut device, "broken", &vertex_path, &broken_path);
    assert!(!broken.is_valid());
    assert_eq!(resources.shader_count(), 2);
    assert_eq!(device.program_count(), 1);
}
