//! Name-keyed memoization of GPU textures and shader programs.
//!
//! Every logical name is decoded, compiled and uploaded at most once for the
//! lifetime of a [`ResourceManager`]. Failures are logged and cached as
//! invalid entries so a broken asset is not retried every frame.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use palmx_asset_database::AssetCache;
use palmx_gpu::{
    GpuDevice, ProgramDesc, SamplerDesc, ShaderError, ShaderLanguage, ShaderSource, TextureDesc,
};
use palmx_texture::{
    DecodedImage, ImageCrateDecoder, ImageDecoder, Texture, TextureCreateDesc, TextureError,
};

mod shader;
pub use shader::Shader;

/// Owns the texture and shader caches.
///
/// Methods that can populate a cache take `&mut self`; share one manager
/// across threads by putting it behind a single mutex. There is no eviction:
/// entries live as long as the manager.
pub struct ResourceManager<D = ImageCrateDecoder> {
    decoder: D,
    textures: AssetCache<Texture>,
    shaders: AssetCache<Shader>,
}

impl Default for ResourceManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceManager {
    pub fn new() -> Self {
        Self::with_decoder(ImageCrateDecoder)
    }
}

impl<D: ImageDecoder> ResourceManager<D> {
    pub fn with_decoder(decoder: D) -> Self {
        Self {
            decoder,
            textures: AssetCache::new(),
            shaders: AssetCache::new(),
        }
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// Decodes and uploads the image at `path` unless `name` is already
    /// cached.
    ///
    /// A texture that fails to decode is cached with an invalid handle.
    pub fn load_texture(
        &mut self,
        device: &mut dyn GpuDevice,
        name: &str,
        path: &Path,
    ) -> Arc<Texture> {
        palmx_profiling::profile_function!();

        let decoder = &self.decoder;
        self.textures.get_or_insert_with(name, || {
            upload_texture(device, name, Some(path), decoder.decode(path))
        })
    }

    /// Same as [`Self::load_texture`] for an encoded image already in memory,
    /// such as one embedded in a model file.
    pub fn load_texture_from_memory(
        &mut self,
        device: &mut dyn GpuDevice,
        name: &str,
        bytes: &[u8],
    ) -> Arc<Texture> {
        palmx_profiling::profile_function!();

        let decoder = &self.decoder;
        self.textures.get_or_insert_with(name, || {
            upload_texture(device, name, None, decoder.decode_from_memory(bytes))
        })
    }

    /// Compiles and links a program unless `name` is already cached.
    ///
    /// Compile and link errors are logged and cached as a shader with an
    /// invalid program.
    pub fn load_shader(
        &mut self,
        device: &mut dyn GpuDevice,
        name: &str,
        vertex: ShaderSource<'_>,
        fragment: ShaderSource<'_>,
    ) -> Arc<Shader> {
        palmx_profiling::profile_function!();

        self.shaders
            .get_or_insert_with(name, || link_program(device, name, vertex, fragment))
    }

    /// Reads both stages from disk, picking the language from each file's
    /// extension, then behaves like [`Self::load_shader`].
    pub fn load_shader_from_files(
        &mut self,
        device: &mut dyn GpuDevice,
        name: &str,
        vertex_path: &Path,
        fragment_path: &Path,
    ) -> Arc<Shader> {
        palmx_profiling::profile_function!();

        self.shaders.get_or_insert_with(name, || {
            let sources = read_shader_source(vertex_path)
                .and_then(|vertex| Ok((vertex, read_shader_source(fragment_path)?)));

            match sources {
                Ok(((vertex_language, vertex), (fragment_language, fragment))) => link_program(
                    device,
                    name,
                    ShaderSource {
                        language: vertex_language,
                        code: &vertex,
                    },
                    ShaderSource {
                        language: fragment_language,
                        code: &fragment,
                    },
                ),
                Err(error) => {
                    log::error!("Failed to load shader \"{}\": {}", name, error);
                    Shader::invalid(name)
                }
            }
        })
    }

    pub fn get_texture(&self, name: &str) -> Option<Arc<Texture>> {
        self.textures.get(name)
    }

    pub fn get_shader(&self, name: &str) -> Option<Arc<Shader>> {
        self.shaders.get(name)
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn shader_count(&self) -> usize {
        self.shaders.len()
    }
}

fn upload_texture(
    device: &mut dyn GpuDevice,
    name: &str,
    path: Option<&Path>,
    decoded: Result<DecodedImage, TextureError>,
) -> Texture {
    palmx_profiling::profile_function!();

    let (image, format) = match decoded.and_then(|image| {
        let format = image.format()?;
        Ok((image, format))
    }) {
        Ok(decoded) => decoded,
        Err(error) => {
            log::error!("Failed to load texture \"{}\": {}", name, error);
            return Texture::invalid(name, path);
        }
    };

    let handle = device.create_texture(&TextureDesc {
        label: name,
        width: image.width,
        height: image.height,
        format,
        pixels: &image.pixels,
        sampler: SamplerDesc::REPEAT_TRILINEAR,
    });

    match handle {
        Ok(handle) => Texture::new(TextureCreateDesc {
            name: name.to_owned(),
            path: path.map(PathBuf::from),
            handle,
            format: Some(format),
            width: image.width,
            height: image.height,
        }),
        Err(error) => {
            log::error!("Failed to upload texture \"{}\": {}", name, error);
            Texture::invalid(name, path)
        }
    }
}

fn link_program(
    device: &mut dyn GpuDevice,
    name: &str,
    vertex: ShaderSource<'_>,
    fragment: ShaderSource<'_>,
) -> Shader {
    palmx_profiling::profile_function!();

    match device.create_program(&ProgramDesc {
        label: name,
        vertex,
        fragment,
    }) {
        Ok(program) => {
            log::debug!("Linked shader \"{}\"", name);
            Shader::new(name, program)
        }
        Err(error) => {
            log::error!("Failed to load shader \"{}\": {}", name, error);
            Shader::invalid(name)
        }
    }
}

fn read_shader_source(path: &Path) -> Result<(ShaderLanguage, String), ShaderError> {
    let language = ShaderLanguage::from_extension(path.extension().and_then(|ext| ext.to_str()));
    let code = std::fs::read_to_string(path).map_err(|error| ShaderError::Read {
        path: path.display().to_string(),
        reason: error.to_string(),
    })?;
    Ok((language, code))
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use palmx_gpu::{HeadlessDevice, TextureFormat};

    use super::*;

    /// Hands out solid images with a fixed channel count and counts calls.
    struct CountingDecoder {
        channels: u8,
        calls: Cell<usize>,
    }

    impl CountingDecoder {
        fn new(channels: u8) -> Self {
            Self {
                channels,
                calls: Cell::new(0),
            }
        }

        fn image(&self) -> Result<DecodedImage, TextureError> {
            self.calls.set(self.calls.get() + 1);
            Ok(DecodedImage {
                width: 4,
                height: 4,
                channels: self.channels,
                pixels: vec![200; 4 * 4 * self.channels as usize],
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

    const VERTEX: &str = r#"
        struct Uniforms {
            model: mat4x4<f32>,
            view: mat4x4<f32>,
            projection: mat4x4<f32>,
        };
        @group(0) @binding(0) var<uniform> uniforms: Uniforms;

        @vertex
        fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
            return uniforms.projection * uniforms.view * uniforms.model * vec4<f32>(position, 1.0);
        }
    "#;

    const FRAGMENT: &str = r#"
        @fragment
        fn fs_main() -> @location(0) vec4<f32> {
            return vec4<f32>(1.0);
        }
    "#;

    #[test]
    fn loads_each_texture_name_once() {
        let mut device = HeadlessDevice::new();
        let mut resources = ResourceManager::with_decoder(CountingDecoder::new(4));

        let first = resources.load_texture(&mut device, "wall", Path::new("wall.png"));
        let second = resources.load_texture(&mut device, "wall", Path::new("wall.png"));

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.handle(), second.handle());
        assert_eq!(resources.decoder().calls.get(), 1);
        assert_eq!(device.texture_count(), 1);
        assert_eq!(resources.texture_count(), 1);
    }

    #[test]
    fn selects_format_by_channel_count() {
        let mut device = HeadlessDevice::new();

        for (channels, format) in [
            (1, TextureFormat::R8),
            (3, TextureFormat::Rgb8),
            (4, TextureFormat::Rgba8),
        ] {
            let mut resources = ResourceManager::with_decoder(CountingDecoder::new(channels));
            let texture = resources.load_texture_from_memory(&mut device, "image", &[]);

            assert!(texture.is_valid());
            assert_eq!(texture.format(), Some(format));
            let record = device.texture(texture.handle()).unwrap();
            assert_eq!(record.format, format);
            assert_eq!(record.sampler, SamplerDesc::REPEAT_TRILINEAR);
            assert_eq!(record.mip_level_count, 3);
        }
    }

    #[test]
    fn caches_undecodable_textures_as_invalid() {
        let mut device = HeadlessDevice::new();
        let mut resources = ResourceManager::new();

        let texture = resources.load_texture_from_memory(&mut device, "garbage", b"not a png");
        assert!(!texture.is_valid());
        assert_eq!(device.texture_count(), 0);

        let cached = resources.get_texture("garbage").unwrap();
        assert!(Arc::ptr_eq(&texture, &cached));
    }

    #[test]
    fn unsupported_channel_count_is_invalid() {
        let mut device = HeadlessDevice::new();
        let mut resources = ResourceManager::with_decoder(CountingDecoder::new(2));

        let texture = resources.load_texture(&mut device, "two", Path::new("two.png"));
        assert!(!texture.is_valid());
        assert_eq!(device.texture_count(), 0);
    }

    #[test]
    fn unknown_names_are_none() {
        let resources = ResourceManager::new();

        assert!(resources.get_texture("nothing").is_none());
        assert!(resources.get_shader("nothing").is_none());
    }

    #[test]
    fn links_each_shader_name_once() {
        let mut device = HeadlessDevice::new();
        let mut resources = ResourceManager::new();

        let first = resources.load_shader(
            &mut device,
            "flat",
            ShaderSource::wgsl(VERTEX),
            ShaderSource::wgsl(FRAGMENT),
        );
        let second = resources.load_shader(
            &mut device,
            "flat",
            ShaderSource::wgsl("this would not compile"),
            ShaderSource::wgsl(FRAGMENT),
        );

        assert!(first.is_valid());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(device.program_count(), 1);
        assert_eq!(resources.shader_count(), 1);
    }

    #[test]
    fn caches_broken_shaders_as_invalid() {
        let mut device = HeadlessDevice::new();
        let mut resources = ResourceManager::new();

        let shader = resources.load_shader(
            &mut device,
            "broken",
            ShaderSource::wgsl("@vertex fn vs_main( {"),
            ShaderSource::wgsl(FRAGMENT),
        );

        assert!(!shader.is_valid());
        assert_eq!(shader.name(), "broken");
        assert!(!resources.get_shader("broken").unwrap().is_valid());
        assert_eq!(device.program_count(), 0);
    }

    #[test]
    fn missing_shader_files_are_invalid() {
        let mut device = HeadlessDevice::new();
        let mut resources = ResourceManager::new();

        let shader = resources.load_shader_from_files(
            &mut device,
            "missing",
            Path::new("does/not/exist.wgsl"),
            Path::new("does/not/exist_either.wgsl"),
        );

        assert!(!shader.is_valid());
        assert_eq!(resources.shader_count(), 1);
    }
}
