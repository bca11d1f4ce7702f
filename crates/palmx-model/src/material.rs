use std::{fmt, sync::Arc};

use palmx_texture::Texture;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    Diffuse,
    Specular,
    Normal,
    Emissive,
    AmbientOcclusion,
    MetallicRoughness,
}

impl TextureKind {
    /// The kinds a mesh's material resolves into GPU textures.
    pub const RESOLVED: [Self; 3] = [Self::Diffuse, Self::Specular, Self::Normal];

    /// Sampler name used for this kind in shaders.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Diffuse => "texture_diffuse",
            Self::Specular => "texture_specular",
            Self::Normal => "texture_normal",
            Self::Emissive => "texture_emissive",
            Self::AmbientOcclusion => "texture_ambient_occlusion",
            Self::MetallicRoughness => "texture_metallic_roughness",
        }
    }
}

impl fmt::Display for TextureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

#[derive(Debug, Clone)]
pub struct MaterialTexture {
    pub kind: TextureKind,
    pub texture: Arc<Texture>,
}

/// Textures of a mesh in the order they were resolved. The textures are
/// shared with the resource cache.
#[derive(Debug, Clone, Default)]
pub struct Material {
    name: String,
    textures: Vec<MaterialTexture>,
}

impl Material {
    pub fn new(name: &str, textures: Vec<MaterialTexture>) -> Self {
        Self {
            name: name.to_owned(),
            textures,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn textures(&self) -> &[MaterialTexture] {
        &self.textures
    }

    pub fn textures_of_kind(&self, kind: TextureKind) -> impl Iterator<Item = &Arc<Texture>> {
        self.textures
            .iter()
            .filter(move |texture| texture.kind == kind)
            .map(|texture| &texture.texture)
    }

    pub fn first(&self, kind: TextureKind) -> Option<&Arc<Texture>> {
        self.textures_of_kind(kind).next()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names() {
        let names = TextureKind::RESOLVED.map(|kind| kind.type_name());
        assert_eq!(names, ["texture_diffuse", "texture_specular", "texture_normal"]);
    }

    #[test]
    fn first_texture_of_kind() {
        let albedo = Arc::new(Texture::invalid("albedo", None));
        let detail = Arc::new(Texture::invalid("detail", None));
        let material = Material::new(
            "stone",
            vec![
                MaterialTexture {
                    kind: TextureKind::Diffuse,
                    texture: albedo.clone(),
                },
                MaterialTexture {
                    kind: TextureKind::Diffuse,
                    texture: detail,
                },
            ],
        );

        assert!(Arc::ptr_eq(material.first(TextureKind::Diffuse).unwrap(), &albedo));
        assert!(material.first(TextureKind::Normal).is_none());
        assert_eq!(material.textures_of_kind(TextureKind::Diffuse).count(), 2);
    }
}
