use std::path::{Path, PathBuf};

/// Directory a model's relative texture references are resolved against.
pub fn asset_directory(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

/// Joins a texture reference found inside a model file onto the model's
/// directory.
///
/// Exporters on Windows write `\` separators and glTF writes percent-encoded
/// URIs, both are normalized here. Absolute references are kept as they are.
pub fn resolve_asset_path(directory: &Path, reference: &str) -> PathBuf {
    let reference = percent_decode(&reference.replace('\\', "/"));
    let reference = Path::new(&reference);

    if reference.is_absolute() {
        reference.to_path_buf()
    } else {
        directory.join(reference)
    }
}

fn percent_decode(value: &str) -> String {
    percent_encoding::percent_decode_str(value)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| value.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_of_model() {
        assert_eq!(
            asset_directory(Path::new("assets/models/crate/crate.gltf")),
            PathBuf::from("assets/models/crate")
        );
        assert_eq!(asset_directory(Path::new("crate.gltf")), PathBuf::new());
    }

    #[test]
    fn joins_relative_references() {
        let directory = Path::new("assets/models/crate");
        assert_eq!(
            resolve_asset_path(directory, "textures\\albedo.png"),
            PathBuf::from("assets/models/crate/textures/albedo.png")
        );
        assert_eq!(
            resolve_asset_path(directory, "wood%20planks.png"),
            PathBuf::from("assets/models/crate/wood planks.png")
        );
    }

    #[test]
    fn keeps_malformed_escapes() {
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("a%zzb"), "a%zzb");
    }

    #[test]
    fn decodes_multibyte_escapes() {
        assert_eq!(percent_decode("caf%C3%A9.png"), "café.png");
        assert_eq!(percent_decode("bad%FF.png"), "bad%FF.png");
    }
}
