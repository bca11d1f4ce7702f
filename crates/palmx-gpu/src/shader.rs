use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => f.write_str("vertex"),
            Self::Fragment => f.write_str("fragment"),
        }
    }
}

impl From<ShaderStage> for naga::ShaderStage {
    fn from(stage: ShaderStage) -> Self {
        match stage {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderLanguage {
    Wgsl,
    /// Desktop GLSL, `#version 440` or newer.
    Glsl,
}

impl ShaderLanguage {
    /// `.wgsl` files are WGSL, every other extension is treated as GLSL.
    pub fn from_extension(extension: Option<&str>) -> Self {
        match extension {
            Some(extension) if extension.eq_ignore_ascii_case("wgsl") => Self::Wgsl,
            _ => Self::Glsl,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ShaderSource<'a> {
    pub language: ShaderLanguage,
    pub code: &'a str,
}

impl<'a> ShaderSource<'a> {
    pub fn wgsl(code: &'a str) -> Self {
        Self {
            language: ShaderLanguage::Wgsl,
            code,
        }
    }

    pub fn glsl(code: &'a str) -> Self {
        Self {
            language: ShaderLanguage::Glsl,
            code,
        }
    }
}

/// A vertex + fragment pair linked against [`crate::Vertex::LAYOUT`].
///
/// Programs see the per-draw uniforms (`model`, `view`, `projection`) at
/// group 0 binding 0, and the albedo texture/sampler and normal
/// texture/sampler at group 1 bindings 0 to 3.
pub struct ProgramDesc<'a> {
    pub label: &'a str,
    pub vertex: ShaderSource<'a>,
    pub fragment: ShaderSource<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShaderError {
    #[error("failed to compile {stage} shader: {log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("failed to link program: {log}")]
    Link { log: String },
    #[error("failed to read shader source {path}: {reason}")]
    Read { path: String, reason: String },
}

/// Parses and validates a single stage with naga, the same front-ends wgpu
/// uses internally.
pub(crate) fn validate_stage(
    source: &ShaderSource<'_>,
    stage: ShaderStage,
) -> Result<naga::Module, ShaderError> {
    palmx_profiling::profile_function!();

    let module = match source.language {
        ShaderLanguage::Wgsl => {
            naga::front::wgsl::parse_str(source.code).map_err(|error| ShaderError::Compile {
                stage,
                log: error.emit_to_string(source.code),
            })?
        }
        ShaderLanguage::Glsl => naga::front::glsl::Frontend::default()
            .parse(&naga::front::glsl::Options::from(naga::ShaderStage::from(stage)), source.code)
            .map_err(|errors| ShaderError::Compile {
                stage,
                log: errors
                    .errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("\n"),
            })?,
    };

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    )
    .validate(&module)
    .map_err(|error| ShaderError::Compile {
        stage,
        log: error.as_inner().to_string(),
    })?;

    Ok(module)
}

/// Linking fails when a stage's module has no entry point for that stage.
pub(crate) fn check_entry_point(
    module: &naga::Module,
    stage: ShaderStage,
) -> Result<(), ShaderError> {
    let naga_stage: naga::ShaderStage = stage.into();
    if module
        .entry_points
        .iter()
        .any(|entry_point| entry_point.stage == naga_stage)
    {
        Ok(())
    } else {
        Err(ShaderError::Link {
            log: format!("{stage} source has no {stage} entry point"),
        })
    }
}
