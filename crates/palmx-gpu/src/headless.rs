//! A device without a GPU. It allocates handles, keeps a record of every
//! upload and validates shader sources with naga, which makes it usable for
//! asset validation tools and for tests.

use std::collections::HashMap;

use crate::{
    handle::HandleAllocator,
    mips::mip_level_count,
    shader::{check_entry_point, validate_stage},
    Frame, GpuDevice, GpuError, ProgramDesc, ProgramHandle, SamplerDesc, ShaderError,
    ShaderStage, TextureDesc, TextureFormat, TextureHandle, VertexArrayDesc, VertexArrayHandle,
    VertexLayout,
};

#[derive(Debug, Clone)]
pub struct VertexArrayRecord {
    pub label: String,
    pub layout: &'static VertexLayout,
    pub vertex_count: usize,
    pub index_count: usize,
}

#[derive(Debug, Clone)]
pub struct TextureRecord {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub mip_level_count: u32,
    pub sampler: SamplerDesc,
}

#[derive(Debug, Clone)]
pub struct ProgramRecord {
    pub label: String,
}

#[derive(Debug, Default)]
pub struct HeadlessDevice {
    handles: HandleAllocator,
    vertex_arrays: HashMap<VertexArrayHandle, VertexArrayRecord>,
    textures: HashMap<TextureHandle, TextureRecord>,
    programs: HashMap<ProgramHandle, ProgramRecord>,
    frames_submitted: usize,
    draws_submitted: usize,
    draws_skipped: usize,
}

impl HeadlessDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_array(&self, handle: VertexArrayHandle) -> Option<&VertexArrayRecord> {
        self.vertex_arrays.get(&handle)
    }

    pub fn texture(&self, handle: TextureHandle) -> Option<&TextureRecord> {
        self.textures.get(&handle)
    }

    pub fn program(&self, handle: ProgramHandle) -> Option<&ProgramRecord> {
        self.programs.get(&handle)
    }

    pub fn vertex_array_count(&self) -> usize {
        self.vertex_arrays.len()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn program_count(&self) -> usize {
        self.programs.len()
    }

    pub fn frames_submitted(&self) -> usize {
        self.frames_submitted
    }

    pub fn draws_submitted(&self) -> usize {
        self.draws_submitted
    }

    pub fn draws_skipped(&self) -> usize {
        self.draws_skipped
    }
}

impl GpuDevice for HeadlessDevice {
    fn create_vertex_array(&mut self, desc: &VertexArrayDesc<'_>) -> VertexArrayHandle {
        palmx_profiling::profile_function!();

        let handle = VertexArrayHandle::from_raw(self.handles.allocate());
        self.vertex_arrays.insert(
            handle,
            VertexArrayRecord {
                label: desc.label.to_owned(),
                layout: desc.layout,
                vertex_count: desc.vertex_count(),
                index_count: desc.indices.len(),
            },
        );
        handle
    }

    fn create_texture(&mut self, desc: &TextureDesc<'_>) -> Result<TextureHandle, GpuError> {
        palmx_profiling::profile_function!();

        desc.validate()?;

        let handle = TextureHandle::from_raw(self.handles.allocate());
        self.textures.insert(
            handle,
            TextureRecord {
                label: desc.label.to_owned(),
                width: desc.width,
                height: desc.height,
                format: desc.format,
                mip_level_count: if desc.sampler.generate_mipmaps {
                    mip_level_count(desc.width, desc.height)
                } else {
                    1
                },
                sampler: desc.sampler,
            },
        );
        Ok(handle)
    }

    fn create_program(&mut self, desc: &ProgramDesc<'_>) -> Result<ProgramHandle, ShaderError> {
        palmx_profiling::profile_function!();

        let vertex = validate_stage(&desc.vertex, ShaderStage::Vertex)?;
        let fragment = validate_stage(&desc.fragment, ShaderStage::Fragment)?;
        check_entry_point(&vertex, ShaderStage::Vertex)?;
        check_entry_point(&fragment, ShaderStage::Fragment)?;

        let handle = ProgramHandle::from_raw(self.handles.allocate());
        self.programs.insert(
            handle,
            ProgramRecord {
                label: desc.label.to_owned(),
            },
        );
        Ok(handle)
    }

    fn submit(&mut self, frame: &Frame) {
        self.frames_submitted += 1;

        for draw in frame.draws() {
            if self.programs.contains_key(&draw.program)
                && self.vertex_arrays.contains_key(&draw.vertex_array)
            {
                self.draws_submitted += 1;
            } else {
                self.draws_skipped += 1;
            }
        }
    }
}
