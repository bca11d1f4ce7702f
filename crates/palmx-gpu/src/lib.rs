//! GPU resource-allocation service.
//!
//! Everything above this crate talks to the GPU through [`GpuDevice`] and
//! holds plain integer handles. The GPU objects themselves live in the
//! device's arenas.

mod device;
mod frame;
mod handle;
pub mod headless;
pub mod mips;
mod shader;
mod texture;
mod vertex;
mod wgpu_device;

pub use device::{GpuDevice, GpuError, VertexArrayDesc};
pub use frame::{DrawCommand, Frame, RenderTargetConfig};
pub use handle::{ProgramHandle, TextureHandle, VertexArrayHandle};
pub use headless::HeadlessDevice;
pub use shader::{ProgramDesc, ShaderError, ShaderLanguage, ShaderSource, ShaderStage};
pub use texture::{FilterMode, SamplerDesc, TextureDesc, TextureFormat, WrapMode};
pub use vertex::{Vertex, VertexAttribute, VertexFormat, VertexLayout, MAX_BONE_INFLUENCE};
pub use wgpu_device::{WgpuDevice, COLOR_FORMAT, DEPTH_FORMAT};

pub use wgpu;
