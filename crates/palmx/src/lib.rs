#![doc(html_no_source)]

mod palmx;
pub use palmx::Palmx;

// Reexport all crates
pub use palmx_asset_database;
pub use palmx_camera;
pub use palmx_gpu;
pub use palmx_model;
pub use palmx_profiling;
pub use palmx_resources;
pub use palmx_texture;
pub use palmx_transform;
