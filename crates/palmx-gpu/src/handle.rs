macro_rules! gpu_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            /// Never handed out by a device. Marks a resource that failed to load.
            pub const INVALID: Self = Self(0);

            /// Wraps a raw id allocated by a [`crate::GpuDevice`] implementation.
            pub const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            pub const fn raw(self) -> u32 {
                self.0
            }

            pub const fn is_valid(self) -> bool {
                self.0 != 0
            }
        }
    };
}

gpu_handle!(
    /// A vertex buffer, index buffer and vertex layout uploaded together.
    VertexArrayHandle
);
gpu_handle!(
    /// A sampled 2D texture with its sampler state.
    TextureHandle
);
gpu_handle!(
    /// A linked vertex + fragment program.
    ProgramHandle
);

/// Hands out ids starting at 1 so that 0 stays reserved for invalid handles.
#[derive(Debug, Default)]
pub(crate) struct HandleAllocator {
    last: u32,
}

impl HandleAllocator {
    pub fn allocate(&mut self) -> u32 {
        self.last += 1;
        self.last
    }
}
