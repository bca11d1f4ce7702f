use palmx_gpu::ProgramHandle;

/// A linked program registered under a logical name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shader {
    name: String,
    program: ProgramHandle,
}

impl Shader {
    pub fn new(name: &str, program: ProgramHandle) -> Self {
        Self {
            name: name.to_owned(),
            program,
        }
    }

    pub fn invalid(name: &str) -> Self {
        Self::new(name, ProgramHandle::INVALID)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn program(&self) -> ProgramHandle {
        self.program
    }

    pub fn is_valid(&self) -> bool {
        self.program.is_valid()
    }
}
