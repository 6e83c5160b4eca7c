//! Pipeline descriptors.

/// Compiled shader bytecode plus its entry point.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShaderBytecode {
    /// Backend-native bytecode (SPIR-V, DXIL, metallib).
    pub bytes: Vec<u8>,
    /// Entry point name.
    pub entry_point: String,
}

impl ShaderBytecode {
    /// Create bytecode with the `main` entry point.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            entry_point: "main".to_string(),
        }
    }

    /// Set the entry point name.
    pub fn with_entry_point(mut self, entry_point: impl Into<String>) -> Self {
        self.entry_point = entry_point.into();
        self
    }

    /// Returns true if there is no bytecode.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Descriptor for creating a compute pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComputePipelineDescriptor {
    /// Debug label for the pipeline.
    pub label: Option<String>,
    /// Compute shader.
    pub compute_shader: ShaderBytecode,
}

impl ComputePipelineDescriptor {
    /// Create a compute pipeline descriptor.
    pub fn new(compute_shader: ShaderBytecode) -> Self {
        Self {
            label: None,
            compute_shader,
        }
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}
