/// Shader compiler collaborator

use std::fmt;

/// Shader stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Pixel,
}

/// Compiler diagnostic returned when a shader fails to build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    /// Compiler output
    pub message: String,
}

impl CompileError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CompileError {}

/// Offline/online shader compiler
///
/// The renderer calls this once per stage when a draw unit names a shader
/// that has no pipeline yet.
pub trait ShaderCompiler: Send + Sync {
    /// Compile one stage of a shader source file
    ///
    /// # Arguments
    ///
    /// * `path` - Shader source path (also the pipeline cache key)
    /// * `entry` - Entry point name (e.g. "VSMain")
    /// * `target` - Compile target profile (e.g. "vs_5_0")
    fn compile(&self, path: &str, entry: &str, target: &str) -> std::result::Result<Vec<u8>, CompileError>;
}
