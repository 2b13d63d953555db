/// Shader compiler stand-in for headless runs
///
/// Sources come from registered in-memory text or, failing that, from the
/// filesystem. Compilation succeeds when the source defines the requested
/// entry point; the "bytecode" is the target followed by the source text.

use std::path::PathBuf;
use std::sync::Mutex;
use rustc_hash::FxHashMap;
use lattice_renderer::lattice::device::{CompileError, ShaderCompiler as RendererShaderCompiler};

use crate::headless_context::lock;

#[derive(Default)]
pub struct ShaderCompiler {
    sources: FxHashMap<String, String>,
    /// Directory file paths are resolved against
    root: Option<PathBuf>,
    compiled: Mutex<Vec<String>>,
}

impl ShaderCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve unregistered paths against `root`
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Register an in-memory source for `path`
    pub fn with_source(mut self, path: &str, source: &str) -> Self {
        self.sources.insert(path.to_string(), source.to_string());
        self
    }

    /// `path:entry` of every successful compilation, in order
    pub fn compiled(&self) -> Vec<String> {
        lock(&self.compiled).clone()
    }

    fn load(&self, path: &str) -> Result<String, CompileError> {
        if let Some(source) = self.sources.get(path) {
            return Ok(source.clone());
        }
        let file = match &self.root {
            Some(root) => root.join(path),
            None => PathBuf::from(path),
        };
        std::fs::read_to_string(&file)
            .map_err(|e| CompileError::new(format!("{}: cannot open source: {}", file.display(), e)))
    }
}

/// Whether `source` declares a function named `entry`
fn defines_entry(source: &str, entry: &str) -> bool {
    source.match_indices(entry).any(|(at, _)| {
        let before = source[..at].chars().next_back();
        let after = source[at + entry.len()..].trim_start().chars().next();
        let boundary = before.map_or(true, |c| !(c.is_alphanumeric() || c == '_'));
        boundary && after == Some('(')
    })
}

impl RendererShaderCompiler for ShaderCompiler {
    fn compile(&self, path: &str, entry: &str, target: &str) -> Result<Vec<u8>, CompileError> {
        let source = self.load(path)?;
        if !defines_entry(&source, entry) {
            return Err(CompileError::new(format!(
                "{}: entry point '{}' not found (target {})",
                path, entry, target
            )));
        }
        lock(&self.compiled).push(format!("{}:{}", path, entry));

        let mut bytecode = Vec::with_capacity(target.len() + 1 + source.len());
        bytecode.extend_from_slice(target.as_bytes());
        bytecode.push(0);
        bytecode.extend_from_slice(source.as_bytes());
        Ok(bytecode)
    }
}

#[cfg(test)]
#[path = "headless_shader_compiler_tests.rs"]
mod tests;
