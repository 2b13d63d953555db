/// Renderer configuration
///
/// All deployment-time tuning knobs of the renderer live here: ring depth,
/// handle pool capacities, fence timeout and the names of the built-in
/// shaders. Pool capacities are not recoverable at runtime; size them for
/// the largest scene the application will build.

use std::time::Duration;
use crate::error::{Error, Result};
use crate::graphics_device::HandleKind;

/// Per-kind handle pool capacities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleCapacities {
    /// Render-target views (one per back buffer + one per render-target mip)
    pub render_target: u32,
    /// Depth-stencil views (one per render target)
    pub depth_stencil: u32,
    /// Shader-visible views (one per texture mip + one per render-target mip)
    pub shader_resource: u32,
    /// Samplers
    pub sampler: u32,
}

impl HandleCapacities {
    /// Same capacity for every kind
    pub fn uniform(capacity: u32) -> Self {
        Self {
            render_target: capacity,
            depth_stencil: capacity,
            shader_resource: capacity,
            sampler: capacity,
        }
    }

    /// Capacity for one kind
    pub fn get(&self, kind: HandleKind) -> u32 {
        match kind {
            HandleKind::RenderTarget => self.render_target,
            HandleKind::DepthStencil => self.depth_stencil,
            HandleKind::ShaderResource => self.shader_resource,
            HandleKind::Sampler => self.sampler,
        }
    }
}

impl Default for HandleCapacities {
    fn default() -> Self {
        Self::uniform(1024)
    }
}

/// Renderer configuration
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Application name (logged when the renderer starts)
    pub app_name: String,
    /// Presentation surface width in pixels
    pub width: u32,
    /// Presentation surface height in pixels
    pub height: u32,
    /// Number of back buffers, which is also the frame ring depth
    pub buffer_count: usize,
    /// Handle pool capacities
    pub handle_capacities: HandleCapacities,
    /// Upper bound on a single fence wait before the device is declared lost
    pub fence_timeout: Duration,
    /// Edge length of the fallback texture bound when a unit has no usable texture
    pub dummy_texture_size: u32,
    /// Shader used by the mipmap generator
    pub mipmap_shader: String,
    /// Vertex stage entry point
    pub vertex_entry: String,
    /// Vertex stage compile target
    pub vertex_target: String,
    /// Pixel stage entry point
    pub pixel_entry: String,
    /// Pixel stage compile target
    pub pixel_target: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            app_name: "Lattice Application".to_string(),
            width: 720,
            height: 480,
            buffer_count: 2,
            handle_capacities: HandleCapacities::default(),
            fence_timeout: Duration::from_secs(5),
            dummy_texture_size: 256,
            mipmap_shader: "genmipmap.hlsl".to_string(),
            vertex_entry: "VSMain".to_string(),
            vertex_target: "vs_5_0".to_string(),
            pixel_entry: "PSMain".to_string(),
            pixel_target: "ps_5_0".to_string(),
        }
    }
}

impl RendererConfig {
    /// Check the configuration before any GPU object is created
    pub fn validate(&self) -> Result<()> {
        if self.buffer_count == 0 {
            return Err(Error::InitializationFailed(
                "buffer_count must be at least 1".to_string(),
            ));
        }
        if self.width == 0 || self.height == 0 {
            return Err(Error::InitializationFailed(format!(
                "surface size must be non-zero (got {}x{})",
                self.width, self.height
            )));
        }
        for kind in HandleKind::ALL {
            if self.handle_capacities.get(kind) == 0 {
                return Err(Error::InitializationFailed(format!(
                    "handle capacity for {:?} must be non-zero",
                    kind
                )));
            }
        }
        if self.dummy_texture_size == 0 {
            return Err(Error::InitializationFailed(
                "dummy_texture_size must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
