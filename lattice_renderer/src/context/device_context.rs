/// Device context - owns the backend device, the presentation chain and the handle pools
///
/// Every GPU object the renderer creates goes through this type. Creation
/// failures are logged here and returned as typed errors so the caller can
/// mark the owning node unusable.

use std::sync::Arc;
use crate::config::RendererConfig;
use crate::context::HandlePools;
use crate::error::{Error, Result};
use crate::graphics_device::{
    Buffer, BufferDesc, BufferUsage, CommandList, DeviceStats, Fence, GraphicsDevice,
    Handle, HandleKind, Pipeline, PipelineDesc, SurfaceHandle, Swapchain, SwapchainDesc,
    Texture, TextureDesc, TextureFormat, ViewDesc,
};
use crate::{lattice_error, lattice_info};

/// Format of the presentation chain and of render-target nodes
pub const BACK_BUFFER_FORMAT: TextureFormat = TextureFormat::R8G8B8A8_UNORM;

pub struct DeviceContext {
    device: Box<dyn GraphicsDevice>,
    swapchain: Box<dyn Swapchain>,
    pools: HandlePools,
    back_buffer_views: Vec<Handle>,
}

impl DeviceContext {
    /// Create the descriptor tables, the swapchain and one view per back buffer
    ///
    /// # Arguments
    ///
    /// * `device` - Backend device (takes ownership)
    /// * `surface` - Surface the swapchain presents to
    /// * `config` - Surface size, ring depth and pool capacities
    pub fn new(
        mut device: Box<dyn GraphicsDevice>,
        surface: SurfaceHandle,
        config: &RendererConfig,
    ) -> Result<Self> {
        config.validate()?;

        let pools = HandlePools::new(|kind| {
            device.create_descriptor_table(kind, config.handle_capacities.get(kind))
        })
        .map_err(|e| Error::InitializationFailed(format!("descriptor tables: {}", e)))?;

        let swapchain = device
            .create_swapchain(
                surface,
                &SwapchainDesc {
                    width: config.width,
                    height: config.height,
                    buffer_count: config.buffer_count,
                    format: BACK_BUFFER_FORMAT,
                },
            )
            .map_err(|e| Error::InitializationFailed(format!("swapchain: {}", e)))?;

        let mut context = Self {
            device,
            swapchain,
            pools,
            back_buffer_views: Vec::with_capacity(config.buffer_count),
        };

        for index in 0..context.swapchain.buffer_count() {
            let back_buffer = context.swapchain.back_buffer(index)?;
            let view = context.create_view(&ViewDesc::RenderTarget {
                texture: back_buffer.as_ref(),
                mip_level: 0,
            })?;
            context.back_buffer_views.push(view);
        }

        lattice_info!(
            "lattice::DeviceContext",
            "Device context created ({}x{}, {} back buffers)",
            config.width,
            config.height,
            context.back_buffer_views.len()
        );

        Ok(context)
    }

    // ===== RESOURCE CREATION =====

    /// Create a committed buffer
    pub fn create_buffer(&mut self, label: &str, size: u64, usage: BufferUsage) -> Result<Arc<dyn Buffer>> {
        let desc = BufferDesc { label: label.to_string(), size, usage };
        self.device
            .create_buffer(&desc)
            .map_err(|e| creation_failed(label, e))
    }

    /// Create a committed texture
    pub fn create_texture(&mut self, desc: &TextureDesc) -> Result<Arc<dyn Texture>> {
        self.device
            .create_texture(desc)
            .map_err(|e| creation_failed(&desc.label, e))
    }

    /// Allocate a handle of the kind selected by `desc` and write the view into it
    ///
    /// The handle is returned to its pool if the device rejects the view.
    pub fn create_view(&mut self, desc: &ViewDesc<'_>) -> Result<Handle> {
        let handle = self.pools.get_mut(desc.kind()).try_alloc()?;
        if let Err(error) = self.device.write_view(desc, &handle) {
            lattice_error!("lattice::DeviceContext", "Failed to write {:?} view: {}", desc.kind(), error);
            self.pools.free(&handle)?;
            return Err(error);
        }
        Ok(handle)
    }

    /// Return a view handle to its pool
    pub fn free_view(&mut self, handle: &Handle) -> Result<()> {
        self.pools.free(handle)
    }

    /// Build a graphics pipeline
    pub fn create_pipeline(&mut self, desc: &PipelineDesc) -> Result<Arc<dyn Pipeline>> {
        self.device.create_pipeline(desc).map_err(|e| {
            if e.is_device_lost() {
                return e;
            }
            lattice_error!("lattice::DeviceContext", "Failed to build pipeline '{}': {}", desc.label, e);
            Error::ShaderCompileFailed { shader: desc.label.clone(), message: e.to_string() }
        })
    }

    pub fn create_command_list(&mut self) -> Result<Box<dyn CommandList>> {
        self.device.create_command_list()
    }

    pub fn create_fence(&mut self, initial_value: u64) -> Result<Arc<dyn Fence>> {
        self.device.create_fence(initial_value)
    }

    /// Device health check
    pub fn check_device(&self) -> Result<()> {
        self.device.device_status()
    }

    /// Backend device (used by the frame ring to submit)
    pub fn device_mut(&mut self) -> &mut dyn GraphicsDevice {
        self.device.as_mut()
    }

    pub fn stats(&self) -> DeviceStats {
        self.device.stats()
    }

    // ===== HANDLE POOLS =====

    pub fn pools(&self) -> &HandlePools {
        &self.pools
    }

    /// (allocated, capacity) for one kind
    pub fn handle_pool_usage(&self, kind: HandleKind) -> (u32, u32) {
        let pool = self.pools.get(kind);
        (pool.len(), pool.capacity())
    }

    // ===== PRESENTATION =====

    /// Index of the back buffer the current frame renders into
    pub fn current_back_buffer_index(&self) -> usize {
        self.swapchain.current_index()
    }

    pub fn back_buffer(&self, index: usize) -> Result<Arc<dyn Texture>> {
        self.swapchain.back_buffer(index)
    }

    /// Render-target view of back buffer `index`
    pub fn back_buffer_view(&self, index: usize) -> Option<&Handle> {
        self.back_buffer_views.get(index)
    }

    pub fn back_buffer_count(&self) -> usize {
        self.swapchain.buffer_count()
    }

    /// Present the current back buffer and advance to the next one
    pub fn present(&mut self) -> Result<()> {
        self.swapchain.present()
    }

    /// Presentation surface size
    pub fn surface_size(&self) -> (u32, u32) {
        (self.swapchain.width(), self.swapchain.height())
    }
}

fn creation_failed(name: &str, error: Error) -> Error {
    if error.is_device_lost() {
        return error;
    }
    lattice_error!("lattice::DeviceContext", "Failed to create '{}': {}", name, error);
    Error::ResourceCreationFailed { name: name.to_string(), reason: error.to_string() }
}

#[cfg(test)]
#[path = "device_context_tests.rs"]
mod tests;
