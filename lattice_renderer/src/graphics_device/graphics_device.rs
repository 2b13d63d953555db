/// GraphicsDevice trait - main backend interface for creating GPU objects and submitting work

use std::sync::Arc;
use crate::error::Result;
use crate::graphics_device::{
    Buffer, BufferDesc, CommandList, DescriptorTable, Fence, Handle, HandleKind,
    Pipeline, PipelineDesc, SurfaceHandle, Swapchain, SwapchainDesc, Texture,
    TextureDesc, ViewDesc,
};

/// Backend-assigned identity of a GPU object
///
/// Used by backends to find their own objects behind a trait object and by
/// tests to compare objects without pointer casts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(pub u64);

/// Device statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceStats {
    /// Buffers created since device creation
    pub buffers_created: u64,
    /// Textures created since device creation
    pub textures_created: u64,
    /// Pipelines created since device creation
    pub pipelines_created: u64,
    /// Views written into descriptor tables
    pub views_written: u64,
    /// Command lists submitted to the queue
    pub submissions: u64,
}

/// Main graphics device trait
///
/// One device owns one command queue. Implemented by backend crates
/// (e.g., `lattice_renderer_headless::HeadlessDevice`).
pub trait GraphicsDevice: Send + Sync {
    /// Create one contiguous descriptor table of `capacity` entries
    ///
    /// The returned table describes where entry `i` lives on the CPU and
    /// GPU side; Handle Pools carve handles out of it.
    fn create_descriptor_table(&mut self, kind: HandleKind, capacity: u32) -> Result<DescriptorTable>;

    /// Create a committed buffer
    fn create_buffer(&mut self, desc: &BufferDesc) -> Result<Arc<dyn Buffer>>;

    /// Create a committed texture
    fn create_texture(&mut self, desc: &TextureDesc) -> Result<Arc<dyn Texture>>;

    /// Write a view of a resource into the CPU location of `handle`
    fn write_view(&mut self, desc: &ViewDesc<'_>, handle: &Handle) -> Result<()>;

    /// Build a graphics pipeline from compiled bytecode
    fn create_pipeline(&mut self, desc: &PipelineDesc) -> Result<Arc<dyn Pipeline>>;

    /// Create a command list (with its own allocator)
    fn create_command_list(&mut self) -> Result<Box<dyn CommandList>>;

    /// Create a fence starting at `initial_value`
    fn create_fence(&mut self, initial_value: u64) -> Result<Arc<dyn Fence>>;

    /// Create the presentation chain for a surface
    fn create_swapchain(&mut self, surface: SurfaceHandle, desc: &SwapchainDesc) -> Result<Box<dyn Swapchain>>;

    /// Execute a closed command list on the queue, then signal `fence` to `signal_value`
    fn submit(&mut self, commands: &mut dyn CommandList, fence: &dyn Fence, signal_value: u64) -> Result<()>;

    /// Report device health
    ///
    /// Returns `Error::DeviceLost` once the device has been removed or hung.
    fn device_status(&self) -> Result<()>;

    /// Get device statistics
    fn stats(&self) -> DeviceStats;
}
