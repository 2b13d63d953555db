/// HeadlessDevice - CPU implementation of the GraphicsDevice trait

use std::sync::Arc;
use lattice_renderer::lattice::device::{
    Buffer as RendererBuffer, BufferDesc, CommandList as RendererCommandList, CpuLocation,
    DescriptorTable, DeviceStats, Fence as RendererFence, GpuLocation, GraphicsDevice, Handle,
    HandleKind, Pipeline as RendererPipeline, PipelineDesc, ResourceState, SurfaceHandle,
    Swapchain as RendererSwapchain, SwapchainDesc, Texture as RendererTexture, TextureDesc,
    TextureFlags, TextureInfo, ViewDesc,
};
use lattice_renderer::lattice::{Error, Result};
use lattice_renderer::{lattice_bail, lattice_debug, lattice_info};

use crate::headless_buffer::Buffer;
use crate::headless_command_list::CommandList;
use crate::headless_context::{HeadlessContext, ViewTarget};
use crate::headless_fence::Fence;
use crate::headless_pipeline::Pipeline;
use crate::headless_swapchain::Swapchain;
use crate::headless_texture::Texture;
use crate::recorded_command::Submission;

/// Descriptor increment of every table, in bytes
const DESCRIPTOR_STRIDE: u64 = 32;

/// Backend running entirely on the CPU
///
/// By default every submission completes immediately. With
/// `with_manual_completion()` fence signals stay queued until the
/// controller completes them, which lets callers observe frames in flight.
pub struct HeadlessDevice {
    ctx: Arc<HeadlessContext>,
}

impl HeadlessDevice {
    pub fn new() -> Self {
        lattice_info!("lattice::headless", "Headless device created");
        Self { ctx: HeadlessContext::new(false) }
    }

    /// Device whose submissions complete only through the controller
    pub fn with_manual_completion() -> Self {
        Self { ctx: HeadlessContext::new(true) }
    }

    /// Inspection and fault-injection handle (clone it before boxing the device)
    pub fn controller(&self) -> HeadlessController {
        HeadlessController { ctx: Arc::clone(&self.ctx) }
    }

    fn check_alive(&self) -> Result<()> {
        match &self.ctx.lock().device_lost {
            Some(reason) => Err(Error::DeviceLost(reason.clone())),
            None => Ok(()),
        }
    }

    fn make_texture(&self, desc: &TextureDesc) -> Result<Arc<Texture>> {
        if desc.width == 0 || desc.height == 0 || desc.mip_levels == 0 {
            return Err(Error::InvalidResource(format!(
                "texture '{}': {}x{} with {} mips",
                desc.label, desc.width, desc.height, desc.mip_levels
            )));
        }
        let mut ctx = self.ctx.lock();
        ctx.prune();
        let id = ctx.allocate_id(&desc.label);
        let texture = Arc::new(Texture::new(
            id,
            &desc.label,
            TextureInfo {
                width: desc.width,
                height: desc.height,
                format: desc.format,
                flags: desc.flags,
                mip_levels: desc.mip_levels,
            },
            desc.initial_state,
        ));
        ctx.textures.insert(id, Arc::downgrade(&texture));
        Ok(texture)
    }
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsDevice for HeadlessDevice {
    fn create_descriptor_table(&mut self, kind: HandleKind, capacity: u32) -> Result<DescriptorTable> {
        let base = (kind as u64 + 1) << 40;
        Ok(DescriptorTable {
            kind,
            cpu_base: CpuLocation(base),
            gpu_base: GpuLocation(if kind.is_shader_visible() { base | (1 << 39) } else { 0 }),
            stride: DESCRIPTOR_STRIDE,
            capacity,
        })
    }

    fn create_buffer(&mut self, desc: &BufferDesc) -> Result<Arc<dyn RendererBuffer>> {
        self.check_alive()?;
        let mut ctx = self.ctx.lock();
        ctx.prune();
        let id = ctx.allocate_id(&desc.label);
        let buffer = Arc::new(Buffer::new(id, desc.size, desc.usage));
        ctx.buffers.insert(id, Arc::downgrade(&buffer));
        ctx.stats.buffers_created += 1;
        lattice_debug!("lattice::headless", "Buffer '{}' ({} bytes, {:?})", desc.label, desc.size, desc.usage);
        Ok(buffer)
    }

    fn create_texture(&mut self, desc: &TextureDesc) -> Result<Arc<dyn RendererTexture>> {
        self.check_alive()?;
        let texture = self.make_texture(desc)?;
        self.ctx.lock().stats.textures_created += 1;
        lattice_debug!(
            "lattice::headless",
            "Texture '{}' ({}x{}, {} mips, {:?})",
            desc.label,
            desc.width,
            desc.height,
            desc.mip_levels,
            desc.format
        );
        Ok(texture)
    }

    fn write_view(&mut self, desc: &ViewDesc<'_>, handle: &Handle) -> Result<()> {
        if handle.kind() != desc.kind() || handle.is_poisoned() {
            return Err(Error::InvalidHandle(format!(
                "{:?} view written into {:?} #{}",
                desc.kind(),
                handle.kind(),
                handle.index()
            )));
        }
        let (texture, mip_level, required) = match desc {
            ViewDesc::RenderTarget { texture, mip_level } => (*texture, *mip_level, TextureFlags::RENDER_TARGET),
            ViewDesc::ShaderResource { texture, mip_level } => (*texture, *mip_level, TextureFlags::SHADER_RESOURCE),
            ViewDesc::DepthStencil { texture } => (*texture, 0, TextureFlags::DEPTH_STENCIL),
            ViewDesc::Sampler { .. } => {
                self.ctx.lock().stats.views_written += 1;
                return Ok(());
            }
        };
        let info = texture.info();
        if !info.flags.contains(required) || mip_level >= info.mip_levels {
            return Err(Error::InvalidResource(format!(
                "{:?} view of mip {} on a texture with {:?} and {} mips",
                desc.kind(),
                mip_level,
                info.flags,
                info.mip_levels
            )));
        }
        let mut ctx = self.ctx.lock();
        ctx.views.insert((handle.kind(), handle.index()), ViewTarget { texture: texture.id(), mip_level });
        ctx.stats.views_written += 1;
        Ok(())
    }

    fn create_pipeline(&mut self, desc: &PipelineDesc) -> Result<Arc<dyn RendererPipeline>> {
        self.check_alive()?;
        if desc.vertex_shader.is_empty() || desc.pixel_shader.is_empty() {
            return Err(Error::InvalidResource(format!("pipeline '{}': empty bytecode", desc.label)));
        }
        let mut ctx = self.ctx.lock();
        let id = ctx.allocate_id(&desc.label);
        let pipeline = Arc::new(Pipeline {
            id,
            label: desc.label.clone(),
            input_layout: desc.input_layout.clone(),
        });
        ctx.pipelines.insert(id, Arc::downgrade(&pipeline));
        ctx.stats.pipelines_created += 1;
        Ok(pipeline)
    }

    fn create_command_list(&mut self) -> Result<Box<dyn RendererCommandList>> {
        let id = self.ctx.lock().allocate_id("command_list");
        Ok(Box::new(CommandList::new(id, Arc::clone(&self.ctx))))
    }

    fn create_fence(&mut self, initial_value: u64) -> Result<Arc<dyn RendererFence>> {
        let mut ctx = self.ctx.lock();
        let id = ctx.allocate_id("fence");
        let fence = Arc::new(Fence::new(id, initial_value));
        ctx.fences.insert(id, Arc::clone(&fence));
        Ok(fence)
    }

    fn create_swapchain(&mut self, _surface: SurfaceHandle, desc: &SwapchainDesc) -> Result<Box<dyn RendererSwapchain>> {
        let mut buffers = Vec::with_capacity(desc.buffer_count);
        for index in 0..desc.buffer_count {
            buffers.push(self.make_texture(&TextureDesc {
                label: format!("backbuffer{}", index),
                width: desc.width,
                height: desc.height,
                format: desc.format,
                flags: TextureFlags::RENDER_TARGET,
                mip_levels: 1,
                initial_state: ResourceState::Present,
            })?);
        }
        Ok(Box::new(Swapchain::new(Arc::clone(&self.ctx), *desc, buffers)))
    }

    fn submit(&mut self, commands: &mut dyn RendererCommandList, fence: &dyn RendererFence, signal_value: u64) -> Result<()> {
        self.check_alive()?;
        if commands.is_recording() {
            lattice_bail!("lattice::headless", "submit of a command list that is still recording");
        }
        let mut ctx = self.ctx.lock();
        let Some(fence) = ctx.fences.get(&fence.id()).cloned() else {
            lattice_bail!("lattice::headless", "submit with a fence of another device");
        };
        let recorded = ctx.recordings.remove(&commands.id()).unwrap_or_default();
        ctx.submissions.push(Submission { fence_value: signal_value, commands: recorded });
        ctx.stats.submissions += 1;
        if ctx.manual_completion {
            ctx.pending.push_back((fence, signal_value));
        } else {
            fence.signal(signal_value);
        }
        Ok(())
    }

    fn device_status(&self) -> Result<()> {
        self.check_alive()
    }

    fn stats(&self) -> DeviceStats {
        self.ctx.lock().stats
    }
}

// ============================================================================
// Controller
// ============================================================================

/// Inspection and fault-injection handle of a `HeadlessDevice`
#[derive(Clone)]
pub struct HeadlessController {
    ctx: Arc<HeadlessContext>,
}

impl HeadlessController {
    /// Every submission so far, in queue order
    pub fn submissions(&self) -> Vec<Submission> {
        self.ctx.lock().submissions.clone()
    }

    /// Last submission, if any
    pub fn last_submission(&self) -> Option<Submission> {
        self.ctx.lock().submissions.last().cloned()
    }

    /// Number of presents
    pub fn presents(&self) -> u64 {
        self.ctx.lock().presents
    }

    /// Submissions waiting for completion (manual mode)
    pub fn pending(&self) -> usize {
        self.ctx.lock().pending.len()
    }

    /// Complete the oldest pending submission; returns its fence value
    pub fn complete_next(&self) -> Option<u64> {
        let (fence, value) = self.ctx.lock().pending.pop_front()?;
        fence.signal(value);
        Some(value)
    }

    /// Complete every pending submission
    pub fn complete_all(&self) {
        while self.complete_next().is_some() {}
    }

    /// Mark the device removed; every later call reports `DeviceLost`
    pub fn lose_device(&self, reason: &str) {
        self.ctx.lock().device_lost = Some(reason.to_string());
    }

    /// Copy of one mip level of the live texture labeled `label`
    pub fn read_texture(&self, label: &str, mip_level: u32) -> Option<Vec<u8>> {
        let ctx = self.ctx.lock();
        let texture = ctx
            .textures
            .values()
            .filter_map(|t| t.upgrade())
            .filter(|t| t.label == label)
            .max_by_key(|t| t.id)?;
        drop(ctx);
        texture.read_mip(mip_level)
    }

    /// Buffers and textures still alive
    pub fn live_resources(&self) -> usize {
        self.ctx.lock().live_resources()
    }

    pub fn stats(&self) -> DeviceStats {
        self.ctx.lock().stats
    }
}

#[cfg(test)]
#[path = "headless_tests.rs"]
mod tests;
