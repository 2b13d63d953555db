/// CommandList - headless implementation of the CommandList trait
///
/// Commands execute on the CPU while they are recorded: copies move bytes,
/// clears fill mip levels, barriers move states. Every command is checked
/// against the state of the resources it touches, so a renderer that forgets
/// a transition fails here the way a validation layer would flag it.

use std::sync::Arc;
use lattice_renderer::lattice::device::{
    mip_extent, Buffer as RendererBuffer, BufferUsage, CommandList as RendererCommandList, Handle,
    HandleKind, Pipeline as RendererPipeline, PrimitiveTopology, Rect2D, ResourceId, ResourceState,
    Subresource, Texture as RendererTexture, TextureFormat, Viewport,
};
use lattice_renderer::lattice::{Error, Result};
use lattice_renderer::{lattice_bail, lattice_trace};

use crate::headless_context::{HeadlessContext, ViewTarget};
use crate::headless_texture::Texture;
use crate::recorded_command::{RecordedCommand, Slot};

/// Headless command list
pub struct CommandList {
    id: ResourceId,
    ctx: Arc<HeadlessContext>,
    is_recording: bool,
    /// Color targets bound by the last `set_render_targets`
    bound_targets: Vec<ViewTarget>,
    bound_pipeline: Option<ResourceId>,
    has_vertex_buffer: bool,
}

impl CommandList {
    pub(crate) fn new(id: ResourceId, ctx: Arc<HeadlessContext>) -> Self {
        Self {
            id,
            ctx,
            is_recording: false,
            bound_targets: Vec::new(),
            bound_pipeline: None,
            has_vertex_buffer: false,
        }
    }

    fn ensure_recording(&self, command: &str) -> Result<()> {
        if !self.is_recording {
            lattice_bail!("lattice::headless", "{}() outside begin()/end()", command);
        }
        Ok(())
    }

    fn record(&self, command: RecordedCommand) {
        lattice_trace!("lattice::headless", "{:?}", command);
        self.ctx.lock().recordings.entry(self.id).or_default().push(command);
    }

    fn texture(&self, id: ResourceId) -> Result<Arc<Texture>> {
        self.ctx
            .lock()
            .texture(id)
            .ok_or_else(|| Error::InvalidResource(format!("unknown texture {:?}", id)))
    }

    /// Texture subresource behind a written view
    fn view(&self, handle: &Handle, kind: HandleKind) -> Result<(ViewTarget, Arc<Texture>)> {
        if handle.kind() != kind || handle.is_poisoned() {
            return Err(Error::InvalidHandle(format!(
                "expected a {:?} handle, got {:?} #{}",
                kind,
                handle.kind(),
                handle.index()
            )));
        }
        let target = self
            .ctx
            .lock()
            .views
            .get(&(kind, handle.index()))
            .copied()
            .ok_or_else(|| Error::InvalidHandle(format!("{:?} #{} has no view", kind, handle.index())))?;
        Ok((target, self.texture(target.texture)?))
    }
}

fn slot(handle: &Handle) -> Slot {
    Slot { kind: handle.kind(), index: handle.index() }
}

/// One texel of `color` in `format`
fn encode_color(format: TextureFormat, color: [f32; 4]) -> [u8; 4] {
    let unorm = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    let [r, g, b, a] = color.map(unorm);
    match format {
        TextureFormat::B8G8R8A8_UNORM => [b, g, r, a],
        TextureFormat::R8G8B8A8_UNORM | TextureFormat::D32_FLOAT => [r, g, b, a],
    }
}

impl RendererCommandList for CommandList {
    fn id(&self) -> ResourceId {
        self.id
    }

    fn begin(&mut self) -> Result<()> {
        if self.is_recording {
            lattice_bail!("lattice::headless", "begin() while already recording");
        }
        self.is_recording = true;
        self.bound_targets.clear();
        self.bound_pipeline = None;
        self.has_vertex_buffer = false;
        self.ctx.lock().recordings.insert(self.id, Vec::new());
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        if !self.is_recording {
            lattice_bail!("lattice::headless", "end() while not recording");
        }
        self.is_recording = false;
        Ok(())
    }

    fn is_recording(&self) -> bool {
        self.is_recording
    }

    fn resource_barrier(
        &mut self,
        texture: &dyn RendererTexture,
        subresource: Subresource,
        before: ResourceState,
        after: ResourceState,
    ) -> Result<()> {
        self.ensure_recording("resource_barrier")?;
        let texture = self.texture(texture.id())?;
        texture.transition(subresource, before, after)?;
        self.record(RecordedCommand::Barrier { texture: texture.label.clone(), subresource, before, after });
        Ok(())
    }

    fn copy_buffer_to_texture(&mut self, src: &dyn RendererBuffer, dst: &dyn RendererTexture, mip_level: u32) -> Result<()> {
        self.ensure_recording("copy_buffer_to_texture")?;
        let (buffer, buffer_label) = {
            let ctx = self.ctx.lock();
            let buffer = ctx
                .buffer(src.id())
                .ok_or_else(|| Error::InvalidResource(format!("unknown buffer {:?}", src.id())))?;
            (buffer, ctx.label(src.id()))
        };
        let texture = self.texture(dst.id())?;
        texture.expect_state(mip_level, ResourceState::CopyDest)?;

        let info = &texture.info;
        let (width, height) = mip_extent(info.width, info.height, mip_level);
        let needed = width as u64 * height as u64 * info.format.bytes_per_pixel() as u64;
        if buffer.usage != BufferUsage::Upload || buffer.size < needed {
            return Err(Error::InvalidResource(format!(
                "'{}' ({:?}, {} bytes) cannot fill '{}' mip {} ({} bytes)",
                buffer_label, buffer.usage, buffer.size, texture.label, mip_level, needed
            )));
        }
        let source = buffer.contents();
        texture.with_mip(mip_level, |pixels| pixels.copy_from_slice(&source[..needed as usize]));

        self.record(RecordedCommand::CopyBufferToTexture {
            buffer: buffer_label,
            texture: texture.label.clone(),
            mip_level,
        });
        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.ensure_recording("set_viewport")?;
        self.record(RecordedCommand::SetViewport { width: viewport.width, height: viewport.height });
        Ok(())
    }

    fn set_scissor(&mut self, scissor: Rect2D) -> Result<()> {
        self.ensure_recording("set_scissor")?;
        self.record(RecordedCommand::SetScissor { width: scissor.width, height: scissor.height });
        Ok(())
    }

    fn set_render_targets(&mut self, color: &[Handle], depth: Option<&Handle>) -> Result<()> {
        self.ensure_recording("set_render_targets")?;
        let mut targets = Vec::with_capacity(color.len());
        for handle in color {
            let (target, texture) = self.view(handle, HandleKind::RenderTarget)?;
            texture.expect_state(target.mip_level, ResourceState::RenderTarget)?;
            targets.push(target);
        }
        if let Some(handle) = depth {
            let (target, texture) = self.view(handle, HandleKind::DepthStencil)?;
            texture.expect_state(target.mip_level, ResourceState::DepthWrite)?;
        }
        self.bound_targets = targets;
        self.record(RecordedCommand::SetRenderTargets {
            colors: color.iter().map(slot).collect(),
            depth: depth.map(slot),
        });
        Ok(())
    }

    fn clear_render_target(&mut self, target: &Handle, color: [f32; 4]) -> Result<()> {
        self.ensure_recording("clear_render_target")?;
        let (view, texture) = self.view(target, HandleKind::RenderTarget)?;
        texture.expect_state(view.mip_level, ResourceState::RenderTarget)?;
        let texel = encode_color(texture.info.format, color);
        texture.with_mip(view.mip_level, |pixels| {
            for chunk in pixels.chunks_exact_mut(4) {
                chunk.copy_from_slice(&texel);
            }
        });
        self.record(RecordedCommand::ClearRenderTarget { target: slot(target), color });
        Ok(())
    }

    fn clear_depth_stencil(&mut self, target: &Handle, depth: f32, stencil: u8) -> Result<()> {
        self.ensure_recording("clear_depth_stencil")?;
        let (view, texture) = self.view(target, HandleKind::DepthStencil)?;
        texture.expect_state(view.mip_level, ResourceState::DepthWrite)?;
        let bytes = depth.to_le_bytes();
        texture.with_mip(view.mip_level, |pixels| {
            for chunk in pixels.chunks_exact_mut(4) {
                chunk.copy_from_slice(&bytes);
            }
        });
        self.record(RecordedCommand::ClearDepthStencil { target: slot(target), depth, stencil });
        Ok(())
    }

    fn set_pipeline(&mut self, pipeline: &Arc<dyn RendererPipeline>) -> Result<()> {
        self.ensure_recording("set_pipeline")?;
        if self.ctx.lock().pipeline(pipeline.id()).is_none() {
            return Err(Error::InvalidResource(format!("unknown pipeline '{}'", pipeline.label())));
        }
        self.bound_pipeline = Some(pipeline.id());
        self.record(RecordedCommand::SetPipeline(pipeline.label().to_string()));
        Ok(())
    }

    fn set_primitive_topology(&mut self, topology: PrimitiveTopology) -> Result<()> {
        self.ensure_recording("set_primitive_topology")?;
        self.record(RecordedCommand::SetPrimitiveTopology(topology));
        Ok(())
    }

    fn set_vertex_buffer(&mut self, buffer: &Arc<dyn RendererBuffer>, stride: u32, size: u64) -> Result<()> {
        self.ensure_recording("set_vertex_buffer")?;
        if buffer.usage() != BufferUsage::Vertex || size > buffer.size() {
            return Err(Error::InvalidResource(format!(
                "vertex buffer view of {} bytes over a {:?} buffer of {} bytes",
                size,
                buffer.usage(),
                buffer.size()
            )));
        }
        let label = self.ctx.lock().label(buffer.id());
        self.has_vertex_buffer = true;
        self.record(RecordedCommand::SetVertexBuffer { buffer: label, stride, size });
        Ok(())
    }

    fn set_descriptor_table(&mut self, slot_index: u32, handle: &Handle) -> Result<()> {
        self.ensure_recording("set_descriptor_table")?;
        match handle.kind() {
            HandleKind::ShaderResource => {
                let (view, texture) = self.view(handle, HandleKind::ShaderResource)?;
                match texture.state(view.mip_level) {
                    Some(ResourceState::GenericRead | ResourceState::Common) => {}
                    found => {
                        return Err(Error::BackendError(format!(
                            "'{}' mip {} bound for sampling in state {:?}",
                            texture.label, view.mip_level, found
                        )));
                    }
                }
            }
            HandleKind::Sampler => {}
            kind => {
                return Err(Error::InvalidHandle(format!("{:?} handles are not shader visible", kind)));
            }
        }
        self.record(RecordedCommand::SetDescriptorTable { slot: slot_index, handle: slot(handle) });
        Ok(())
    }

    fn draw(&mut self, vertex_count: u32, instance_count: u32) -> Result<()> {
        self.ensure_recording("draw")?;
        let Some(pipeline_id) = self.bound_pipeline else {
            lattice_bail!("lattice::headless", "draw() without a pipeline");
        };
        if self.bound_targets.is_empty() {
            lattice_bail!("lattice::headless", "draw() without a render target");
        }
        let needs_vertices = self
            .ctx
            .lock()
            .pipeline(pipeline_id)
            .map(|p| !p.input_layout.attributes.is_empty())
            .unwrap_or(false);
        if needs_vertices && !self.has_vertex_buffer {
            lattice_bail!("lattice::headless", "draw() without a vertex buffer");
        }
        self.record(RecordedCommand::Draw { vertex_count, instance_count });
        Ok(())
    }
}

#[cfg(test)]
#[path = "headless_command_list_tests.rs"]
mod tests;
