/// Update phase.
///
/// Walks the node graph in insertion order and materializes every node that
/// has no GPU backing yet: vertex buffers, textures (with a staging upload
/// recorded by the next draw), render targets and draw-unit pipelines.
/// A node whose materialization fails is marked `Failed` and skipped by
/// later updates and draws; the frame keeps going.

use std::sync::Arc;
use crate::context::{DeviceContext, BACK_BUFFER_FORMAT};
use crate::error::{Error, Result};
use crate::frame::PendingUpload;
use crate::graph::{
    Backing, Node, NodeId, NodeKind, NodeState, RenderTargetBacking, RenderTargetNode,
    TextureBacking, TextureNode, VertexBufferBacking, VertexBufferNode,
};
use crate::graphics_device::{
    mip_level_count, Buffer, BufferUsage, Handle, Pipeline, PipelineDesc, ResourceState,
    TextureDesc, TextureFlags, TextureFormat, VertexLayout, ViewDesc,
};
use crate::renderer::SceneRenderer;
use crate::{lattice_debug, lattice_error, lattice_warn};

/// What one `update()` did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateStats {
    pub buffers_created: u32,
    pub textures_created: u32,
    pub render_targets_created: u32,
    pub pipelines_created: u32,
    pub compile_failures: u32,
    pub resource_failures: u32,
    pub mipmaps_scheduled: u32,
}

impl SceneRenderer {
    /// Materialize pending nodes into the current frame slot
    ///
    /// Waits for the slot to be free, releases retired objects whose frames
    /// have completed, then creates every missing backing and pipeline.
    /// Only a lost device aborts the phase.
    pub fn update(&mut self, frame_id: u64) -> Result<UpdateStats> {
        self.context.check_device()?;
        let slot = self.current_slot();
        let released = self.ring.acquire(slot)?;
        self.release(released);

        let mut stats = UpdateStats::default();
        let ids: Vec<NodeId> = self.graph.ids().to_vec();
        for id in ids {
            let Some(node) = self.graph.get(id) else { continue };
            if node.state() == NodeState::Failed {
                continue;
            }
            match node.kind() {
                NodeKind::DrawUnit => self.update_draw_unit(id, &mut stats)?,
                NodeKind::VertexBuffer | NodeKind::Texture | NodeKind::RenderTarget => {
                    self.update_resource(id, slot, &mut stats)?;
                    self.schedule_mipmaps(id, slot, &mut stats);
                }
                NodeKind::View => self.set_state(id, NodeState::Ready),
            }
        }

        lattice_debug!(
            "lattice::UpdatePhase",
            "frame {} (slot {}): {:?}",
            frame_id,
            slot,
            stats
        );
        Ok(stats)
    }

    fn set_state(&mut self, id: NodeId, state: NodeState) {
        if let Some(node) = self.graph.get_mut(id) {
            node.set_state(state);
        }
    }

    // ===== RESOURCES =====

    fn update_resource(&mut self, id: NodeId, slot: usize, stats: &mut UpdateStats) -> Result<()> {
        if self.backings.contains_key(id) {
            self.set_state(id, NodeState::Ready);
            return Ok(());
        }
        let Some(node) = self.graph.get(id) else { return Ok(()) };
        let name = node.name().to_string();

        let result = match node {
            Node::VertexBuffer(vb) => materialize_vertex_buffer(&mut self.context, vb).map(|b| (b, None)),
            Node::Texture(texture) => {
                materialize_texture(&mut self.context, texture).map(|(b, upload)| (b, Some(upload)))
            }
            Node::RenderTarget(rt) => materialize_render_target(&mut self.context, rt).map(|b| (b, None)),
            Node::DrawUnit(_) | Node::View(_) => return Ok(()),
        };

        match result {
            Ok((backing, upload)) => {
                match &backing {
                    Backing::VertexBuffer(_) => stats.buffers_created += 1,
                    Backing::Texture(_) => stats.textures_created += 1,
                    Backing::RenderTarget(_) => stats.render_targets_created += 1,
                }
                if let Some(buffer) = upload {
                    self.ring.record_mut(slot).pending_uploads.push(PendingUpload { node: id, buffer });
                }
                self.backings.insert(id, backing);
                self.set_state(id, NodeState::Ready);
                lattice_debug!("lattice::UpdatePhase", "'{}' materialized", name);
                Ok(())
            }
            Err(error) if error.is_device_lost() => Err(error),
            Err(error) => {
                lattice_error!("lattice::UpdatePhase", "'{}' marked failed: {}", name, error);
                stats.resource_failures += 1;
                self.set_state(id, NodeState::Failed);
                Ok(())
            }
        }
    }

    /// Move a node's mip request into the slot's queue
    fn schedule_mipmaps(&mut self, id: NodeId, slot: usize, stats: &mut UpdateStats) {
        let requested = match self.graph.get_mut(id) {
            Some(Node::Texture(texture)) => texture.take_mipmap_request(),
            Some(Node::RenderTarget(rt)) => rt.take_mipmap_request(),
            _ => false,
        };
        if !requested {
            return;
        }
        let levels = match self.backings.get(id) {
            Some(Backing::Texture(t)) => t.rtv_mips.len().min(t.srv_mips.len()),
            Some(Backing::RenderTarget(rt)) => rt.rtv_mips.len().min(rt.srv_mips.len()),
            _ => 0,
        };
        if levels < 2 {
            let name = self.graph.get(id).map(|n| n.name().to_string()).unwrap_or_default();
            lattice_warn!("lattice::UpdatePhase", "'{}' has no mip chain; request dropped", name);
            return;
        }
        self.ring.record_mut(slot).schedule_mipmaps(id);
        stats.mipmaps_scheduled += 1;
    }

    // ===== PIPELINES =====

    fn update_draw_unit(&mut self, id: NodeId, stats: &mut UpdateStats) -> Result<()> {
        let Some(Node::DrawUnit(unit)) = self.graph.get(id) else { return Ok(()) };
        let Some(shader) = unit.shader().map(str::to_string) else {
            // Nothing to build until a shader is set
            return Ok(());
        };
        if self.pipelines.contains_key(&shader) {
            self.set_state(id, NodeState::Ready);
            return Ok(());
        }
        if self.failed_shaders.contains(&shader) {
            self.set_state(id, NodeState::Failed);
            return Ok(());
        }
        let layout = unit.input_layout().clone();

        match self.build_pipeline(&shader, layout) {
            Ok(pipeline) => {
                self.pipelines.insert(shader, pipeline);
                stats.pipelines_created += 1;
                self.set_state(id, NodeState::Ready);
                Ok(())
            }
            Err(error) if error.is_device_lost() => Err(error),
            Err(error) => {
                lattice_error!("lattice::UpdatePhase", "{}", error);
                stats.compile_failures += 1;
                self.failed_shaders.insert(shader);
                self.set_state(id, NodeState::Failed);
                Ok(())
            }
        }
    }

    fn build_pipeline(&mut self, shader: &str, input_layout: VertexLayout) -> Result<Arc<dyn Pipeline>> {
        let compile = |entry: &str, target: &str| {
            self.compiler
                .compile(shader, entry, target)
                .map_err(|e| Error::ShaderCompileFailed { shader: shader.to_string(), message: e.message })
        };
        let vertex_shader = compile(&self.config.vertex_entry, &self.config.vertex_target)?;
        let pixel_shader = compile(&self.config.pixel_entry, &self.config.pixel_target)?;

        self.context.create_pipeline(&PipelineDesc {
            label: shader.to_string(),
            vertex_shader,
            pixel_shader,
            input_layout,
            color_format: BACK_BUFFER_FORMAT,
            depth_format: None,
        })
    }
}

// ===== MATERIALIZATION =====

fn materialize_vertex_buffer(context: &mut DeviceContext, node: &VertexBufferNode) -> Result<Backing> {
    let size = node.data().len() as u64;
    let buffer = context.create_buffer(node.name(), size, BufferUsage::Vertex)?;
    buffer.update(0, node.data())?;
    Ok(Backing::VertexBuffer(VertexBufferBacking { buffer, stride: node.stride(), size }))
}

/// Texture plus the staging buffer holding its pixels
fn materialize_texture(context: &mut DeviceContext, node: &TextureNode) -> Result<(Backing, Arc<dyn Buffer>)> {
    let mut created = Vec::new();
    let result = build_texture(context, node, &mut created);
    if result.is_err() {
        free_handles(context, &created);
    }
    result
}

fn build_texture(
    context: &mut DeviceContext,
    node: &TextureNode,
    created: &mut Vec<Handle>,
) -> Result<(Backing, Arc<dyn Buffer>)> {
    let mip_levels = if node.has_mip_chain() {
        mip_level_count(node.width(), node.height())
    } else {
        1
    };
    let mut flags = TextureFlags::SHADER_RESOURCE;
    if node.has_mip_chain() {
        flags |= TextureFlags::RENDER_TARGET;
    }
    let texture = context.create_texture(&TextureDesc {
        label: node.name().to_string(),
        width: node.width(),
        height: node.height(),
        format: TextureFormat::R8G8B8A8_UNORM,
        flags,
        mip_levels,
        initial_state: ResourceState::CopyDest,
    })?;

    let mut srv_mips = Vec::with_capacity(mip_levels as usize);
    let mut rtv_mips = Vec::new();
    for mip_level in 0..mip_levels {
        let srv = create_view(context, &ViewDesc::ShaderResource { texture: texture.as_ref(), mip_level }, created)?;
        srv_mips.push(srv);
        if node.has_mip_chain() {
            let rtv = create_view(context, &ViewDesc::RenderTarget { texture: texture.as_ref(), mip_level }, created)?;
            rtv_mips.push(rtv);
        }
    }

    let upload = context.create_buffer(
        &format!("{}_upload", node.name()),
        node.pixels().len() as u64,
        BufferUsage::Upload,
    )?;
    upload.update(0, node.pixels())?;

    Ok((Backing::Texture(TextureBacking { texture, srv_mips, rtv_mips, mip_levels }), upload))
}

fn materialize_render_target(context: &mut DeviceContext, node: &RenderTargetNode) -> Result<Backing> {
    let mut created = Vec::new();
    let result = build_render_target(context, node, &mut created);
    if result.is_err() {
        free_handles(context, &created);
    }
    result
}

fn build_render_target(
    context: &mut DeviceContext,
    node: &RenderTargetNode,
    created: &mut Vec<Handle>,
) -> Result<Backing> {
    let mip_levels = mip_level_count(node.width(), node.height());
    let color = context.create_texture(&TextureDesc {
        label: node.name().to_string(),
        width: node.width(),
        height: node.height(),
        format: BACK_BUFFER_FORMAT,
        flags: TextureFlags::RENDER_TARGET | TextureFlags::SHADER_RESOURCE,
        mip_levels,
        initial_state: ResourceState::Common,
    })?;
    let depth = context.create_texture(&TextureDesc {
        label: format!("{}_depth", node.name()),
        width: node.width(),
        height: node.height(),
        format: TextureFormat::D32_FLOAT,
        flags: TextureFlags::DEPTH_STENCIL,
        mip_levels: 1,
        initial_state: ResourceState::DepthWrite,
    })?;

    let mut rtv_mips = Vec::with_capacity(mip_levels as usize);
    let mut srv_mips = Vec::with_capacity(mip_levels as usize);
    for mip_level in 0..mip_levels {
        rtv_mips.push(create_view(context, &ViewDesc::RenderTarget { texture: color.as_ref(), mip_level }, created)?);
        srv_mips.push(create_view(context, &ViewDesc::ShaderResource { texture: color.as_ref(), mip_level }, created)?);
    }
    let dsv = create_view(context, &ViewDesc::DepthStencil { texture: depth.as_ref() }, created)?;

    Ok(Backing::RenderTarget(RenderTargetBacking { color, depth, srv_mips, rtv_mips, dsv, mip_levels }))
}

fn create_view(context: &mut DeviceContext, desc: &ViewDesc<'_>, created: &mut Vec<Handle>) -> Result<Handle> {
    let handle = context.create_view(desc)?;
    created.push(handle);
    Ok(handle)
}

/// Return the handles of a partially built backing
fn free_handles(context: &mut DeviceContext, handles: &[Handle]) {
    for handle in handles {
        if let Err(error) = context.free_view(handle) {
            lattice_warn!("lattice::UpdatePhase", "Failed to free handle: {}", error);
        }
    }
}
