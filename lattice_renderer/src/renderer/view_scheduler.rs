/// Draw phase.
///
/// Records one command list per frame into the current ring slot:
/// pending texture uploads, queued texture mip chains, then every view in
/// descending order. A view clears its target (a render-target node or the
/// current back buffer) and draws its units in list order. Units missing a
/// vertex buffer, a pipeline or a vertex count are skipped, as are units
/// sampling their own view's target; units without a usable texture sample
/// the fallback checker texture. A unit that fails to record is skipped too.

use std::cmp::Reverse;
use std::sync::Arc;
use slotmap::SecondaryMap;
use rustc_hash::FxHashMap;
use crate::error::{Error, Result};
use crate::frame::FrameRecord;
use crate::graph::{Backing, Node, NodeGraph, NodeId, VertexBufferBacking, ViewNode};
use crate::graphics_device::{
    CommandList, Handle, Pipeline, PrimitiveTopology, Rect2D, ResourceState, Subresource, Texture, Viewport,
};
use crate::renderer::mipmap_generator::{record_mip_chain, MipChain};
use crate::renderer::{SceneRenderer, DUMMY_TEXTURE};
use crate::{lattice_debug, lattice_error, lattice_warn};

/// What one `draw()` recorded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frame_id: u64,
    /// Ring slot the frame was recorded into
    pub slot: usize,
    /// Fence value signaled by the frame's submission
    pub fence_value: u64,
    pub views_drawn: u32,
    pub views_skipped: u32,
    pub draw_calls: u32,
    pub units_skipped: u32,
    pub uploads_recorded: u32,
    pub mip_levels_generated: u32,
}

/// Why a unit was left out of a view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The name is unknown or not a draw unit
    NotADrawUnit,
    /// The vertex buffer is unset, unknown or not materialized
    NoVertexBuffer,
    /// The shader is unset or its pipeline failed to build
    NoPipeline,
    /// Neither the unit's texture nor the fallback texture is materialized
    NoTexture,
    /// The vertex count was never set
    NoVertexCount,
    /// The texture is the render target of the view drawing the unit
    SamplesViewTarget,
}

/// Everything one draw call binds
pub(crate) struct DrawInputs<'a> {
    pub pipeline: &'a Arc<dyn Pipeline>,
    pub vertex_buffer: &'a VertexBufferBacking,
    pub texture_view: &'a Handle,
    pub topology: PrimitiveTopology,
    pub vertex_count: u32,
}

/// Views sorted for drawing: highest order first, insertion order among equals
pub fn draw_order<'a>(mut views: Vec<(NodeId, &'a ViewNode)>) -> Vec<(NodeId, &'a ViewNode)> {
    views.sort_by_key(|(_, view)| Reverse(view.order()));
    views
}

impl SceneRenderer {
    /// Record, submit and present one frame
    ///
    /// Returns the frame's statistics. Only device-level failures (lost
    /// device, fence timeout, command recording errors outside a unit) are
    /// returned as errors; missing scene pieces are skipped with a warning.
    /// When a frame fails, its uploads and mip requests stay queued on the
    /// slot and are recorded again the next time the slot comes around.
    pub fn draw(&mut self, frame_id: u64) -> Result<FrameStats> {
        self.context.check_device()?;
        let slot = self.current_slot();
        let released = self.ring.acquire(slot)?;
        self.release(released);

        let mut stats = FrameStats { frame_id, slot, ..FrameStats::default() };
        self.ring.record_mut(slot).command_list.begin()?;

        let mip_requests = self.ring.record_mut(slot).mipmap_queue.clone();
        if let Err(error) = self.record_frame(slot, &mut stats) {
            let record = self.ring.record_mut(slot);
            record.mipmap_queue = mip_requests;
            if record.command_list.is_recording() {
                if let Err(close_error) = record.command_list.end() {
                    lattice_warn!("lattice::ViewScheduler", "Failed to close command list: {}", close_error);
                }
            }
            return Err(error);
        }

        stats.fence_value = self.ring.submit(slot, self.context.device_mut())?;
        self.context.present()?;

        lattice_debug!("lattice::ViewScheduler", "frame {}: {:?}", frame_id, stats);
        Ok(stats)
    }

    fn record_frame(&mut self, slot: usize, stats: &mut FrameStats) -> Result<()> {
        let back_buffer_index = self.context.current_back_buffer_index();
        let mip_pipeline = self.pipelines.get(&self.config.mipmap_shader).cloned();
        let FrameRecord { command_list, pending_uploads, in_flight, mipmap_queue, .. } =
            self.ring.record_mut(slot);
        let cmd = command_list.as_mut();

        // Uploads (drained once the whole frame is recorded)
        for upload in pending_uploads.iter() {
            let Some(Backing::Texture(texture)) = self.backings.get(upload.node) else { continue };
            cmd.copy_buffer_to_texture(upload.buffer.as_ref(), texture.texture.as_ref(), 0)?;
            cmd.resource_barrier(
                texture.texture.as_ref(),
                Subresource::All,
                ResourceState::CopyDest,
                ResourceState::GenericRead,
            )?;
            stats.uploads_recorded += 1;
        }

        if mip_pipeline.is_none() && !mipmap_queue.is_empty() {
            lattice_warn!(
                "lattice::ViewScheduler",
                "Mipmap pipeline unavailable; {} request(s) dropped",
                mipmap_queue.len()
            );
            mipmap_queue.clear();
        }

        // Texture mip chains (render targets wait for their view)
        let queued: Vec<NodeId> = mipmap_queue
            .iter()
            .copied()
            .filter(|&id| matches!(self.backings.get(id), Some(Backing::Texture(_))))
            .collect();
        for id in queued {
            mipmap_queue.retain(|&q| q != id);
            stats.mip_levels_generated +=
                generate_mips(cmd, mip_pipeline.as_ref(), &self.linear_sampler, self.backings.get(id))?;
        }

        // Views
        let dummy_view = self
            .graph
            .id(DUMMY_TEXTURE)
            .and_then(|id| self.backings.get(id))
            .and_then(Backing::shader_view);

        for (_, view) in draw_order(self.graph.views()) {
            let target_id = match view.render_target() {
                Some(name) => {
                    let Some(id) = self.graph.id(name).filter(|&id| {
                        matches!(self.backings.get(id), Some(Backing::RenderTarget(_)))
                    }) else {
                        lattice_warn!(
                            "lattice::ViewScheduler",
                            "View '{}': render target '{}' is not available; skipped",
                            view.name(),
                            name
                        );
                        stats.views_skipped += 1;
                        continue;
                    };
                    Some(id)
                }
                None => None,
            };

            let back_buffer;
            let target = match target_id.and_then(|id| self.backings.get(id)).and_then(Backing::as_render_target) {
                Some(rt) => ViewTarget {
                    texture: rt.color.as_ref(),
                    color: &rt.rtv_mips[0],
                    depth: Some(&rt.dsv),
                    resting: ResourceState::Common,
                },
                None => {
                    back_buffer = self.context.back_buffer(back_buffer_index)?;
                    let color = self.context.back_buffer_view(back_buffer_index).ok_or_else(|| {
                        Error::InvalidHandle(format!("no view for back buffer {}", back_buffer_index))
                    })?;
                    ViewTarget { texture: back_buffer.as_ref(), color, depth: None, resting: ResourceState::Present }
                }
            };

            cmd.resource_barrier(target.texture, Subresource::All, target.resting, ResourceState::RenderTarget)?;
            let mut recorded = bind_target(cmd, view, &target);

            // Units
            if recorded.is_ok() {
                for unit in view.units() {
                    let inputs = resolve_unit(
                        &self.graph,
                        &self.backings,
                        &self.pipelines,
                        dummy_view,
                        view.render_target(),
                        unit,
                    );
                    match inputs {
                        Ok(inputs) => match record_unit(cmd, &inputs, &self.linear_sampler) {
                            Ok(()) => stats.draw_calls += 1,
                            Err(error) if error.is_device_lost() => {
                                recorded = Err(error);
                                break;
                            }
                            Err(error) => {
                                lattice_error!(
                                    "lattice::ViewScheduler",
                                    "View '{}': unit '{}' failed to record: {}",
                                    view.name(),
                                    unit,
                                    error
                                );
                                stats.units_skipped += 1;
                            }
                        },
                        Err(reason) => {
                            lattice_warn!(
                                "lattice::ViewScheduler",
                                "View '{}': unit '{}' skipped ({:?})",
                                view.name(),
                                unit,
                                reason
                            );
                            stats.units_skipped += 1;
                        }
                    }
                }
            }

            // The target returns to its resting state even when the view failed
            let restored =
                cmd.resource_barrier(target.texture, Subresource::All, ResourceState::RenderTarget, target.resting);
            recorded?;
            restored?;

            if let Some(id) = target_id {
                if mipmap_queue.contains(&id) {
                    mipmap_queue.retain(|&q| q != id);
                    stats.mip_levels_generated +=
                        generate_mips(cmd, mip_pipeline.as_ref(), &self.linear_sampler, self.backings.get(id))?;
                }
            }
            stats.views_drawn += 1;
        }

        // Render targets no view drew this frame
        for id in std::mem::take(mipmap_queue) {
            stats.mip_levels_generated +=
                generate_mips(cmd, mip_pipeline.as_ref(), &self.linear_sampler, self.backings.get(id))?;
        }

        // Every copy is recorded; staging buffers now live until the slot's fence
        in_flight.extend(pending_uploads.drain(..).map(|upload| upload.buffer));
        Ok(())
    }
}

/// Color and depth views a view draws into
struct ViewTarget<'a> {
    texture: &'a dyn Texture,
    color: &'a Handle,
    depth: Option<&'a Handle>,
    /// State the texture rests in between views
    resting: ResourceState,
}

/// Bind a view's target, viewport and scissor, then clear it
fn bind_target(cmd: &mut dyn CommandList, view: &ViewNode, target: &ViewTarget<'_>) -> Result<()> {
    cmd.set_render_targets(std::slice::from_ref(target.color), target.depth)?;
    cmd.set_viewport(Viewport::from_size(view.width(), view.height()))?;
    cmd.set_scissor(Rect2D::from_size(view.width(), view.height()))?;
    cmd.clear_render_target(target.color, view.clear_color())?;
    if let Some(depth) = target.depth {
        cmd.clear_depth_stencil(depth, 1.0, 0)?;
    }
    Ok(())
}

fn generate_mips(
    cmd: &mut dyn CommandList,
    pipeline: Option<&Arc<dyn Pipeline>>,
    sampler: &Handle,
    backing: Option<&Backing>,
) -> Result<u32> {
    match (pipeline, backing.and_then(MipChain::from_backing)) {
        (Some(pipeline), Some(chain)) => record_mip_chain(cmd, pipeline, sampler, &chain),
        _ => Ok(0),
    }
}

/// Look up everything a unit needs to be drawn
///
/// `view_target` is the render-target node the unit's view draws into; a
/// unit sampling it is skipped.
pub(crate) fn resolve_unit<'a>(
    graph: &'a NodeGraph,
    backings: &'a SecondaryMap<NodeId, Backing>,
    pipelines: &'a FxHashMap<String, Arc<dyn Pipeline>>,
    dummy_view: Option<&'a Handle>,
    view_target: Option<&str>,
    name: &str,
) -> std::result::Result<DrawInputs<'a>, SkipReason> {
    let Ok(Node::DrawUnit(unit)) = graph.node(name) else {
        return Err(SkipReason::NotADrawUnit);
    };
    if unit.vertex_count() == 0 {
        return Err(SkipReason::NoVertexCount);
    }
    if unit.texture().is_some() && unit.texture() == view_target {
        return Err(SkipReason::SamplesViewTarget);
    }
    let vertex_buffer = unit
        .vertex_buffer()
        .and_then(|vb| graph.id(vb))
        .and_then(|id| backings.get(id))
        .and_then(Backing::as_vertex_buffer)
        .ok_or(SkipReason::NoVertexBuffer)?;
    let pipeline = unit
        .shader()
        .and_then(|shader| pipelines.get(shader))
        .ok_or(SkipReason::NoPipeline)?;
    let texture_view = unit
        .texture()
        .and_then(|texture| graph.id(texture))
        .and_then(|id| backings.get(id))
        .and_then(Backing::shader_view)
        .or(dummy_view)
        .ok_or(SkipReason::NoTexture)?;

    Ok(DrawInputs {
        pipeline,
        vertex_buffer,
        texture_view,
        topology: unit.topology(),
        vertex_count: unit.vertex_count(),
    })
}

/// Bind a unit's state and issue its draw
pub(crate) fn record_unit(cmd: &mut dyn CommandList, inputs: &DrawInputs<'_>, sampler: &Handle) -> Result<()> {
    cmd.set_primitive_topology(inputs.topology)?;
    cmd.set_vertex_buffer(&inputs.vertex_buffer.buffer, inputs.vertex_buffer.stride, inputs.vertex_buffer.size)?;
    cmd.set_pipeline(inputs.pipeline)?;
    cmd.set_descriptor_table(0, inputs.texture_view)?;
    cmd.set_descriptor_table(1, sampler)?;
    cmd.draw(inputs.vertex_count, 1)
}

#[cfg(test)]
#[path = "view_scheduler_tests.rs"]
mod tests;
