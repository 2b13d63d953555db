/// Scene renderer - the retained-mode entry point.
///
/// Owns the device context, the frame ring, the node graph and everything
/// materialized from it. Applications describe the scene with nodes, then
/// call `update()` and `draw()` once per frame (or hand the renderer to
/// `run_frame_loop`).
///
/// # Example
///
/// ```ignore
/// let mut renderer = SceneRenderer::new(device, &surface, compiler, RendererConfig::default())?;
///
/// renderer.set_node(VertexBufferNode::from_slice("rect", &quad)?)?;
/// let mut unit = DrawUnitNode::new("rect_unit")?;
/// unit.set_vertex_buffer("rect");
/// unit.set_shader("test.hlsl");
/// unit.set_vertex_count(4);
/// renderer.set_node(unit)?;
///
/// let mut view = ViewNode::new("main", 720, 480)?;
/// view.add_unit("rect_unit");
/// renderer.set_node(view)?;
///
/// renderer.update(0)?;
/// renderer.draw(0)?;
/// ```

use std::sync::Arc;
use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::SecondaryMap;

use crate::config::RendererConfig;
use crate::context::DeviceContext;
use crate::error::{Error, Result};
use crate::frame::{FrameRecord, FrameRing, Retired};
use crate::graph::{
    Backing, DrawUnitNode, Node, NodeGraph, NodeId, NodeKind, NodeState, RenderTargetNode,
    TextureNode, ViewNode,
};
use crate::graphics_device::{
    DeviceStats, GraphicsDevice, Handle, HandleKind, Pipeline, SamplerFilter, ShaderCompiler,
    SurfaceProvider, VertexLayout, ViewDesc,
};
use crate::{lattice_info, lattice_warn};

/// Fallback texture bound when a unit samples nothing usable
pub const DUMMY_TEXTURE: &str = "__DUMMY_TEX__";

/// Draw unit carrying the mipmap shader
pub const MIPMAP_UNIT: &str = "__MIPMAP__";

/// Checker cell size of the fallback texture, in pixels
const DUMMY_CHECKER_CELL: u32 = 32;

pub struct SceneRenderer {
    pub(crate) config: RendererConfig,
    pub(crate) context: DeviceContext,
    pub(crate) ring: FrameRing,
    pub(crate) graph: NodeGraph,
    pub(crate) backings: SecondaryMap<NodeId, Backing>,
    /// Pipelines keyed by shader path
    pub(crate) pipelines: FxHashMap<String, Arc<dyn Pipeline>>,
    /// Shaders that failed to build; skipped until `reload_shaders()`
    pub(crate) failed_shaders: FxHashSet<String>,
    pub(crate) compiler: Box<dyn ShaderCompiler>,
    pub(crate) point_sampler: Handle,
    pub(crate) linear_sampler: Handle,
}

impl SceneRenderer {
    /// Create the renderer and its built-in nodes
    ///
    /// # Arguments
    ///
    /// * `device` - Backend device (takes ownership)
    /// * `surface` - Surface the swapchain presents to
    /// * `compiler` - Shader compiler used by the Update phase
    /// * `config` - Renderer configuration
    pub fn new(
        device: Box<dyn GraphicsDevice>,
        surface: &dyn SurfaceProvider,
        compiler: Box<dyn ShaderCompiler>,
        config: RendererConfig,
    ) -> Result<Self> {
        let mut context = DeviceContext::new(device, surface.surface_handle(), &config)?;
        let depth = context.back_buffer_count();
        let ring = FrameRing::new(&mut context, depth, config.fence_timeout)?;

        let point_sampler = context.create_view(&ViewDesc::Sampler { filter: SamplerFilter::Point })?;
        let linear_sampler = context.create_view(&ViewDesc::Sampler { filter: SamplerFilter::Linear })?;

        let mut graph = NodeGraph::new();
        let size = config.dummy_texture_size;
        graph.insert(TextureNode::new(DUMMY_TEXTURE, size, size, checker_pixels(size))?.into());

        let mut mipmap = DrawUnitNode::new(MIPMAP_UNIT)?;
        mipmap.set_shader(&config.mipmap_shader);
        mipmap.set_input_layout(VertexLayout::empty());
        mipmap.set_vertex_count(4);
        graph.insert(mipmap.into());

        lattice_info!(
            "lattice::SceneRenderer",
            "'{}' ready ({} frames in flight)",
            config.app_name,
            ring.len()
        );

        Ok(Self {
            config,
            context,
            ring,
            graph,
            backings: SecondaryMap::new(),
            pipelines: FxHashMap::default(),
            failed_shaders: FxHashSet::default(),
            compiler,
            point_sampler,
            linear_sampler,
        })
    }

    // ===== SCENE EDITING =====

    /// Insert a node, or replace the node with the same name
    ///
    /// A node whose GPU backing exists cannot be replaced: remove it first.
    /// Replacing a node that was never materialized keeps its position.
    pub fn set_node(&mut self, node: impl Into<Node>) -> Result<NodeId> {
        let node = node.into();
        if let Some(id) = self.graph.id(node.name()) {
            if self.backings.contains_key(id) {
                lattice_warn!(
                    "lattice::SceneRenderer",
                    "'{}' is materialized; remove it before replacing",
                    node.name()
                );
                return Err(Error::NodeMaterialized(node.name().to_string()));
            }
        }
        let (id, _previous) = self.graph.insert(node);
        Ok(id)
    }

    /// Remove a node and retire its backing
    ///
    /// The backing's GPU objects and handles are released once every frame
    /// that could reference them has completed.
    pub fn remove_node(&mut self, name: &str) -> Result<()> {
        if name == DUMMY_TEXTURE || name == MIPMAP_UNIT {
            return Err(Error::InvalidResource(format!("'{}' is a built-in node", name)));
        }
        let (id, _node) = self
            .graph
            .remove(name)
            .ok_or_else(|| Error::NodeNotFound(name.to_string()))?;

        for slot in 0..self.ring.len() {
            let record = self.ring.record_mut(slot);
            record.pending_uploads.retain(|upload| upload.node != id);
            record.mipmap_queue.retain(|&queued| queued != id);
        }
        if let Some(backing) = self.backings.remove(id) {
            self.ring.retire(Retired::Backing(backing));
        }
        Ok(())
    }

    /// Drop every pipeline and forget compile failures
    ///
    /// Pipelines are rebuilt by the next `update()`.
    pub fn reload_shaders(&mut self) {
        let count = self.pipelines.len();
        for (_, pipeline) in self.pipelines.drain() {
            self.ring.retire(Retired::Pipeline(pipeline));
        }
        self.failed_shaders.clear();

        let ids: Vec<NodeId> = self.graph.ids().to_vec();
        for id in ids {
            if let Some(node) = self.graph.get_mut(id) {
                if node.kind() == NodeKind::DrawUnit {
                    node.set_state(NodeState::Pending);
                }
            }
        }
        lattice_info!("lattice::SceneRenderer", "Shaders reloaded ({} pipelines retired)", count);
    }

    /// Block until the GPU is idle and release everything it was holding
    pub fn wait_idle(&mut self) -> Result<()> {
        let released = self.ring.wait_idle()?;
        self.release(released);
        Ok(())
    }

    // ===== ACCESSORS =====

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn graph(&self) -> &NodeGraph {
        &self.graph
    }

    pub fn node(&self, name: &str) -> Result<&Node> {
        self.graph.node(name)
    }

    pub fn view_mut(&mut self, name: &str) -> Result<&mut ViewNode> {
        self.graph.view_mut(name)
    }

    pub fn draw_unit_mut(&mut self, name: &str) -> Result<&mut DrawUnitNode> {
        self.graph.draw_unit_mut(name)
    }

    pub fn render_target_mut(&mut self, name: &str) -> Result<&mut RenderTargetNode> {
        self.graph.render_target_mut(name)
    }

    pub fn texture_mut(&mut self, name: &str) -> Result<&mut TextureNode> {
        self.graph.texture_mut(name)
    }

    /// GPU backing of a node, if materialized
    pub fn backing(&self, name: &str) -> Option<&Backing> {
        self.graph.id(name).and_then(|id| self.backings.get(id))
    }

    /// Pipeline built for a shader path
    pub fn pipeline(&self, shader: &str) -> Option<&Arc<dyn Pipeline>> {
        self.pipelines.get(shader)
    }

    /// Whether a shader failed to build since the last reload
    pub fn shader_failed(&self, shader: &str) -> bool {
        self.failed_shaders.contains(shader)
    }

    /// (allocated, capacity) of one handle pool
    pub fn handle_pool_usage(&self, kind: HandleKind) -> (u32, u32) {
        self.context.handle_pool_usage(kind)
    }

    /// Sampler handle for a filter
    pub fn sampler(&self, filter: SamplerFilter) -> Handle {
        match filter {
            SamplerFilter::Point => self.point_sampler,
            SamplerFilter::Linear => self.linear_sampler,
        }
    }

    /// Frame slot the next update/draw records into
    pub fn current_slot(&self) -> usize {
        self.context.current_back_buffer_index() % self.ring.len()
    }

    pub fn frame_record(&self, slot: usize) -> &FrameRecord {
        self.ring.record(slot)
    }

    /// Objects waiting for the GPU before release
    pub fn retired_len(&self) -> usize {
        self.ring.retired_len()
    }

    pub fn device_stats(&self) -> DeviceStats {
        self.context.stats()
    }

    // ===== INTERNAL =====

    /// Return the handles of released backings to their pools
    pub(crate) fn release(&mut self, items: Vec<Retired>) {
        for item in items {
            if let Retired::Backing(backing) = item {
                for handle in backing.handles() {
                    if let Err(error) = self.context.free_view(&handle) {
                        lattice_warn!("lattice::SceneRenderer", "Failed to free handle: {}", error);
                    }
                }
            }
        }
    }
}

impl Drop for SceneRenderer {
    fn drop(&mut self) {
        if let Err(error) = self.wait_idle() {
            lattice_warn!("lattice::SceneRenderer", "GPU not idle at shutdown: {}", error);
        }
    }
}

/// RGBA8 checker pattern of black and white cells
pub(crate) fn checker_pixels(size: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(size as usize * size as usize * 4);
    for y in 0..size {
        for x in 0..size {
            let cell = ((x / DUMMY_CHECKER_CELL) ^ (y / DUMMY_CHECKER_CELL)) & 1;
            let value = if cell == 0 { 0x00 } else { 0xFF };
            pixels.extend_from_slice(&[value, value, value, 0xFF]);
        }
    }
    pixels
}

#[cfg(test)]
#[path = "scene_renderer_tests.rs"]
mod tests;
