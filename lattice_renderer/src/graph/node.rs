/// Scene nodes.
///
/// A node is a named, typed description of something the renderer draws
/// with. Nodes carry no GPU object; the Update phase materializes a backing
/// for the kinds that need one and records the outcome in the node state.

use glam::{Mat4, Vec3};
use crate::error::{Error, Result};
use crate::graphics_device::{PrimitiveTopology, VertexLayout};

/// Clear color of a view that never set one (opaque red)
pub const DEFAULT_CLEAR_COLOR: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

// ===== HEADER =====

/// Materialization state of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// Created or changed, not materialized yet
    Pending,
    /// Materialized and usable
    Ready,
    /// Materialization failed; not retried until the node is replaced
    Failed,
}

/// Node type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    RenderTarget,
    Texture,
    VertexBuffer,
    DrawUnit,
    View,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::RenderTarget => "RenderTarget",
            NodeKind::Texture => "Texture",
            NodeKind::VertexBuffer => "VertexBuffer",
            NodeKind::DrawUnit => "DrawUnit",
            NodeKind::View => "View",
        }
    }
}

/// Fields shared by every node
#[derive(Debug, Clone)]
pub struct NodeHeader {
    name: String,
    state: NodeState,
}

impl NodeHeader {
    fn new(name: &str) -> Result<Self> {
        if name.is_empty() {
            return Err(Error::InvalidResource("node name must not be empty".to_string()));
        }
        Ok(Self { name: name.to_string(), state: NodeState::Pending })
    }
}

fn check_size(name: &str, width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidResource(format!(
            "node '{}': size must be non-zero (got {}x{})",
            name, width, height
        )));
    }
    Ok(())
}

// ===== NODE =====

/// A scene node (tagged by kind)
#[derive(Debug, Clone)]
pub enum Node {
    RenderTarget(RenderTargetNode),
    Texture(TextureNode),
    VertexBuffer(VertexBufferNode),
    DrawUnit(DrawUnitNode),
    View(ViewNode),
}

impl Node {
    fn header(&self) -> &NodeHeader {
        match self {
            Node::RenderTarget(n) => &n.header,
            Node::Texture(n) => &n.header,
            Node::VertexBuffer(n) => &n.header,
            Node::DrawUnit(n) => &n.header,
            Node::View(n) => &n.header,
        }
    }

    fn header_mut(&mut self) -> &mut NodeHeader {
        match self {
            Node::RenderTarget(n) => &mut n.header,
            Node::Texture(n) => &mut n.header,
            Node::VertexBuffer(n) => &mut n.header,
            Node::DrawUnit(n) => &mut n.header,
            Node::View(n) => &mut n.header,
        }
    }

    /// Unique name of the node
    pub fn name(&self) -> &str {
        &self.header().name
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::RenderTarget(_) => NodeKind::RenderTarget,
            Node::Texture(_) => NodeKind::Texture,
            Node::VertexBuffer(_) => NodeKind::VertexBuffer,
            Node::DrawUnit(_) => NodeKind::DrawUnit,
            Node::View(_) => NodeKind::View,
        }
    }

    pub fn state(&self) -> NodeState {
        self.header().state
    }

    pub(crate) fn set_state(&mut self, state: NodeState) {
        self.header_mut().state = state;
    }

    /// Whether the node still has to go through the Update phase
    pub fn is_dirty(&self) -> bool {
        self.state() != NodeState::Ready
    }
}

impl From<RenderTargetNode> for Node {
    fn from(node: RenderTargetNode) -> Self {
        Node::RenderTarget(node)
    }
}

impl From<TextureNode> for Node {
    fn from(node: TextureNode) -> Self {
        Node::Texture(node)
    }
}

impl From<VertexBufferNode> for Node {
    fn from(node: VertexBufferNode) -> Self {
        Node::VertexBuffer(node)
    }
}

impl From<DrawUnitNode> for Node {
    fn from(node: DrawUnitNode) -> Self {
        Node::DrawUnit(node)
    }
}

impl From<ViewNode> for Node {
    fn from(node: ViewNode) -> Self {
        Node::View(node)
    }
}

// ===== RENDER TARGET =====

/// Offscreen color + depth target, sampleable by later views
#[derive(Debug, Clone)]
pub struct RenderTargetNode {
    header: NodeHeader,
    width: u32,
    height: u32,
    generate_mipmaps: bool,
}

impl RenderTargetNode {
    pub fn new(name: &str, width: u32, height: u32) -> Result<Self> {
        check_size(name, width, height)?;
        Ok(Self {
            header: NodeHeader::new(name)?,
            width,
            height,
            generate_mipmaps: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.header.name
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Request a mip chain rebuild after the next time this target is drawn
    pub fn set_generate_mipmaps(&mut self, generate: bool) {
        self.generate_mipmaps = generate;
    }

    pub fn generate_mipmaps(&self) -> bool {
        self.generate_mipmaps
    }

    pub(crate) fn take_mipmap_request(&mut self) -> bool {
        std::mem::replace(&mut self.generate_mipmaps, false)
    }
}

// ===== TEXTURE =====

/// Immutable RGBA8 image uploaded once
#[derive(Debug, Clone)]
pub struct TextureNode {
    header: NodeHeader,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    mip_chain: bool,
    generate_mipmaps: bool,
}

impl TextureNode {
    /// Create a texture from tightly packed RGBA8 pixels
    ///
    /// # Arguments
    ///
    /// * `name` - Unique node name
    /// * `width` - Width in pixels
    /// * `height` - Height in pixels
    /// * `pixels` - `width * height * 4` bytes, rows top to bottom
    pub fn new(name: &str, width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        check_size(name, width, height)?;
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(Error::InvalidResource(format!(
                "texture '{}': expected {} bytes for {}x{} RGBA8, got {}",
                name,
                expected,
                width,
                height,
                pixels.len()
            )));
        }
        Ok(Self {
            header: NodeHeader::new(name)?,
            width,
            height,
            pixels,
            mip_chain: false,
            generate_mipmaps: false,
        })
    }

    /// Materialize with a full mip chain and generate it after upload
    pub fn with_mipmaps(mut self) -> Self {
        self.mip_chain = true;
        self.generate_mipmaps = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.header.name
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Whether the texture is created with every mip level
    pub fn has_mip_chain(&self) -> bool {
        self.mip_chain
    }

    /// Request a mip chain rebuild (ignored for single-level textures)
    pub fn set_generate_mipmaps(&mut self, generate: bool) {
        self.generate_mipmaps = generate;
    }

    pub fn generate_mipmaps(&self) -> bool {
        self.generate_mipmaps
    }

    pub(crate) fn take_mipmap_request(&mut self) -> bool {
        std::mem::replace(&mut self.generate_mipmaps, false)
    }
}

// ===== VERTEX BUFFER =====

/// Interleaved vertex data
#[derive(Debug, Clone)]
pub struct VertexBufferNode {
    header: NodeHeader,
    data: Vec<u8>,
    stride: u32,
}

impl VertexBufferNode {
    /// Create a vertex buffer from raw bytes
    ///
    /// `data.len()` must be a multiple of `stride`.
    pub fn new(name: &str, data: Vec<u8>, stride: u32) -> Result<Self> {
        if stride == 0 {
            return Err(Error::InvalidResource(format!(
                "vertex buffer '{}': stride must be non-zero",
                name
            )));
        }
        if data.len() % stride as usize != 0 {
            return Err(Error::InvalidResource(format!(
                "vertex buffer '{}': {} bytes is not a multiple of stride {}",
                name,
                data.len(),
                stride
            )));
        }
        Ok(Self { header: NodeHeader::new(name)?, data, stride })
    }

    /// Create a vertex buffer from a slice of plain-old-data vertices
    ///
    /// # Example
    ///
    /// ```ignore
    /// let quad: [[f32; 8]; 4] = ...;
    /// let node = VertexBufferNode::from_slice("rect", &quad)?;
    /// ```
    pub fn from_slice<T: bytemuck::Pod>(name: &str, vertices: &[T]) -> Result<Self> {
        Self::new(
            name,
            bytemuck::cast_slice(vertices).to_vec(),
            std::mem::size_of::<T>() as u32,
        )
    }

    pub fn name(&self) -> &str {
        &self.header.name
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn vertex_count(&self) -> u32 {
        (self.data.len() / self.stride as usize) as u32
    }
}

// ===== DRAW UNIT =====

/// One draw call: a vertex buffer, an optional texture and a shader
#[derive(Debug, Clone)]
pub struct DrawUnitNode {
    header: NodeHeader,
    vertex_buffer: Option<String>,
    texture: Option<String>,
    shader: Option<String>,
    vertex_count: u32,
    topology: PrimitiveTopology,
    input_layout: VertexLayout,
    position: Vec3,
    scale: Vec3,
}

impl DrawUnitNode {
    pub fn new(name: &str) -> Result<Self> {
        Ok(Self {
            header: NodeHeader::new(name)?,
            vertex_buffer: None,
            texture: None,
            shader: None,
            vertex_count: 0,
            topology: PrimitiveTopology::TriangleStrip,
            input_layout: VertexLayout::position_uv_normal(),
            position: Vec3::ZERO,
            scale: Vec3::ONE,
        })
    }

    pub fn name(&self) -> &str {
        &self.header.name
    }

    pub fn set_vertex_buffer(&mut self, name: &str) {
        self.vertex_buffer = Some(name.to_string());
    }

    pub fn vertex_buffer(&self) -> Option<&str> {
        self.vertex_buffer.as_deref()
    }

    /// Texture or render target sampled at slot 0 (None = fallback texture)
    pub fn set_texture(&mut self, name: Option<&str>) {
        self.texture = name.map(str::to_string);
    }

    pub fn texture(&self) -> Option<&str> {
        self.texture.as_deref()
    }

    /// Shader source path, also the pipeline cache key
    pub fn set_shader(&mut self, path: &str) {
        if self.shader.as_deref() != Some(path) {
            self.shader = Some(path.to_string());
            self.header.state = NodeState::Pending;
        }
    }

    pub fn shader(&self) -> Option<&str> {
        self.shader.as_deref()
    }

    pub fn set_vertex_count(&mut self, count: u32) {
        self.vertex_count = count;
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn set_topology(&mut self, topology: PrimitiveTopology) {
        self.topology = topology;
    }

    pub fn topology(&self) -> PrimitiveTopology {
        self.topology
    }

    /// Vertex layout used when the pipeline is built
    pub fn set_input_layout(&mut self, layout: VertexLayout) {
        self.input_layout = layout;
    }

    pub fn input_layout(&self) -> &VertexLayout {
        &self.input_layout
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Local transform (scale, then translation)
    pub fn transform(&self) -> Mat4 {
        Mat4::from_translation(self.position) * Mat4::from_scale(self.scale)
    }
}

// ===== VIEW =====

/// A pass: clears a target and draws units into it
#[derive(Debug, Clone)]
pub struct ViewNode {
    header: NodeHeader,
    width: u32,
    height: u32,
    order: i32,
    clear_color: [f32; 4],
    render_target: Option<String>,
    units: Vec<String>,
}

impl ViewNode {
    pub fn new(name: &str, width: u32, height: u32) -> Result<Self> {
        check_size(name, width, height)?;
        Ok(Self {
            header: NodeHeader::new(name)?,
            width,
            height,
            order: 0,
            clear_color: DEFAULT_CLEAR_COLOR,
            render_target: None,
            units: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.header.name
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Views with a higher order are drawn first
    pub fn set_order(&mut self, order: i32) {
        self.order = order;
    }

    pub fn order(&self) -> i32 {
        self.order
    }

    pub fn set_clear_color(&mut self, color: [f32; 4]) {
        self.clear_color = color;
    }

    pub fn clear_color(&self) -> [f32; 4] {
        self.clear_color
    }

    /// Render into a render-target node instead of the presentation surface
    pub fn set_render_target(&mut self, name: Option<&str>) {
        self.render_target = name.map(str::to_string);
    }

    pub fn render_target(&self) -> Option<&str> {
        self.render_target.as_deref()
    }

    /// Append a unit; a unit already in the list keeps its position
    pub fn add_unit(&mut self, name: &str) {
        if !self.units.iter().any(|u| u == name) {
            self.units.push(name.to_string());
        }
    }

    /// Remove a unit; returns whether it was in the list
    pub fn remove_unit(&mut self, name: &str) -> bool {
        let before = self.units.len();
        self.units.retain(|u| u != name);
        self.units.len() != before
    }

    /// Units in draw order
    pub fn units(&self) -> &[String] {
        &self.units
    }
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
