/// CommandList trait - for recording GPU commands

use std::sync::Arc;
use crate::error::Result;
use crate::graphics_device::{
    Buffer, Handle, Pipeline, PrimitiveTopology, ResourceId, Texture,
};

/// Usage state of a texture, as tracked by explicit barriers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceState {
    /// No particular usage (resting state of render targets)
    Common,
    /// Bound as color output
    RenderTarget,
    /// Owned by the presentation engine
    Present,
    /// Destination of a copy
    CopyDest,
    /// Readable by shaders (resting state of uploaded textures)
    GenericRead,
    /// Bound as depth output
    DepthWrite,
}

/// Part of a texture a barrier applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subresource {
    /// Every mip level
    All,
    /// A single mip level
    Mip(u32),
}

/// Command list for recording GPU commands
///
/// A command list owns its allocator. Commands are recorded between
/// `begin()` and `end()` and executed by `GraphicsDevice::submit()`.
/// `begin()` must not be called while the GPU may still be reading the
/// previous recording; the frame ring guarantees this with its fence.
pub trait CommandList: Send + Sync {
    /// Backend identity of this command list
    fn id(&self) -> ResourceId;

    /// Reset the allocator and start recording
    fn begin(&mut self) -> Result<()>;

    /// Close the list so it can be submitted
    fn end(&mut self) -> Result<()>;

    /// Whether the list is between `begin()` and `end()`
    fn is_recording(&self) -> bool;

    /// Transition a texture (or one of its mips) between usage states
    ///
    /// # Arguments
    ///
    /// * `texture` - Texture to transition
    /// * `subresource` - Mip level(s) affected
    /// * `before` - Current state
    /// * `after` - New state
    fn resource_barrier(
        &mut self,
        texture: &dyn Texture,
        subresource: Subresource,
        before: ResourceState,
        after: ResourceState,
    ) -> Result<()>;

    /// Copy tightly packed pixel rows from a staging buffer into one mip of a texture
    fn copy_buffer_to_texture(&mut self, src: &dyn Buffer, dst: &dyn Texture, mip_level: u32) -> Result<()>;

    /// Set the viewport
    fn set_viewport(&mut self, viewport: Viewport) -> Result<()>;

    /// Set the scissor rectangle
    fn set_scissor(&mut self, scissor: Rect2D) -> Result<()>;

    /// Bind color targets and an optional depth target
    ///
    /// # Arguments
    ///
    /// * `color` - Render-target view handles
    /// * `depth` - Depth-stencil view handle
    fn set_render_targets(&mut self, color: &[Handle], depth: Option<&Handle>) -> Result<()>;

    /// Clear a render-target view to a color
    fn clear_render_target(&mut self, target: &Handle, color: [f32; 4]) -> Result<()>;

    /// Clear a depth-stencil view
    fn clear_depth_stencil(&mut self, target: &Handle, depth: f32, stencil: u8) -> Result<()>;

    /// Bind a graphics pipeline
    fn set_pipeline(&mut self, pipeline: &Arc<dyn Pipeline>) -> Result<()>;

    /// Set the primitive topology used by subsequent draws
    fn set_primitive_topology(&mut self, topology: PrimitiveTopology) -> Result<()>;

    /// Bind a vertex buffer
    ///
    /// # Arguments
    ///
    /// * `buffer` - Buffer to bind
    /// * `stride` - Size of one vertex in bytes
    /// * `size` - Number of bytes visible to the input assembler
    fn set_vertex_buffer(&mut self, buffer: &Arc<dyn Buffer>, stride: u32, size: u64) -> Result<()>;

    /// Point a root table slot at a shader-visible handle
    ///
    /// # Arguments
    ///
    /// * `slot` - Root table slot (0 = texture, 1 = sampler)
    /// * `handle` - Shader-visible handle (shader-resource or sampler)
    fn set_descriptor_table(&mut self, slot: u32, handle: &Handle) -> Result<()>;

    /// Draw non-indexed vertices
    fn draw(&mut self, vertex_count: u32, instance_count: u32) -> Result<()>;
}

/// Viewport dimensions and depth range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// Full-depth viewport covering `width` x `height` from the origin
    pub fn from_size(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// 2D rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect2D {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect2D {
    /// Rectangle covering `width` x `height` from the origin
    pub fn from_size(width: u32, height: u32) -> Self {
        Self { x: 0, y: 0, width, height }
    }
}
