/// Swapchain - headless implementation of the Swapchain trait

use std::sync::Arc;
use lattice_renderer::lattice::device::{
    ResourceState, Swapchain as RendererSwapchain, SwapchainDesc, Texture as RendererTexture,
    TextureFormat,
};
use lattice_renderer::lattice::{Error, Result};
use lattice_renderer::lattice_bail;

use crate::headless_context::HeadlessContext;
use crate::headless_texture::Texture;

/// Offscreen presentation chain
///
/// Presenting checks that the current back buffer is back in the `Present`
/// state, counts the present and advances to the next buffer.
pub struct Swapchain {
    ctx: Arc<HeadlessContext>,
    desc: SwapchainDesc,
    buffers: Vec<Arc<Texture>>,
    current: usize,
}

impl Swapchain {
    pub(crate) fn new(ctx: Arc<HeadlessContext>, desc: SwapchainDesc, buffers: Vec<Arc<Texture>>) -> Self {
        Self { ctx, desc, buffers, current: 0 }
    }
}

impl RendererSwapchain for Swapchain {
    fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    fn current_index(&self) -> usize {
        self.current
    }

    fn back_buffer(&self, index: usize) -> Result<Arc<dyn RendererTexture>> {
        match self.buffers.get(index) {
            Some(texture) => Ok(Arc::clone(texture) as Arc<dyn RendererTexture>),
            None => Err(Error::InvalidResource(format!(
                "back buffer {} out of range ({} buffers)",
                index,
                self.buffers.len()
            ))),
        }
    }

    fn present(&mut self) -> Result<()> {
        let Some(back_buffer) = self.buffers.get(self.current) else {
            lattice_bail!("lattice::headless", "swapchain has no back buffers");
        };
        if back_buffer.state(0) != Some(ResourceState::Present) {
            lattice_bail!(
                "lattice::headless",
                "present of '{}' in state {:?}",
                back_buffer.label,
                back_buffer.state(0)
            );
        }
        self.ctx.lock().presents += 1;
        self.current = (self.current + 1) % self.buffers.len();
        Ok(())
    }

    fn width(&self) -> u32 {
        self.desc.width
    }

    fn height(&self) -> u32 {
        self.desc.height
    }

    fn format(&self) -> TextureFormat {
        self.desc.format
    }
}
