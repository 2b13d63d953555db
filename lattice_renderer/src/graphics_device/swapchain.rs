/// Swapchain trait - presentation chain of back buffers

use std::sync::Arc;
use crate::error::Result;
use crate::graphics_device::{Texture, TextureFormat};

/// Descriptor for creating a swapchain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapchainDesc {
    /// Back buffer width in pixels
    pub width: u32,
    /// Back buffer height in pixels
    pub height: u32,
    /// Number of back buffers
    pub buffer_count: usize,
    /// Back buffer format
    pub format: TextureFormat,
}

/// Presentation chain
///
/// Back buffers rest in the `Present` state between frames. The current
/// index advances by one (modulo the buffer count) on every `present()`.
pub trait Swapchain: Send + Sync {
    /// Get the number of back buffers
    fn buffer_count(&self) -> usize;

    /// Index of the back buffer the next frame renders into
    fn current_index(&self) -> usize;

    /// Get back buffer `index`
    fn back_buffer(&self, index: usize) -> Result<Arc<dyn Texture>>;

    /// Present the current back buffer and advance the index
    fn present(&mut self) -> Result<()>;

    /// Get the width of the back buffers in pixels
    fn width(&self) -> u32;

    /// Get the height of the back buffers in pixels
    fn height(&self) -> u32;

    /// Get the pixel format of the back buffers
    fn format(&self) -> TextureFormat;
}
