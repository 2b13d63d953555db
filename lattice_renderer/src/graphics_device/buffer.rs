/// Buffer trait and buffer descriptor

use crate::error::Result;
use crate::graphics_device::ResourceId;

/// Buffer usage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    /// CPU-visible vertex buffer, read directly by the input assembler
    Vertex,
    /// CPU-visible staging buffer, source of a texture copy
    Upload,
}

/// Descriptor for creating a buffer
#[derive(Debug, Clone)]
pub struct BufferDesc {
    /// Debug label (node name)
    pub label: String,
    /// Size in bytes
    pub size: u64,
    /// Buffer usage
    pub usage: BufferUsage,
}

/// Buffer resource trait
///
/// Implemented by backend-specific buffer types (e.g., HeadlessBuffer).
/// The buffer is automatically destroyed when the last reference is dropped.
pub trait Buffer: Send + Sync {
    /// Backend identity of this buffer
    fn id(&self) -> ResourceId;

    /// Size in bytes
    fn size(&self) -> u64;

    /// Usage the buffer was created with
    fn usage(&self) -> BufferUsage;

    /// Update buffer data
    ///
    /// # Arguments
    ///
    /// * `offset` - Offset into the buffer in bytes
    /// * `data` - Data to write
    fn update(&self, offset: u64, data: &[u8]) -> Result<()>;
}
