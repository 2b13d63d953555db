/// Buffer - headless implementation of the Buffer trait

use std::sync::Mutex;
use lattice_renderer::lattice::{Error, Result};
use lattice_renderer::lattice::device::{Buffer as RendererBuffer, BufferUsage, ResourceId};
use lattice_renderer::lattice_error;

use crate::headless_context::lock;

/// CPU-memory buffer
pub struct Buffer {
    pub(crate) id: ResourceId,
    pub(crate) size: u64,
    pub(crate) usage: BufferUsage,
    pub(crate) data: Mutex<Vec<u8>>,
}

impl Buffer {
    pub(crate) fn new(id: ResourceId, size: u64, usage: BufferUsage) -> Self {
        Self { id, size, usage, data: Mutex::new(vec![0; size as usize]) }
    }

    /// Copy of the buffer contents
    pub fn contents(&self) -> Vec<u8> {
        lock(&self.data).clone()
    }
}

impl RendererBuffer for Buffer {
    fn id(&self) -> ResourceId {
        self.id
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn usage(&self) -> BufferUsage {
        self.usage
    }

    fn update(&self, offset: u64, data: &[u8]) -> Result<()> {
        let end = offset
            .checked_add(data.len() as u64)
            .filter(|&end| end <= self.size);
        let Some(end) = end else {
            lattice_error!(
                "lattice::headless",
                "Buffer update out of range (offset {} + {} bytes > size {})",
                offset,
                data.len(),
                self.size
            );
            return Err(Error::InvalidResource(format!(
                "buffer update of {} bytes at {} exceeds size {}",
                data.len(),
                offset,
                self.size
            )));
        };
        lock(&self.data)[offset as usize..end as usize].copy_from_slice(data);
        Ok(())
    }
}
