/// Per-frame recording state

use std::sync::Arc;
use crate::graph::NodeId;
use crate::graphics_device::{Buffer, CommandList};

/// Staging buffer waiting for its copy to be recorded
pub struct PendingUpload {
    /// Texture node the pixels belong to
    pub node: NodeId,
    pub buffer: Arc<dyn Buffer>,
}

/// One slot of the frame ring
pub struct FrameRecord {
    /// Command list (with its allocator) reused every time the slot comes around
    pub command_list: Box<dyn CommandList>,
    /// Fence value signaled after the slot's last submission (None = idle)
    pub fence_value: Option<u64>,
    /// Uploads created by this frame's Update
    pub pending_uploads: Vec<PendingUpload>,
    /// Staging buffers whose copy has been recorded; kept alive until the fence passes
    pub in_flight: Vec<Arc<dyn Buffer>>,
    /// Texture and render-target nodes waiting for mip generation
    pub mipmap_queue: Vec<NodeId>,
}

impl FrameRecord {
    pub fn new(command_list: Box<dyn CommandList>) -> Self {
        Self {
            command_list,
            fence_value: None,
            pending_uploads: Vec::new(),
            in_flight: Vec::new(),
            mipmap_queue: Vec::new(),
        }
    }

    /// Queue a node for mip generation (once per frame)
    pub fn schedule_mipmaps(&mut self, node: NodeId) {
        if !self.mipmap_queue.contains(&node) {
            self.mipmap_queue.push(node);
        }
    }

    /// Remove a node from the mip queue; returns whether it was queued
    pub fn take_mipmap_request(&mut self, node: NodeId) -> bool {
        let before = self.mipmap_queue.len();
        self.mipmap_queue.retain(|&queued| queued != node);
        self.mipmap_queue.len() != before
    }
}
