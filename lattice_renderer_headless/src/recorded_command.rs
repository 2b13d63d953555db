/// Commands as recorded by headless command lists

use lattice_renderer::lattice::device::{HandleKind, PrimitiveTopology, ResourceState, Subresource};

/// Descriptor slot referenced by a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub kind: HandleKind,
    pub index: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCommand {
    Barrier {
        texture: String,
        subresource: Subresource,
        before: ResourceState,
        after: ResourceState,
    },
    CopyBufferToTexture {
        buffer: String,
        texture: String,
        mip_level: u32,
    },
    SetViewport {
        width: f32,
        height: f32,
    },
    SetScissor {
        width: u32,
        height: u32,
    },
    SetRenderTargets {
        colors: Vec<Slot>,
        depth: Option<Slot>,
    },
    ClearRenderTarget {
        target: Slot,
        color: [f32; 4],
    },
    ClearDepthStencil {
        target: Slot,
        depth: f32,
        stencil: u8,
    },
    SetPipeline(String),
    SetPrimitiveTopology(PrimitiveTopology),
    SetVertexBuffer {
        buffer: String,
        stride: u32,
        size: u64,
    },
    SetDescriptorTable {
        slot: u32,
        handle: Slot,
    },
    Draw {
        vertex_count: u32,
        instance_count: u32,
    },
}

/// One executed command list
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    /// Value the queue fence was signaled to after this list
    pub fence_value: u64,
    pub commands: Vec<RecordedCommand>,
}

impl Submission {
    /// Number of draw commands
    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, RecordedCommand::Draw { .. }))
            .count()
    }

    /// Pipelines bound, in order
    pub fn pipelines(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                RecordedCommand::SetPipeline(label) => Some(label.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Clear colors, in order
    pub fn clear_colors(&self) -> Vec<[f32; 4]> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                RecordedCommand::ClearRenderTarget { color, .. } => Some(*color),
                _ => None,
            })
            .collect()
    }
}
