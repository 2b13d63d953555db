/// GPU objects materialized for a node.
///
/// Backings are stored beside the graph, keyed by `NodeId`. Dropping a
/// backing releases its GPU objects; its handles must be returned to the
/// pools by the owner first.

use std::sync::Arc;
use crate::graphics_device::{Buffer, Handle, Texture};

pub struct VertexBufferBacking {
    pub buffer: Arc<dyn Buffer>,
    /// Size of one vertex in bytes
    pub stride: u32,
    /// Size of the vertex data in bytes
    pub size: u64,
}

pub struct TextureBacking {
    pub texture: Arc<dyn Texture>,
    /// One shader-resource view per mip level
    pub srv_mips: Vec<Handle>,
    /// One render-target view per mip level (empty without a mip chain)
    pub rtv_mips: Vec<Handle>,
    pub mip_levels: u32,
}

pub struct RenderTargetBacking {
    pub color: Arc<dyn Texture>,
    pub depth: Arc<dyn Texture>,
    /// One shader-resource view per mip level of the color texture
    pub srv_mips: Vec<Handle>,
    /// One render-target view per mip level of the color texture
    pub rtv_mips: Vec<Handle>,
    pub dsv: Handle,
    pub mip_levels: u32,
}

pub enum Backing {
    VertexBuffer(VertexBufferBacking),
    Texture(TextureBacking),
    RenderTarget(RenderTargetBacking),
}

impl Backing {
    /// Every view handle owned by this backing
    pub fn handles(&self) -> Vec<Handle> {
        match self {
            Backing::VertexBuffer(_) => Vec::new(),
            Backing::Texture(t) => t.srv_mips.iter().chain(t.rtv_mips.iter()).copied().collect(),
            Backing::RenderTarget(rt) => rt
                .srv_mips
                .iter()
                .chain(rt.rtv_mips.iter())
                .chain(std::iter::once(&rt.dsv))
                .copied()
                .collect(),
        }
    }

    /// Shader-resource view of mip 0 (what draw units sample)
    pub fn shader_view(&self) -> Option<&Handle> {
        match self {
            Backing::VertexBuffer(_) => None,
            Backing::Texture(t) => t.srv_mips.first(),
            Backing::RenderTarget(rt) => rt.srv_mips.first(),
        }
    }

    pub fn as_vertex_buffer(&self) -> Option<&VertexBufferBacking> {
        match self {
            Backing::VertexBuffer(vb) => Some(vb),
            _ => None,
        }
    }

    pub fn as_texture(&self) -> Option<&TextureBacking> {
        match self {
            Backing::Texture(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_render_target(&self) -> Option<&RenderTargetBacking> {
        match self {
            Backing::RenderTarget(rt) => Some(rt),
            _ => None,
        }
    }
}
