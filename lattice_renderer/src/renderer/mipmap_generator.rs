/// Mipmap generator.
///
/// Builds mip level i+1 from level i by drawing a full-target strip quad
/// with the mipmap pipeline: the shader samples the SRV of level i (table
/// slot 0, linear sampler at slot 1) and writes the RTV of level i+1.

use std::sync::Arc;
use crate::error::Result;
use crate::graph::Backing;
use crate::graphics_device::{
    mip_extent, mip_level_count, CommandList, Handle, Pipeline, PrimitiveTopology, Rect2D,
    ResourceState, Subresource, Texture, Viewport,
};

/// Vertices of the full-target quad drawn per level
pub const MIP_QUAD_VERTICES: u32 = 4;

/// Texture and per-level views a chain is generated through
pub struct MipChain<'a> {
    pub texture: &'a dyn Texture,
    pub srv_mips: &'a [Handle],
    pub rtv_mips: &'a [Handle],
    /// State the levels rest in outside of generation
    pub resting: ResourceState,
}

impl<'a> MipChain<'a> {
    /// Chain of a texture or render-target backing (None for vertex buffers)
    pub fn from_backing(backing: &'a Backing) -> Option<Self> {
        match backing {
            Backing::VertexBuffer(_) => None,
            Backing::Texture(t) => Some(Self {
                texture: t.texture.as_ref(),
                srv_mips: &t.srv_mips,
                rtv_mips: &t.rtv_mips,
                resting: ResourceState::GenericRead,
            }),
            Backing::RenderTarget(rt) => Some(Self {
                texture: rt.color.as_ref(),
                srv_mips: &rt.srv_mips,
                rtv_mips: &rt.rtv_mips,
                resting: ResourceState::Common,
            }),
        }
    }

    /// Number of levels that can take part in generation
    pub fn levels(&self) -> u32 {
        let info = self.texture.info();
        mip_level_count(info.width, info.height)
            .min(info.mip_levels)
            .min(self.srv_mips.len() as u32)
            .min(self.rtv_mips.len() as u32)
    }
}

/// Record the commands generating every level of `chain` below level 0
///
/// Returns the number of levels written (0 when the chain has a single level).
///
/// # Arguments
///
/// * `cmd` - Open command list
/// * `pipeline` - Pipeline of the mipmap shader
/// * `sampler` - Sampler bound at table slot 1
/// * `chain` - Target texture and its views
pub fn record_mip_chain(
    cmd: &mut dyn CommandList,
    pipeline: &Arc<dyn Pipeline>,
    sampler: &Handle,
    chain: &MipChain<'_>,
) -> Result<u32> {
    let levels = chain.levels();
    if levels < 2 {
        return Ok(0);
    }
    let info = chain.texture.info();

    cmd.set_pipeline(pipeline)?;
    cmd.set_primitive_topology(PrimitiveTopology::TriangleStrip)?;
    cmd.set_descriptor_table(1, sampler)?;

    for level in 0..levels - 1 {
        let dst = level + 1;
        let (width, height) = mip_extent(info.width, info.height, dst);

        cmd.set_viewport(Viewport::from_size(width, height))?;
        cmd.set_scissor(Rect2D::from_size(width, height))?;
        cmd.resource_barrier(chain.texture, Subresource::Mip(dst), chain.resting, ResourceState::RenderTarget)?;
        cmd.set_render_targets(&chain.rtv_mips[dst as usize..=dst as usize], None)?;
        cmd.set_descriptor_table(0, &chain.srv_mips[level as usize])?;
        cmd.draw(MIP_QUAD_VERTICES, 1)?;
        cmd.resource_barrier(chain.texture, Subresource::Mip(dst), ResourceState::RenderTarget, chain.resting)?;
    }

    Ok(levels - 1)
}

#[cfg(test)]
#[path = "mipmap_generator_tests.rs"]
mod tests;
