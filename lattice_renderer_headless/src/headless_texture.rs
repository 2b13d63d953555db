/// Texture - headless implementation of the Texture trait
///
/// Each mip level owns a tightly packed byte image and a resource state.
/// Command lists check the state on every barrier, copy and clear.

use std::sync::Mutex;
use lattice_renderer::lattice::device::{
    mip_extent, ResourceId, ResourceState, Subresource, Texture as RendererTexture, TextureInfo,
};
use lattice_renderer::lattice::{Error, Result};

use crate::headless_context::lock;

pub(crate) struct MipLevel {
    pub(crate) state: ResourceState,
    pub(crate) pixels: Vec<u8>,
}

/// CPU-memory texture
pub struct Texture {
    pub(crate) id: ResourceId,
    pub(crate) label: String,
    pub(crate) info: TextureInfo,
    pub(crate) mips: Mutex<Vec<MipLevel>>,
}

impl Texture {
    pub(crate) fn new(id: ResourceId, label: &str, info: TextureInfo, initial_state: ResourceState) -> Self {
        let bpp = info.format.bytes_per_pixel() as usize;
        let mips = (0..info.mip_levels.max(1))
            .map(|level| {
                let (w, h) = mip_extent(info.width, info.height, level);
                MipLevel { state: initial_state, pixels: vec![0; w as usize * h as usize * bpp] }
            })
            .collect();
        Self { id, label: label.to_string(), info, mips: Mutex::new(mips) }
    }

    /// Copy of one mip level's bytes
    pub fn read_mip(&self, level: u32) -> Option<Vec<u8>> {
        lock(&self.mips).get(level as usize).map(|mip| mip.pixels.clone())
    }

    /// Current state of one mip level
    pub fn state(&self, level: u32) -> Option<ResourceState> {
        lock(&self.mips).get(level as usize).map(|mip| mip.state)
    }

    /// Move `subresource` from `before` to `after`
    ///
    /// Fails when any targeted level is not in `before`.
    pub(crate) fn transition(&self, subresource: Subresource, before: ResourceState, after: ResourceState) -> Result<()> {
        let mut mips = lock(&self.mips);
        let range = match subresource {
            Subresource::All => 0..mips.len(),
            Subresource::Mip(level) if (level as usize) < mips.len() => level as usize..level as usize + 1,
            Subresource::Mip(level) => {
                return Err(Error::InvalidResource(format!(
                    "'{}' has no mip {} ({} levels)",
                    self.label,
                    level,
                    mips.len()
                )));
            }
        };
        if let Some((level, mip)) = mips[range.clone()].iter().enumerate().find(|(_, m)| m.state != before) {
            return Err(Error::BackendError(format!(
                "barrier on '{}' mip {}: expected {:?}, found {:?}",
                self.label,
                range.start + level,
                before,
                mip.state
            )));
        }
        for mip in &mut mips[range] {
            mip.state = after;
        }
        Ok(())
    }

    /// Fail unless `level` is in `expected`
    pub(crate) fn expect_state(&self, level: u32, expected: ResourceState) -> Result<()> {
        match self.state(level) {
            Some(state) if state == expected => Ok(()),
            found => Err(Error::BackendError(format!(
                "'{}' mip {}: expected {:?}, found {:?}",
                self.label, level, expected, found
            ))),
        }
    }

    /// Run `f` on the bytes of one mip level
    pub(crate) fn with_mip<R>(&self, level: u32, f: impl FnOnce(&mut Vec<u8>) -> R) -> Option<R> {
        lock(&self.mips).get_mut(level as usize).map(|mip| f(&mut mip.pixels))
    }
}

impl RendererTexture for Texture {
    fn id(&self) -> ResourceId {
        self.id
    }

    fn info(&self) -> &TextureInfo {
        &self.info
    }
}

#[cfg(test)]
#[path = "headless_texture_tests.rs"]
mod tests;
