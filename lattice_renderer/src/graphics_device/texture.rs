/// Texture trait, texture descriptor, and texture info

use bitflags::bitflags;
use crate::graphics_device::{ResourceId, ResourceState};

/// Texture format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum TextureFormat {
    R8G8B8A8_UNORM,
    B8G8R8A8_UNORM,
    D32_FLOAT,
}

impl TextureFormat {
    /// Returns size in bytes of one texel
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            TextureFormat::R8G8B8A8_UNORM
            | TextureFormat::B8G8R8A8_UNORM
            | TextureFormat::D32_FLOAT => 4,
        }
    }

    /// Whether this is a depth format
    pub fn is_depth(&self) -> bool {
        matches!(self, TextureFormat::D32_FLOAT)
    }
}

bitflags! {
    /// Texture usage flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureFlags: u32 {
        /// Can be sampled through a shader-resource view
        const SHADER_RESOURCE  = 1 << 0;
        /// Can be bound as a color render target
        const RENDER_TARGET    = 1 << 1;
        /// Can be bound as a depth-stencil target
        const DEPTH_STENCIL    = 1 << 2;
        /// Can be written by unordered access
        const UNORDERED_ACCESS = 1 << 3;
    }
}

/// Number of mip levels of a full chain: floor(log2(min(w, h))) + 1
///
/// Returns 0 when either dimension is 0.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    let min = width.min(height);
    if min == 0 {
        0
    } else {
        u32::BITS - min.leading_zeros()
    }
}

/// Size of mip `level` of a `width` x `height` texture (each side clamped to 1)
pub fn mip_extent(width: u32, height: u32, level: u32) -> (u32, u32) {
    let w = width.checked_shr(level).unwrap_or(0).max(1);
    let h = height.checked_shr(level).unwrap_or(0).max(1);
    (w, h)
}

/// Descriptor for creating a texture
#[derive(Debug, Clone)]
pub struct TextureDesc {
    /// Debug label (node name)
    pub label: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format
    pub format: TextureFormat,
    /// Usage flags
    pub flags: TextureFlags,
    /// Number of mip levels (>= 1)
    pub mip_levels: u32,
    /// State the texture is created in
    pub initial_state: ResourceState,
}

/// Read-only properties of a created texture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format
    pub format: TextureFormat,
    /// Usage flags
    pub flags: TextureFlags,
    /// Number of mip levels
    pub mip_levels: u32,
}

/// Texture resource trait
///
/// Implemented by backend-specific texture types.
/// The texture is destroyed when the last reference is dropped.
pub trait Texture: Send + Sync {
    /// Backend identity of this texture
    fn id(&self) -> ResourceId;

    /// Get the read-only properties of this texture
    fn info(&self) -> &TextureInfo;
}

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;
