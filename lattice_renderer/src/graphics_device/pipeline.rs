/// Pipeline trait, pipeline descriptor and vertex input layout

use crate::graphics_device::{ResourceId, TextureFormat};

/// Format of one vertex attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum BufferFormat {
    R32_SFLOAT,
    R32G32_SFLOAT,
    R32G32B32_SFLOAT,
    R32G32B32A32_SFLOAT,
}

impl BufferFormat {
    /// Size in bytes of one attribute of this format
    pub fn size_bytes(&self) -> u32 {
        match self {
            BufferFormat::R32_SFLOAT => 4,
            BufferFormat::R32G32_SFLOAT => 8,
            BufferFormat::R32G32B32_SFLOAT => 12,
            BufferFormat::R32G32B32A32_SFLOAT => 16,
        }
    }
}

/// One element of a vertex input layout
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    /// Semantic name bound in the vertex shader (e.g. "POSITION")
    pub semantic: String,
    /// Attribute format
    pub format: BufferFormat,
    /// Byte offset inside the vertex
    pub offset: u32,
}

/// Vertex input layout (one interleaved stream)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct VertexLayout {
    pub attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    /// Layout without attributes (vertex id driven shaders)
    pub fn empty() -> Self {
        Self { attributes: Vec::new() }
    }

    /// position(3f) uv(2f) normal(3f), 32 bytes per vertex
    pub fn position_uv_normal() -> Self {
        Self {
            attributes: vec![
                VertexAttribute {
                    semantic: "POSITION".to_string(),
                    format: BufferFormat::R32G32B32_SFLOAT,
                    offset: 0,
                },
                VertexAttribute {
                    semantic: "TEXCOORD".to_string(),
                    format: BufferFormat::R32G32_SFLOAT,
                    offset: 12,
                },
                VertexAttribute {
                    semantic: "NORMAL".to_string(),
                    format: BufferFormat::R32G32B32_SFLOAT,
                    offset: 20,
                },
            ],
        }
    }

    /// Size of one vertex (end of the last attribute)
    pub fn stride(&self) -> u32 {
        self.attributes
            .iter()
            .map(|a| a.offset + a.format.size_bytes())
            .max()
            .unwrap_or(0)
    }
}

/// Primitive topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveTopology {
    TriangleList,
    TriangleStrip,
}

/// Descriptor for creating a graphics pipeline
#[derive(Debug, Clone)]
pub struct PipelineDesc {
    /// Debug label (shader identifier)
    pub label: String,
    /// Compiled vertex stage bytecode
    pub vertex_shader: Vec<u8>,
    /// Compiled pixel stage bytecode
    pub pixel_shader: Vec<u8>,
    /// Vertex input layout
    pub input_layout: VertexLayout,
    /// Color target format
    pub color_format: TextureFormat,
    /// Depth target format (None = no depth test)
    pub depth_format: Option<TextureFormat>,
}

/// Graphics pipeline trait
///
/// Implemented by backend-specific pipeline types.
pub trait Pipeline: Send + Sync {
    /// Backend identity of this pipeline
    fn id(&self) -> ResourceId;

    /// Label the pipeline was created with
    fn label(&self) -> &str;
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
