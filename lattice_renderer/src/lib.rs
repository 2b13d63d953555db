/*!
# Lattice Renderer

Retained-mode scene renderer over an explicit GPU API.

Applications describe a scene as named nodes (vertex buffers, textures,
render targets, draw units and views). Every frame the renderer
materializes pending nodes into GPU objects (**Update**) and records one
command list that clears and draws every view in order (**Draw**), keeping
up to N frames in flight behind a single queue fence.

## Architecture

- **GraphicsDevice**: Backend trait creating buffers, textures, views, pipelines and submitting work
- **DeviceContext**: Owns the device, the presentation chain and the handle pools
- **HandlePool**: Fixed-capacity descriptor slots with LIFO reuse
- **FrameRing**: Per-frame records, fence watermarks and deferred release
- **NodeGraph**: Named, typed scene nodes in insertion order
- **SceneRenderer**: Update phase, view scheduling and mip generation

Backends implement `GraphicsDevice`; the `lattice_renderer_headless` crate
provides a CPU-only one.
*/

pub mod error;
pub mod log;
pub mod config;
pub mod graphics_device;
pub mod context;
pub mod frame;
pub mod graph;
pub mod renderer;

// Main lattice namespace module
pub mod lattice {
    // Error types
    pub use crate::error::{Error, Result};

    // Configuration
    pub use crate::config::{HandleCapacities, RendererConfig};

    // Renderer entry points
    pub use crate::renderer::{run_frame_loop, FrameStats, SceneRenderer, SkipReason, UpdateStats};

    // Logging sub-module (types only, macros are exported at the crate root)
    pub mod log {
        pub use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
    }

    // Backend traits and descriptors
    pub mod device {
        pub use crate::graphics_device::*;
    }

    // Scene nodes
    pub mod scene {
        pub use crate::graph::*;
    }
}

// Re-export math library at crate root
pub use glam;
