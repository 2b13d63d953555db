/// Graphics device module - backend traits and GPU object descriptors

// Module declarations
pub mod graphics_device;
pub mod descriptor;
pub mod texture;
pub mod buffer;
pub mod shader;
pub mod pipeline;
pub mod command_list;
pub mod fence;
pub mod swapchain;
pub mod surface;

// Re-export everything from graphics_device.rs
pub use graphics_device::*;

// Re-export from other modules
pub use descriptor::*;
pub use texture::*;
pub use buffer::*;
pub use shader::*;
pub use pipeline::*;
pub use command_list::*;
pub use fence::*;
pub use swapchain::*;
pub use surface::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;
