/*!
# Lattice Renderer - Headless Backend

CPU implementation of the lattice_renderer backend traits.

Resources live in plain memory, command lists execute while they are
recorded and every command is validated against the resource states it
touches. Useful for CI, tooling and tests that need the full renderer
without a GPU or a window.

## Example

```no_run
use lattice_renderer::lattice::{RendererConfig, SceneRenderer};
use lattice_renderer_headless::{HeadlessDevice, HeadlessShaderCompiler, HeadlessSurface};

let device = HeadlessDevice::new();
let controller = device.controller();
let compiler = HeadlessShaderCompiler::new().with_root("shaders");
let mut renderer = SceneRenderer::new(
    Box::new(device),
    &HeadlessSurface::unbounded(),
    Box::new(compiler),
    RendererConfig::default(),
)?;
renderer.update(0)?;
renderer.draw(0)?;
assert_eq!(controller.presents(), 1);
# Ok::<(), lattice_renderer::lattice::Error>(())
```
*/

mod headless;
mod headless_context;
mod headless_buffer;
mod headless_texture;
mod headless_pipeline;
mod headless_fence;
mod headless_command_list;
mod headless_swapchain;
mod headless_shader_compiler;
mod headless_surface;
mod recorded_command;

pub use headless::{HeadlessController, HeadlessDevice};
pub use headless_buffer::Buffer as HeadlessBuffer;
pub use headless_texture::Texture as HeadlessTexture;
pub use headless_command_list::CommandList as HeadlessCommandList;
pub use headless_shader_compiler::ShaderCompiler as HeadlessShaderCompiler;
pub use headless_surface::Surface as HeadlessSurface;
pub use recorded_command::{RecordedCommand, Slot, Submission};
