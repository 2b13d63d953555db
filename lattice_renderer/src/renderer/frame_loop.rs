/// Frame loop driver

use crate::error::Result;
use crate::graphics_device::SurfaceProvider;
use crate::renderer::SceneRenderer;
use crate::{lattice_error, lattice_info};

/// Run update + draw until the surface stops polling
///
/// `on_frame` runs before each frame's update and may edit the scene.
/// Returns the number of frames drawn. A lost device ends the loop with
/// its error; the GPU is drained before returning either way.
///
/// # Arguments
///
/// * `renderer` - Renderer to drive
/// * `surface` - Surface whose `poll()` gates every frame
/// * `on_frame` - Per-frame scene callback, receives the frame id
pub fn run_frame_loop<S, F>(renderer: &mut SceneRenderer, surface: &mut S, mut on_frame: F) -> Result<u64>
where
    S: SurfaceProvider + ?Sized,
    F: FnMut(&mut SceneRenderer, u64) -> Result<()>,
{
    let mut frame_id = 0u64;
    let outcome = loop {
        if !surface.poll() {
            break Ok(());
        }
        if let Err(error) = run_frame(renderer, &mut on_frame, frame_id) {
            if error.is_device_lost() {
                lattice_error!("lattice::FrameLoop", "Device lost at frame {}: {}", frame_id, error);
            }
            break Err(error);
        }
        frame_id += 1;
    };

    let drained = renderer.wait_idle();
    if let Err(error) = &drained {
        lattice_error!("lattice::FrameLoop", "Shutdown wait failed: {}", error);
    }
    outcome.and(drained)?;

    lattice_info!("lattice::FrameLoop", "Frame loop ended after {} frames", frame_id);
    Ok(frame_id)
}

fn run_frame<F>(renderer: &mut SceneRenderer, on_frame: &mut F, frame_id: u64) -> Result<()>
where
    F: FnMut(&mut SceneRenderer, u64) -> Result<()>,
{
    on_frame(renderer, frame_id)?;
    renderer.update(frame_id)?;
    renderer.draw(frame_id)?;
    Ok(())
}

#[cfg(test)]
#[path = "frame_loop_tests.rs"]
mod tests;
