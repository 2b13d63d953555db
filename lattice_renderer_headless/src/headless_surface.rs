/// Surface - headless implementation of SurfaceProvider

use lattice_renderer::lattice::device::{SurfaceHandle, SurfaceProvider};

/// Windowless surface that stays open for a fixed number of frames
pub struct Surface {
    remaining: Option<u64>,
}

impl Surface {
    /// Surface closing after `frames` polls
    pub fn with_frames(frames: u64) -> Self {
        Self { remaining: Some(frames) }
    }

    /// Surface that never closes
    pub fn unbounded() -> Self {
        Self { remaining: None }
    }

    /// Close the surface; the next poll returns false
    pub fn close(&mut self) {
        self.remaining = Some(0);
    }
}

impl SurfaceProvider for Surface {
    fn surface_handle(&self) -> SurfaceHandle {
        SurfaceHandle::Headless
    }

    fn poll(&mut self) -> bool {
        match &mut self.remaining {
            None => true,
            Some(0) => false,
            Some(remaining) => {
                *remaining -= 1;
                true
            }
        }
    }
}
