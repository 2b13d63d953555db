/// Presentation surface collaborator

/// Native surface the swapchain presents to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceHandle {
    /// No window (offscreen backends)
    Headless,
    /// Platform window handle
    Raw(u64),
}

/// Window-like provider driving the frame loop
pub trait SurfaceProvider {
    /// Native surface handle
    fn surface_handle(&self) -> SurfaceHandle;

    /// Pump pending events; returns false once the surface has been closed
    fn poll(&mut self) -> bool;
}
