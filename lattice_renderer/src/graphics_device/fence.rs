/// Fence trait - GPU timeline progress

use std::time::Duration;
use crate::error::Result;
use crate::graphics_device::ResourceId;

/// Monotonic GPU timeline value
///
/// The queue signals the fence to a value after all work submitted before
/// the signal has finished executing.
pub trait Fence: Send + Sync {
    /// Backend identity of this fence
    fn id(&self) -> ResourceId;

    /// Last value the GPU has reached
    fn completed_value(&self) -> u64;

    /// Block until the fence reaches `value` or `timeout` elapses
    ///
    /// Returns `Ok(true)` when the value was reached, `Ok(false)` on timeout.
    fn wait(&self, value: u64, timeout: Duration) -> Result<bool>;
}
