/// Fence - headless implementation of the Fence trait

use std::sync::{Condvar, Mutex};
use std::time::Duration;
use lattice_renderer::lattice::device::{Fence as RendererFence, ResourceId};
use lattice_renderer::lattice::Result;

use crate::headless_context::lock;

/// Monotonic counter with blocking waits
pub struct Fence {
    pub(crate) id: ResourceId,
    value: Mutex<u64>,
    reached: Condvar,
}

impl Fence {
    pub(crate) fn new(id: ResourceId, initial_value: u64) -> Self {
        Self { id, value: Mutex::new(initial_value), reached: Condvar::new() }
    }

    /// Raise the completed value (never lowers it) and wake waiters
    pub(crate) fn signal(&self, value: u64) {
        let mut current = lock(&self.value);
        if value > *current {
            *current = value;
            self.reached.notify_all();
        }
    }
}

impl RendererFence for Fence {
    fn id(&self) -> ResourceId {
        self.id
    }

    fn completed_value(&self) -> u64 {
        *lock(&self.value)
    }

    fn wait(&self, value: u64, timeout: Duration) -> Result<bool> {
        let guard = lock(&self.value);
        let (guard, _) = self
            .reached
            .wait_timeout_while(guard, timeout, |current| *current < value)
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(*guard >= value)
    }
}

#[cfg(test)]
#[path = "headless_fence_tests.rs"]
mod tests;
