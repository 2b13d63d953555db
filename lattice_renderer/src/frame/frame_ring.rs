/// Frame context ring.
///
/// N frame records share one queue fence whose value grows by one per
/// submission. A slot is reused only after the fence has reached the value
/// signaled by the slot's previous submission, which is what keeps the CPU
/// at most N frames ahead of the GPU. Objects retired while the GPU may
/// still reference them wait in a deferred queue tagged with the last
/// signaled value.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use crate::context::DeviceContext;
use crate::error::{Error, Result};
use crate::frame::FrameRecord;
use crate::graph::Backing;
use crate::graphics_device::{Fence, GraphicsDevice, Pipeline};
use crate::{lattice_fail, lattice_trace};

/// Object released once the GPU is done with it
pub enum Retired {
    /// Backing of a removed node; its handles go back to the pools
    Backing(Backing),
    /// Pipeline dropped by a shader reload
    Pipeline(Arc<dyn Pipeline>),
}

pub struct FrameRing {
    records: Vec<FrameRecord>,
    fence: Arc<dyn Fence>,
    next_fence_value: u64,
    last_signaled: u64,
    retired: VecDeque<(u64, Retired)>,
    timeout: Duration,
}

impl FrameRing {
    /// Create `depth` records, each with its own command list
    pub fn new(context: &mut DeviceContext, depth: usize, timeout: Duration) -> Result<Self> {
        if depth == 0 {
            return Err(Error::InitializationFailed("frame ring depth must be at least 1".to_string()));
        }
        let mut records = Vec::with_capacity(depth);
        for _ in 0..depth {
            records.push(FrameRecord::new(context.create_command_list()?));
        }
        Ok(Self {
            records,
            fence: context.create_fence(0)?,
            next_fence_value: 1,
            last_signaled: 0,
            retired: VecDeque::new(),
            timeout,
        })
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record(&self, slot: usize) -> &FrameRecord {
        &self.records[slot]
    }

    pub fn record_mut(&mut self, slot: usize) -> &mut FrameRecord {
        &mut self.records[slot]
    }

    /// Last fence value handed to the queue (0 before the first submission)
    pub fn last_signaled(&self) -> u64 {
        self.last_signaled
    }

    /// Last fence value the GPU has reached
    pub fn completed_value(&self) -> u64 {
        self.fence.completed_value()
    }

    /// Make `slot` safe to record into
    ///
    /// Blocks until the slot's previous submission has completed, releases
    /// its staging buffers, then returns every retired object whose fence
    /// value has been reached. Acquiring an idle slot does not wait.
    pub fn acquire(&mut self, slot: usize) -> Result<Vec<Retired>> {
        let timeout = self.timeout;
        let record = &mut self.records[slot];
        if let Some(value) = record.fence_value {
            if self.fence.completed_value() < value {
                lattice_trace!("lattice::FrameRing", "slot {} waiting for fence {}", slot, value);
                if !self.fence.wait(value, timeout)? {
                    return Err(lattice_fail!(
                        "lattice::FrameRing",
                        Error::DeviceLost(format!(
                            "fence value {} not reached within {:?} (completed {})",
                            value,
                            timeout,
                            self.fence.completed_value()
                        ))
                    ));
                }
            }
            record.in_flight.clear();
            record.fence_value = None;
        }
        Ok(self.collect_retired())
    }

    /// Close the slot's command list, submit it and signal the next fence value
    ///
    /// Returns the signaled value, which becomes the slot's watermark.
    pub fn submit(&mut self, slot: usize, device: &mut dyn GraphicsDevice) -> Result<u64> {
        let value = self.next_fence_value;
        let record = &mut self.records[slot];
        record.command_list.end()?;
        device.submit(record.command_list.as_mut(), self.fence.as_ref(), value)?;
        record.fence_value = Some(value);
        self.next_fence_value += 1;
        self.last_signaled = value;
        Ok(value)
    }

    /// Defer the release of an object until the GPU passes the last signaled value
    pub fn retire(&mut self, item: Retired) {
        self.retired.push_back((self.last_signaled, item));
    }

    /// Number of objects waiting in the deferred queue
    pub fn retired_len(&self) -> usize {
        self.retired.len()
    }

    /// Wait for every submission, release all staging buffers and retired objects
    pub fn wait_idle(&mut self) -> Result<Vec<Retired>> {
        let value = self.last_signaled;
        if value > 0 && self.fence.completed_value() < value && !self.fence.wait(value, self.timeout)? {
            return Err(lattice_fail!(
                "lattice::FrameRing",
                Error::DeviceLost(format!("fence value {} not reached within {:?}", value, self.timeout))
            ));
        }
        for record in &mut self.records {
            record.in_flight.clear();
            record.fence_value = None;
        }
        Ok(self.collect_retired())
    }

    fn collect_retired(&mut self) -> Vec<Retired> {
        let completed = self.fence.completed_value();
        let mut released = Vec::new();
        while let Some((value, _)) = self.retired.front() {
            if *value > completed {
                break;
            }
            if let Some((_, item)) = self.retired.pop_front() {
                released.push(item);
            }
        }
        released
    }
}

#[cfg(test)]
#[path = "frame_ring_tests.rs"]
mod tests;
