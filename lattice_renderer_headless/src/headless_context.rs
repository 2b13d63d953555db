/// Shared CPU-side "GPU" state
///
/// Every object created by one `HeadlessDevice` holds an `Arc` to the same
/// context. Command lists find the resources they are handed through the
/// registries, keyed by `ResourceId`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use rustc_hash::FxHashMap;
use lattice_renderer::lattice::device::{DeviceStats, HandleKind, ResourceId};

use crate::headless_buffer::Buffer;
use crate::headless_fence::Fence;
use crate::headless_pipeline::Pipeline;
use crate::headless_texture::Texture;
use crate::recorded_command::{RecordedCommand, Submission};

/// Texture subresource a view points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewTarget {
    pub texture: ResourceId,
    /// Mip level (0 for depth-stencil views)
    pub mip_level: u32,
}

#[derive(Default)]
pub struct ContextState {
    pub(crate) next_id: u64,
    pub(crate) labels: FxHashMap<ResourceId, String>,
    pub(crate) buffers: FxHashMap<ResourceId, Weak<Buffer>>,
    pub(crate) textures: FxHashMap<ResourceId, Weak<Texture>>,
    pub(crate) pipelines: FxHashMap<ResourceId, Weak<Pipeline>>,
    pub(crate) fences: FxHashMap<ResourceId, Arc<Fence>>,
    /// Written views by (kind, slot index); samplers are not tracked
    pub(crate) views: FxHashMap<(HandleKind, u32), ViewTarget>,
    /// Commands of each command list since its last `begin()`
    pub(crate) recordings: FxHashMap<ResourceId, Vec<RecordedCommand>>,
    pub(crate) submissions: Vec<Submission>,
    /// Fence signals waiting for `HeadlessController::complete_next`
    pub(crate) pending: VecDeque<(Arc<Fence>, u64)>,
    pub(crate) manual_completion: bool,
    pub(crate) device_lost: Option<String>,
    pub(crate) presents: u64,
    pub(crate) stats: DeviceStats,
}

impl ContextState {
    pub(crate) fn allocate_id(&mut self, label: &str) -> ResourceId {
        self.next_id += 1;
        let id = ResourceId(self.next_id);
        self.labels.insert(id, label.to_string());
        id
    }

    pub(crate) fn label(&self, id: ResourceId) -> String {
        self.labels
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("#{}", id.0))
    }

    pub(crate) fn texture(&self, id: ResourceId) -> Option<Arc<Texture>> {
        self.textures.get(&id).and_then(Weak::upgrade)
    }

    pub(crate) fn buffer(&self, id: ResourceId) -> Option<Arc<Buffer>> {
        self.buffers.get(&id).and_then(Weak::upgrade)
    }

    pub(crate) fn pipeline(&self, id: ResourceId) -> Option<Arc<Pipeline>> {
        self.pipelines.get(&id).and_then(Weak::upgrade)
    }

    /// Forget registry entries whose object has been dropped
    pub(crate) fn prune(&mut self) {
        self.buffers.retain(|_, b| b.strong_count() > 0);
        self.textures.retain(|_, t| t.strong_count() > 0);
        self.pipelines.retain(|_, p| p.strong_count() > 0);
    }

    /// Number of live buffers and textures
    pub(crate) fn live_resources(&self) -> usize {
        self.buffers.values().filter(|b| b.strong_count() > 0).count()
            + self.textures.values().filter(|t| t.strong_count() > 0).count()
    }
}

/// Context shared by the device and everything it created
#[derive(Default)]
pub struct HeadlessContext {
    state: Mutex<ContextState>,
}

impl HeadlessContext {
    pub fn new(manual_completion: bool) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(ContextState { manual_completion, ..Default::default() }),
        })
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, ContextState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Lock a mutex, recovering the data if a holder panicked
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
