/// Mock graphics device for unit tests (no GPU required)
///
/// Every object shares one `MockState`. Commands recorded by command lists,
/// submissions and presents are appended to a single journal of strings so
/// tests can assert on the exact sequence the renderer produced.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{Error, Result};
use crate::graphics_device::{
    Buffer, BufferDesc, BufferUsage, CommandList, CompileError, DescriptorTable,
    CpuLocation, DeviceStats, Fence, GpuLocation, GraphicsDevice, Handle, HandleKind,
    Pipeline, PipelineDesc, PrimitiveTopology, Rect2D, ResourceId, ResourceState,
    ShaderCompiler, Subresource, SurfaceHandle, SurfaceProvider, Swapchain,
    SwapchainDesc, Texture, TextureDesc, TextureFormat, TextureFlags, TextureInfo,
    ViewDesc, Viewport,
};
use crate::lattice_bail;

// ============================================================================
// Shared state
// ============================================================================

/// State shared by the mock device and every object it created
#[derive(Default)]
pub struct MockState {
    /// Journal of recorded commands, submissions and presents
    pub journal: Vec<String>,
    /// Labels of every created object, by id
    pub labels: FxHashMap<ResourceId, String>,
    /// Resource creation with one of these labels fails
    pub fail_labels: FxHashSet<String>,
    /// Recorded commands starting with one of these prefixes fail
    pub fail_commands: FxHashSet<String>,
    /// Device health
    pub device_lost: bool,
    /// When set, submitted fence signals stay pending until `complete_pending`
    pub hold_fences: bool,
    /// Fence signals waiting for `complete_pending`
    pub pending_signals: Vec<(Arc<MockFence>, u64)>,
    /// Written views, by (kind, slot index)
    pub views: FxHashMap<(HandleKind, u32), String>,
    /// Creation and submission counters
    pub stats: DeviceStats,
}

/// Cloneable handle to the shared mock state
#[derive(Clone, Default)]
pub struct MockControl {
    state: Arc<Mutex<MockState>>,
}

impl MockControl {
    pub fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    /// Snapshot of the journal
    pub fn journal(&self) -> Vec<String> {
        self.lock().journal.clone()
    }

    /// Clear the journal
    pub fn clear_journal(&self) {
        self.lock().journal.clear();
    }

    /// Journal entries starting with `prefix`
    pub fn entries(&self, prefix: &str) -> Vec<String> {
        self.lock()
            .journal
            .iter()
            .filter(|e| e.starts_with(prefix))
            .cloned()
            .collect()
    }

    pub fn fail_label(&self, label: &str) {
        self.lock().fail_labels.insert(label.to_string());
    }

    pub fn fail_command(&self, prefix: &str) {
        self.lock().fail_commands.insert(prefix.to_string());
    }

    pub fn set_device_lost(&self, lost: bool) {
        self.lock().device_lost = lost;
    }

    pub fn set_hold_fences(&self, hold: bool) {
        self.lock().hold_fences = hold;
    }

    /// Complete every held fence signal
    pub fn complete_pending(&self) {
        let pending = std::mem::take(&mut self.lock().pending_signals);
        for (fence, value) in pending {
            fence.signal(value);
        }
    }

    fn push(&self, entry: String) {
        self.lock().journal.push(entry);
    }

    /// Journal a command unless it matches an injected failure
    fn record(&self, entry: String) -> Result<()> {
        let mut state = self.lock();
        if state.fail_commands.iter().any(|prefix| entry.starts_with(prefix.as_str())) {
            return Err(Error::BackendError(format!("injected failure: {}", entry)));
        }
        state.journal.push(entry);
        Ok(())
    }

    fn label(&self, id: ResourceId) -> String {
        self.lock()
            .labels
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("#{}", id.0))
    }
}

// ============================================================================
// Mock Buffer
// ============================================================================

pub struct MockBuffer {
    pub id: ResourceId,
    pub size: u64,
    pub usage: BufferUsage,
    pub data: Mutex<Vec<u8>>,
}

impl Buffer for MockBuffer {
    fn id(&self) -> ResourceId {
        self.id
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn usage(&self) -> BufferUsage {
        self.usage
    }

    fn update(&self, offset: u64, data: &[u8]) -> Result<()> {
        let end = offset as usize + data.len();
        if end as u64 > self.size {
            lattice_bail!("lattice::mock", "update out of range ({} > {})", end, self.size);
        }
        self.data.lock().unwrap()[offset as usize..end].copy_from_slice(data);
        Ok(())
    }
}

// ============================================================================
// Mock Texture
// ============================================================================

pub struct MockTexture {
    pub id: ResourceId,
    pub info: TextureInfo,
}

impl Texture for MockTexture {
    fn id(&self) -> ResourceId {
        self.id
    }

    fn info(&self) -> &TextureInfo {
        &self.info
    }
}

// ============================================================================
// Mock Pipeline
// ============================================================================

pub struct MockPipeline {
    pub id: ResourceId,
    pub label: String,
}

impl Pipeline for MockPipeline {
    fn id(&self) -> ResourceId {
        self.id
    }

    fn label(&self) -> &str {
        &self.label
    }
}

// ============================================================================
// Mock Fence
// ============================================================================

pub struct MockFence {
    pub id: ResourceId,
    value: AtomicU64,
}

impl MockFence {
    pub fn signal(&self, value: u64) {
        self.value.fetch_max(value, Ordering::SeqCst);
    }
}

impl Fence for MockFence {
    fn id(&self) -> ResourceId {
        self.id
    }

    fn completed_value(&self) -> u64 {
        self.value.load(Ordering::SeqCst)
    }

    // Never blocks: a held fence reports a timeout immediately
    fn wait(&self, value: u64, _timeout: Duration) -> Result<bool> {
        Ok(self.completed_value() >= value)
    }
}

// ============================================================================
// Mock CommandList
// ============================================================================

pub struct MockCommandList {
    pub id: ResourceId,
    control: MockControl,
    recording: bool,
}

fn sub_str(sub: Subresource) -> String {
    match sub {
        Subresource::All => "all".to_string(),
        Subresource::Mip(m) => format!("mip{}", m),
    }
}

fn handle_str(handle: &Handle) -> String {
    let prefix = match handle.kind() {
        HandleKind::RenderTarget => "rtv",
        HandleKind::DepthStencil => "dsv",
        HandleKind::ShaderResource => "srv",
        HandleKind::Sampler => "smp",
    };
    format!("{}{}", prefix, handle.index())
}

impl CommandList for MockCommandList {
    fn id(&self) -> ResourceId {
        self.id
    }

    fn begin(&mut self) -> Result<()> {
        if self.recording {
            lattice_bail!("lattice::mock", "begin() while recording");
        }
        self.recording = true;
        self.control.push("begin".to_string());
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        if !self.recording {
            lattice_bail!("lattice::mock", "end() while not recording");
        }
        self.recording = false;
        self.control.push("end".to_string());
        Ok(())
    }

    fn is_recording(&self) -> bool {
        self.recording
    }

    fn resource_barrier(
        &mut self,
        texture: &dyn Texture,
        subresource: Subresource,
        before: ResourceState,
        after: ResourceState,
    ) -> Result<()> {
        let label = self.control.label(texture.id());
        self.control.record(format!(
            "barrier {} {} {:?}->{:?}",
            label,
            sub_str(subresource),
            before,
            after
        ))
    }

    fn copy_buffer_to_texture(&mut self, src: &dyn Buffer, dst: &dyn Texture, mip_level: u32) -> Result<()> {
        let src_label = self.control.label(src.id());
        let dst_label = self.control.label(dst.id());
        self.control.record(format!("copy {} -> {} mip{}", src_label, dst_label, mip_level))
    }

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.control.record(format!("viewport {}x{}", viewport.width, viewport.height))
    }

    fn set_scissor(&mut self, scissor: Rect2D) -> Result<()> {
        self.control.record(format!("scissor {}x{}", scissor.width, scissor.height))
    }

    fn set_render_targets(&mut self, color: &[Handle], depth: Option<&Handle>) -> Result<()> {
        let colors: Vec<String> = color.iter().map(handle_str).collect();
        let depth = depth.map(handle_str).unwrap_or_else(|| "-".to_string());
        self.control.record(format!("targets [{}] {}", colors.join(","), depth))
    }

    fn clear_render_target(&mut self, target: &Handle, color: [f32; 4]) -> Result<()> {
        self.control.record(format!("clear {} {:?}", handle_str(target), color))
    }

    fn clear_depth_stencil(&mut self, target: &Handle, depth: f32, stencil: u8) -> Result<()> {
        self.control.record(format!("clear_depth {} {} {}", handle_str(target), depth, stencil))
    }

    fn set_pipeline(&mut self, pipeline: &Arc<dyn Pipeline>) -> Result<()> {
        self.control.record(format!("pipeline {}", pipeline.label()))
    }

    fn set_primitive_topology(&mut self, topology: PrimitiveTopology) -> Result<()> {
        self.control.record(format!("topology {:?}", topology))
    }

    fn set_vertex_buffer(&mut self, buffer: &Arc<dyn Buffer>, stride: u32, size: u64) -> Result<()> {
        let label = self.control.label(buffer.id());
        self.control.record(format!("vertex_buffer {} {} {}", label, stride, size))
    }

    fn set_descriptor_table(&mut self, slot: u32, handle: &Handle) -> Result<()> {
        self.control.record(format!("table {} {}", slot, handle_str(handle)))
    }

    fn draw(&mut self, vertex_count: u32, instance_count: u32) -> Result<()> {
        self.control.record(format!("draw {} {}", vertex_count, instance_count))
    }
}

// ============================================================================
// Mock Swapchain
// ============================================================================

pub struct MockSwapchain {
    pub desc: SwapchainDesc,
    pub buffers: Vec<Arc<dyn Texture>>,
    pub current: usize,
    control: MockControl,
}

impl Swapchain for MockSwapchain {
    fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    fn current_index(&self) -> usize {
        self.current
    }

    fn back_buffer(&self, index: usize) -> Result<Arc<dyn Texture>> {
        match self.buffers.get(index) {
            Some(texture) => Ok(Arc::clone(texture)),
            None => Err(Error::InvalidResource(format!("back buffer {} out of range", index))),
        }
    }

    fn present(&mut self) -> Result<()> {
        self.control.push(format!("present {}", self.current));
        self.current = (self.current + 1) % self.buffers.len();
        Ok(())
    }

    fn width(&self) -> u32 {
        self.desc.width
    }

    fn height(&self) -> u32 {
        self.desc.height
    }

    fn format(&self) -> TextureFormat {
        self.desc.format
    }
}

// ============================================================================
// Mock Device
// ============================================================================

/// Mock device tracking created objects without a GPU
pub struct MockGraphicsDevice {
    control: MockControl,
    fences: FxHashMap<ResourceId, Arc<MockFence>>,
    next_id: u64,
}

impl MockGraphicsDevice {
    pub fn new() -> Self {
        Self { control: MockControl::default(), fences: FxHashMap::default(), next_id: 1 }
    }

    /// Shared state handle (clone it before boxing the device)
    pub fn control(&self) -> MockControl {
        self.control.clone()
    }

    fn allocate_id(&mut self, label: &str) -> ResourceId {
        let id = ResourceId(self.next_id);
        self.next_id += 1;
        self.control.lock().labels.insert(id, label.to_string());
        id
    }

    fn check_label(&self, label: &str) -> Result<()> {
        if self.control.lock().fail_labels.contains(label) {
            return Err(Error::OutOfMemory);
        }
        Ok(())
    }

    fn make_texture(&mut self, desc: &TextureDesc) -> Arc<dyn Texture> {
        let id = self.allocate_id(&desc.label);
        Arc::new(MockTexture {
            id,
            info: TextureInfo {
                width: desc.width,
                height: desc.height,
                format: desc.format,
                flags: desc.flags,
                mip_levels: desc.mip_levels,
            },
        })
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn create_descriptor_table(&mut self, kind: HandleKind, capacity: u32) -> Result<DescriptorTable> {
        let base = (kind as u64 + 1) << 32;
        Ok(DescriptorTable {
            kind,
            cpu_base: CpuLocation(base),
            gpu_base: GpuLocation(base | 0x8000_0000),
            stride: 32,
            capacity,
        })
    }

    fn create_buffer(&mut self, desc: &BufferDesc) -> Result<Arc<dyn Buffer>> {
        self.check_label(&desc.label)?;
        let id = self.allocate_id(&desc.label);
        self.control.lock().stats.buffers_created += 1;
        Ok(Arc::new(MockBuffer {
            id,
            size: desc.size,
            usage: desc.usage,
            data: Mutex::new(vec![0; desc.size as usize]),
        }))
    }

    fn create_texture(&mut self, desc: &TextureDesc) -> Result<Arc<dyn Texture>> {
        self.check_label(&desc.label)?;
        self.control.lock().stats.textures_created += 1;
        Ok(self.make_texture(desc))
    }

    fn write_view(&mut self, desc: &ViewDesc<'_>, handle: &Handle) -> Result<()> {
        let text = match desc {
            ViewDesc::RenderTarget { texture, mip_level }
            | ViewDesc::ShaderResource { texture, mip_level } => {
                format!("{} mip{}", self.control.label(texture.id()), mip_level)
            }
            ViewDesc::DepthStencil { texture } => self.control.label(texture.id()),
            ViewDesc::Sampler { filter } => format!("{:?}", filter),
        };
        let mut state = self.control.lock();
        state.views.insert((handle.kind(), handle.index()), text);
        state.stats.views_written += 1;
        Ok(())
    }

    fn create_pipeline(&mut self, desc: &PipelineDesc) -> Result<Arc<dyn Pipeline>> {
        self.check_label(&desc.label)?;
        let id = self.allocate_id(&desc.label);
        self.control.lock().stats.pipelines_created += 1;
        Ok(Arc::new(MockPipeline { id, label: desc.label.clone() }))
    }

    fn create_command_list(&mut self) -> Result<Box<dyn CommandList>> {
        let id = self.allocate_id("command_list");
        Ok(Box::new(MockCommandList { id, control: self.control.clone(), recording: false }))
    }

    fn create_fence(&mut self, initial_value: u64) -> Result<Arc<dyn Fence>> {
        let fence = Arc::new(MockFence {
            id: self.allocate_id("fence"),
            value: AtomicU64::new(initial_value),
        });
        self.fences.insert(fence.id, Arc::clone(&fence));
        Ok(fence)
    }

    fn create_swapchain(&mut self, _surface: SurfaceHandle, desc: &SwapchainDesc) -> Result<Box<dyn Swapchain>> {
        let mut buffers = Vec::with_capacity(desc.buffer_count);
        for i in 0..desc.buffer_count {
            buffers.push(self.make_texture(&TextureDesc {
                label: format!("__backbuffer__{}", i),
                width: desc.width,
                height: desc.height,
                format: desc.format,
                flags: TextureFlags::RENDER_TARGET,
                mip_levels: 1,
                initial_state: ResourceState::Present,
            }));
        }
        Ok(Box::new(MockSwapchain {
            desc: *desc,
            buffers,
            current: 0,
            control: self.control.clone(),
        }))
    }

    fn submit(&mut self, commands: &mut dyn CommandList, fence: &dyn Fence, signal_value: u64) -> Result<()> {
        if commands.is_recording() {
            lattice_bail!("lattice::mock", "submit of an open command list");
        }
        let Some(mock_fence) = self.fences.get(&fence.id()).cloned() else {
            lattice_bail!("lattice::mock", "unknown fence {:?}", fence.id());
        };
        let mut state = self.control.lock();
        state.journal.push(format!("submit {}", signal_value));
        state.stats.submissions += 1;
        if state.hold_fences {
            state.pending_signals.push((mock_fence, signal_value));
        } else {
            mock_fence.signal(signal_value);
        }
        Ok(())
    }

    fn device_status(&self) -> Result<()> {
        if self.control.lock().device_lost {
            return Err(Error::DeviceLost("mock device removed".to_string()));
        }
        Ok(())
    }

    fn stats(&self) -> DeviceStats {
        self.control.lock().stats
    }
}

// ============================================================================
// Mock shader compiler / surface
// ============================================================================

/// Compiler returning `path:entry:target` as bytecode; paths in `failing` fail
#[derive(Default)]
pub struct MockShaderCompiler {
    pub failing: Mutex<FxHashSet<String>>,
    pub calls: Mutex<Vec<String>>,
}

impl MockShaderCompiler {
    pub fn failing(paths: &[&str]) -> Self {
        let compiler = Self::default();
        {
            let mut failing = compiler.failing.lock().unwrap();
            for path in paths {
                failing.insert(path.to_string());
            }
        }
        compiler
    }
}

impl ShaderCompiler for MockShaderCompiler {
    fn compile(&self, path: &str, entry: &str, target: &str) -> std::result::Result<Vec<u8>, CompileError> {
        self.calls.lock().unwrap().push(format!("{}:{}", path, entry));
        if self.failing.lock().unwrap().contains(path) {
            return Err(CompileError::new(format!("{}: syntax error", path)));
        }
        Ok(format!("{}:{}:{}", path, entry, target).into_bytes())
    }
}

/// Surface that reports `frames` polls as running, then closes
pub struct MockSurface {
    pub frames: u32,
}

impl SurfaceProvider for MockSurface {
    fn surface_handle(&self) -> SurfaceHandle {
        SurfaceHandle::Headless
    }

    fn poll(&mut self) -> bool {
        if self.frames == 0 {
            return false;
        }
        self.frames -= 1;
        true
    }
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
