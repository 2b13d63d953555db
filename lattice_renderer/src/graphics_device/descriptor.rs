/// Descriptor tables, handles and view descriptors
///
/// A descriptor table is one contiguous, fixed-size array of view slots
/// living in device memory. Handles are slots of that array identified by
/// their CPU location (where the view is written) and their GPU location
/// (what a shader-visible binding points at).

use crate::graphics_device::Texture;

/// Kind of view a descriptor table stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HandleKind {
    /// Render-target (color) views
    RenderTarget,
    /// Depth-stencil views
    DepthStencil,
    /// Shader-visible resource views (textures sampled by pixel shaders)
    ShaderResource,
    /// Samplers
    Sampler,
}

impl HandleKind {
    /// Every kind, in pool creation order
    pub const ALL: [HandleKind; 4] = [
        HandleKind::RenderTarget,
        HandleKind::DepthStencil,
        HandleKind::ShaderResource,
        HandleKind::Sampler,
    ];

    /// Whether views of this kind can be bound as shader tables
    pub fn is_shader_visible(&self) -> bool {
        matches!(self, HandleKind::ShaderResource | HandleKind::Sampler)
    }
}

/// CPU-side address of a descriptor slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CpuLocation(pub u64);

/// GPU-side address of a descriptor slot (0 for non-shader-visible tables)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GpuLocation(pub u64);

/// Layout of one contiguous descriptor table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorTable {
    /// Kind of views stored in the table
    pub kind: HandleKind,
    /// CPU address of slot 0
    pub cpu_base: CpuLocation,
    /// GPU address of slot 0
    pub gpu_base: GpuLocation,
    /// Distance in bytes between two slots
    pub stride: u64,
    /// Number of slots
    pub capacity: u32,
}

impl DescriptorTable {
    /// Locations of slot `index` (no bounds check against capacity)
    pub fn location(&self, index: u32) -> (CpuLocation, GpuLocation) {
        let offset = index as u64 * self.stride;
        let gpu = if self.kind.is_shader_visible() {
            GpuLocation(self.gpu_base.0 + offset)
        } else {
            GpuLocation(0)
        };
        (CpuLocation(self.cpu_base.0 + offset), gpu)
    }
}

/// Sentinel CPU address carried by poisoned handles
pub const POISONED_CPU_LOCATION: CpuLocation = CpuLocation(0x1234_1234_1234_1234);
/// Sentinel GPU address carried by poisoned handles
pub const POISONED_GPU_LOCATION: GpuLocation = GpuLocation(0x7890_7890_7890_7890);

/// A slot allocated from a Handle Pool
///
/// Handles are plain values; ownership is pool-relative. The generation
/// distinguishes a live handle from a stale copy once the slot has been
/// freed and reissued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    kind: HandleKind,
    index: u32,
    generation: u32,
    cpu: CpuLocation,
    gpu: GpuLocation,
}

impl Handle {
    pub(crate) fn new(
        kind: HandleKind,
        index: u32,
        generation: u32,
        cpu: CpuLocation,
        gpu: GpuLocation,
    ) -> Self {
        Self { kind, index, generation, cpu, gpu }
    }

    /// The sentinel returned when a pool is exhausted
    pub fn poisoned(kind: HandleKind) -> Self {
        Self {
            kind,
            index: u32::MAX,
            generation: 0,
            cpu: POISONED_CPU_LOCATION,
            gpu: POISONED_GPU_LOCATION,
        }
    }

    /// Whether this handle is the exhaustion sentinel
    pub fn is_poisoned(&self) -> bool {
        self.index == u32::MAX
    }

    /// Kind of the pool this handle came from
    pub fn kind(&self) -> HandleKind {
        self.kind
    }

    /// Slot index inside the pool
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot when this handle was issued
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// CPU location (where views are written)
    pub fn cpu(&self) -> CpuLocation {
        self.cpu
    }

    /// GPU location (what shader tables point at)
    pub fn gpu(&self) -> GpuLocation {
        self.gpu
    }
}

/// Sampler filtering mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamplerFilter {
    /// Nearest texel, nearest mip
    Point,
    /// Bilinear texel, linear mip
    Linear,
}

/// Description of a view to write into a handle
///
/// One variant per handle kind; the kind of the handle is chosen from the
/// variant at allocation time.
#[derive(Clone, Copy)]
pub enum ViewDesc<'a> {
    /// Color view of one mip level
    RenderTarget { texture: &'a dyn Texture, mip_level: u32 },
    /// Depth view of a depth texture
    DepthStencil { texture: &'a dyn Texture },
    /// Shader-visible view of one mip level
    ShaderResource { texture: &'a dyn Texture, mip_level: u32 },
    /// Sampler state
    Sampler { filter: SamplerFilter },
}

impl<'a> ViewDesc<'a> {
    /// Kind of handle this view must be written into
    pub fn kind(&self) -> HandleKind {
        match self {
            ViewDesc::RenderTarget { .. } => HandleKind::RenderTarget,
            ViewDesc::DepthStencil { .. } => HandleKind::DepthStencil,
            ViewDesc::ShaderResource { .. } => HandleKind::ShaderResource,
            ViewDesc::Sampler { .. } => HandleKind::Sampler,
        }
    }
}

impl<'a> std::fmt::Debug for ViewDesc<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewDesc::RenderTarget { texture, mip_level } => f
                .debug_struct("RenderTarget")
                .field("texture", &texture.id())
                .field("mip_level", mip_level)
                .finish(),
            ViewDesc::DepthStencil { texture } => f
                .debug_struct("DepthStencil")
                .field("texture", &texture.id())
                .finish(),
            ViewDesc::ShaderResource { texture, mip_level } => f
                .debug_struct("ShaderResource")
                .field("texture", &texture.id())
                .field("mip_level", mip_level)
                .finish(),
            ViewDesc::Sampler { filter } => f
                .debug_struct("Sampler")
                .field("filter", filter)
                .finish(),
        }
    }
}
