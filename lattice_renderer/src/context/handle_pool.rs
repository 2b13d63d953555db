/// Fixed-capacity allocator of descriptor handles.
///
/// A pool carves `capacity` evenly strided slots out of one contiguous
/// descriptor table. Fresh slots are handed out in ascending index order;
/// freed slots are recycled last-freed first. Every free bumps the slot
/// generation so stale copies of a handle are detected.
///
/// # Example
///
/// ```ignore
/// let mut pool = HandlePool::new(table);
/// let a = pool.alloc();          // index 0
/// let b = pool.alloc();          // index 1
/// pool.free(a)?;                 // 0 is now available, generation 1
/// let c = pool.alloc();          // index 0 (recycled)
/// assert!(!pool.is_live(&a));
/// ```

use crate::error::{Error, Result};
use crate::graphics_device::{DescriptorTable, Handle, HandleKind};
use crate::{lattice_error, lattice_fail};

pub struct HandlePool {
    table: DescriptorTable,
    free_list: Vec<u32>,
    next_index: u32,
    generations: Vec<u32>,
    in_use: Vec<bool>,
    len: u32,
}

impl HandlePool {
    /// Create a pool over a descriptor table
    pub fn new(table: DescriptorTable) -> Self {
        let capacity = table.capacity as usize;
        Self {
            table,
            free_list: Vec::new(),
            next_index: 0,
            generations: vec![0; capacity],
            in_use: vec![false; capacity],
            len: 0,
        }
    }

    /// Kind of handles this pool hands out
    pub fn kind(&self) -> HandleKind {
        self.table.kind
    }

    /// Allocate a handle, or the poisoned sentinel on exhaustion
    ///
    /// Exhaustion is logged. Callers that need to react use `try_alloc()`.
    pub fn alloc(&mut self) -> Handle {
        match self.next_free() {
            Some(index) => self.issue(index),
            None => {
                lattice_error!(
                    "lattice::HandlePool",
                    "{:?} pool exhausted ({} handles), returning poisoned handle",
                    self.table.kind,
                    self.table.capacity
                );
                Handle::poisoned(self.table.kind)
            }
        }
    }

    /// Allocate a handle, failing with `HandlePoolExhausted` when none is left
    pub fn try_alloc(&mut self) -> Result<Handle> {
        match self.next_free() {
            Some(index) => Ok(self.issue(index)),
            None => Err(lattice_fail!(
                "lattice::HandlePool",
                Error::HandlePoolExhausted {
                    kind: self.table.kind,
                    capacity: self.table.capacity,
                }
            )),
        }
    }

    /// Return a handle to the pool
    ///
    /// Poisoned handles, handles of another kind and stale copies are rejected.
    pub fn free(&mut self, handle: &Handle) -> Result<()> {
        if handle.is_poisoned() {
            return Err(Error::InvalidHandle(format!(
                "cannot free the poisoned {:?} handle",
                handle.kind()
            )));
        }
        if handle.kind() != self.table.kind {
            return Err(Error::InvalidHandle(format!(
                "{:?} handle freed into the {:?} pool",
                handle.kind(),
                self.table.kind
            )));
        }
        if !self.is_live(handle) {
            return Err(Error::InvalidHandle(format!(
                "{:?} handle {} (generation {}) is not live",
                handle.kind(),
                handle.index(),
                handle.generation()
            )));
        }

        let index = handle.index() as usize;
        self.in_use[index] = false;
        self.generations[index] = self.generations[index].wrapping_add(1);
        self.free_list.push(handle.index());
        self.len -= 1;
        Ok(())
    }

    /// Whether `handle` is currently allocated from this pool
    pub fn is_live(&self, handle: &Handle) -> bool {
        if handle.is_poisoned() || handle.kind() != self.table.kind {
            return false;
        }
        let index = handle.index() as usize;
        index < self.in_use.len()
            && self.in_use[index]
            && self.generations[index] == handle.generation()
    }

    /// Number of allocated handles
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Whether no handle is allocated
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total number of slots
    pub fn capacity(&self) -> u32 {
        self.table.capacity
    }

    /// Number of slots still available
    pub fn available(&self) -> u32 {
        self.table.capacity - self.len
    }

    fn next_free(&mut self) -> Option<u32> {
        if let Some(index) = self.free_list.pop() {
            return Some(index);
        }
        if self.next_index < self.table.capacity {
            let index = self.next_index;
            self.next_index += 1;
            return Some(index);
        }
        None
    }

    fn issue(&mut self, index: u32) -> Handle {
        self.in_use[index as usize] = true;
        self.len += 1;
        let (cpu, gpu) = self.table.location(index);
        Handle::new(self.table.kind, index, self.generations[index as usize], cpu, gpu)
    }
}

/// One pool per handle kind
pub struct HandlePools {
    render_target: HandlePool,
    depth_stencil: HandlePool,
    shader_resource: HandlePool,
    sampler: HandlePool,
}

impl HandlePools {
    /// Build the pools from one descriptor table per kind
    ///
    /// The closure is called once per kind in `HandleKind::ALL` order.
    pub fn new<F>(mut create_table: F) -> Result<Self>
    where
        F: FnMut(HandleKind) -> Result<DescriptorTable>,
    {
        Ok(Self {
            render_target: HandlePool::new(create_table(HandleKind::RenderTarget)?),
            depth_stencil: HandlePool::new(create_table(HandleKind::DepthStencil)?),
            shader_resource: HandlePool::new(create_table(HandleKind::ShaderResource)?),
            sampler: HandlePool::new(create_table(HandleKind::Sampler)?),
        })
    }

    /// Pool for one kind
    pub fn get(&self, kind: HandleKind) -> &HandlePool {
        match kind {
            HandleKind::RenderTarget => &self.render_target,
            HandleKind::DepthStencil => &self.depth_stencil,
            HandleKind::ShaderResource => &self.shader_resource,
            HandleKind::Sampler => &self.sampler,
        }
    }

    /// Mutable pool for one kind
    pub fn get_mut(&mut self, kind: HandleKind) -> &mut HandlePool {
        match kind {
            HandleKind::RenderTarget => &mut self.render_target,
            HandleKind::DepthStencil => &mut self.depth_stencil,
            HandleKind::ShaderResource => &mut self.shader_resource,
            HandleKind::Sampler => &mut self.sampler,
        }
    }

    /// Return a handle to the pool of its own kind
    pub fn free(&mut self, handle: &Handle) -> Result<()> {
        self.get_mut(handle.kind()).free(handle)
    }
}

#[cfg(test)]
#[path = "handle_pool_tests.rs"]
mod tests;
