//! Error types for the Lattice renderer
//!
//! This module defines the error types used throughout the renderer,
//! including device access, resource materialization, shader compilation
//! and handle allocation.

use std::fmt;
use crate::graphics_device::HandleKind;

/// Result type for Lattice operations
pub type Result<T> = std::result::Result<T, Error>;

/// Lattice renderer errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (headless, Direct3D 12, Vulkan, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (texture, buffer, node payload, etc.)
    InvalidResource(String),

    /// Initialization failed (device context, frame ring, built-in nodes)
    InitializationFailed(String),

    /// A GPU object backing a node could not be created
    ResourceCreationFailed {
        /// Name of the node (or internal object) being materialized
        name: String,
        /// Device-reported reason
        reason: String,
    },

    /// A shader failed to compile or its pipeline could not be built
    ShaderCompileFailed {
        /// Shader identifier (file path)
        shader: String,
        /// Compiler diagnostic
        message: String,
    },

    /// A handle pool has no free entry left
    HandlePoolExhausted {
        /// Kind of the exhausted pool
        kind: HandleKind,
        /// Capacity the pool was created with
        capacity: u32,
    },

    /// A handle is stale, poisoned or belongs to another pool
    InvalidHandle(String),

    /// The device was removed, hung or stopped signaling fences
    DeviceLost(String),

    /// No node is registered under this name
    NodeNotFound(String),

    /// A node exists under this name but has another kind
    NodeKindMismatch {
        /// Node name
        name: String,
        /// Kind the caller asked for
        expected: &'static str,
        /// Kind actually stored
        found: &'static str,
    },

    /// The node already owns GPU objects and cannot be replaced in place
    NodeMaterialized(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::ResourceCreationFailed { name, reason } => {
                write!(f, "Resource creation failed for '{}': {}", name, reason)
            }
            Error::ShaderCompileFailed { shader, message } => {
                write!(f, "Shader compile failed for '{}': {}", shader, message)
            }
            Error::HandlePoolExhausted { kind, capacity } => {
                write!(f, "Handle pool exhausted: {:?} (capacity {})", kind, capacity)
            }
            Error::InvalidHandle(msg) => write!(f, "Invalid handle: {}", msg),
            Error::DeviceLost(msg) => write!(f, "Device lost: {}", msg),
            Error::NodeNotFound(name) => write!(f, "Node not found: '{}'", name),
            Error::NodeKindMismatch { name, expected, found } => {
                write!(f, "Node '{}' is a {} (expected {})", name, found, expected)
            }
            Error::NodeMaterialized(name) => {
                write!(f, "Node '{}' already has a GPU backing; remove it before replacing", name)
            }
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Whether this error means the device can no longer be used
    pub fn is_device_lost(&self) -> bool {
        matches!(self, Error::DeviceLost(_))
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
