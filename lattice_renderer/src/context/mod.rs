/// Device context module - device ownership and handle allocation

pub mod handle_pool;
pub mod device_context;

pub use handle_pool::{HandlePool, HandlePools};
pub use device_context::{DeviceContext, BACK_BUFFER_FORMAT};
