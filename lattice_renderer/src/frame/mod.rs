/// Frame module - ring of per-frame command recording state

pub mod frame_record;
pub mod frame_ring;

pub use frame_record::{FrameRecord, PendingUpload};
pub use frame_ring::{FrameRing, Retired};
