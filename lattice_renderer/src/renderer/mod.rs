/// Renderer module - update phase, draw phase, mip generation and the frame loop

pub mod scene_renderer;
pub mod update_phase;
pub mod view_scheduler;
pub mod mipmap_generator;
pub mod frame_loop;

pub use scene_renderer::{SceneRenderer, DUMMY_TEXTURE, MIPMAP_UNIT};
pub use update_phase::UpdateStats;
pub use view_scheduler::{draw_order, FrameStats, SkipReason};
pub use mipmap_generator::{record_mip_chain, MipChain, MIP_QUAD_VERTICES};
pub use frame_loop::run_frame_loop;
