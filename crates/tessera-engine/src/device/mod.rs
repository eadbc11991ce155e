//! GPU device + surface management.
//!
//! Responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating and configuring the Surface (swapchain)
//! - acquiring frames and mapping surface errors onto frame actions
//! - capturing GPU errors raised while a frame is recorded and submitted

mod error;
mod frame;
mod gpu;

pub use error::{FrameErrorScope, SurfaceErrorAction};
pub use frame::GpuFrame;
pub use gpu::{Gpu, GpuInit};
