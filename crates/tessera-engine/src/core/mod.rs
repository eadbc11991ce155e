//! Contract between the window runtime and the frame pipelines.
//!
//! The runtime owns the event loop; applications only see these callbacks
//! and contexts.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, FrameStatus, InitCtx};
