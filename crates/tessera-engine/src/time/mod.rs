//! Frame timing.
//!
//! The simulation advances one tick per presented frame and never reads
//! wall-clock time; the clock exists for frame indices and diagnostics.

mod frame_clock;
mod stats;

pub use frame_clock::{FrameClock, FrameTime};
pub use stats::{FrameReport, FrameStats};
