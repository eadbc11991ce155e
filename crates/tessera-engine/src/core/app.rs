use winit::event::WindowEvent;

use super::ctx::{FrameCtx, InitCtx};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract driven by [`crate::window::Runtime`].
///
/// Call order: `on_init` exactly once, then any interleaving of
/// `on_reshape`/`on_window_event` with one `on_frame` per redraw, then
/// `on_shutdown` once. Frames never overlap.
pub trait App {
    /// Allocates GPU resources. An error here stops the runtime before the
    /// first frame.
    fn on_init(&mut self, ctx: &InitCtx<'_, '_>) -> anyhow::Result<()>;

    /// Called once per redraw.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;

    /// New drawable size in physical pixels. Advisory: the surface is already
    /// reconfigured by the runtime.
    fn on_reshape(&mut self, width: u32, height: u32) {
        let _ = (width, height);
    }

    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    fn on_shutdown(&mut self) {}
}
