use winit::window::Window;

use crate::coords::Viewport;
use crate::device::{FrameErrorScope, Gpu, SurfaceErrorAction};
use crate::error::RenderError;
use crate::render::{FrameTarget, RenderCtx};
use crate::time::FrameTime;
use crate::window::RuntimeCtx;

/// Context handed to [`super::App::on_init`].
pub struct InitCtx<'a, 'w> {
    pub window: &'a Window,
    pub gpu: &'a Gpu<'w>,
}

impl InitCtx<'_, '_> {
    pub fn device(&self) -> &wgpu::Device {
        self.gpu.device()
    }

    /// Drawable size in physical pixels.
    pub fn size(&self) -> (u32, u32) {
        let s = self.gpu.size();
        (s.width, s.height)
    }
}

/// Outcome of a frame that did not error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameStatus {
    Presented,
    /// The surface could not provide a texture this time (reconfigured or
    /// timed out); nothing was drawn.
    Skipped,
}

/// Per-frame context passed to [`super::App::on_frame`].
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window borrow carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: &'a Window,
    pub gpu: &'a mut Gpu<'w>,
    pub time: FrameTime,
    pub runtime: &'a mut RuntimeCtx,
}

impl FrameCtx<'_, '_> {
    /// Logical window size as `(width, height)`.
    pub fn logical_size(&self) -> (f32, f32) {
        let logical: winit::dpi::LogicalSize<f64> =
            self.window.inner_size().to_logical(self.window.scale_factor());
        (logical.width as f32, logical.height as f32)
    }

    /// Acquires a frame, runs `draw` against it and presents the result.
    ///
    /// If `draw` fails, the recorded commands are discarded and nothing is
    /// presented for this frame; the error is returned for the caller's
    /// [`crate::error::FramePolicy`] to judge. Errors the device raises while
    /// the frame is recorded or submitted come back as [`RenderError::Gpu`].
    pub fn render<F>(&mut self, viewport: Viewport, draw: F) -> Result<FrameStatus, RenderError>
    where
        F: FnOnce(&RenderCtx<'_>, &mut FrameTarget<'_>) -> Result<(), RenderError>,
    {
        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                return match self.gpu.handle_surface_error(&err) {
                    SurfaceErrorAction::Fatal => Err(RenderError::Surface(err)),
                    SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {
                        Ok(FrameStatus::Skipped)
                    }
                };
            }
        };

        let size = self.gpu.size();
        let rctx = RenderCtx::new(
            self.gpu.device(),
            self.gpu.queue(),
            self.gpu.surface_format(),
            viewport,
            (size.width, size.height),
        );

        let scope = FrameErrorScope::open(self.gpu.device());

        // The target borrows the encoder; it must be gone before submit() takes the frame.
        {
            let mut target = FrameTarget::new(&mut frame.encoder, &frame.view);
            if let Err(err) = draw(&rctx, &mut target) {
                log::error!("frame {} aborted while recording: {err}", self.time.frame_index);
                return Err(err);
            }
        }

        self.window.pre_present_notify();
        self.gpu.submit(frame);

        match scope.close() {
            None => Ok(FrameStatus::Presented),
            Some(err) => {
                log::error!("frame {} rejected by the device: {err}", self.time.frame_index);
                Err(RenderError::Gpu(err))
            }
        }
    }
}
