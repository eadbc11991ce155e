//! Frame-level error kinds and the policy that decides between aborting and
//! skipping a frame.
//!
//! GPU-wrapping operations never abort on their own. They return a
//! [`RenderError`] and the frame loop decides what to do with it through a
//! [`FramePolicy`].

use thiserror::Error;

use crate::core::AppControl;
use crate::render::MaskStage;
use crate::resources::TargetStatus;

#[derive(Debug, Error)]
pub enum RenderError {
    /// The off-screen target failed its completeness check.
    #[error("render target incomplete: {0}")]
    TargetIncomplete(TargetStatus),

    #[error("render target has zero size ({width}x{height})")]
    ZeroSizedTarget { width: u32, height: u32 },

    /// Surface acquisition failed in a way that cannot be recovered by reconfiguring.
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    /// Error the device reported while a frame was recorded or submitted.
    #[error("gpu error: {0}")]
    Gpu(#[from] wgpu::Error),

    /// A masked-frame stage was entered out of order. `None` on either side
    /// stands for the frame boundary.
    #[error("{operation}: entered {found:?} while expecting {expected:?}")]
    StageOrder {
        operation: &'static str,
        expected: Option<MaskStage>,
        found: Option<MaskStage>,
    },

    /// A depth/stencil attachment does not match the surface it is paired with.
    #[error("attachment is {attachment:?} but the surface is {surface:?}")]
    AttachmentMismatch {
        attachment: (u32, u32),
        surface: (u32, u32),
    },

    /// A GPU object was used before the renderer created it.
    #[error("{0} used before it was created")]
    MissingResource(&'static str),

    /// Staging memory for vertex data could not be reserved.
    #[error("failed to allocate {bytes} bytes of staging memory")]
    HostAlloc { bytes: usize },
}

/// Coarse classification used by [`FramePolicy`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorClass {
    /// Startup allocation or completeness failure. Always fatal.
    Allocation,
    /// Error raised while recording or presenting a frame.
    PerFrame,
    /// Host memory exhaustion. Always fatal.
    Host,
}

impl RenderError {
    pub fn class(&self) -> ErrorClass {
        match self {
            RenderError::TargetIncomplete(_) | RenderError::ZeroSizedTarget { .. } => {
                ErrorClass::Allocation
            }
            RenderError::Surface(wgpu::SurfaceError::OutOfMemory)
            | RenderError::Gpu(wgpu::Error::OutOfMemory { .. }) => ErrorClass::Allocation,
            RenderError::HostAlloc { .. } => ErrorClass::Host,
            RenderError::Surface(_)
            | RenderError::Gpu(_)
            | RenderError::StageOrder { .. }
            | RenderError::AttachmentMismatch { .. }
            | RenderError::MissingResource(_) => ErrorClass::PerFrame,
        }
    }
}

/// What the frame loop does with a per-frame error.
///
/// Allocation and host errors terminate regardless of the policy.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum FramePolicy {
    /// Every error ends the loop.
    #[default]
    Abort,
    /// Per-frame errors are logged and the frame is dropped.
    SkipFrame,
}

impl FramePolicy {
    /// Maps a frame result onto the loop's next step, logging failures.
    pub fn resolve<T>(self, result: Result<T, RenderError>) -> AppControl {
        let err = match result {
            Ok(_) => return AppControl::Continue,
            Err(err) => err,
        };

        match (err.class(), self) {
            (ErrorClass::PerFrame, FramePolicy::SkipFrame) => {
                log::warn!("frame skipped: {err}");
                AppControl::Continue
            }
            (class, _) => {
                log::error!("fatal {class:?} error: {err}");
                AppControl::Exit
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn per_frame() -> RenderError {
        RenderError::MissingResource("mask pipeline")
    }

    fn validation() -> RenderError {
        RenderError::Gpu(wgpu::Error::Validation {
            source: Box::new(std::fmt::Error),
            description: "draw index out of range".into(),
        })
    }

    #[test]
    fn ok_always_continues() {
        assert_eq!(FramePolicy::Abort.resolve::<()>(Ok(())), AppControl::Continue);
        assert_eq!(FramePolicy::SkipFrame.resolve::<()>(Ok(())), AppControl::Continue);
    }

    #[test]
    fn abort_policy_exits_on_per_frame_error() {
        assert_eq!(FramePolicy::Abort.resolve::<()>(Err(per_frame())), AppControl::Exit);
    }

    #[test]
    fn skip_policy_continues_on_per_frame_error() {
        assert_eq!(FramePolicy::SkipFrame.resolve::<()>(Err(per_frame())), AppControl::Continue);
        let surface = RenderError::Surface(wgpu::SurfaceError::Timeout);
        assert_eq!(FramePolicy::SkipFrame.resolve::<()>(Err(surface)), AppControl::Continue);
    }

    #[test]
    fn allocation_and_host_errors_are_fatal_under_any_policy() {
        for policy in [FramePolicy::Abort, FramePolicy::SkipFrame] {
            let incomplete = RenderError::TargetIncomplete(TargetStatus::IncompleteDimensions);
            assert_eq!(policy.resolve::<()>(Err(incomplete)), AppControl::Exit);
            let oom = RenderError::Surface(wgpu::SurfaceError::OutOfMemory);
            assert_eq!(policy.resolve::<()>(Err(oom)), AppControl::Exit);
            let host = RenderError::HostAlloc { bytes: 1 << 40 };
            assert_eq!(policy.resolve::<()>(Err(host)), AppControl::Exit);
        }
    }

    #[test]
    fn stage_order_is_per_frame() {
        let err = RenderError::StageOrder {
            operation: "masked frame",
            expected: Some(MaskStage::MaskWrite),
            found: Some(MaskStage::MaskedDraw),
        };
        assert_eq!(err.class(), ErrorClass::PerFrame);
        assert!(err.to_string().contains("MaskedDraw"));
    }

    #[test]
    fn gpu_validation_error_follows_frame_policy() {
        assert_eq!(validation().class(), ErrorClass::PerFrame);
        assert!(validation().to_string().contains("draw index out of range"));
        assert_eq!(FramePolicy::SkipFrame.resolve::<()>(Err(validation())), AppControl::Continue);
        assert_eq!(FramePolicy::Abort.resolve::<()>(Err(validation())), AppControl::Exit);
    }

    #[test]
    fn gpu_out_of_memory_is_fatal() {
        let oom = || RenderError::Gpu(wgpu::Error::OutOfMemory {
            source: Box::new(std::fmt::Error),
        });
        assert_eq!(oom().class(), ErrorClass::Allocation);
        assert_eq!(FramePolicy::SkipFrame.resolve::<()>(Err(oom())), AppControl::Exit);
    }
}
