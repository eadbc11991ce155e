//! Configuration aggregates.
//!
//! Everything is a plain struct whose `Default` gives the fixed-resolution,
//! abort-on-error setup. Nothing is read from disk.

use crate::coords::Viewport;
use crate::error::FramePolicy;
use crate::render::MaskConfig;
use crate::resources::TargetConfig;
use crate::sim::SimConfig;

pub use crate::logging::LoggingConfig;

/// How on-screen projection reacts to window resizes.
///
/// The depth/stencil attachment always follows the surface size; only the
/// logical coordinate space is governed by this policy.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum ResizePolicy {
    /// Keep the startup viewport. Content stretches with the window.
    #[default]
    Fixed,
    /// Use the window's current logical size.
    Recompute,
}

impl ResizePolicy {
    /// Logical viewport for the next frame.
    pub fn viewport(self, initial: Viewport, current: Viewport) -> Viewport {
        match self {
            ResizePolicy::Fixed => initial,
            ResizePolicy::Recompute if current.is_valid() => current,
            ResizePolicy::Recompute => initial,
        }
    }
}

/// Settings shared by both demo pipelines.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub sim: SimConfig,
    pub mask: MaskConfig,
    pub target: TargetConfig,
    /// When set, the off-screen target is sized to the window divided by this
    /// factor instead of `target`'s fixed dimensions.
    pub target_divisor: Option<u32>,
    pub frame_policy: FramePolicy,
    pub resize_policy: ResizePolicy,
}

impl PipelineConfig {
    /// Off-screen target configuration for a window of `width` x `height`
    /// physical pixels.
    pub fn target_for(&self, width: u32, height: u32) -> TargetConfig {
        match self.target_divisor {
            Some(divisor) => TargetConfig {
                color_format: self.target.color_format,
                depth_format: self.target.depth_format,
                ..TargetConfig::from_window(width, height, divisor)
            },
            None => self.target,
        }
    }
}
