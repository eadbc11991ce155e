//! GPU resource management.
//!
//! This module is the only place that allocates render attachments:
//! - the off-screen color + depth target sampled by the compositor
//! - the depth/stencil plane that backs the visible surface for masking
//!
//! Everything else addresses attachments through the handles returned here.

mod stencil;
mod target;

pub use stencil::StencilPlane;
pub use target::{initialize, RenderTarget, TargetConfig, TargetId, TargetStatus};
