//! Frame pipelines.
//!
//! - [`Compositor`]: scene -> off-screen target, then target -> visible surface
//! - [`MaskedRenderer`]: stripes -> stencil, then entities through the stencil
//!
//! Convention for on-screen geometry: logical pixels, top-left origin, +Y
//! down; the vertex shader converts to NDC with a viewport uniform. Vertex
//! data is built on the CPU every frame and uploaded with `write_buffer`.

mod common;
mod composite;
mod compositor;
mod ctx;
mod mask;
mod masked;
mod scene;

pub use common::{ScreenVertex, TexturedVertex};
pub use composite::{sample_nearest, CompositeQuad, TexcoordOrigin};
pub use compositor::Compositor;
pub use ctx::{FrameTarget, RenderCtx};
pub use mask::{entity_quad, MaskSequencer, MaskStage, StripePattern};
pub use masked::{MaskedRenderer, MaskConfig};
pub use scene::{Camera, SceneDescription, SceneVertex};
