//! Coordinate and geometry types.
//!
//! Canonical CPU space for on-screen drawing:
//! - logical pixels
//! - origin top-left, +X right, +Y down
//!
//! Shaders convert to NDC using a viewport uniform. The off-screen scene uses
//! its own perspective camera and does not share this space.

mod rect;
mod vec2;
mod viewport;

pub use rect::Rect;
pub use vec2::Vec2;
pub use viewport::Viewport;
