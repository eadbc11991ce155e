//! Colors used by clears and per-vertex attributes.

mod color;

pub use color::{Color, CornerColors};
