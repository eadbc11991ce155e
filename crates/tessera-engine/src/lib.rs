//! Tessera engine crate.
//!
//! Two frame pipelines on top of a shared wgpu/winit runtime:
//! - a compositor that renders a scene into an off-screen target and then
//!   draws that target onto the visible surface
//! - a fixed population of bouncing rectangles drawn through a striped
//!   stencil mask

pub mod device;
pub mod window;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod paint;
pub mod config;
pub mod error;

pub mod resources;
pub mod render;
pub mod sim;
