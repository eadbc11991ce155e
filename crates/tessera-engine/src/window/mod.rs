//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the single window, and maps winit callbacks
//! onto the [`crate::core::App`] contract.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx};
