//! Fixed-population rectangle simulation.
//!
//! Each tick is one explicit Euler step (`dt` = one tick) followed by an
//! axis-aligned reflection test against the world bounds. Entities never
//! interact with each other and the population never changes size.

mod config;
mod entity;
mod simulation;

pub use config::{Containment, SimConfig, VelocityRange, World};
pub use entity::Entity;
pub use simulation::{step, tick, Simulation};
