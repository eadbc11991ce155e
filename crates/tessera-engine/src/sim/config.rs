use crate::coords::Vec2;

/// World bounds the entities bounce inside, anchored at the origin.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct World {
    pub width: f32,
    pub height: f32,
}

impl World {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(640.0, 480.0)
    }
}

/// Inclusive integer range initial velocity components are drawn from.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct VelocityRange {
    min: i32,
    max: i32,
}

impl VelocityRange {
    /// Default range for the stencil demo. Not centred on zero, so the
    /// population drifts towards +X/+Y on average.
    pub const REFERENCE: VelocityRange = VelocityRange { min: -2, max: 5 };

    /// Builds a range; reversed bounds are swapped.
    pub fn new(a: i32, b: i32) -> Self {
        Self { min: a.min(b), max: a.max(b) }
    }

    /// `[-magnitude, magnitude]`.
    pub fn symmetric(magnitude: i32) -> Self {
        Self::new(-magnitude.abs(), magnitude.abs())
    }

    pub fn min(self) -> i32 {
        self.min
    }

    pub fn max(self) -> i32 {
        self.max
    }

    /// Largest per-tick displacement any entity can have along one axis.
    pub fn max_magnitude(self) -> f32 {
        self.min.unsigned_abs().max(self.max.unsigned_abs()) as f32
    }
}

impl Default for VelocityRange {
    fn default() -> Self {
        Self::REFERENCE
    }
}

/// What happens when an entity crosses a world edge.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum Containment {
    /// Flip the velocity component after the step and leave the position
    /// alone. An entity may sit up to one step outside the world for a tick.
    #[default]
    Reflect,
    /// Flip the velocity component and clamp the position back inside.
    Strict,
}

/// Simulation parameters.
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub world: World,
    pub entity_count: usize,
    pub entity_size: Vec2,
    pub velocity: VelocityRange,
    /// Seed for the initial state. `None` draws one from OS entropy.
    pub seed: Option<u64>,
    pub containment: Containment,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            world: World::default(),
            entity_count: 256,
            entity_size: Vec2::new(32.0, 32.0),
            velocity: VelocityRange::REFERENCE,
            seed: None,
            containment: Containment::Reflect,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reversed_bounds_are_swapped() {
        let r = VelocityRange::new(4, -1);
        assert_eq!((r.min(), r.max()), (-1, 4));
    }

    #[test]
    fn max_magnitude_uses_larger_side() {
        assert_eq!(VelocityRange::REFERENCE.max_magnitude(), 5.0);
        assert_eq!(VelocityRange::new(-7, 2).max_magnitude(), 7.0);
        assert_eq!(VelocityRange::symmetric(-3), VelocityRange::new(-3, 3));
    }
}
