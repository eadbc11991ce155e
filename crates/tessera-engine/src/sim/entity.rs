use crate::coords::{Rect, Vec2};

/// A simulated axis-aligned rectangle.
///
/// The extent is shared by the whole population and lives in
/// [`super::SimConfig::entity_size`]; only position and velocity are per entity.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Entity {
    /// Top-left corner, in world units (logical pixels).
    pub position: Vec2,
    /// World units per tick.
    pub velocity: Vec2,
}

impl Entity {
    #[inline]
    pub const fn new(position: Vec2, velocity: Vec2) -> Self {
        Self { position, velocity }
    }

    #[inline]
    pub fn bounds(&self, size: Vec2) -> Rect {
        Rect::from_origin_size(self.position, size)
    }
}
