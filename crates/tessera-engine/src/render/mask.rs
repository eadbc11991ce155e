//! Stencil mask pattern and the per-frame stage ordering of masked drawing.

use crate::coords::{Rect, Vec2};
use crate::error::RenderError;
use crate::paint::CornerColors;
use crate::sim::Entity;

use super::common::ScreenVertex;

/// Vertical stripes repeating every `period` units, each `width` units wide,
/// starting at x = 0 and spanning the full height.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StripePattern {
    pub period: f32,
    pub width: f32,
}

impl Default for StripePattern {
    fn default() -> Self {
        Self { period: 20.0, width: 10.0 }
    }
}

impl StripePattern {
    /// Stripe rectangles covering a `width` x `height` viewport.
    pub fn stripes(&self, width: f32, height: f32) -> Vec<Rect> {
        if self.period <= 0.0 || self.width <= 0.0 || width <= 0.0 || height <= 0.0 {
            return Vec::new();
        }
        let count = (width / self.period).ceil() as usize;
        (0..count)
            .map(|i| Rect::new(i as f32 * self.period, 0.0, self.width, height))
            .collect()
    }

    /// Whether the pixel column `column` (sampled at its centre) is inside a stripe.
    pub fn is_visible(&self, column: u32) -> bool {
        if self.period <= 0.0 {
            return false;
        }
        (column as f32 + 0.5).rem_euclid(self.period) < self.width
    }

    /// Fraction of the first `width` columns that lie inside a stripe.
    pub fn visible_fraction(&self, width: u32) -> f64 {
        if width == 0 {
            return 0.0;
        }
        let visible = (0..width).filter(|&c| self.is_visible(c)).count();
        visible as f64 / width as f64
    }
}

/// Stages of one masked frame, in the only order they may run.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MaskStage {
    /// Clear color, depth and stencil.
    Clear,
    /// Color writes off, stencil always passes and replaces with the reference.
    MaskWrite,
    /// Color writes on, stencil passes on equality only, stencil writes off.
    MaskRead,
    /// Entity quads drawn through the mask.
    MaskedDraw,
}

impl MaskStage {
    pub const fn next(self) -> Option<MaskStage> {
        match self {
            MaskStage::Clear => Some(MaskStage::MaskWrite),
            MaskStage::MaskWrite => Some(MaskStage::MaskRead),
            MaskStage::MaskRead => Some(MaskStage::MaskedDraw),
            MaskStage::MaskedDraw => None,
        }
    }
}

/// Tracks the `Clear -> MaskWrite -> MaskRead -> MaskedDraw` walk of one frame.
#[derive(Debug, Default)]
pub struct MaskSequencer {
    current: Option<MaskStage>,
}

impl MaskSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<MaskStage> {
        self.current
    }

    fn expected(&self) -> Option<MaskStage> {
        match self.current {
            None => Some(MaskStage::Clear),
            Some(stage) => stage.next(),
        }
    }

    /// Moves to `stage`, which must be the immediate successor of the current one.
    pub fn enter(&mut self, stage: MaskStage) -> Result<(), RenderError> {
        let expected = self.expected();
        if expected != Some(stage) {
            return Err(RenderError::StageOrder {
                operation: "masked frame",
                expected,
                found: Some(stage),
            });
        }
        self.current = Some(stage);
        Ok(())
    }

    /// Closes the frame. Every stage must have run.
    pub fn finish(&mut self) -> Result<(), RenderError> {
        let expected = self.expected();
        if self.current.take() != Some(MaskStage::MaskedDraw) {
            return Err(RenderError::StageOrder {
                operation: "masked frame",
                expected,
                found: None,
            });
        }
        Ok(())
    }

    /// Drops any partially recorded frame.
    pub fn reset(&mut self) {
        self.current = None;
    }
}

/// Quad vertices for one entity with per-corner colors.
pub fn entity_quad(entity: &Entity, size: Vec2, colors: &CornerColors) -> [ScreenVertex; 4] {
    let corners = entity.bounds(size).corners();
    std::array::from_fn(|i| ScreenVertex {
        pos: [corners[i].x, corners[i].y],
        color: colors.0[i].to_array(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::Color;

    // ── stripes ───────────────────────────────────────────────────────────

    #[test]
    fn stripes_cover_viewport_width_at_fixed_period() {
        let s = StripePattern::default().stripes(100.0, 50.0);
        assert_eq!(s.len(), 5);
        assert_eq!(s[0], Rect::new(0.0, 0.0, 10.0, 50.0));
        assert_eq!(s[4], Rect::new(80.0, 0.0, 10.0, 50.0));
    }

    #[test]
    fn partial_last_period_still_gets_a_stripe() {
        let s = StripePattern::default().stripes(105.0, 10.0);
        assert_eq!(s.len(), 6);
        assert_eq!(s[5].origin.x, 100.0);
    }

    #[test]
    fn degenerate_patterns_produce_nothing() {
        assert!(StripePattern { period: 0.0, width: 10.0 }.stripes(100.0, 10.0).is_empty());
        assert!(StripePattern::default().stripes(0.0, 10.0).is_empty());
    }

    #[test]
    fn visible_columns_follow_the_pattern() {
        let p = StripePattern::default();
        assert!(p.is_visible(0));
        assert!(p.is_visible(9));
        assert!(!p.is_visible(10));
        assert!(!p.is_visible(19));
        assert!(p.is_visible(20));
    }

    #[test]
    fn coverage_is_half_for_multiples_of_period() {
        let p = StripePattern::default();
        for w in [20, 640, 1920, 20_000] {
            assert_eq!(p.visible_fraction(w), 0.5, "width {w}");
        }
    }

    #[test]
    fn coverage_converges_to_half() {
        let p = StripePattern::default();
        let small = (p.visible_fraction(30) - 0.5).abs();
        let large = (p.visible_fraction(20_010) - 0.5).abs();
        assert!(large < small);
        assert!(large < 1e-3);
    }

    // ── sequencing ────────────────────────────────────────────────────────

    #[test]
    fn full_sequence_succeeds_repeatedly() {
        let mut seq = MaskSequencer::new();
        for _ in 0..3 {
            seq.enter(MaskStage::Clear).unwrap();
            seq.enter(MaskStage::MaskWrite).unwrap();
            seq.enter(MaskStage::MaskRead).unwrap();
            seq.enter(MaskStage::MaskedDraw).unwrap();
            seq.finish().unwrap();
        }
    }

    #[test]
    fn skipping_a_stage_is_rejected() {
        let mut seq = MaskSequencer::new();
        seq.enter(MaskStage::Clear).unwrap();
        let err = seq.enter(MaskStage::MaskRead).unwrap_err();
        assert!(matches!(
            err,
            RenderError::StageOrder {
                expected: Some(MaskStage::MaskWrite),
                found: Some(MaskStage::MaskRead),
                ..
            }
        ));
    }

    #[test]
    fn drawing_before_mask_is_rejected() {
        let mut seq = MaskSequencer::new();
        assert!(seq.enter(MaskStage::MaskedDraw).is_err());
        assert_eq!(seq.current(), None);
    }

    #[test]
    fn finishing_early_is_rejected_and_resets() {
        let mut seq = MaskSequencer::new();
        seq.enter(MaskStage::Clear).unwrap();
        seq.enter(MaskStage::MaskWrite).unwrap();
        assert!(seq.finish().is_err());
        seq.enter(MaskStage::Clear).unwrap();
    }

    #[test]
    fn no_stage_after_masked_draw() {
        let mut seq = MaskSequencer::new();
        for s in [MaskStage::Clear, MaskStage::MaskWrite, MaskStage::MaskRead, MaskStage::MaskedDraw] {
            seq.enter(s).unwrap();
        }
        assert!(seq.enter(MaskStage::MaskWrite).is_err());
    }

    // ── entity quads ──────────────────────────────────────────────────────

    #[test]
    fn entity_quad_uses_bounds_and_corner_colors() {
        let e = Entity::new(Vec2::new(10.0, 20.0), Vec2::new(1.0, 1.0));
        let colors = CornerColors([Color::RED, Color::GREEN, Color::BLUE, Color::WHITE]);
        let q = entity_quad(&e, Vec2::new(32.0, 16.0), &colors);
        assert_eq!(q[0].pos, [10.0, 20.0]);
        assert_eq!(q[1].pos, [42.0, 20.0]);
        assert_eq!(q[2].pos, [42.0, 36.0]);
        assert_eq!(q[3].pos, [10.0, 36.0]);
        assert_eq!(q[2].color, Color::BLUE.to_array());
    }
}
