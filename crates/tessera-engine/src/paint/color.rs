/// Linear RGBA color, straight (non-premultiplied) alpha.
///
/// All geometry in this crate is opaque, so no premultiplication is applied.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);

    #[inline]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// Quantizes to 8 bits per channel, the way an RGBA8 attachment stores it.
    #[inline]
    pub fn to_u8(self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    #[inline]
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: self.a as f64,
        }
    }
}

/// Per-corner colors for a gradient quad, in [`crate::coords::Rect::corners`]
/// order (top-left, top-right, bottom-right, bottom-left).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CornerColors(pub [Color; 4]);

impl Default for CornerColors {
    fn default() -> Self {
        Self([Color::RED, Color::GREEN, Color::BLUE, Color::WHITE])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_u8_is_exact_for_byte_values() {
        for v in [0u8, 1, 77, 128, 254, 255] {
            let c = v as f32 / 255.0;
            assert_eq!(Color::rgba(c, c, c, c).to_u8(), [v; 4]);
        }
    }

    #[test]
    fn to_u8_clamps_out_of_range() {
        assert_eq!(Color::rgba(-1.0, 2.0, 0.5, 1.0).to_u8(), [0, 255, 128, 255]);
    }
}
