//! Geometry of the composite pass: the screen quad that displays the
//! off-screen target, and the CPU model of how it samples that target.

use crate::coords::{Rect, Vec2};

use super::common::TexturedVertex;

/// Where texture row 0 lives relative to the displayed image.
///
/// wgpu render targets store row 0 at the top, the same as the display, so
/// no flip is needed there. `BottomLeft` reproduces the GL-style mapping
/// where v = 1 sits on the quad's top edge.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum TexcoordOrigin {
    #[default]
    TopLeft,
    BottomLeft,
}

/// Screen quad for the composite pass.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CompositeQuad {
    /// Destination region in logical pixels.
    pub rect: Rect,
    pub origin: TexcoordOrigin,
}

impl CompositeQuad {
    pub fn new(rect: Rect, origin: TexcoordOrigin) -> Self {
        Self { rect, origin }
    }

    /// Corner vertices (clockwise from top-left) spanning the whole texture.
    pub fn vertices(&self) -> [TexturedVertex; 4] {
        let corners = self.rect.corners();
        let uvs = match self.origin {
            TexcoordOrigin::TopLeft => [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
            TexcoordOrigin::BottomLeft => [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]],
        };
        std::array::from_fn(|i| TexturedVertex {
            pos: [corners[i].x, corners[i].y],
            uv: uvs[i],
        })
    }

    /// Texture coordinate the quad interpolates at screen point `p`, or
    /// `None` outside the quad.
    pub fn uv_at(&self, p: Vec2) -> Option<Vec2> {
        if !self.rect.contains(p) {
            return None;
        }
        let rel = self.rect.relative(p)?;
        Some(match self.origin {
            TexcoordOrigin::TopLeft => rel,
            TexcoordOrigin::BottomLeft => Vec2::new(rel.x, 1.0 - rel.y),
        })
    }
}

/// Nearest-filtered, edge-clamped lookup into tightly packed RGBA8 rows
/// (row 0 first), matching the target's sampler.
pub fn sample_nearest(pixels: &[u8], width: u32, height: u32, uv: Vec2) -> Option<[u8; 4]> {
    if width == 0 || height == 0 {
        return None;
    }
    let texel = |t: f32, n: u32| ((t.clamp(0.0, 1.0) * n as f32).floor() as u32).min(n - 1);
    let x = texel(uv.x, width) as usize;
    let y = texel(uv.y, height) as usize;
    let i = (y * width as usize + x) * 4;
    let px = pixels.get(i..i + 4)?;
    Some([px[0], px[1], px[2], px[3]])
}
