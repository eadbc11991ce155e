use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::paint::Color;

/// Off-screen scene vertex: model-space position + color.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct SceneVertex {
    pub pos: [f32; 3],
    pub color: [f32; 4],
}

impl SceneVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // pos
        1 => Float32x4  // color
    ];

    pub(super) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SceneVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Perspective camera for the off-screen pass.
///
/// Independent of the on-screen logical-pixel space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    /// Vertical field of view, radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    /// Applied to the scene before projection (a fixed camera pull-back).
    pub translation: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fov_y: std::f32::consts::FRAC_PI_4,
            near: 1.0,
            far: 100.0,
            translation: Vec3::new(0.0, 0.0, -4.0),
        }
    }
}

impl Camera {
    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, aspect.max(f32::EPSILON), self.near, self.far)
            * Mat4::from_translation(self.translation)
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub(super) fn new(camera: &Camera, aspect: f32) -> Self {
        Self {
            view_proj: camera.view_proj(aspect).to_cols_array_2d(),
        }
    }
}

/// What the off-screen pass draws: a triangle list, its camera and the
/// target's clear color.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneDescription {
    pub vertices: Vec<SceneVertex>,
    pub camera: Camera,
    pub clear: Color,
}

impl SceneDescription {
    /// One solid triangle centred on the origin.
    pub fn triangle(color: Color, clear: Color) -> Self {
        let c = color.to_array();
        Self {
            vertices: vec![
                SceneVertex { pos: [-1.0, -1.0, 0.0], color: c },
                SceneVertex { pos: [1.0, -1.0, 0.0], color: c },
                SceneVertex { pos: [0.0, 1.0, 0.0], color: c },
            ],
            camera: Camera::default(),
            clear,
        }
    }
}

impl Default for SceneDescription {
    fn default() -> Self {
        Self::triangle(Color::rgb(1.0, 0.5, 0.0), Color::rgb(0.1, 0.1, 0.2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn ndc(m: Mat4, p: [f32; 3]) -> Vec3 {
        let clip = m * Vec4::new(p[0], p[1], p[2], 1.0);
        clip.truncate() / clip.w
    }

    #[test]
    fn default_triangle_is_fully_visible() {
        let scene = SceneDescription::default();
        let m = scene.camera.view_proj(1.0);
        for v in &scene.vertices {
            let p = ndc(m, v.pos);
            assert!(p.x.abs() <= 1.0 && p.y.abs() <= 1.0, "{p:?} outside");
            assert!((0.0..=1.0).contains(&p.z), "depth {} outside", p.z);
        }
    }

    #[test]
    fn camera_pull_back_shrinks_geometry() {
        let near = Camera { translation: Vec3::new(0.0, 0.0, -3.0), ..Default::default() };
        let far = Camera { translation: Vec3::new(0.0, 0.0, -6.0), ..Default::default() };
        let a = ndc(near.view_proj(1.0), [1.0, 0.0, 0.0]).x;
        let b = ndc(far.view_proj(1.0), [1.0, 0.0, 0.0]).x;
        assert!(a > b && b > 0.0);
    }

    #[test]
    fn triangle_vertices_share_one_color() {
        let scene = SceneDescription::triangle(Color::GREEN, Color::BLACK);
        assert_eq!(scene.vertices.len(), 3);
        assert!(scene.vertices.iter().all(|v| v.color == Color::GREEN.to_array()));
    }
}
