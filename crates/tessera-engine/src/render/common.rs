//! GPU types and helpers shared by both pipelines.

use bytemuck::{Pod, Zeroable};

use crate::coords::Viewport;
use crate::error::RenderError;

// ── viewport uniform ──────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct ViewportUniform {
    pub viewport: [f32; 2],
    pub _pad: [f32; 2], // 16-byte alignment
}

impl ViewportUniform {
    pub(super) fn new(viewport: Viewport) -> Self {
        Self {
            viewport: [viewport.width.max(1.0), viewport.height.max(1.0)],
            _pad: [0.0; 2],
        }
    }

    pub(super) fn min_binding_size() -> std::num::NonZeroU64 {
        std::num::NonZeroU64::new(std::mem::size_of::<Self>() as u64)
            .expect("ViewportUniform has non-zero size")
    }
}

pub(super) fn viewport_bind_group_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: Some(ViewportUniform::min_binding_size()),
            },
            count: None,
        }],
    })
}

// ── vertices ──────────────────────────────────────────────────────────────

/// On-screen vertex: logical px position + color.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ScreenVertex {
    pub pos: [f32; 2],
    pub color: [f32; 4],
}

impl ScreenVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x2, // pos
        1 => Float32x4  // color
    ];

    pub(super) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ScreenVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// On-screen vertex with texture coordinates.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct TexturedVertex {
    pub pos: [f32; 2],
    pub uv: [f32; 2],
}

impl TexturedVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x2, // pos
        1 => Float32x2  // uv
    ];

    pub(super) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<TexturedVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Two triangles over quad corners `base..base + 4` (clockwise from top-left).
#[inline]
pub(super) const fn quad_indices(base: u32) -> [u32; 6] {
    [base, base + 1, base + 2, base, base + 2, base + 3]
}

pub(super) fn opaque_primitive() -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleList,
        strip_index_format: None,
        front_face: wgpu::FrontFace::Ccw,
        cull_mode: None,
        polygon_mode: wgpu::PolygonMode::Fill,
        unclipped_depth: false,
        conservative: false,
    }
}

// ── staging ───────────────────────────────────────────────────────────────

/// Reserves CPU staging space, reporting exhaustion instead of aborting.
pub(super) fn staging<T>(len: usize) -> Result<Vec<T>, RenderError> {
    let mut v = Vec::new();
    v.try_reserve_exact(len).map_err(|_| RenderError::HostAlloc {
        bytes: len.saturating_mul(std::mem::size_of::<T>()),
    })?;
    Ok(v)
}

/// GPU buffer that grows to the next power of two when data outgrows it.
pub(super) struct GrowBuffer {
    label: &'static str,
    usage: wgpu::BufferUsages,
    buffer: Option<wgpu::Buffer>,
    capacity: u64,
}

impl GrowBuffer {
    pub(super) fn new(label: &'static str, usage: wgpu::BufferUsages) -> Self {
        Self {
            label,
            usage: usage | wgpu::BufferUsages::COPY_DST,
            buffer: None,
            capacity: 0,
        }
    }

    /// Uploads `data` from offset 0, reallocating first if needed.
    pub(super) fn upload<T: Pod>(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &[T],
    ) -> Result<&wgpu::Buffer, RenderError> {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let needed = (bytes.len() as u64).max(wgpu::COPY_BUFFER_ALIGNMENT);

        if self.buffer.is_none() || needed > self.capacity {
            let capacity = needed.next_power_of_two().max(256);
            self.buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(self.label),
                size: capacity,
                usage: self.usage,
                mapped_at_creation: false,
            }));
            self.capacity = capacity;
            log::debug!("{}: grown to {capacity} bytes", self.label);
        }

        let buffer = self.buffer.as_ref().ok_or(RenderError::MissingResource(self.label))?;
        if !bytes.is_empty() {
            queue.write_buffer(buffer, 0, bytes);
        }
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_indices_cover_two_triangles() {
        assert_eq!(quad_indices(0), [0, 1, 2, 0, 2, 3]);
        assert_eq!(quad_indices(8), [8, 9, 10, 8, 10, 11]);
    }

    #[test]
    fn staging_reports_impossible_reservations() {
        let err = staging::<ScreenVertex>(usize::MAX / 2).unwrap_err();
        assert!(matches!(err, RenderError::HostAlloc { .. }));
    }

    #[test]
    fn staging_reserves_requested_capacity() {
        let v = staging::<u32>(64).unwrap();
        assert!(v.capacity() >= 64);
        assert!(v.is_empty());
    }

    #[test]
    fn viewport_uniform_clamps_degenerate_sizes() {
        let u = ViewportUniform::new(Viewport::new(0.0, -3.0));
        assert_eq!(u.viewport, [1.0, 1.0]);
    }
}
