use crate::coords::{Vec2, Viewport};
use crate::error::RenderError;
use crate::paint::{Color, CornerColors};
use crate::resources::StencilPlane;
use crate::sim::Entity;

use super::common::{
    opaque_primitive, quad_indices, staging, viewport_bind_group_layout, GrowBuffer,
    ScreenVertex, ViewportUniform,
};
use super::ctx::{FrameTarget, RenderCtx};
use super::mask::{entity_quad, MaskSequencer, MaskStage, StripePattern};

/// Appearance of a masked frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MaskConfig {
    pub pattern: StripePattern,
    /// Value the mask pass writes and the draw pass compares against.
    pub reference: u32,
    pub colors: CornerColors,
    pub clear: Color,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            pattern: StripePattern::default(),
            reference: 1,
            colors: CornerColors::default(),
            clear: Color::BLACK,
        }
    }
}

/// Stencil state for the mask-write stage: always pass, replace with the reference.
pub(super) fn mask_write_stencil() -> wgpu::StencilState {
    let face = wgpu::StencilFaceState {
        compare: wgpu::CompareFunction::Always,
        fail_op: wgpu::StencilOperation::Keep,
        depth_fail_op: wgpu::StencilOperation::Keep,
        pass_op: wgpu::StencilOperation::Replace,
    };
    wgpu::StencilState {
        front: face,
        back: face,
        read_mask: 0xFF,
        write_mask: 0xFF,
    }
}

/// Stencil state for the masked draw: pass on equality, never write.
pub(super) fn mask_read_stencil() -> wgpu::StencilState {
    let face = wgpu::StencilFaceState {
        compare: wgpu::CompareFunction::Equal,
        fail_op: wgpu::StencilOperation::Keep,
        depth_fail_op: wgpu::StencilOperation::Keep,
        pass_op: wgpu::StencilOperation::Keep,
    };
    wgpu::StencilState {
        front: face,
        back: face,
        read_mask: 0xFF,
        write_mask: 0x00,
    }
}

/// CPU-side geometry of one masked frame: stripe quads first, then entity quads.
#[derive(Debug)]
pub(super) struct MaskedGeometry {
    pub vertices: Vec<ScreenVertex>,
    pub indices: Vec<u32>,
    /// Number of leading indices that belong to the mask stripes.
    pub mask_indices: u32,
}

impl MaskedGeometry {
    pub(super) fn build(
        config: &MaskConfig,
        viewport: Viewport,
        entities: &[Entity],
        size: Vec2,
    ) -> Result<Self, RenderError> {
        let stripes = config.pattern.stripes(viewport.width, viewport.height);
        let quads = stripes.len() + entities.len();
        let mut vertices = staging::<ScreenVertex>(quads * 4)?;
        let mut indices = staging::<u32>(quads * 6)?;

        // Stripe colors never reach the color target.
        for stripe in &stripes {
            indices.extend_from_slice(&quad_indices(vertices.len() as u32));
            vertices.extend(stripe.corners().map(|c| ScreenVertex {
                pos: [c.x, c.y],
                color: Color::WHITE.to_array(),
            }));
        }
        let mask_indices = indices.len() as u32;

        for entity in entities {
            indices.extend_from_slice(&quad_indices(vertices.len() as u32));
            vertices.extend(entity_quad(entity, size, &config.colors));
        }

        Ok(Self {
            vertices,
            indices,
            mask_indices,
        })
    }
}

/// Draws entity quads through a procedurally generated stencil mask.
///
/// One render pass per frame, walked through [`MaskStage`] in order:
/// clear color/depth/stencil, write the stripes into stencil only, switch to
/// the equality test, then draw every entity in storage order.
pub struct MaskedRenderer {
    pub config: MaskConfig,
    sequencer: MaskSequencer,

    pipeline_format: Option<wgpu::TextureFormat>,
    mask_pipeline: Option<wgpu::RenderPipeline>,
    draw_pipeline: Option<wgpu::RenderPipeline>,
    viewport_ubo: Option<wgpu::Buffer>,
    bind_group: Option<wgpu::BindGroup>,

    vbo: GrowBuffer,
    ibo: GrowBuffer,
}

impl MaskedRenderer {
    pub fn new(config: MaskConfig) -> Self {
        Self {
            config,
            sequencer: MaskSequencer::new(),
            pipeline_format: None,
            mask_pipeline: None,
            draw_pipeline: None,
            viewport_ubo: None,
            bind_group: None,
            vbo: GrowBuffer::new("tessera masked vbo", wgpu::BufferUsages::VERTEX),
            ibo: GrowBuffer::new("tessera masked ibo", wgpu::BufferUsages::INDEX),
        }
    }

    /// Records one masked frame. `stencil` must match the surface size.
    pub fn render_frame(
        &mut self,
        ctx: &RenderCtx<'_>,
        frame: &mut FrameTarget<'_>,
        stencil: &StencilPlane,
        entities: &[Entity],
        size: Vec2,
    ) -> Result<(), RenderError> {
        if stencil.size() != ctx.surface_size {
            return Err(RenderError::AttachmentMismatch {
                attachment: stencil.size(),
                surface: ctx.surface_size,
            });
        }

        self.ensure_pipelines(ctx);
        let geometry = MaskedGeometry::build(&self.config, ctx.viewport, entities, size)?;

        let result = self.record(ctx, frame, stencil, &geometry);
        if result.is_err() {
            self.sequencer.reset();
        }
        result
    }

    fn record(
        &mut self,
        ctx: &RenderCtx<'_>,
        frame: &mut FrameTarget<'_>,
        stencil: &StencilPlane,
        geometry: &MaskedGeometry,
    ) -> Result<(), RenderError> {
        let viewport_ubo = self
            .viewport_ubo
            .as_ref()
            .ok_or(RenderError::MissingResource("masked viewport ubo"))?;
        let uniform = ViewportUniform::new(ctx.viewport);
        ctx.queue.write_buffer(viewport_ubo, 0, bytemuck::bytes_of(&uniform));

        let vbo = self.vbo.upload(ctx.device, ctx.queue, &geometry.vertices)?;
        let ibo = self.ibo.upload(ctx.device, ctx.queue, &geometry.indices)?;

        let mask_pipeline = self
            .mask_pipeline
            .as_ref()
            .ok_or(RenderError::MissingResource("mask pipeline"))?;
        let draw_pipeline = self
            .draw_pipeline
            .as_ref()
            .ok_or(RenderError::MissingResource("masked draw pipeline"))?;
        let bind_group = self
            .bind_group
            .as_ref()
            .ok_or(RenderError::MissingResource("masked bind group"))?;
        let seq = &mut self.sequencer;
        let reference = self.config.reference;

        seq.enter(MaskStage::Clear)?;
        let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("tessera masked pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: frame.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.config.clear.to_wgpu()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: stencil.view(),
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(0),
                    store: wgpu::StoreOp::Discard,
                }),
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, vbo.slice(..));
        rpass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint32);

        seq.enter(MaskStage::MaskWrite)?;
        rpass.set_pipeline(mask_pipeline);
        rpass.set_stencil_reference(reference);
        if geometry.mask_indices > 0 {
            rpass.draw_indexed(0..geometry.mask_indices, 0, 0..1);
        }

        seq.enter(MaskStage::MaskRead)?;
        rpass.set_pipeline(draw_pipeline);
        rpass.set_stencil_reference(reference);

        seq.enter(MaskStage::MaskedDraw)?;
        let total = geometry.indices.len() as u32;
        if total > geometry.mask_indices {
            rpass.draw_indexed(geometry.mask_indices..total, 0, 0..1);
        }
        drop(rpass);

        seq.finish()
    }

    fn ensure_pipelines(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.draw_pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("tessera color shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/color.wgsl").into()),
        });
        let bgl = viewport_bind_group_layout(ctx.device, "tessera masked bgl");
        let layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("tessera masked pipeline layout"),
            bind_group_layouts: &[&bgl],
            immediate_size: 0,
        });

        let build = |label: &str, write_mask: wgpu::ColorWrites, stencil: wgpu::StencilState| {
            ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[ScreenVertex::layout()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: ctx.surface_format,
                        blend: None,
                        write_mask,
                    })],
                }),
                primitive: opaque_primitive(),
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: StencilPlane::FORMAT,
                    depth_write_enabled: false,
                    depth_compare: wgpu::CompareFunction::Always,
                    stencil,
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        };

        let mask_pipeline = build(
            "tessera mask write pipeline",
            wgpu::ColorWrites::empty(),
            mask_write_stencil(),
        );
        let draw_pipeline = build(
            "tessera masked draw pipeline",
            wgpu::ColorWrites::ALL,
            mask_read_stencil(),
        );

        let viewport_ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tessera masked viewport ubo"),
            size: std::mem::size_of::<ViewportUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tessera masked bind group"),
            layout: &bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: viewport_ubo.as_entire_binding(),
            }],
        });

        log::debug!("masked renderer: pipelines built for {:?}", ctx.surface_format);
        self.pipeline_format = Some(ctx.surface_format);
        self.mask_pipeline = Some(mask_pipeline);
        self.draw_pipeline = Some(draw_pipeline);
        self.viewport_ubo = Some(viewport_ubo);
        self.bind_group = Some(bind_group);
    }
}

impl Default for MaskedRenderer {
    fn default() -> Self {
        Self::new(MaskConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(x: f32, y: f32) -> Entity {
        Entity {
            position: Vec2::new(x, y),
            velocity: Vec2::zero(),
        }
    }

    #[test]
    fn mask_stage_writes_stencil_only() {
        let s = mask_write_stencil();
        assert_eq!(s.front.compare, wgpu::CompareFunction::Always);
        assert_eq!(s.front.pass_op, wgpu::StencilOperation::Replace);
        assert_eq!(s.write_mask, 0xFF);
        assert_eq!(s.front, s.back);
    }

    #[test]
    fn draw_stage_tests_equality_and_never_writes() {
        let s = mask_read_stencil();
        assert_eq!(s.front.compare, wgpu::CompareFunction::Equal);
        assert_eq!(s.write_mask, 0x00);
        for op in [s.front.fail_op, s.front.depth_fail_op, s.front.pass_op] {
            assert_eq!(op, wgpu::StencilOperation::Keep);
        }
    }

    #[test]
    fn geometry_puts_mask_before_entities() {
        let config = MaskConfig::default();
        let entities = [entity(0.0, 0.0), entity(100.0, 50.0)];
        let g = MaskedGeometry::build(&config, Viewport::new(100.0, 80.0), &entities, Vec2::new(32.0, 32.0))
            .unwrap();

        // 5 stripes, 2 entities.
        assert_eq!(g.mask_indices, 5 * 6);
        assert_eq!(g.indices.len(), 7 * 6);
        assert_eq!(g.vertices.len(), 7 * 4);

        let first_entity = &g.vertices[5 * 4..5 * 4 + 4];
        assert_eq!(first_entity[0].pos, [0.0, 0.0]);
        assert_eq!(first_entity[2].pos, [32.0, 32.0]);
        assert_eq!(first_entity[0].color, Color::RED.to_array());
    }

    #[test]
    fn entity_indices_follow_storage_order() {
        let config = MaskConfig::default();
        let entities: Vec<Entity> = (0..4).map(|i| entity(i as f32 * 10.0, 0.0)).collect();
        let g = MaskedGeometry::build(&config, Viewport::new(40.0, 40.0), &entities, Vec2::new(5.0, 5.0))
            .unwrap();

        let entity_idx = &g.indices[g.mask_indices as usize..];
        for (i, chunk) in entity_idx.chunks(6).enumerate() {
            let base = g.vertices.len() as u32 - (entities.len() as u32 - i as u32) * 4;
            assert_eq!(chunk, quad_indices(base));
            assert_eq!(g.vertices[base as usize].pos[0], i as f32 * 10.0);
        }
    }

    #[test]
    fn empty_viewport_draws_no_mask() {
        let g = MaskedGeometry::build(
            &MaskConfig::default(),
            Viewport::new(0.0, 0.0),
            &[entity(1.0, 1.0)],
            Vec2::new(2.0, 2.0),
        )
        .unwrap();
        assert_eq!(g.mask_indices, 0);
        assert_eq!(g.indices.len(), 6);
    }

    #[test]
    fn default_reference_is_one() {
        assert_eq!(MaskConfig::default().reference, 1);
    }
}
