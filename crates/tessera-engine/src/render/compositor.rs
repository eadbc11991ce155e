use crate::coords::Rect;
use crate::error::RenderError;
use crate::paint::Color;
use crate::resources::{RenderTarget, TargetId};

use super::common::{
    opaque_primitive, quad_indices, viewport_bind_group_layout, GrowBuffer, TexturedVertex,
    ViewportUniform,
};
use super::composite::{CompositeQuad, TexcoordOrigin};
use super::ctx::{FrameTarget, RenderCtx};
use super::scene::{CameraUniform, SceneDescription, SceneVertex};

/// Two-pass render-to-texture compositor.
///
/// Pass 1 draws a [`SceneDescription`] into a borrowed [`RenderTarget`] with its
/// own perspective camera. Pass 2 clears the visible surface and draws one quad
/// (logical px) that samples the target's color attachment.
pub struct Compositor {
    /// Screen region the target is shown in; `None` covers the whole viewport.
    pub region: Option<Rect>,
    pub origin: TexcoordOrigin,
    /// Clear color of the visible surface.
    pub clear: Color,

    scene_formats: Option<(wgpu::TextureFormat, wgpu::TextureFormat)>,
    scene_pipeline: Option<wgpu::RenderPipeline>,
    camera_ubo: Option<wgpu::Buffer>,
    camera_bind_group: Option<wgpu::BindGroup>,

    composite_format: Option<wgpu::TextureFormat>,
    composite_pipeline: Option<wgpu::RenderPipeline>,
    viewport_ubo: Option<wgpu::Buffer>,
    viewport_bind_group: Option<wgpu::BindGroup>,
    texture_bgl: Option<wgpu::BindGroupLayout>,
    texture_bind_group: Option<(TargetId, wgpu::BindGroup)>,

    scene_vbo: GrowBuffer,
    quad_vbo: GrowBuffer,
    quad_ibo: GrowBuffer,
}

impl Default for Compositor {
    fn default() -> Self {
        Self {
            region: None,
            origin: TexcoordOrigin::default(),
            clear: Color::BLACK,
            scene_formats: None,
            scene_pipeline: None,
            camera_ubo: None,
            camera_bind_group: None,
            composite_format: None,
            composite_pipeline: None,
            viewport_ubo: None,
            viewport_bind_group: None,
            texture_bgl: None,
            texture_bind_group: None,
            scene_vbo: GrowBuffer::new("tessera scene vbo", wgpu::BufferUsages::VERTEX),
            quad_vbo: GrowBuffer::new("tessera composite vbo", wgpu::BufferUsages::VERTEX),
            quad_ibo: GrowBuffer::new("tessera composite ibo", wgpu::BufferUsages::INDEX),
        }
    }
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// The quad pass 2 draws for the current viewport.
    pub fn quad(&self, ctx: &RenderCtx<'_>) -> CompositeQuad {
        let full = Rect::new(0.0, 0.0, ctx.viewport.width, ctx.viewport.height);
        CompositeQuad::new(self.region.unwrap_or(full), self.origin)
    }

    /// Records both passes into `frame`. Pass 1 always completes before pass 2
    /// reads the target.
    pub fn render_frame(
        &mut self,
        ctx: &RenderCtx<'_>,
        frame: &mut FrameTarget<'_>,
        target: &RenderTarget,
        scene: &SceneDescription,
    ) -> Result<(), RenderError> {
        self.ensure_scene_pipeline(ctx, target);
        self.ensure_composite_pipeline(ctx);
        self.ensure_texture_binding(ctx, target)?;

        self.offscreen_pass(ctx, frame, target, scene)?;
        self.composite_pass(ctx, frame)
    }

    fn offscreen_pass(
        &mut self,
        ctx: &RenderCtx<'_>,
        frame: &mut FrameTarget<'_>,
        target: &RenderTarget,
        scene: &SceneDescription,
    ) -> Result<(), RenderError> {
        let camera_ubo = self
            .camera_ubo
            .as_ref()
            .ok_or(RenderError::MissingResource("camera ubo"))?;
        let camera = CameraUniform::new(&scene.camera, target.aspect());
        ctx.queue.write_buffer(camera_ubo, 0, bytemuck::bytes_of(&camera));

        let vbo = self.scene_vbo.upload(ctx.device, ctx.queue, &scene.vertices)?;
        let pipeline = self
            .scene_pipeline
            .as_ref()
            .ok_or(RenderError::MissingResource("scene pipeline"))?;
        let bind_group = self
            .camera_bind_group
            .as_ref()
            .ok_or(RenderError::MissingResource("camera bind group"))?;

        let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("tessera offscreen pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view(),
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(scene.clear.to_wgpu()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: target.depth_view(),
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        if scene.vertices.is_empty() {
            return Ok(());
        }

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, vbo.slice(..));
        rpass.draw(0..scene.vertices.len() as u32, 0..1);
        Ok(())
    }

    fn composite_pass(
        &mut self,
        ctx: &RenderCtx<'_>,
        frame: &mut FrameTarget<'_>,
    ) -> Result<(), RenderError> {
        let viewport_ubo = self
            .viewport_ubo
            .as_ref()
            .ok_or(RenderError::MissingResource("composite viewport ubo"))?;
        let uniform = ViewportUniform::new(ctx.viewport);
        ctx.queue.write_buffer(viewport_ubo, 0, bytemuck::bytes_of(&uniform));

        let quad = self.quad(ctx);
        let vertices: [TexturedVertex; 4] = quad.vertices();
        let indices = quad_indices(0);
        let vbo = self.quad_vbo.upload(ctx.device, ctx.queue, &vertices)?;
        let ibo = self.quad_ibo.upload(ctx.device, ctx.queue, &indices)?;

        let pipeline = self
            .composite_pipeline
            .as_ref()
            .ok_or(RenderError::MissingResource("composite pipeline"))?;
        let viewport_bg = self
            .viewport_bind_group
            .as_ref()
            .ok_or(RenderError::MissingResource("composite viewport bind group"))?;
        let (_, texture_bg) = self
            .texture_bind_group
            .as_ref()
            .ok_or(RenderError::MissingResource("composite texture bind group"))?;

        let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("tessera composite pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: frame.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear.to_wgpu()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        if quad.rect.is_empty() {
            return Ok(());
        }

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, viewport_bg, &[]);
        rpass.set_bind_group(1, texture_bg, &[]);
        rpass.set_vertex_buffer(0, vbo.slice(..));
        rpass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..indices.len() as u32, 0, 0..1);
        Ok(())
    }

    fn ensure_scene_pipeline(&mut self, ctx: &RenderCtx<'_>, target: &RenderTarget) {
        let formats = (target.color_format(), target.depth_format());
        if self.scene_formats == Some(formats) && self.scene_pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("tessera scene shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
        });

        let camera_size = std::mem::size_of::<CameraUniform>() as u64;
        let bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tessera scene bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(camera_size),
                },
                count: None,
            }],
        });

        let layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("tessera scene pipeline layout"),
            bind_group_layouts: &[&bgl],
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("tessera scene pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[SceneVertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: formats.0,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: opaque_primitive(),
            depth_stencil: Some(wgpu::DepthStencilState {
                format: formats.1,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let camera_ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tessera camera ubo"),
            size: camera_size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tessera camera bind group"),
            layout: &bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_ubo.as_entire_binding(),
            }],
        });

        log::debug!("compositor: scene pipeline built for {:?} + {:?}", formats.0, formats.1);
        self.scene_formats = Some(formats);
        self.scene_pipeline = Some(pipeline);
        self.camera_ubo = Some(camera_ubo);
        self.camera_bind_group = Some(bind_group);
    }

    fn ensure_composite_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.composite_format == Some(ctx.surface_format) && self.composite_pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("tessera composite shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/composite.wgsl").into()),
        });

        let viewport_bgl = viewport_bind_group_layout(ctx.device, "tessera composite viewport bgl");
        let texture_bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tessera composite texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("tessera composite pipeline layout"),
            bind_group_layouts: &[&viewport_bgl, &texture_bgl],
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("tessera composite pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[TexturedVertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: opaque_primitive(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let viewport_ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tessera composite viewport ubo"),
            size: std::mem::size_of::<ViewportUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let viewport_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tessera composite viewport bind group"),
            layout: &viewport_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: viewport_ubo.as_entire_binding(),
            }],
        });

        self.composite_format = Some(ctx.surface_format);
        self.composite_pipeline = Some(pipeline);
        self.viewport_ubo = Some(viewport_ubo);
        self.viewport_bind_group = Some(viewport_bind_group);
        self.texture_bgl = Some(texture_bgl);
        // The old texture bind group belongs to the replaced layout.
        self.texture_bind_group = None;
    }

    fn ensure_texture_binding(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &RenderTarget,
    ) -> Result<(), RenderError> {
        if matches!(&self.texture_bind_group, Some((id, _)) if *id == target.id()) {
            return Ok(());
        }
        let bgl = self
            .texture_bgl
            .as_ref()
            .ok_or(RenderError::MissingResource("composite texture bgl"))?;

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tessera composite texture bind group"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(target.color_view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(target.sampler()),
                },
            ],
        });
        self.texture_bind_group = Some((target.id(), bind_group));
        Ok(())
    }
}
