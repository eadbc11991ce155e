//! Render-to-texture demo: a triangle drawn into a small off-screen target,
//! then stretched over the window.

use tessera_engine::config::PipelineConfig;
use tessera_engine::coords::Viewport;
use tessera_engine::core::{App, AppControl, FrameCtx, InitCtx};
use tessera_engine::render::{Compositor, SceneDescription};
use tessera_engine::resources::{self, RenderTarget};
use tessera_engine::time::FrameStats;

pub struct FboDemo {
    config: PipelineConfig,
    compositor: Compositor,
    scene: SceneDescription,
    target: Option<RenderTarget>,
    initial_viewport: Viewport,
    stats: FrameStats,
}

impl FboDemo {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            compositor: Compositor::new(),
            scene: SceneDescription::default(),
            target: None,
            initial_viewport: Viewport::default(),
            stats: FrameStats::default(),
        }
    }
}

impl App for FboDemo {
    fn on_init(&mut self, ctx: &InitCtx<'_, '_>) -> anyhow::Result<()> {
        let (w, h) = ctx.size();
        let target_config = self.config.target_for(w, h);
        let target = resources::initialize(ctx.device(), &target_config)?;
        log::debug!("window {w}x{h}, target aspect {:.3}", target.aspect());

        let logical = ctx.window.inner_size().to_logical::<f32>(ctx.window.scale_factor());
        self.initial_viewport = Viewport::new(logical.width, logical.height);
        self.target = Some(target);
        Ok(())
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let Some(target) = self.target.as_ref() else {
            log::error!("frame requested before the off-screen target exists");
            return AppControl::Exit;
        };

        let (w, h) = ctx.logical_size();
        let viewport = self
            .config
            .resize_policy
            .viewport(self.initial_viewport, Viewport::new(w, h));

        let compositor = &mut self.compositor;
        let scene = &self.scene;
        let result = ctx.render(viewport, |rctx, frame| {
            compositor.render_frame(rctx, frame, target, scene)
        });

        if let Some(report) = self.stats.record(&ctx.time) {
            log::debug!(
                "{} frames: mean {:.2} ms, worst {:.2} ms",
                report.frames,
                report.mean_ms,
                report.worst_ms
            );
        }
        self.config.frame_policy.resolve(result)
    }

    fn on_reshape(&mut self, width: u32, height: u32) {
        log::debug!("reshape to {width}x{height}; off-screen target keeps its size");
    }

    fn on_shutdown(&mut self) {
        log::info!("fbo demo finished");
    }
}
