//! Stencil demo: 256 bouncing gradient rectangles visible only through
//! vertical stripes.

use tessera_engine::config::PipelineConfig;
use tessera_engine::coords::{Vec2, Viewport};
use tessera_engine::core::{App, AppControl, FrameCtx, InitCtx};
use tessera_engine::render::MaskedRenderer;
use tessera_engine::resources::StencilPlane;
use tessera_engine::sim::{Entity, Simulation};
use tessera_engine::time::FrameStats;

pub struct StencilDemo {
    config: PipelineConfig,
    sim: Simulation,
    renderer: MaskedRenderer,
    stencil: Option<StencilPlane>,
    stats: FrameStats,
}

impl StencilDemo {
    pub fn new(config: PipelineConfig) -> Self {
        let sim = Simulation::new(&config.sim);
        let renderer = MaskedRenderer::new(config.mask);
        Self {
            config,
            sim,
            renderer,
            stencil: None,
            stats: FrameStats::default(),
        }
    }
}

impl App for StencilDemo {
    fn on_init(&mut self, ctx: &InitCtx<'_, '_>) -> anyhow::Result<()> {
        let (w, h) = ctx.size();
        self.stencil = Some(StencilPlane::new(ctx.device(), w, h));
        log::info!(
            "{} entities in a {}x{} world, max speed {} px/tick",
            self.sim.entities().len(),
            self.sim.world().width,
            self.sim.world().height,
            self.sim.max_speed(),
        );
        Ok(())
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let size = ctx.gpu.size();
        if size.width == 0 || size.height == 0 {
            // Minimized: nothing to draw into.
            return AppControl::Continue;
        }

        let Some(stencil) = self.stencil.as_mut() else {
            log::error!("frame requested before the stencil plane exists");
            return AppControl::Exit;
        };
        if stencil.ensure_size(ctx.gpu.device(), size.width, size.height) {
            log::debug!("stencil plane resized to {}x{}", size.width, size.height);
        }

        let world = self.sim.world();
        let (w, h) = ctx.logical_size();
        let viewport = self
            .config
            .resize_policy
            .viewport(Viewport::new(world.width, world.height), Viewport::new(w, h));

        let renderer = &mut self.renderer;
        let sim = &mut self.sim;
        let stencil = &*stencil;
        let result = ctx.render(viewport, |rctx, frame| {
            advance_and_draw(sim, |entities, size| {
                renderer.render_frame(rctx, frame, stencil, entities, size)
            })
        });

        if let Some(report) = self.stats.record(&ctx.time) {
            log::debug!(
                "tick {}: mean {:.2} ms, worst {:.2} ms over {} frames",
                self.sim.ticks(),
                report.mean_ms,
                report.worst_ms,
                report.frames
            );
        }
        self.config.frame_policy.resolve(result)
    }

    fn on_reshape(&mut self, width: u32, height: u32) {
        log::debug!("reshape to {width}x{height} ({:?})", self.config.resize_policy);
    }

    fn on_shutdown(&mut self) {
        log::info!("stencil demo finished after {} ticks", self.sim.ticks());
    }
}

/// One tick, then a draw of the new state. Runs inside the render closure, so
/// a frame the surface could not provide advances nothing.
fn advance_and_draw<R>(sim: &mut Simulation, draw: impl FnOnce(&[Entity], Vec2) -> R) -> R {
    sim.tick();
    draw(sim.entities(), sim.entity_size())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_engine::sim::SimConfig;

    #[test]
    fn draw_sees_the_state_after_exactly_one_tick() {
        let config = SimConfig {
            seed: Some(7),
            ..SimConfig::default()
        };
        let mut sim = Simulation::new(&config);
        let mut expected = Simulation::new(&config);
        expected.tick();

        let drawn = advance_and_draw(&mut sim, |entities, _| entities.to_vec());

        assert_eq!(sim.ticks(), 1);
        assert_eq!(drawn.as_slice(), expected.entities());
    }
}
