mod args;
mod fbo;
mod stencil;

use tessera_engine::device::GpuInit;
use tessera_engine::logging::{init_logging, LoggingConfig};
use tessera_engine::window::{Runtime, RuntimeConfig};

use args::{DemoArgs, DemoKind};
use fbo::FboDemo;
use stencil::StencilDemo;

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let DemoArgs { kind, config } = args::parse(std::env::args().skip(1))?;
    log::info!("starting {kind:?} demo ({:?}, {:?})", config.frame_policy, config.resize_policy);

    match kind {
        DemoKind::Fbo => Runtime::run(
            RuntimeConfig {
                title: "tessera: render to texture".to_string(),
                ..Default::default()
            },
            GpuInit::default(),
            FboDemo::new(config),
        ),
        DemoKind::Stencil => Runtime::run(
            RuntimeConfig {
                title: "tessera: stencil mask".to_string(),
                ..Default::default()
            },
            GpuInit::default(),
            StencilDemo::new(config),
        ),
    }
}
