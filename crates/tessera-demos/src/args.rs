//! Command line: `tessera-demos [fbo|stencil] [--skip-errors] [--resize] [--seed N]`.

use anyhow::{bail, Context, Result};
use tessera_engine::config::{PipelineConfig, ResizePolicy};
use tessera_engine::error::FramePolicy;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DemoKind {
    Fbo,
    Stencil,
}

#[derive(Debug)]
pub struct DemoArgs {
    pub kind: DemoKind,
    pub config: PipelineConfig,
}

/// The FBO demo renders at an eighth of the window size.
const FBO_DIVISOR: u32 = 8;

pub fn parse<I>(args: I) -> Result<DemoArgs>
where
    I: IntoIterator<Item = String>,
{
    let mut kind = None;
    let mut config = PipelineConfig::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "fbo" if kind.is_none() => kind = Some(DemoKind::Fbo),
            "stencil" if kind.is_none() => kind = Some(DemoKind::Stencil),
            "--skip-errors" => config.frame_policy = FramePolicy::SkipFrame,
            "--resize" => config.resize_policy = ResizePolicy::Recompute,
            "--seed" => {
                let value = args.next().context("--seed needs a value")?;
                let seed = value
                    .parse::<u64>()
                    .with_context(|| format!("invalid seed {value:?}"))?;
                config.sim.seed = Some(seed);
            }
            other => bail!("unexpected argument {other:?}; usage: tessera-demos [fbo|stencil] [--skip-errors] [--resize] [--seed N]"),
        }
    }

    let kind = kind.unwrap_or(DemoKind::Stencil);
    if kind == DemoKind::Fbo {
        config.target_divisor = Some(FBO_DIVISOR);
    }
    Ok(DemoArgs { kind, config })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_strs(args: &[&str]) -> Result<DemoArgs> {
        parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn stencil_is_the_default_demo() {
        let a = parse_strs(&[]).unwrap();
        assert_eq!(a.kind, DemoKind::Stencil);
        assert_eq!(a.config.frame_policy, FramePolicy::Abort);
        assert_eq!(a.config.target_divisor, None);
    }

    #[test]
    fn fbo_demo_uses_window_fraction() {
        let a = parse_strs(&["fbo"]).unwrap();
        assert_eq!(a.kind, DemoKind::Fbo);
        assert_eq!(a.config.target_divisor, Some(FBO_DIVISOR));
    }

    #[test]
    fn flags_select_hardened_policies() {
        let a = parse_strs(&["stencil", "--skip-errors", "--resize", "--seed", "42"]).unwrap();
        assert_eq!(a.config.frame_policy, FramePolicy::SkipFrame);
        assert_eq!(a.config.resize_policy, ResizePolicy::Recompute);
        assert_eq!(a.config.sim.seed, Some(42));
    }

    #[test]
    fn bad_arguments_are_rejected() {
        assert!(parse_strs(&["teapot"]).is_err());
        assert!(parse_strs(&["--seed"]).is_err());
        assert!(parse_strs(&["--seed", "x"]).is_err());
        assert!(parse_strs(&["fbo", "stencil"]).is_err());
    }
}
