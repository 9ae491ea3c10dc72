use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use argh::FromArgs;
use indicatif::{ProgressBar, ProgressStyle};
use nalgebra::Vector2;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use swarm::config::SwarmConfig;
use swarm::render::{HeadlessRenderer, PngRenderer, Renderer};
use swarm::simulation::Simulation;

const FRAMES: u64 = 5000;

#[derive(FromArgs)]
/// A particle swarm chasing a goal that moves whenever it is reached or goes stale.
struct Args {
    /// JSON config file; missing fields use the defaults
    #[argh(option)]
    config: Option<PathBuf>,

    /// number of frames to simulate
    #[argh(option, default = "FRAMES")]
    frames: u64,

    /// directory PNG frames are written to
    #[argh(option, default = "PathBuf::from(\"./frames\")")]
    output: PathBuf,

    /// rng seed, overrides the config file
    #[argh(option)]
    seed: Option<u64>,

    /// initial goal as x,y instead of a random one
    #[argh(option, from_str_fn(parse_point))]
    goal: Option<Vector2<f32>>,

    /// run the swarm without writing any frames
    #[argh(switch)]
    headless: bool,

    /// write a JSON summary of the run to this file
    #[argh(option)]
    summary: Option<PathBuf>,
}

fn parse_point(value: &str) -> Result<Vector2<f32>, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got {value:?}"))?;
    let x: f32 = x.trim().parse().map_err(|e| format!("bad x {x:?}: {e}"))?;
    let y: f32 = y.trim().parse().map_err(|e| format!("bad y {y:?}: {e}"))?;
    if !x.is_finite() || !y.is_finite() {
        return Err(format!("goal must be finite, got {value:?}"));
    }
    Ok(Vector2::new(x, y))
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Args = argh::from_env();

    let mut config = match &args.config {
        Some(path) => SwarmConfig::from_path(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => SwarmConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    info!(
        population = config.population_size,
        k = config.k,
        c1 = config.c1,
        c2 = config.c2,
        goal_size = config.goal_size,
        width = config.width,
        height = config.height,
        seed = ?config.seed,
        "starting swarm"
    );

    let mut renderer: Box<dyn Renderer> = if args.headless {
        Box::new(HeadlessRenderer::new(config.bounds()?))
    } else {
        Box::new(
            PngRenderer::new(&args.output, &config)
                .with_context(|| format!("preparing {}", args.output.display()))?,
        )
    };
    let mut sim = Simulation::new(config, renderer.bounds(), args.goal)?;

    let pbar = ProgressBar::new(args.frames);
    pbar.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}/{eta_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}",
        )?,
    );
    for _ in 0..args.frames {
        if let Some(event) = sim.step() {
            pbar.set_message(format!("goals: {}", sim.history().len()));
            info!(tick = event.tick, reason = ?event.reason, "new goal");
        }
        renderer
            .present(&sim.frame())
            .with_context(|| format!("rendering frame {}", sim.tick()))?;
        pbar.inc(1);
    }
    pbar.finish();

    let summary = sim.summary();
    info!(
        ticks = summary.ticks,
        goals = summary.goals.len(),
        best_fitness = summary.best_fitness,
        "done"
    );
    if let Some(path) = &args.summary {
        let file =
            File::create(path).with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(file, &summary)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_points() {
        assert_eq!(parse_point("12.5, 40").unwrap(), Vector2::new(12.5, 40.0));
        assert!(parse_point("12.5").is_err());
        assert!(parse_point("a,1").is_err());
        assert!(parse_point("nan,5").is_err());
        assert!(parse_point("1,inf").is_err());
    }
}
