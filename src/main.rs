use galsim::{bench_step_curve, bench_strategies, generate_galaxy, save_bodies};
use galsim::{Diagnostics, GalaxyConfig, GalaxyStats, Scenario, ScenarioConfig, Scheme, Strategy, G_GALACTIC};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(about = "Direct-summation galaxy n-body simulator")]
struct Args {
    /// Scenario file name, looked up in `scenarios/` unless it is a path that exists
    #[arg(short, long, default_value = "two_body.yaml")]
    file_name: String,

    /// Override the scenario's time step
    #[arg(long)]
    dt: Option<f64>,

    /// Override the scenario's step count
    #[arg(long)]
    steps: Option<u64>,

    /// Override the acceleration strategy
    #[arg(long, value_enum)]
    strategy: Option<Strategy>,

    /// Override the integrator
    #[arg(long, value_enum)]
    integrator: Option<Scheme>,

    /// Time the strategies against each other instead of running a scenario
    #[arg(long)]
    bench: bool,

    /// Write a galaxy of this many stars to a body file instead of running a scenario
    #[arg(long, value_name = "STARS")]
    generate: Option<usize>,

    /// Output path for --generate, defaults to `data/galaxy_<STARS>`
    #[arg(long)]
    out: Option<PathBuf>,

    /// Random seed for --generate
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Black hole mass for --generate, random in [1e5, 1e10] if not given
    #[arg(long)]
    black_hole_mass: Option<f64>,
}

// load here to keep main clean
fn load_scenario(args: &Args) -> Result<ScenarioConfig> {
    let direct = PathBuf::from(&args.file_name);
    let config_path = if direct.exists() {
        direct
    } else {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(&args.file_name)
    };

    let mut cfg = ScenarioConfig::load(&config_path)
        .with_context(|| format!("failed to load scenario {}", config_path.display()))?;

    if let Some(dt) = args.dt {
        cfg.parameters.dt = dt;
    }
    if let Some(steps) = args.steps {
        cfg.parameters.steps = steps;
    }
    if let Some(strategy) = args.strategy {
        cfg.engine.strategy = strategy;
    }
    if let Some(integrator) = args.integrator {
        cfg.engine.integrator = integrator;
    }
    Ok(cfg)
}

fn generate(args: &Args, stars: usize) -> Result<()> {
    let out = args
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from("data").join(format!("galaxy_{stars}")));

    let cfg = GalaxyConfig {
        stars,
        black_hole_mass: args.black_hole_mass,
        ..Default::default()
    };
    let bodies = generate_galaxy(&cfg, G_GALACTIC, args.seed)?;
    save_bodies(&out, &bodies).with_context(|| format!("failed to write {}", out.display()))?;

    info!("wrote {} bodies to {}", bodies.len(), out.display());
    if let Some(stats) = GalaxyStats::of(&bodies) {
        info!("total objects: {} (1 black hole + {} stars)", stats.objects, stats.objects - 1);
        info!("black hole mass: {:.3e} solar masses", stats.black_hole_mass);
        info!("total mass: {:.3e} solar masses", stats.total_mass);
        info!("mean star mass: {:.3} solar masses", stats.mean_star_mass);
        info!(
            "distance from centre: {:.3e} to {:.3e} light-years",
            stats.min_distance, stats.max_distance
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.bench {
        bench_strategies(&[200, 400, 800, 1600])?;
        bench_step_curve(2000, 200)?;
        return Ok(());
    }
    if let Some(stars) = args.generate {
        return generate(&args, stars);
    }

    let cfg = load_scenario(&args)?;
    let Scenario { dt, steps, mut engine } = Scenario::build(cfg)?;

    let start = Diagnostics::of(engine.system(), engine.gravity());
    info!(
        "running {} bodies for {} steps of dt = {:e} ({} / {:?})",
        engine.system().len(),
        steps,
        dt,
        engine.strategy_name(),
        engine.scheme()
    );

    let t0 = Instant::now();
    if let Err(e) = engine.run(dt, steps, |_| {}) {
        warn!("stopped after {} steps: {e}", engine.system().steps());
    }
    let elapsed = t0.elapsed().as_secs_f64();

    let end = Diagnostics::of(engine.system(), engine.gravity());
    let (dp, de) = end.drift_since(&start);
    info!(
        "time for {} steps ({} bodies): {:.4} seconds",
        engine.system().steps(),
        engine.system().len(),
        elapsed
    );
    info!(
        "momentum drift |dp| = {dp:.3e}, centre of mass drift = {:.3e}, relative energy drift = {de:.3e}",
        end.center_of_mass_drift(&start)
    );

    for (i, x) in engine.system().positions().iter().enumerate() {
        println!("{i} {:.6e} {:.6e} {:.6e}", x.x, x.y, x.z);
    }

    Ok(())
}
