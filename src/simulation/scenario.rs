//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a [`ScenarioConfig`] (YAML-facing) and produces a [`Scenario`]:
//! the run length and time step the driver should use, plus an [`Engine`]
//! holding the validated system at t = 0 and the selected strategy.

use log::debug;

use crate::configuration::bodies::load_bodies;
use crate::configuration::config::{BodyConfig, ScenarioConfig};
use crate::error::{Error, Result};
use crate::simulation::engine::Engine;
use crate::simulation::galaxy;
use crate::simulation::params::Gravity;
use crate::simulation::states::Body;

/// A ready-to-run scenario
#[derive(Debug)]
pub struct Scenario {
    pub dt: f64,
    pub steps: u64,
    pub engine: Engine,
}

impl Scenario {
    pub fn build(cfg: ScenarioConfig) -> Result<Self> {
        let p = &cfg.parameters;
        let gravity = Gravity::new(p.G, p.guard)?;

        if !p.dt.is_finite() || p.dt <= 0.0 {
            return Err(Error::InvalidTimeStep(p.dt));
        }

        let bodies = scenario_bodies(&cfg, &gravity)?;

        let engine = Engine::build(
            bodies,
            gravity,
            cfg.engine.strategy,
            cfg.engine.integrator,
            cfg.engine.threads,
        )?;

        Ok(Self {
            dt: p.dt,
            steps: p.steps,
            engine,
        })
    }
}

/// Inline bodies win over `body_file`, which wins over `galaxy`.
fn scenario_bodies(cfg: &ScenarioConfig, gravity: &Gravity) -> Result<Vec<Body>> {
    if !cfg.bodies.is_empty() {
        debug!("scenario: {} inline bodies", cfg.bodies.len());
        return Ok(cfg.bodies.iter().map(|bc: &BodyConfig| Body::new(bc.m, bc.x, bc.v)).collect());
    }
    if let Some(path) = &cfg.body_file {
        debug!("scenario: loading bodies from {}", path.display());
        return load_bodies(path);
    }
    if let Some(g) = &cfg.galaxy {
        debug!("scenario: generating galaxy with {} stars (seed {})", g.stars, cfg.parameters.seed);
        return galaxy::generate(g, gravity.G, cfg.parameters.seed);
    }
    Err(Error::InvalidScenario(
        "no bodies: give `bodies`, `body_file` or `galaxy`".into(),
    ))
}
