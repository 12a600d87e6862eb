//! Configuration types for loading simulation scenarios from YAML.
//!
//! A scenario consists of:
//!
//! - [`EngineConfig`]     – acceleration strategy, integrator, worker threads
//! - [`ParametersConfig`] – time step, step count and physical constants
//! - a body source        – inline [`BodyConfig`] list, a body file, or a generated galaxy
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//!
//! ```yaml
//! engine:
//!   strategy: "parallel"    # "direct", "pairwise" or "parallel"
//!   integrator: "taylor"    # or "verlet"
//!   threads: 4              # optional, parallel strategy only
//!
//! parameters:
//!   dt: 0.01                # time step (years)
//!   steps: 1000             # number of steps the driver takes
//!   G: 1.0                  # optional, defaults to ly^3 / (M_sun yr^2)
//!   guard: 1.0e-10          # optional distance guard
//!   seed: 42                # optional generator seed
//!
//! bodies:
//!   - m: 1.0
//!     x: [0.0, 0.0, 0.0]
//!     v: [0.0, 0.0, 0.0]
//!   - m: 1.0
//!     x: [1.0, 0.0, 0.0]
//!     v: [0.0, 1.0, 0.0]
//! ```
//!
//! Instead of `bodies`, a scenario may name a `body_file` (see
//! [`crate::configuration::bodies`]) or a `galaxy:` block
//! ([`crate::simulation::galaxy::GalaxyConfig`]).

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;
use crate::simulation::forces::Strategy;
use crate::simulation::galaxy::GalaxyConfig;
use crate::simulation::integrator::Scheme;
use crate::simulation::params::{DEFAULT_GUARD, G_GALACTIC};

/// High-level engine configuration
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub strategy: Strategy,     // how accelerations are summed
    pub integrator: Scheme,     // time integrator used for advancing the system state
    pub threads: Option<usize>, // dedicated pool size for the parallel strategy
}

/// Global numerical and physical parameters for a scenario
#[allow(non_snake_case)]
#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    pub dt: f64,    // time step size
    pub steps: u64, // number of steps
    #[serde(default = "default_g")]
    pub G: f64, // gravitational constant
    #[serde(default = "default_guard")]
    pub guard: f64, // pairs closer than this exert no force
    #[serde(default)]
    pub seed: u64, // deterministic seed for generated bodies
}

fn default_g() -> f64 {
    G_GALACTIC
}

fn default_guard() -> f64 {
    DEFAULT_GUARD
}

/// Configuration for a single body's initial state
#[derive(Deserialize, Debug, Clone)]
pub struct BodyConfig {
    pub m: f64,      // mass
    pub x: [f64; 3], // initial position
    pub v: [f64; 3], // initial velocity
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    pub parameters: ParametersConfig,
    #[serde(default)]
    pub bodies: Vec<BodyConfig>, // inline bodies, used first when non-empty
    #[serde(default)]
    pub body_file: Option<PathBuf>, // relative paths resolve against the scenario file
    #[serde(default)]
    pub galaxy: Option<GalaxyConfig>,
}

impl ScenarioConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Load a scenario file. A relative `body_file` is rebased onto the
    /// directory holding `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let mut cfg: ScenarioConfig = serde_yaml::from_reader(reader)?;

        if let (Some(file), Some(dir)) = (cfg.body_file.as_mut(), path.parent()) {
            if file.is_relative() {
                *file = dir.join(&*file);
            }
        }
        Ok(cfg)
    }
}
