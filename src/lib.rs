pub mod error;
pub mod simulation;
pub mod configuration;
pub mod benchmark;

pub use error::{Error, Result};

pub use simulation::states::{Body, System, NVec3};
pub use simulation::params::{Gravity, G_GALACTIC, DEFAULT_GUARD};
pub use simulation::forces::{Acceleration, Strategy, DirectGravity, PairwiseGravity, ParallelGravity};
pub use simulation::integrator::{Scheme, taylor_step, verlet_step};
pub use simulation::engine::{Engine, Diagnostics};
pub use simulation::scenario::Scenario;
pub use simulation::galaxy::{generate as generate_galaxy, GalaxyConfig, GalaxyStats};

pub use configuration::config::{EngineConfig, ParametersConfig, BodyConfig, ScenarioConfig};
pub use configuration::bodies::{read_bodies, write_bodies, load_bodies, save_bodies};

pub use benchmark::benchmark::{bench_strategies, bench_step_curve};
