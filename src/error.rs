//! Error types for galsim.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("body {index}: mass must be finite and > 0, got {mass}")]
    InvalidMass { index: usize, mass: f64 },

    #[error("body {index}: non-finite {field} {value:?}")]
    NonFinite {
        index: usize,
        field: &'static str,
        value: [f64; 3],
    },

    #[error("time step must be finite and > 0, got {0}")]
    InvalidTimeStep(f64),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("step diverged: body {index} would leave the finite range")]
    Diverged { index: usize },

    #[error("line {line}: {msg}")]
    Parse { line: usize, msg: String },

    #[error("invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, Error>;
