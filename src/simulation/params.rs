//! Physical parameters shared by every acceleration strategy
//!
//! `Gravity` holds the gravitational constant `G` and the distance guard.
//! Both are fixed once an engine is built.

use crate::error::{Error, Result};

/// Gravitational constant in light-years³ / (solar mass · year²).
pub const G_GALACTIC: f64 = 1.560339e-13;

/// Default minimum pair separation below which a pair contributes no force.
pub const DEFAULT_GUARD: f64 = 1e-10;

#[allow(non_snake_case)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gravity {
    pub G: f64,     // gravitational constant
    pub guard: f64, // distance guard epsilon
}

impl Default for Gravity {
    fn default() -> Self {
        Self {
            G: G_GALACTIC,
            guard: DEFAULT_GUARD,
        }
    }
}

impl Gravity {
    #[allow(non_snake_case)]
    pub fn new(G: f64, guard: f64) -> Result<Self> {
        if !G.is_finite() || G <= 0.0 {
            return Err(Error::InvalidParameter(format!("G must be finite and > 0, got {G}")));
        }
        if !guard.is_finite() || guard < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "distance guard must be finite and >= 0, got {guard}"
            )));
        }
        Ok(Self { G, guard })
    }
}
