//! Initial conditions: a disc of stars on roughly stable orbits around a
//! central black hole.
//!
//! Speeds start from the circular-orbit value sqrt(G M / r) for the black
//! hole alone, scaled by sqrt(1 + e) for a random eccentricity, with a small
//! vertical kick. Star-star attraction is ignored when choosing speeds.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Normal;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::simulation::states::{Body, NVec3};

/// Galaxy generator settings, in light-years / solar masses / years.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct GalaxyConfig {
    pub stars: usize,                    // number of stars, excluding the black hole
    pub black_hole_mass: Option<f64>,    // None -> uniform in [1e5, 1e10]
    pub star_mass: [f64; 2],             // star mass range
    pub radius: [f64; 2],                // orbital radius range
    pub max_eccentricity: f64,           // e is uniform in [0, max_eccentricity]
    pub inclination_sigma: f64,          // std-dev of the orbital inclination (rad)
    pub vertical_sigma: f64,             // std-dev of the vertical speed, as a fraction of the speed
}

impl Default for GalaxyConfig {
    fn default() -> Self {
        Self {
            stars: 100,
            black_hole_mass: None,
            star_mass: [0.5, 10.0],
            radius: [0.001, 1.0],
            max_eccentricity: 0.7,
            inclination_sigma: 0.1,
            vertical_sigma: 0.05,
        }
    }
}

impl GalaxyConfig {
    fn check(&self) -> Result<()> {
        let range_ok = |r: [f64; 2]| r[0].is_finite() && r[1].is_finite() && 0.0 < r[0] && r[0] <= r[1];
        if !range_ok(self.star_mass) {
            return Err(Error::InvalidScenario(format!("bad star mass range {:?}", self.star_mass)));
        }
        if !range_ok(self.radius) {
            return Err(Error::InvalidScenario(format!("bad orbital radius range {:?}", self.radius)));
        }
        if let Some(m) = self.black_hole_mass {
            if !m.is_finite() || m <= 0.0 {
                return Err(Error::InvalidScenario(format!("bad black hole mass {m}")));
            }
        }
        if !(0.0..1.0).contains(&self.max_eccentricity) {
            return Err(Error::InvalidScenario(format!(
                "max eccentricity must be in [0, 1), got {}",
                self.max_eccentricity
            )));
        }
        Ok(())
    }
}

/// Generate `cfg.stars + 1` bodies; body 0 is the black hole at rest at the origin.
#[allow(non_snake_case)]
pub fn generate(cfg: &GalaxyConfig, G: f64, seed: u64) -> Result<Vec<Body>> {
    cfg.check()?;

    let mut rng = StdRng::seed_from_u64(seed);
    let inclination = Normal::new(0.0, cfg.inclination_sigma)
        .map_err(|e| Error::InvalidScenario(format!("inclination sigma: {e}")))?;
    let vertical = Normal::new(0.0, cfg.vertical_sigma)
        .map_err(|e| Error::InvalidScenario(format!("vertical sigma: {e}")))?;

    let m_bh = match cfg.black_hole_mass {
        Some(m) => m,
        None => rng.gen_range(1e5..=1e10),
    };

    let mut bodies = Vec::with_capacity(cfg.stars + 1);
    bodies.push(Body::new(m_bh, NVec3::zeros(), NVec3::zeros()));

    for _ in 0..cfg.stars {
        let m = rng.gen_range(cfg.star_mass[0]..=cfg.star_mass[1]);

        let r = rng.gen_range(cfg.radius[0]..=cfg.radius[1]);
        let theta = rng.gen_range(0.0..std::f64::consts::TAU);
        let inc: f64 = rng.sample(&inclination);

        let (sin, cos) = theta.sin_cos();
        let x = NVec3::new(r * cos, r * sin, r * inc.sin());

        // circular speed around the black hole, stretched by the eccentricity
        let e = rng.gen_range(0.0..=cfg.max_eccentricity);
        let speed = (G * m_bh / x.norm()).sqrt() * (1.0 + e).sqrt();

        // tangential direction in the disc plane
        let tangent = NVec3::new(-x.y, x.x, 0.0);
        let tangent = if tangent.norm() > 0.0 { tangent.normalize() } else { tangent };

        let mut v = speed * tangent;
        v.z += rng.sample(&vertical) * speed;

        bodies.push(Body::new(m, x, v));
    }

    Ok(bodies)
}

/// Summary of a generated galaxy, as logged by `galsim --generate`.
#[derive(Debug, Clone, PartialEq)]
pub struct GalaxyStats {
    pub objects: usize,
    pub black_hole_mass: f64,
    pub total_mass: f64,
    pub mean_star_mass: f64, // 0 when there are no stars
    pub min_distance: f64,   // star distances from the origin
    pub max_distance: f64,
}

impl GalaxyStats {
    /// `None` for an empty list. Body 0 is taken to be the black hole.
    pub fn of(bodies: &[Body]) -> Option<Self> {
        let (hole, stars) = bodies.split_first()?;

        let star_mass: f64 = stars.iter().map(|b| b.m).sum();
        let (min_distance, max_distance) = stars
            .iter()
            .map(|b| b.x.norm())
            .fold((f64::INFINITY, 0.0f64), |(lo, hi), r| (lo.min(r), hi.max(r)));

        Some(Self {
            objects: bodies.len(),
            black_hole_mass: hole.m,
            total_mass: hole.m + star_mass,
            mean_star_mass: if stars.is_empty() { 0.0 } else { star_mass / stars.len() as f64 },
            min_distance: if stars.is_empty() { 0.0 } else { min_distance },
            max_distance,
        })
    }
}
