//! Gravitational acceleration strategies for the n-body engine
//!
//! Every strategy implements [`Acceleration`] and computes the same quantity
//!
//! ```text
//! a_i = Σ_{j≠i} G m_j (x_j - x_i) / |x_j - x_i|³
//! ```
//!
//! from an immutable [`System`]. The result goes into a buffer the caller
//! owns, never into the system, so a step cannot read positions it has
//! already overwritten.
//!
//! Distance guard: a pair closer than `Gravity::guard` contributes exactly
//! zero. This is not physical softening, it only keeps two bodies generated
//! on (nearly) the same point from producing inf/NaN.

use std::fmt;

use clap::ValueEnum;
use nalgebra::DMatrix;
use rayon::prelude::*;
use serde::Deserialize;

use crate::error::Result;
use crate::simulation::params::Gravity;
use crate::simulation::states::{Body, NVec3, System};

/// Trait for acceleration strategies operating on [`System`]
///
/// Implementations overwrite `out[i]` with the total acceleration of body `i`.
/// `out.len()` must equal `sys.len()`.
pub trait Acceleration {
    fn name(&self) -> &'static str;

    fn gravity(&self) -> &Gravity;

    fn acceleration(&self, sys: &System, out: &mut [NVec3]);

    /// Same as [`Acceleration::acceleration`] into a freshly allocated buffer.
    fn accelerations(&self, sys: &System) -> Vec<NVec3> {
        let mut out = vec![NVec3::zeros(); sys.len()];
        self.acceleration(sys, &mut out);
        out
    }
}

impl Gravity {
    /// Acceleration on a body at `xi` caused by a mass `mj` at `xj`.
    #[inline]
    pub fn pull(&self, xi: &NVec3, xj: &NVec3, mj: f64) -> NVec3 {
        let r = xj - xi;
        let dist = r.norm();
        if dist <= self.guard {
            return NVec3::zeros();
        }
        (self.G * mj / (dist * dist * dist)) * r
    }

    /// Total acceleration on body `i` from every other body, summed in index order.
    #[inline]
    pub fn accel_on(&self, bodies: &[Body], i: usize) -> NVec3 {
        let xi = bodies[i].x;
        let mut acc = NVec3::zeros();
        for (j, bj) in bodies.iter().enumerate() {
            if j == i {
                continue;
            }
            acc += self.pull(&xi, &bj.x, bj.m);
        }
        acc
    }

    /// Newtonian force exerted by body `j` on body `i`, before any summation.
    ///
    /// Zero for `i == j` and for pairs inside the distance guard.
    pub fn pair_force(&self, sys: &System, i: usize, j: usize) -> NVec3 {
        if i == j {
            return NVec3::zeros();
        }
        let (bi, bj) = (sys.body(i), sys.body(j));
        bi.m * self.pull(&bi.x, &bj.x, bj.m)
    }
}

/// Which acceleration strategy an engine uses
#[derive(Deserialize, ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    #[default]
    #[serde(rename = "direct")] // double loop over unordered pairs
    Direct,

    #[serde(rename = "pairwise")] // batched n×n displacement/distance matrices
    Pairwise,

    #[serde(rename = "parallel")] // per-body kernel on rayon
    Parallel,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Direct, Strategy::Pairwise, Strategy::Parallel];

    /// Build the strategy. `threads` only affects [`Strategy::Parallel`];
    /// `None` runs on rayon's global pool.
    pub fn build(
        self,
        gravity: Gravity,
        threads: Option<usize>,
    ) -> Result<Box<dyn Acceleration + Send + Sync>> {
        Ok(match self {
            Strategy::Direct => Box::new(DirectGravity { gravity }),
            Strategy::Pairwise => Box::new(PairwiseGravity { gravity }),
            Strategy::Parallel => match threads {
                Some(n) => Box::new(ParallelGravity::with_threads(gravity, n)?),
                None => Box::new(ParallelGravity::new(gravity)),
            },
        })
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strategy::Direct => "direct",
            Strategy::Pairwise => "pairwise",
            Strategy::Parallel => "parallel",
        })
    }
}

// =========================================================================================
// Direct double loop
// =========================================================================================

/// Direct n² sum over unordered pairs
pub struct DirectGravity {
    pub gravity: Gravity,
}

impl Acceleration for DirectGravity {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn gravity(&self) -> &Gravity {
        &self.gravity
    }

    fn acceleration(&self, sys: &System, out: &mut [NVec3]) {
        debug_assert_eq!(out.len(), sys.len());

        // Zero buffer, the loop below only accumulates
        for a in out.iter_mut() {
            *a = NVec3::zeros();
        }

        let bodies = sys.bodies();
        let n = bodies.len();
        let g = &self.gravity;

        // Loop over each unordered pair (i, j) with i < j, so the self-term
        // never appears
        for i in 0..n {
            let xi = bodies[i].x; // position of body i
            let mi = bodies[i].m; // mass of body i

            for j in (i + 1)..n {
                let xj = bodies[j].x; // position of body j
                let mj = bodies[j].m; // mass of body j

                // r points from i to j: i is pulled along +r, j along -r
                let r = xj - xi;
                let dist = r.norm();

                // Degenerate pair, contributes nothing
                if dist <= g.guard {
                    continue;
                }

                // coef = G / |r|^3
                let coef = g.G / (dist * dist * dist);

                // a_i +=  G m_j r / |r|^3
                // a_j += -G m_i r / |r|^3
                // (equal and opposite)
                out[i] += coef * mj * r;
                out[j] -= coef * mi * r;
            }
        }
    }
}

// =========================================================================================
// Batched pairwise-difference form
// =========================================================================================

/// Batched form: builds the full displacement and distance matrices and
/// reduces them row by row. O(n²) memory.
pub struct PairwiseGravity {
    pub gravity: Gravity,
}

impl Acceleration for PairwiseGravity {
    fn name(&self) -> &'static str {
        "pairwise"
    }

    fn gravity(&self) -> &Gravity {
        &self.gravity
    }

    fn acceleration(&self, sys: &System, out: &mut [NVec3]) {
        debug_assert_eq!(out.len(), sys.len());

        let bodies = sys.bodies();
        let n = bodies.len();
        if n == 0 {
            return;
        }
        let g = &self.gravity;

        // d*[(i, j)] = x_j - x_i, per component
        let dx = DMatrix::from_fn(n, n, |i, j| bodies[j].x.x - bodies[i].x.x);
        let dy = DMatrix::from_fn(n, n, |i, j| bodies[j].x.y - bodies[i].x.y);
        let dz = DMatrix::from_fn(n, n, |i, j| bodies[j].x.z - bodies[i].x.z);

        let dist = dx.zip_zip_map(&dy, &dz, |a, b, c| (a * a + b * b + c * c).sqrt());

        // factor[(i, j)] = G m_j / r_ij^3, zero inside the guard and on the diagonal
        let mut factor = DMatrix::from_fn(n, n, |i, j| {
            let r = dist[(i, j)];
            if r > g.guard {
                g.G * bodies[j].m / (r * r * r)
            } else {
                0.0
            }
        });
        factor.fill_diagonal(0.0);

        // row sums of factor ∘ d*
        let ax = factor.component_mul(&dx).column_sum();
        let ay = factor.component_mul(&dy).column_sum();
        let az = factor.component_mul(&dz).column_sum();

        for (i, a) in out.iter_mut().enumerate() {
            *a = NVec3::new(ax[i], ay[i], az[i]);
        }
    }
}

// =========================================================================================
// Parallel per-body kernel
// =========================================================================================

/// Each body's acceleration is an independent read of the shared pre-step
/// state, so the outer loop is split across rayon workers. Every worker writes
/// only its own output slots.
pub struct ParallelGravity {
    pub gravity: Gravity,
    pool: Option<rayon::ThreadPool>,
}

impl ParallelGravity {
    /// Run on rayon's global pool.
    pub fn new(gravity: Gravity) -> Self {
        Self {
            gravity,
            pool: None,
        }
    }

    /// Run on a dedicated pool of `threads` workers.
    pub fn with_threads(gravity: Gravity, threads: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("galsim-gravity-{i}"))
            .build()?;
        Ok(Self {
            gravity,
            pool: Some(pool),
        })
    }

    fn fill(&self, bodies: &[Body], out: &mut [NVec3]) {
        let g = &self.gravity;
        out.par_iter_mut()
            .enumerate()
            .for_each(|(i, a)| *a = g.accel_on(bodies, i));
    }
}

impl Acceleration for ParallelGravity {
    fn name(&self) -> &'static str {
        "parallel"
    }

    fn gravity(&self) -> &Gravity {
        &self.gravity
    }

    fn acceleration(&self, sys: &System, out: &mut [NVec3]) {
        debug_assert_eq!(out.len(), sys.len());

        let bodies = sys.bodies();
        match &self.pool {
            Some(pool) => pool.install(|| self.fill(bodies, out)),
            None => self.fill(bodies, out),
        }
    }
}
