//! Fixed-step time integrators for the N-body system
//!
//! Both schemes work in two phases: every acceleration is computed from the
//! pre-step [`System`], then a new body list is built next to it. Nothing
//! here writes to the system; [`crate::simulation::engine::Engine`] commits
//! the returned bodies once they have been checked.

use serde::Deserialize;
use clap::ValueEnum;

use super::forces::Acceleration;
use super::states::{Body, NVec3, System};

/// Which integrator the engine uses
#[derive(Deserialize, ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    #[default]
    #[serde(rename = "taylor")] // constant acceleration over the step, one force evaluation
    Taylor,

    #[serde(rename = "verlet")] // velocity-Verlet kick-drift-kick, two force evaluations
    Verlet,
}

/// Advance by `dt` assuming constant acceleration over the step:
///
/// x_n+1 = x_n + dt v_n + (1/2) dt² a_n
/// v_n+1 = v_n + dt a_n
///
/// `acc` is scratch space of length `sys.len()`; on return it holds a_n.
pub fn taylor_step(sys: &System, forces: &dyn Acceleration, dt: f64, acc: &mut [NVec3]) -> Vec<Body> {
    let half_dt2 = 0.5 * dt * dt;

    // a_n from x_n, entirely before any new position exists
    forces.acceleration(sys, acc);

    sys.bodies()
        .iter()
        .zip(acc.iter())
        .map(|(b, a)| Body {
            m: b.m,
            x: b.x + dt * b.v + half_dt2 * *a,
            v: b.v + dt * *a,
        })
        .collect()
}

/// Advance by `dt` using velocity-Verlet:
///
/// v_n+1/2 = v_n + (dt/2) a_n
/// x_n+1   = x_n + dt v_n+1/2
/// v_n+1   = v_n+1/2 + (dt/2) a_n+1
///
/// a_n+1 is evaluated on a staged copy holding x_n+1, so `sys` stays the
/// pre-step state throughout. `acc` is scratch space of length `sys.len()`.
pub fn verlet_step(sys: &System, forces: &dyn Acceleration, dt: f64, acc: &mut [NVec3]) -> Vec<Body> {
    let half_dt = 0.5 * dt;

    // a_n from x_n
    forces.acceleration(sys, acc);

    // Kick + drift into a staged body list
    let half: Vec<Body> = sys
        .bodies()
        .iter()
        .zip(acc.iter())
        .map(|(b, a)| {
            let v = b.v + half_dt * *a;
            Body {
                m: b.m,
                x: b.x + dt * v,
                v,
            }
        })
        .collect();

    // a_n+1 from x_n+1
    let staged = sys.staged(half);
    forces.acceleration(&staged, acc);

    // Second kick
    staged
        .bodies()
        .iter()
        .zip(acc.iter())
        .map(|(b, a)| Body {
            m: b.m,
            x: b.x,
            v: b.v + half_dt * *a,
        })
        .collect()
}

impl Scheme {
    pub fn step(self, sys: &System, forces: &dyn Acceleration, dt: f64, acc: &mut [NVec3]) -> Vec<Body> {
        match self {
            Scheme::Taylor => taylor_step(sys, forces, dt, acc),
            Scheme::Verlet => verlet_step(sys, forces, dt, acc),
        }
    }
}
