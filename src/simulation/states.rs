//! Core state types for the N-body simulation.
//!
//! A [`System`] is the body store: an ordered list of [`Body`] values plus the
//! current simulation time `t`. Every body in a `System` has a finite,
//! strictly positive mass and finite position/velocity; construction rejects
//! anything else. Bodies are only replaced as a whole, at the end of a step,
//! after the new values pass the same checks.

use nalgebra::Vector3;

use crate::error::{Error, Result};
use crate::simulation::params::Gravity;

pub type NVec3 = Vector3<f64>;

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub m: f64,   // mass
    pub x: NVec3, // position
    pub v: NVec3, // velocity
}

impl Body {
    pub fn new(m: f64, x: impl Into<NVec3>, v: impl Into<NVec3>) -> Self {
        Self {
            m,
            x: x.into(),
            v: v.into(),
        }
    }

    /// Check the per-body invariants, reporting the offending index.
    pub fn validate(&self, index: usize) -> Result<()> {
        if !self.m.is_finite() || self.m <= 0.0 {
            return Err(Error::InvalidMass { index, mass: self.m });
        }
        if !finite(&self.x) {
            return Err(Error::NonFinite {
                index,
                field: "position",
                value: [self.x.x, self.x.y, self.x.z],
            });
        }
        if !finite(&self.v) {
            return Err(Error::NonFinite {
                index,
                field: "velocity",
                value: [self.v.x, self.v.y, self.v.z],
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct System {
    bodies: Vec<Body>, // stable order, "body i" is the same body across steps
    t: f64,            // time
    steps: u64,        // committed steps
}

impl System {
    /// Build a system at `t = 0`, validating every body.
    pub fn new(bodies: Vec<Body>) -> Result<Self> {
        for (i, b) in bodies.iter().enumerate() {
            b.validate(i)?;
        }
        Ok(Self {
            bodies,
            t: 0.0,
            steps: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn t(&self) -> f64 {
        self.t
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body(&self, i: usize) -> &Body {
        &self.bodies[i]
    }

    pub fn mass(&self, i: usize) -> f64 {
        self.bodies[i].m
    }

    pub fn position(&self, i: usize) -> NVec3 {
        self.bodies[i].x
    }

    pub fn velocity(&self, i: usize) -> NVec3 {
        self.bodies[i].v
    }

    /// Euclidean distance between bodies `i` and `j`.
    ///
    /// `|x_j - x_i|` and `|x_i - x_j|` are computed from the same component
    /// differences up to sign, so the result is exactly symmetric.
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        (self.bodies[j].x - self.bodies[i].x).norm()
    }

    /// Snapshot of every position at the current instant, in body order.
    pub fn positions(&self) -> Vec<NVec3> {
        self.bodies.iter().map(|b| b.x).collect()
    }

    /// Snapshot of every velocity at the current instant, in body order.
    pub fn velocities(&self) -> Vec<NVec3> {
        self.bodies.iter().map(|b| b.v).collect()
    }

    pub fn masses(&self) -> Vec<f64> {
        self.bodies.iter().map(|b| b.m).collect()
    }

    // diagnostics ==========================================================================

    pub fn total_mass(&self) -> f64 {
        self.bodies.iter().map(|b| b.m).sum()
    }

    /// Total linear momentum Σ m_i v_i.
    pub fn momentum(&self) -> NVec3 {
        self.bodies
            .iter()
            .fold(NVec3::zeros(), |p, b| p + b.m * b.v)
    }

    pub fn center_of_mass(&self) -> NVec3 {
        let m = self.total_mass();
        if m == 0.0 {
            return NVec3::zeros();
        }
        self.bodies
            .iter()
            .fold(NVec3::zeros(), |c, b| c + b.m * b.x)
            / m
    }

    pub fn kinetic_energy(&self) -> f64 {
        self.bodies
            .iter()
            .map(|b| 0.5 * b.m * b.v.norm_squared())
            .sum()
    }

    /// Pairwise potential energy -Σ_{i<j} G m_i m_j / r_ij.
    /// Pairs inside the distance guard contribute nothing, matching the force law.
    pub fn potential_energy(&self, gravity: &Gravity) -> f64 {
        let n = self.bodies.len();
        let mut u = 0.0;
        for i in 0..n {
            for j in (i + 1)..n {
                let r = self.distance(i, j);
                if r > gravity.guard {
                    u -= gravity.G * self.bodies[i].m * self.bodies[j].m / r;
                }
            }
        }
        u
    }

    pub fn total_energy(&self, gravity: &Gravity) -> f64 {
        self.kinetic_energy() + self.potential_energy(gravity)
    }

    // write-back ===========================================================================

    /// Unvalidated copy holding `bodies`, used to evaluate forces mid-step.
    /// Never observable outside a step.
    pub(crate) fn staged(&self, bodies: Vec<Body>) -> System {
        System {
            bodies,
            t: self.t,
            steps: self.steps,
        }
    }

    /// Replace every body with `next` and advance time by `dt`.
    ///
    /// Fails without touching `self` if `next` has a different length or any
    /// body in it breaks the invariants.
    pub(crate) fn commit(&mut self, next: Vec<Body>, dt: f64) -> Result<()> {
        if next.len() != self.bodies.len() {
            return Err(Error::InvalidParameter(format!(
                "body count changed during step: {} -> {}",
                self.bodies.len(),
                next.len()
            )));
        }
        for (i, b) in next.iter().enumerate() {
            if b.validate(i).is_err() {
                return Err(Error::Diverged { index: i });
            }
        }
        self.bodies = next;
        self.t += dt;
        self.steps += 1;
        Ok(())
    }
}

fn finite(v: &NVec3) -> bool {
    v.iter().all(|c| c.is_finite())
}
