//! Runtime engine: one [`System`] plus the strategy and scheme that advance it
//!
//! The engine is the only owner of the system state. `step` is the atomic
//! Pre-step → Post-step transition: it either commits a fully updated body
//! list or returns an error and leaves the state untouched.

use log::{debug, trace};

use crate::error::{Error, Result};
use crate::simulation::forces::{Acceleration, Strategy};
use crate::simulation::integrator::Scheme;
use crate::simulation::params::Gravity;
use crate::simulation::states::{Body, NVec3, System};

pub struct Engine {
    system: System,
    forces: Box<dyn Acceleration + Send + Sync>,
    scheme: Scheme,
    acc: Vec<NVec3>, // scratch, reused every step
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("bodies", &self.system.len())
            .field("t", &self.system.t())
            .field("forces", &self.forces.name())
            .field("gravity", self.forces.gravity())
            .field("scheme", &self.scheme)
            .finish()
    }
}

impl Engine {
    pub fn new(system: System, forces: Box<dyn Acceleration + Send + Sync>, scheme: Scheme) -> Self {
        debug!(
            "engine: {} bodies, {} strategy, {:?} scheme, G = {:e}, guard = {:e}",
            system.len(),
            forces.name(),
            scheme,
            forces.gravity().G,
            forces.gravity().guard
        );
        let acc = vec![NVec3::zeros(); system.len()];
        Self {
            system,
            forces,
            scheme,
            acc,
        }
    }

    /// Validate `bodies`, build `strategy` and wrap them in an engine.
    pub fn build(
        bodies: Vec<Body>,
        gravity: Gravity,
        strategy: Strategy,
        scheme: Scheme,
        threads: Option<usize>,
    ) -> Result<Self> {
        let system = System::new(bodies)?;
        let forces = strategy.build(gravity, threads)?;
        Ok(Self::new(system, forces, scheme))
    }

    pub fn system(&self) -> &System {
        &self.system
    }

    pub fn gravity(&self) -> &Gravity {
        self.forces.gravity()
    }

    pub fn strategy_name(&self) -> &'static str {
        self.forces.name()
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Accelerations at the current instant, without stepping.
    pub fn accelerations(&self) -> Vec<NVec3> {
        self.forces.accelerations(&self.system)
    }

    /// Advance every body by `dt` and return the new position snapshot.
    ///
    /// Rejects a non-positive or non-finite `dt`, and any step whose result
    /// would hold a non-finite component, without changing the state.
    pub fn step(&mut self, dt: f64) -> Result<Vec<NVec3>> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(Error::InvalidTimeStep(dt));
        }

        let next = self
            .scheme
            .step(&self.system, self.forces.as_ref(), dt, &mut self.acc);
        self.system.commit(next, dt)?;

        trace!("step {} -> t = {:e}", self.system.steps(), self.system.t());
        Ok(self.system.positions())
    }

    /// Take `steps` steps of size `dt`, handing each snapshot to `on_step`.
    /// Stops at the first rejected step; earlier steps stay committed.
    pub fn run<F>(&mut self, dt: f64, steps: u64, mut on_step: F) -> Result<()>
    where
        F: FnMut(&System),
    {
        for _ in 0..steps {
            self.step(dt)?;
            on_step(&self.system);
        }
        Ok(())
    }
}

/// Conserved-quantity readout of a system, for drift reporting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Diagnostics {
    pub t: f64,
    pub mass: f64,
    pub momentum: NVec3,
    pub center_of_mass: NVec3,
    pub kinetic: f64,
    pub potential: f64,
}

impl Diagnostics {
    pub fn of(sys: &System, gravity: &Gravity) -> Self {
        Self {
            t: sys.t(),
            mass: sys.total_mass(),
            momentum: sys.momentum(),
            center_of_mass: sys.center_of_mass(),
            kinetic: sys.kinetic_energy(),
            potential: sys.potential_energy(gravity),
        }
    }

    pub fn energy(&self) -> f64 {
        self.kinetic + self.potential
    }

    /// |Δp| and relative |ΔE| from `start` to `self`.
    pub fn drift_since(&self, start: &Diagnostics) -> (f64, f64) {
        let dp = (self.momentum - start.momentum).norm();
        let e0 = start.energy();
        let de = if e0 != 0.0 {
            ((self.energy() - e0) / e0).abs()
        } else {
            (self.energy() - e0).abs()
        };
        (dp, de)
    }

    /// Distance between the centre of mass and where uniform motion at the
    /// starting momentum would have carried it.
    pub fn center_of_mass_drift(&self, start: &Diagnostics) -> f64 {
        if start.mass == 0.0 {
            return 0.0;
        }
        let expected = start.center_of_mass + start.momentum / start.mass * (self.t - start.t);
        (self.center_of_mass - expected).norm()
    }
}
