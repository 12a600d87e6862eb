use std::time::Instant;

use crate::simulation::engine::Engine;
use crate::simulation::forces::Strategy;
use crate::simulation::integrator::Scheme;
use crate::simulation::params::Gravity;
use crate::simulation::states::{Body, NVec3, System};

/// Helper to build a manual body list of size `n`
/// Deterministic positions, no rand needed
pub fn make_bodies(n: usize) -> Vec<Body> {
    (0..n)
        .map(|i| {
            let i_f = i as f64;
            let x = NVec3::new(
                (i_f * 0.37).sin() * 5.0,
                (i_f * 0.13).cos() * 5.0,
                (i_f * 0.07).sin() * 5.0,
            );
            Body::new(1.0, x, NVec3::zeros())
        })
        .collect()
}

fn bench_gravity() -> Gravity {
    Gravity { G: 0.1, guard: 1e-10 }
}

/// Time one acceleration evaluation per strategy for each `n`
pub fn bench_strategies(ns: &[usize]) -> crate::Result<()> {
    let gravity = bench_gravity();

    for &n in ns {
        let sys = System::new(make_bodies(n))?;
        let mut out = vec![NVec3::zeros(); n];

        let mut line = format!("N = {n:5}");
        for strategy in Strategy::ALL {
            let forces = strategy.build(gravity, None)?;

            // Warm up
            forces.acceleration(&sys, &mut out);

            let t0 = Instant::now();
            forces.acceleration(&sys, &mut out);
            let elapsed = t0.elapsed().as_secs_f64();

            line.push_str(&format!(", {} = {:8.6} s", forces.name(), elapsed));
        }
        println!("{line}");
    }
    Ok(())
}

/// Benchmark full engine steps for a range of n
/// Paste output directly into a spreadsheet to graph
pub fn bench_step_curve(max_n: usize, stride: usize) -> crate::Result<()> {
    println!("N,direct_ms,pairwise_ms,parallel_ms");

    let dt = 0.001;
    for n in (stride..=max_n).step_by(stride.max(1)) {
        // Small n: average over a few steps to smooth noise
        let steps = if n <= 800 { 5 } else { 1 };

        let mut row = n.to_string();
        for strategy in Strategy::ALL {
            let mut engine = Engine::build(make_bodies(n), bench_gravity(), strategy, Scheme::Taylor, None)?;

            let t0 = Instant::now();
            for _ in 0..steps {
                engine.step(dt)?;
            }
            let ms = t0.elapsed().as_secs_f64() * 1000.0 / steps as f64;
            row.push_str(&format!(",{ms:.6}"));
        }
        println!("{row}");
    }
    Ok(())
}
