use approx::assert_relative_eq;

use galsim::{Acceleration, Body, Diagnostics, Engine, Error, Gravity, NVec3, ParallelGravity, Scheme, Strategy, System};
use galsim::DEFAULT_GUARD;

/// Build a simple 2-body System separated along x-axis
pub fn two_body_system(dist: f64, m1: f64, m2: f64) -> System {
    System::new(vec![
        Body::new(m1, [-dist / 2.0, 0.0, 0.0], [0.0, 0.0, 0.0]),
        Body::new(m2, [dist / 2.0, 0.0, 0.0], [0.0, 0.0, 0.0]),
    ])
    .unwrap()
}

/// Irregular cluster with unequal masses and nonzero velocities
pub fn cluster(n: usize) -> Vec<Body> {
    (0..n)
        .map(|i| {
            let f = i as f64;
            Body::new(
                1.0 + (f * 0.71).sin().abs() * 4.0,
                [(f * 0.37).sin() * 5.0 + f * 0.01, (f * 0.13).cos() * 5.0, (f * 0.07).sin() * 5.0],
                [(f * 0.5).cos() * 0.1, (f * 0.3).sin() * 0.1, 0.05],
            )
        })
        .collect()
}

pub fn unit_gravity() -> Gravity {
    Gravity::new(1.0, 1e-10).unwrap()
}

fn all_strategies(g: Gravity) -> Vec<Box<dyn Acceleration + Send + Sync>> {
    Strategy::ALL.iter().map(|s| s.build(g, None).unwrap()).collect()
}

// ==================================================================================
// Body store tests
// ==================================================================================

#[test]
fn distance_is_symmetric() {
    let sys = System::new(cluster(12)).unwrap();
    for i in 0..sys.len() {
        for j in 0..sys.len() {
            assert_eq!(sys.distance(i, j), sys.distance(j, i));
        }
    }

    let sys = System::new(vec![
        Body::new(1.0, [0.0, 0.0, 0.0], [0.0, 0.0, 0.0]),
        Body::new(1.0, [3.0, 4.0, 0.0], [0.0, 0.0, 0.0]),
    ])
    .unwrap();
    assert_relative_eq!(sys.distance(0, 1), 5.0);
}

#[test]
fn snapshots_keep_body_order() {
    let bodies = cluster(5);
    let sys = System::new(bodies.clone()).unwrap();

    let xs = sys.positions();
    let vs = sys.velocities();
    for (i, b) in bodies.iter().enumerate() {
        assert_eq!(xs[i], b.x);
        assert_eq!(vs[i], b.v);
        assert_eq!(sys.mass(i), b.m);
    }
}

#[test]
fn construction_rejects_invalid_bodies() {
    let ok = || Body::new(1.0, [0.0, 0.0, 0.0], [0.0, 0.0, 0.0]);

    for m in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let mut b = ok();
        b.m = m;
        let err = System::new(vec![ok(), b]).unwrap_err();
        assert!(matches!(err, Error::InvalidMass { index: 1, .. }), "{err}");
    }

    let mut b = ok();
    b.x.y = f64::NAN;
    let err = System::new(vec![b]).unwrap_err();
    assert!(matches!(err, Error::NonFinite { index: 0, field: "position", .. }));

    let mut b = ok();
    b.v.z = f64::NEG_INFINITY;
    let err = System::new(vec![b]).unwrap_err();
    assert!(matches!(err, Error::NonFinite { index: 0, field: "velocity", .. }));
}

#[test]
fn gravity_parameters_are_validated() {
    assert!(Gravity::new(0.0, 1e-10).is_err());
    assert!(Gravity::new(f64::NAN, 1e-10).is_err());
    assert!(Gravity::new(1.0, -1.0).is_err());
    assert!(Gravity::new(1.0, f64::INFINITY).is_err());
    assert!(Gravity::new(1.0, 0.0).is_ok());
}

#[test]
fn momentum_and_center_of_mass() {
    let sys = System::new(vec![
        Body::new(1.0, [0.0, 0.0, 0.0], [1.0, 0.0, 0.0]),
        Body::new(3.0, [4.0, 0.0, 0.0], [0.0, -1.0, 0.0]),
    ])
    .unwrap();

    assert_relative_eq!(sys.total_mass(), 4.0);
    assert_relative_eq!(sys.momentum(), NVec3::new(1.0, -3.0, 0.0));
    assert_relative_eq!(sys.center_of_mass(), NVec3::new(3.0, 0.0, 0.0));
    assert_relative_eq!(sys.kinetic_energy(), 0.5 + 1.5);
    assert_relative_eq!(sys.potential_energy(&unit_gravity()), -3.0 / 4.0);
}

// ==================================================================================
// Gravity tests
// ==================================================================================

#[test]
fn gravity_newton_third_law() {
    let sys = two_body_system(1.0, 2.0, 3.0);

    for forces in all_strategies(unit_gravity()) {
        let acc = forces.accelerations(&sys);
        let net = acc[0] * sys.mass(0) + acc[1] * sys.mass(1);
        assert!(net.norm() < 1e-12, "{}: net force not zero: {:?}", forces.name(), net);
    }
}

#[test]
fn pair_forces_are_equal_and_opposite() {
    let sys = System::new(cluster(10)).unwrap();
    let g = unit_gravity();

    for i in 0..sys.len() {
        for j in 0..sys.len() {
            if i == j {
                continue;
            }
            let fij = g.pair_force(&sys, i, j);
            let fji = g.pair_force(&sys, j, i);
            assert!(fij.norm() > 0.0);
            assert_relative_eq!(fij.norm(), fji.norm(), max_relative = 1e-14);
            assert_relative_eq!(fij, -fji, max_relative = 1e-14);
        }
    }
}

#[test]
fn zero_self_force() {
    let sys = System::new(cluster(4)).unwrap();
    let g = unit_gravity();
    for i in 0..sys.len() {
        assert_eq!(g.pair_force(&sys, i, i), NVec3::zeros());
    }

    // A lone body feels nothing under every strategy
    let lone = System::new(vec![Body::new(5.0, [1.0, 2.0, 3.0], [0.0, 0.0, 0.0])]).unwrap();
    for forces in all_strategies(g) {
        assert_eq!(forces.accelerations(&lone), vec![NVec3::zeros()], "{}", forces.name());
    }
}

#[test]
fn gravity_points_toward_other_body() {
    let sys = two_body_system(2.0, 1.0, 1.0);

    for forces in all_strategies(unit_gravity()) {
        let acc = forces.accelerations(&sys);
        let dx = sys.position(1) - sys.position(0);
        assert!(acc[0].dot(&dx) > 0.0, "{}: body 0 not pulled toward body 1", forces.name());
        assert!(acc[1].dot(&dx) < 0.0, "{}: body 1 not pulled toward body 0", forces.name());
    }
}

#[test]
fn gravity_inverse_square_law() {
    let sys_r = two_body_system(1.0, 1.0, 1.0);
    let sys_2r = two_body_system(2.0, 1.0, 1.0);

    for forces in all_strategies(unit_gravity()) {
        let ratio = forces.accelerations(&sys_r)[0].norm() / forces.accelerations(&sys_2r)[0].norm();
        assert_relative_eq!(ratio, 4.0, max_relative = 1e-12);
    }
}

#[test]
fn strategies_agree() {
    let sys = System::new(cluster(60)).unwrap();
    let g = unit_gravity();

    let reference = Strategy::Direct.build(g, None).unwrap().accelerations(&sys);
    for forces in all_strategies(g) {
        let acc = forces.accelerations(&sys);
        for (a, r) in acc.iter().zip(reference.iter()) {
            assert!((a - r).norm() <= 1e-9 * r.norm(), "{}: {a:?} vs {r:?}", forces.name());
        }
    }

    let pooled = ParallelGravity::with_threads(g, 2).unwrap().accelerations(&sys);
    for (a, r) in pooled.iter().zip(reference.iter()) {
        assert!((a - r).norm() <= 1e-9 * r.norm());
    }
}

#[test]
fn accelerations_do_not_depend_on_body_order() {
    let bodies = cluster(40);
    let n = bodies.len();
    let forward = System::new(bodies.clone()).unwrap();
    let reversed = System::new(bodies.into_iter().rev().collect()).unwrap();

    for forces in all_strategies(unit_gravity()) {
        let acc = forces.accelerations(&forward);
        let acc_rev = forces.accelerations(&reversed);
        for i in 0..n {
            let (a, b) = (acc[i], acc_rev[n - 1 - i]);
            assert!((a - b).norm() <= 1e-12 * a.norm(), "{} body {i}: {a:?} vs {b:?}", forces.name());
        }
    }
}

#[test]
fn coincident_bodies_exert_no_force() {
    let sys = System::new(vec![
        Body::new(1.0, [1.0, 1.0, 1.0], [0.0, 0.0, 0.0]),
        Body::new(2.0, [1.0, 1.0, 1.0], [0.0, 0.0, 0.0]),
    ])
    .unwrap();

    for forces in all_strategies(unit_gravity()) {
        let acc = forces.accelerations(&sys);
        assert_eq!(acc, vec![NVec3::zeros(); 2], "{}", forces.name());
    }

    // With a third body the degenerate pair still only feels the third one
    let sys = System::new(vec![
        Body::new(1.0, [0.0, 0.0, 0.0], [0.0, 0.0, 0.0]),
        Body::new(1.0, [0.0, 0.0, 0.0], [0.0, 0.0, 0.0]),
        Body::new(1.0, [2.0, 0.0, 0.0], [0.0, 0.0, 0.0]),
    ])
    .unwrap();
    for forces in all_strategies(unit_gravity()) {
        let acc = forces.accelerations(&sys);
        assert!(acc.iter().all(|a| a.iter().all(|c| c.is_finite())));
        assert_relative_eq!(acc[0], NVec3::new(0.25, 0.0, 0.0), max_relative = 1e-12);
        assert_relative_eq!(acc[1], NVec3::new(0.25, 0.0, 0.0), max_relative = 1e-12);
    }
}

#[test]
fn default_guard_covers_near_coincident_pair() {
    // close but not identical, inside the default guard
    let sys = two_body_system(5e-11, 1.0, 1.0);
    assert!(sys.distance(0, 1) > 0.0 && sys.distance(0, 1) <= DEFAULT_GUARD);

    let g = Gravity::new(1.0, DEFAULT_GUARD).unwrap();
    for forces in all_strategies(g) {
        let acc = forces.accelerations(&sys);
        assert_eq!(acc, vec![NVec3::zeros(); 2], "{}", forces.name());
    }
    assert_eq!(sys.potential_energy(&g), 0.0);
}

#[test]
fn distance_guard_is_configurable() {
    let sys = two_body_system(0.5, 1.0, 1.0);

    let wide = Gravity::new(1.0, 1.0).unwrap();
    let narrow = Gravity::new(1.0, 0.1).unwrap();

    for s in Strategy::ALL {
        let acc = s.build(wide, None).unwrap().accelerations(&sys);
        assert_eq!(acc[0], NVec3::zeros());

        let acc = s.build(narrow, None).unwrap().accelerations(&sys);
        assert_relative_eq!(acc[0].x, 4.0, max_relative = 1e-12);
    }
}

// ==================================================================================
// Integrator tests
// ==================================================================================

fn engine(bodies: Vec<Body>, strategy: Strategy, scheme: Scheme) -> Engine {
    Engine::build(bodies, unit_gravity(), strategy, scheme, None).unwrap()
}

fn scenario_two_body() -> Vec<Body> {
    vec![
        Body::new(1.0, [0.0, 0.0, 0.0], [0.0, 0.0, 0.0]),
        Body::new(1.0, [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ]
}

#[test]
fn two_body_single_step() {
    let dt = 0.01;
    let expected = 0.5 * dt * dt; // 0.5 G m / r^2 dt^2 with G = m = r = 1

    for s in Strategy::ALL {
        let mut e = engine(scenario_two_body(), s, Scheme::Taylor);
        let xs = e.step(dt).unwrap();

        // A drifts toward B
        assert_relative_eq!(xs[0], NVec3::new(expected, 0.0, 0.0), max_relative = 1e-12);

        // B drifts toward A relative to free motion (1, dt, 0)
        let free = NVec3::new(1.0, dt, 0.0);
        assert_relative_eq!(xs[1] - free, NVec3::new(-expected, 0.0, 0.0), max_relative = 1e-9);

        assert_relative_eq!(e.system().velocity(0), NVec3::new(dt, 0.0, 0.0), max_relative = 1e-12);
        assert_relative_eq!(e.system().velocity(1), NVec3::new(-dt, 1.0, 0.0), max_relative = 1e-12);
        assert_relative_eq!(e.system().t(), dt);
        assert_eq!(e.system().steps(), 1);
    }
}

#[test]
fn step_returns_post_step_snapshot() {
    let mut e = engine(cluster(8), Strategy::Direct, Scheme::Taylor);
    let before = e.system().positions();
    let xs = e.step(1e-3).unwrap();

    assert_eq!(xs, e.system().positions());
    assert_ne!(xs, before);
}

#[test]
fn engine_accelerations_match_its_strategy() {
    for s in Strategy::ALL {
        let mut e = engine(cluster(12), s, Scheme::Taylor);
        e.step(1e-3).unwrap();

        let expected = s.build(unit_gravity(), None).unwrap().accelerations(e.system());
        assert_eq!(e.accelerations(), expected, "{s}");
    }
}

#[test]
fn momentum_is_conserved() {
    for s in Strategy::ALL {
        for scheme in [Scheme::Taylor, Scheme::Verlet] {
            let mut e = engine(cluster(20), s, scheme);
            let p0 = e.system().momentum();

            e.run(1e-3, 200, |_| {}).unwrap();

            let drift = (e.system().momentum() - p0).norm();
            assert!(drift < 1e-10, "{s}/{scheme:?}: momentum drift {drift:e}");
        }
    }
}

#[test]
fn verlet_orbit_conserves_energy() {
    // light body on a circular orbit of radius 1 around a unit mass
    let bodies = vec![
        Body::new(1.0, [0.0, 0.0, 0.0], [0.0, 0.0, 0.0]),
        Body::new(1e-6, [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ];
    let mut e = engine(bodies, Strategy::Direct, Scheme::Verlet);
    let e0 = e.system().total_energy(&unit_gravity());

    e.run(1e-3, 1000, |_| {}).unwrap();

    let e1 = e.system().total_energy(&unit_gravity());
    assert_relative_eq!(e1, e0, max_relative = 1e-5);
    assert_relative_eq!(e.system().distance(0, 1), 1.0, max_relative = 1e-3);
}

#[test]
fn schemes_share_the_position_update() {
    let mut taylor = engine(cluster(10), Strategy::Direct, Scheme::Taylor);
    let mut verlet = engine(cluster(10), Strategy::Direct, Scheme::Verlet);

    let xt = taylor.step(1e-2).unwrap();
    let xv = verlet.step(1e-2).unwrap();
    for (a, b) in xt.iter().zip(xv.iter()) {
        assert_relative_eq!(*a, *b, max_relative = 1e-14, epsilon = 1e-15);
    }
}

#[test]
fn steps_are_deterministic() {
    for s in Strategy::ALL {
        let mut a = engine(cluster(30), s, Scheme::Taylor);
        let mut b = engine(cluster(30), s, Scheme::Taylor);

        a.run(1e-3, 50, |_| {}).unwrap();
        b.run(1e-3, 50, |_| {}).unwrap();

        assert_eq!(a.system().positions(), b.system().positions(), "{s}");
        assert_eq!(a.system().velocities(), b.system().velocities(), "{s}");
    }
}

#[test]
fn invalid_time_step_is_rejected_atomically() {
    let mut e = engine(cluster(6), Strategy::Direct, Scheme::Taylor);
    e.step(1e-3).unwrap();

    let xs = e.system().positions();
    let vs = e.system().velocities();
    let t = e.system().t();

    for dt in [0.0, -1e-3, f64::NAN, f64::INFINITY] {
        let err = e.step(dt).unwrap_err();
        assert!(matches!(err, Error::InvalidTimeStep(_)), "{err}");

        assert_eq!(e.system().positions(), xs);
        assert_eq!(e.system().velocities(), vs);
        assert_eq!(e.system().t(), t);
        assert_eq!(e.system().steps(), 1);
    }
}

#[test]
fn diverging_step_is_rejected_atomically() {
    let bodies = vec![
        Body::new(1.0, [0.0, 0.0, 0.0], [0.0, 0.0, 0.0]),
        Body::new(1.0, [1.0, 0.0, 0.0], [1e300, 0.0, 0.0]),
    ];
    let mut e = engine(bodies.clone(), Strategy::Direct, Scheme::Taylor);

    let err = e.step(1e10).unwrap_err();
    assert!(matches!(err, Error::Diverged { index: 1 }), "{err}");

    assert_eq!(e.system().bodies(), &bodies[..]);
    assert_eq!(e.system().steps(), 0);
    assert_eq!(e.system().t(), 0.0);
}

#[test]
fn center_of_mass_moves_uniformly() {
    let mut e = engine(cluster(20), Strategy::Parallel, Scheme::Verlet);
    let start = Diagnostics::of(e.system(), e.gravity());

    e.run(1e-3, 200, |_| {}).unwrap();
    let end = Diagnostics::of(e.system(), e.gravity());

    // the bulk drift (0.05 in z per unit time) is expected, not counted
    assert!((end.center_of_mass - start.center_of_mass).norm() > 1e-3);
    assert!(end.center_of_mass_drift(&start) < 1e-10);

    // a displaced centre shows up
    let mut moved = end;
    moved.center_of_mass.x += 0.5;
    assert_relative_eq!(moved.center_of_mass_drift(&start), 0.5, max_relative = 1e-9);
}

#[test]
fn run_reports_every_step() {
    let mut e = engine(cluster(4), Strategy::Parallel, Scheme::Taylor);
    let mut seen = Vec::new();

    e.run(1e-3, 5, |sys| seen.push(sys.steps())).unwrap();

    assert_eq!(seen, vec![1, 2, 3, 4, 5]);
    assert_relative_eq!(e.system().t(), 5e-3, max_relative = 1e-12);
}
