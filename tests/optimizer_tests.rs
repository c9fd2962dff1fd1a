//! End-to-end scenarios for the round controller.

use bayesopt::{Error, NormalParam, Optimizer, Param, UniformParam};

#[test]
fn test_minimize_quadratic_with_defaults() {
    let x = UniformParam::new("x", -10.0, 10.0);
    let opt = Optimizer::builder()
        .param(x.clone())
        .seed(42)
        .build()
        .unwrap();

    let (best, y) = opt.optimize(|p| p[&x.id()].powi(2) + 1.0).unwrap();

    assert!(
        (y - 1.0).abs() < 0.01,
        "best y = {y}; want 1 within 0.01 (x = {})",
        best[&x.id()]
    );
    assert!(best[&x.id()].abs() < 0.1);

    // Round accounting: the full budget ran unless a numerical failure cut
    // the loop short.
    if opt.exploration_err().is_none() {
        assert_eq!(opt.rounds(), 20);
    }
    assert!(!opt.running());
}

#[test]
fn test_maximize_quadratic() {
    let x = UniformParam::new("x", -10.0, 10.0);
    let opt = Optimizer::builder()
        .param(x.clone())
        .rounds(30)
        .minimize(false)
        .seed(42)
        .build()
        .unwrap();

    let (best, y) = opt.optimize(|p| -p[&x.id()].powi(2)).unwrap();

    assert!(
        y.abs() < 0.01,
        "best y = {y}; want 0 within 0.01 (x = {})",
        best[&x.id()]
    );
}

#[test]
fn test_minimum_on_box_boundary() {
    // The argmin of x^2 + 1 over [5, 10] sits on the boundary; the loose
    // tolerance absorbs the stochastic proposals.
    let x = UniformParam::new("x", 5.0, 10.0);
    let opt = Optimizer::builder()
        .param(x.clone())
        .rounds(30)
        .seed(42)
        .build()
        .unwrap();

    let (best, y) = opt.optimize(|p| p[&x.id()].powi(2) + 1.0).unwrap();

    assert!(
        (y - 26.0).abs() / 26.0 < 0.44,
        "best y = {y}; want 26 within 44%"
    );
    assert!((5.0..=10.0).contains(&best[&x.id()]));
}

#[test]
fn test_multivariate_minimize() {
    let a = UniformParam::new("a", -5.0, 5.0);
    let b = NormalParam::new("b", -5.0, 5.0, 0.0, 2.0);
    let opt = Optimizer::builder()
        .param(a.clone())
        .param(b.clone())
        .rounds(40)
        .random_rounds(10)
        .seed(42)
        .build()
        .unwrap();

    let (_, y) = opt
        .optimize(|p| p[&a.id()].powi(2) + p[&b.id()].powi(2))
        .unwrap();

    assert!(y < 0.5, "best y = {y}; expected near-zero for a sphere");
}

#[test]
fn test_manual_next_log_loop() {
    let x = UniformParam::new("x", 0.0, 1.0);
    let opt = Optimizer::builder()
        .param(x.clone())
        .rounds(7)
        .random_rounds(3)
        .seed(7)
        .build()
        .unwrap();

    let mut produced = 0;
    loop {
        let (point, parallel) = opt.next();
        let Some(point) = point else { break };
        // Rounds 0 and 1 are parallelizable warm-up; round 2 is the last
        // warm-up round and everything after is model-driven.
        assert_eq!(parallel, produced < 2, "round {produced}");
        let v = point[&x.id()];
        assert!((0.0..=1.0).contains(&v));
        opt.log(&point, (v - 0.3).powi(2)).unwrap();
        produced += 1;
    }

    assert_eq!(produced, 7);
    assert_eq!(opt.rounds(), 7);
    assert_eq!(opt.gp().len(), 7);
    assert!(opt.exploration_err().is_none());
}

#[test]
fn test_optimize_rejects_concurrent_run() {
    let x = UniformParam::new("x", 0.0, 1.0);
    let opt = Optimizer::builder()
        .param(x.clone())
        .rounds(6)
        .seed(1)
        .build()
        .unwrap();

    let (_, _) = opt
        .optimize(|p| {
            // Re-entry from inside an evaluation must be refused.
            let nested = opt.optimize(|_| 0.0);
            assert!(matches!(nested, Err(Error::AlreadyRunning)));
            assert!(opt.running());
            p[&x.id()]
        })
        .unwrap();

    assert!(!opt.running());
}

#[test]
fn test_stop_surfaces_stop_error() {
    let x = UniformParam::new("x", 0.0, 1.0);
    let opt = Optimizer::builder()
        .param(x.clone())
        .rounds(10)
        .seed(1)
        .build()
        .unwrap();

    let result = opt.optimize(|p| {
        opt.stop();
        p[&x.id()]
    });

    assert!(matches!(result, Err(Error::Stopped)));
    assert!(!opt.running());
    // A stopped run can be restarted.
    let restarted = opt.optimize(|p| p[&x.id()]);
    assert!(restarted.is_ok() || matches!(restarted, Err(Error::Stopped)));
}

#[test]
fn test_best_point_uses_direction() {
    let x = UniformParam::new("x", 0.0, 1.0);
    let opt = Optimizer::builder()
        .param(x.clone())
        .rounds(2)
        .random_rounds(2)
        .minimize(false)
        .seed(3)
        .build()
        .unwrap();

    let (_, y) = opt.optimize(|p| p[&x.id()]).unwrap();
    let (_, observed) = opt.gp().raw_data();
    let max = observed.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    assert_eq!(y, max);
}

#[test]
fn test_gp_accessor_exposes_observations() {
    let x = UniformParam::new("x", -1.0, 1.0);
    let opt = Optimizer::builder()
        .param(x.clone())
        .rounds(5)
        .random_rounds(5)
        .seed(9)
        .output_name("loss")
        .build()
        .unwrap();

    opt.optimize(|p| p[&x.id()].abs()).unwrap();

    let gp = opt.gp();
    assert_eq!(gp.len(), 5);
    assert_eq!(gp.dims(), 1);
    assert_eq!(gp.name(0), "x");
    assert_eq!(gp.output_name(), "loss");
    let (xs, ys) = gp.raw_data();
    assert_eq!(xs.len(), 5);
    assert_eq!(ys.len(), 5);
}
