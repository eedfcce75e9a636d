use approx::{assert_abs_diff_eq, assert_relative_eq};
use pes::linspace;

use crate::optimize::score;
use crate::*;

fn double_well(x: f64, y: f64) -> f64 {
    (x * x - 1.0).powi(2) + y * y
}

/// a valley running from (-1, 0) to (1, 0) that dips to y = -1/2 in the
/// middle, so the straight line between the minima is not the best path
fn valley(x: f64, y: f64) -> f64 {
    (x * x - 1.0).powi(2) + 2.0 * (y + 0.5 * (1.0 - x * x)).powi(2)
}

fn cloud<F: Fn(f64, f64) -> f64>(n: usize, f: F) -> SampleCloud {
    let xs = linspace(-2.0, 2.0, n);
    SampleCloud::tabulate(&xs, &xs, f)
}

fn surface<F: Fn(f64, f64) -> f64>(n: usize, f: F) -> Surface {
    Surface::new(&cloud(n, f)).unwrap()
}

fn endpoints() -> (Point, Point) {
    (Point::new(-1.0, 0.0), Point::new(1.0, 0.0))
}

#[test]
fn linear_path() {
    let (a, b) = endpoints();
    let path = Path::linear(a, b, 5);
    assert_eq!(path.len(), 5);
    assert_eq!(path.points()[0], a);
    assert_eq!(path.points()[4], b);
    assert_eq!(path.points()[2], Point::new(0.0, 0.0));
    assert_abs_diff_eq!(path.length(), 2.0, epsilon = 1e-15);
}

#[test]
fn reparameterize_straight_line() {
    // uneven spacing along a straight line
    let path = Path::new(
        [0.0, 0.05, 0.1, 0.4, 0.45, 0.9, 1.0]
            .iter()
            .map(|t| Point::new(1.0 + 3.0 * t, -2.0 + 4.0 * t))
            .collect(),
    );
    let once = path.reparameterize().unwrap();
    assert_eq!(once.len(), path.len());
    assert_eq!(once.points()[0], path.points()[0]);
    assert_eq!(once.points()[6], path.points()[6]);
    let s = once.arclength();
    let l = once.length();
    assert_abs_diff_eq!(l, 5.0, epsilon = 1e-12);
    for (k, s) in s.iter().enumerate() {
        assert_abs_diff_eq!(*s, k as f64 * l / 6.0, epsilon = 1e-12);
    }
    let twice = once.reparameterize().unwrap();
    assert!(twice.max_distance(&once) < 1e-9 * l);
}

#[test]
fn reparameterize_keeps_endpoints() {
    let path = Path::new(vec![
        Point::new(-1.0, 0.0),
        Point::new(-0.3, 0.9),
        Point::new(-0.2, 1.0),
        Point::new(0.7, 0.2),
        Point::new(1.3, -0.1),
    ]);
    let got = path.reparameterize().unwrap();
    assert_eq!(got.len(), 5);
    assert_eq!(got.points()[0], path.points()[0]);
    assert_eq!(got.points()[4], path.points()[4]);
    // every new point lies on the old polyline, so the new string is no
    // longer than the old one
    assert!(got.length() <= path.length());
}

#[test]
fn reparameterize_degenerate() {
    let a = Point::new(0.0, 0.0);
    let b = Point::new(1.0, 1.0);
    let path = Path::new(vec![a, b, b, Point::new(2.0, 0.0)]);
    assert_eq!(
        path.reparameterize(),
        Err(StringError::DegenerateArclength { segment: 1 })
    );
    let path = Path::new(vec![a, a]);
    assert!(path.reparameterize().unwrap_err().is_degenerate_arclength());
    let path = Path::new(vec![a, Point::new(f64::NAN, 0.0), b]);
    assert!(path.reparameterize().unwrap_err().is_degenerate_arclength());
}

#[test]
fn normalization_bound() {
    let surface = surface(41, valley);
    let params = Params::default();
    let (a, b) = endpoints();
    let path = Path::linear(a, b, params.point_count);
    let got = evolve(&surface, &path, &params).unwrap();
    let disps: Vec<f64> = path
        .iter()
        .zip(&got)
        .map(|(p, q)| (p - q).norm())
        .collect();
    let max = disps.iter().copied().fold(0.0, f64::max);
    assert_abs_diff_eq!(max, params.step_size, epsilon = 1e-15);
    for d in disps {
        assert!(d <= params.step_size * (1.0 + 1e-12));
    }
}

#[test]
fn evolve_downhill() {
    let surface = surface(41, valley);
    let params = Params::default();
    let (a, b) = endpoints();
    let path = Path::linear(a, b, params.point_count);
    let got = evolve(&surface, &path, &params).unwrap();
    // the valley floor is below the straight line, so the middle sinks
    let mid = params.point_count / 2;
    assert!(got.points()[mid].y < path.points()[mid].y);
}

#[test]
fn evolve_outside() {
    let surface = surface(21, valley);
    let path = Path::linear(Point::new(-3.0, 0.0), Point::new(1.0, 0.0), 10);
    let strict = Params {
        strict: true,
        ..Params::default()
    };
    assert_eq!(
        evolve(&surface, &path, &strict),
        Err(StringError::OutOfDomain {
            index: 0,
            point: Point::new(-3.0, 0.0)
        })
    );

    // without strict, NaN spreads through the shared scale factor to every
    // point
    let got = evolve(&surface, &path, &Params::default()).unwrap();
    assert!(got.iter().all(|p| p.x.is_nan() && p.y.is_nan()));
    assert!(got.reparameterize().unwrap_err().is_degenerate_arclength());
}

#[test]
fn evolve_flat() {
    let surface = surface(11, |_, _| 1.0);
    let (a, b) = endpoints();
    let path = Path::linear(a, b, 10);
    let strict = Params {
        strict: true,
        ..Params::default()
    };
    assert_eq!(
        evolve(&surface, &path, &strict),
        Err(StringError::ZeroGradient)
    );
    let got = evolve(&surface, &path, &Params::default()).unwrap();
    assert!(got.iter().all(|p| p.x.is_nan()));
}

#[test]
fn phases() {
    let surface = surface(21, valley);
    let (a, b) = endpoints();
    let params = Params {
        point_count: 10,
        max_iterations: 3,
        ..Params::default()
    };
    let mut sm = StringMethod::new(&surface, a, b, params);
    assert_eq!(sm.phase(), Phase::Initialized);
    assert!(sm.best().is_none());
    assert!(sm.step().unwrap().is_some());
    assert_eq!(sm.phase(), Phase::Iterating);
    assert!(sm.step().unwrap().is_some());
    assert!(sm.step().unwrap().is_some());
    assert_eq!(sm.phase(), Phase::Converged);
    assert_eq!(sm.step().unwrap(), None);
    assert_eq!(sm.scores().len(), 3);
    assert_eq!(sm.path().len(), 10);
}

#[test]
fn no_iterations() {
    let surface = surface(21, valley);
    let (a, b) = endpoints();
    let params = Params {
        max_iterations: 0,
        ..Params::default()
    };
    let got = StringMethod::new(&surface, a, b, params).run();
    assert_eq!(got, Err(StringError::NoFiniteScore));
}

#[test]
fn best_never_degrades() {
    let surface = surface(41, double_well);
    let (a, b) = endpoints();
    let mut sm = StringMethod::new(&surface, a, b, Params::default());
    let mut last = f64::INFINITY;
    while let Some(score) = sm.step().unwrap() {
        let best = sm.best().unwrap();
        assert!(best.score <= last);
        assert!(best.score <= score);
        last = best.score;
    }
    let best = sm.best().unwrap();
    let min = sm.scores().iter().copied().fold(f64::INFINITY, f64::min);
    assert_eq!(best.score, min);
    assert_eq!(sm.scores()[best.iteration], min);
}

#[test]
fn double_well_stays_on_axis() {
    let surface = surface(101, double_well);
    let config = Config::new("unused", [-1.0, 0.0], [1.0, 0.0]);
    let got = run(&surface, &config).unwrap();
    assert_eq!(got.best.path.len(), 60);
    assert_eq!(got.scores.len(), 100);
    let dev = got.best.path.iter().map(|p| p.y.abs()).fold(0.0, f64::max);
    assert!(dev < 0.05, "max deviation {dev}");
    // the straight line is already the minimum energy path, so the only
    // change comes from the endpoints settling into the discrete minima
    assert_abs_diff_eq!(got.best.score, got.initial_score, epsilon = 1e-2);
}

#[test]
fn valley_bends() {
    let surface = surface(41, valley);
    let config = Config::new("unused", [-1.0, 0.0], [1.0, 0.0]);
    let got = run(&surface, &config).unwrap();
    assert!(
        got.best.score < got.initial_score - 10.0,
        "{} vs {}",
        got.best.score,
        got.initial_score
    );
    assert_eq!(got.best.score, score(&surface, &got.best.path));
    let lowest = got.best.path.iter().map(|p| p.y).fold(0.0, f64::min);
    assert!(lowest < -0.3, "lowest point at {lowest}");
    let pts = got.best.path.points();
    assert!(pts[0].y.abs() < 0.1);
    assert!(pts[pts.len() - 1].y.abs() < 0.1);
}

#[test]
fn scale_invariance() {
    let c = 4.0;
    let cl = cloud(41, valley);
    let surface = Surface::new(&cl).unwrap();
    let scaled = Surface::new(&cl.scale(c)).unwrap();
    let config = Config::new("unused", [-1.0, 0.0], [1.0, 0.0]);
    let want = run(&surface, &config).unwrap();
    let got = run(&scaled, &config).unwrap();
    assert_eq!(got.best.iteration, want.best.iteration);
    assert_relative_eq!(got.initial_score, c * want.initial_score);
    for (g, w) in got.scores.iter().zip(&want.scores) {
        assert_relative_eq!(*g, c * w, max_relative = 1e-12);
    }
    assert!(got.best.path.max_distance(&want.best.path) < 1e-12);
}

/// a string on the plane v = x over [-1, 1]², sliding toward x = -1 by 0.01
/// per iteration. its first point leaves the surface on iteration 4
fn drifting(strict: bool) -> (Surface, Point, Point, Params) {
    let xs = linspace(-1.0, 1.0, 21);
    let surface = Surface::new(&SampleCloud::tabulate(&xs, &xs, |x, _| x))
        .unwrap();
    let params = Params {
        point_count: 10,
        max_iterations: 30,
        strict,
        ..Params::default()
    };
    (surface, Point::new(-0.955, 0.0), Point::new(0.5, 0.0), params)
}

#[test]
fn drift_keeps_best() {
    let (surface, a, b, params) = drifting(false);
    let got = StringMethod::new(&surface, a, b, params).run().unwrap();
    assert_eq!(got.scores.len(), 30);
    assert!(got.scores[..4].iter().all(|s| s.is_finite()));
    assert!(got.scores[4..].iter().all(|s| s.is_nan()));
    assert_eq!(got.best.iteration, 3);
    assert_abs_diff_eq!(got.initial_score, -2.275, epsilon = 1e-9);
    assert_abs_diff_eq!(got.best.score, -2.675, epsilon = 1e-9);
    assert_abs_diff_eq!(got.best.path.points()[0].x, -0.995, epsilon = 1e-9);
    assert!(got.best.path.iter().all(|p| p.x.is_finite()));
}

#[test]
fn drift_strict() {
    let (surface, a, b, params) = drifting(true);
    let mut sm = StringMethod::new(&surface, a, b, params);
    for _ in 0..4 {
        assert!(sm.step().unwrap().is_some());
    }
    // the gradient was still defined before the step, so the loss only
    // shows up in the values of the new string
    let Err(StringError::OutOfDomain { index, point }) = sm.step() else {
        panic!("expected the string to leave the surface");
    };
    assert_eq!(index, 0);
    assert_abs_diff_eq!(point.x, -1.005, epsilon = 1e-9);
    assert_eq!(sm.best().unwrap().iteration, 3);
}

#[test]
fn drift_from_the_start() {
    let (surface, _, b, params) = drifting(false);
    let a = Point::new(-0.995, 0.0);
    let got = StringMethod::new(&surface, a, b, params).run();
    assert_eq!(got, Err(StringError::NoFiniteScore));
}
