//! Incremental (Bowyer-Watson) Delaunay triangulation of a planar point set

use rustc_hash::{FxHashMap, FxHashSet};

use crate::Point;

/// circumcircle tests within this fraction of the squared radius count as on
/// the circle, so cocircular points (every cell of a regular grid) are never
/// treated as inside
const CIRCLE_TOL: f64 = 1e-10;

/// orientation tolerance for point location in normalized coordinates
const ORIENT_TOL: f64 = 1e-12;

/// distance of the enclosing triangle's vertices from the center of the
/// normalized point set
const SUPER: f64 = 50.0;

/// twice the signed area of (a, b, c), positive when counter-clockwise
pub(crate) fn orient(a: &Point, b: &Point, c: &Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

#[derive(Clone, Copy, Debug)]
struct Tri {
    v: [usize; 3],
    center: Point,
    r2: f64,
}

impl Tri {
    fn new(v: [usize; 3], pts: &[Point]) -> Self {
        let a = pts[v[0]];
        let b = pts[v[1]] - a;
        let c = pts[v[2]] - a;
        let d = 2.0 * (b.x * c.y - b.y * c.x);
        let (b2, c2) = (b.norm_squared(), c.norm_squared());
        let u = Point::new(
            (c.y * b2 - b.y * c2) / d,
            (b.x * c2 - c.x * b2) / d,
        );
        Self {
            v,
            center: a + u,
            r2: u.norm_squared(),
        }
    }

    /// whether `p` is strictly inside the circumcircle
    fn encloses(&self, p: &Point) -> bool {
        (p - self.center).norm_squared() < self.r2 * (1.0 - CIRCLE_TOL)
    }

    fn contains(&self, p: &Point, pts: &[Point]) -> bool {
        self.edges()
            .iter()
            .all(|&(a, b)| orient(&pts[a], &pts[b], p) >= -ORIENT_TOL)
    }

    /// directed edges in counter-clockwise order
    fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.v;
        [(a, b), (b, c), (c, a)]
    }
}

/// A triangulation of a point set, with vertices stored in coordinates
/// normalized so the point set fits in the unit square
#[derive(Clone, Debug)]
pub(crate) struct Triangulation {
    /// normalized input points
    pub(crate) points: Vec<Point>,

    /// counter-clockwise vertex indices into `points`
    pub(crate) triangles: Vec<[usize; 3]>,

    origin: Point,
    span: f64,
}

impl Triangulation {
    pub(crate) fn new(input: &[Point]) -> Self {
        let n = input.len();
        let (lo, hi) = input.iter().fold(
            (
                Point::repeat(f64::INFINITY),
                Point::repeat(f64::NEG_INFINITY),
            ),
            |(lo, hi), p| (lo.inf(p), hi.sup(p)),
        );
        let span = (hi - lo).max();
        let span = if span.is_finite() && span > 0.0 { span } else { 1.0 };
        let origin = if n > 0 { lo } else { Point::zeros() };

        let mut pts: Vec<Point> =
            input.iter().map(|p| (p - origin) / span).collect();
        let mid = Point::new(0.5, 0.5);
        for k in 0..3 {
            let t = std::f64::consts::FRAC_PI_2
                + k as f64 * 2.0 * std::f64::consts::FRAC_PI_3;
            pts.push(mid + SUPER * Point::new(t.cos(), t.sin()));
        }

        let mut tris: Vec<Option<Tri>> = Vec::new();
        let mut edges: FxHashMap<(usize, usize), usize> = FxHashMap::default();
        let root = Tri::new([n, n + 1, n + 2], &pts);
        for e in root.edges() {
            edges.insert(e, 0);
        }
        tris.push(Some(root));

        for i in 0..n {
            let p = pts[i];
            let seed = (0..tris.len()).rev().find(|&t| {
                tris[t].as_ref().is_some_and(|t| t.contains(&p, &pts))
            });
            let Some(seed) = seed else {
                log::warn!("point {i} is outside of the triangulation");
                continue;
            };
            let Some(seed_tri) = tris[seed] else { continue };
            if seed_tri.v.iter().any(|&v| pts[v] == p) {
                log::warn!("skipping duplicate point {i}");
                continue;
            }

            // grow the cavity of triangles whose circumcircles hold p
            let mut cavity = vec![seed];
            let mut in_cavity = FxHashSet::default();
            in_cavity.insert(seed);
            let mut stack = vec![seed];
            while let Some(t) = stack.pop() {
                let Some(tri) = tris[t] else { continue };
                for (a, b) in tri.edges() {
                    let Some(&u) = edges.get(&(b, a)) else { continue };
                    if in_cavity.contains(&u) {
                        continue;
                    }
                    if tris[u].is_some_and(|nb| nb.encloses(&p)) {
                        in_cavity.insert(u);
                        cavity.push(u);
                        stack.push(u);
                    }
                }
            }

            // edges of the cavity whose twins lie outside of it, or on the
            // outer boundary
            let mut boundary = Vec::new();
            for &t in &cavity {
                let Some(tri) = tris[t] else { continue };
                for (a, b) in tri.edges() {
                    if edges
                        .get(&(b, a))
                        .is_none_or(|u| !in_cavity.contains(u))
                    {
                        boundary.push((a, b));
                    }
                }
            }
            for &t in &cavity {
                let Some(tri) = tris[t].take() else { continue };
                for e in tri.edges() {
                    edges.remove(&e);
                }
            }
            for (a, b) in boundary {
                let idx = tris.len();
                let tri = Tri::new([a, b, i], &pts);
                for e in tri.edges() {
                    edges.insert(e, idx);
                }
                tris.push(Some(tri));
            }
        }

        let triangles: Vec<[usize; 3]> = tris
            .into_iter()
            .flatten()
            .filter(|t| t.v.iter().all(|&v| v < n))
            .map(|t| t.v)
            // slivers left along a collinear hull
            .filter(|&[a, b, c]| {
                orient(&pts[a], &pts[b], &pts[c]) > ORIENT_TOL
            })
            .collect();
        pts.truncate(n);
        log::info!(
            "triangulated {n} points into {} triangles",
            triangles.len()
        );
        Self {
            points: pts,
            triangles,
            origin,
            span,
        }
    }

    /// map `p` into the normalized coordinates of [Self::points]
    pub(crate) fn normalize(&self, p: &Point) -> Point {
        (p - self.origin) / self.span
    }
}
