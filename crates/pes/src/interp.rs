use rayon::prelude::*;

use crate::delaunay::{orient, Triangulation};
use crate::{Field, Point};

/// barycentric weights this far below zero still count as inside a triangle,
/// so that points on shared edges and on the hull resolve to a triangle
const BARY_TOL: f64 = 1e-12;

/// Piecewise-linear interpolation over a Delaunay triangulation of scattered
/// nodes. Queries outside of the convex hull of the nodes evaluate to NaN.
#[derive(Clone, Debug)]
pub struct Interpolator {
    tri: Triangulation,

    /// number of buckets along each side of the unit square
    nb: usize,

    /// triangle indices overlapping each bucket, row-major
    buckets: Vec<Vec<usize>>,
}

impl Interpolator {
    /// triangulate `nodes`. The values later passed to
    /// [Interpolator::interpolate] are looked up by node index with
    /// [Field::node], so `nodes` must be in the same order
    pub fn new(nodes: &[Point]) -> Self {
        let tri = Triangulation::new(nodes);
        let nb = ((tri.triangles.len() as f64).sqrt().ceil() as usize).max(1);
        let mut buckets = vec![Vec::new(); nb * nb];
        for (t, &[a, b, c]) in tri.triangles.iter().enumerate() {
            let (pa, pb, pc) = (tri.points[a], tri.points[b], tri.points[c]);
            let lo = pa.inf(&pb).inf(&pc);
            let hi = pa.sup(&pb).sup(&pc);
            let (i0, j0) = Self::cell(nb, &lo);
            let (i1, j1) = Self::cell(nb, &hi);
            for j in j0..=j1 {
                for i in i0..=i1 {
                    buckets[j * nb + i].push(t);
                }
            }
        }
        Self { tri, nb, buckets }
    }

    /// the number of triangles in the underlying triangulation
    pub fn triangles(&self) -> usize {
        self.tri.triangles.len()
    }

    /// bucket coordinates of the normalized point `p`, clamped to the grid
    fn cell(nb: usize, p: &Point) -> (usize, usize) {
        let f =
            |v: f64| ((v * nb as f64).floor().max(0.0) as usize).min(nb - 1);
        (f(p.x), f(p.y))
    }

    /// find the triangle holding `p` and its barycentric weights
    fn locate(&self, p: &Point) -> Option<([usize; 3], [f64; 3])> {
        let q = self.tri.normalize(p);
        if !(q.x.is_finite() && q.y.is_finite())
            || q.x < -BARY_TOL
            || q.y < -BARY_TOL
            || q.x > 1.0 + BARY_TOL
            || q.y > 1.0 + BARY_TOL
        {
            return None;
        }
        let (i, j) = Self::cell(self.nb, &q);
        for &t in &self.buckets[j * self.nb + i] {
            let v @ [a, b, c] = self.tri.triangles[t];
            let (pa, pb, pc) =
                (&self.tri.points[a], &self.tri.points[b], &self.tri.points[c]);
            let det = orient(pa, pb, pc);
            if det.abs() < f64::EPSILON * f64::EPSILON {
                continue;
            }
            let la = orient(&q, pb, pc) / det;
            let lb = orient(pa, &q, pc) / det;
            let lc = orient(pa, pb, &q) / det;
            if la >= -BARY_TOL && lb >= -BARY_TOL && lc >= -BARY_TOL {
                return Some((v, [la, lb, lc]));
            }
        }
        None
    }

    /// evaluate `field` at the single point `p`
    pub fn interpolate_one(&self, field: &Field, p: &Point) -> f64 {
        match self.locate(p) {
            Some((v, w)) => v
                .iter()
                .zip(w)
                .map(|(&k, w)| w * field.node(k))
                .sum::<f64>(),
            None => f64::NAN,
        }
    }

    /// evaluate `field` at each of `points`, returning NaN for any point
    /// outside of the convex hull of the nodes
    pub fn interpolate(&self, field: &Field, points: &[Point]) -> Vec<f64> {
        points
            .par_iter()
            .map(|p| self.interpolate_one(field, p))
            .collect()
    }
}
