use pes::linspace;

use crate::{Point, StringError};

/// The discretized string: an ordered sequence of points in the plane
#[derive(Clone, Debug, PartialEq)]
pub struct Path(Vec<Point>);

impl Path {
    pub fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// `n` points evenly spaced on the segment from `start` to `end`
    pub fn linear(start: Point, end: Point, n: usize) -> Self {
        let xs = linspace(start.x, end.x, n);
        let ys = linspace(start.y, end.y, n);
        Self(xs.into_iter().zip(ys).map(|(x, y)| Point::new(x, y)).collect())
    }

    pub fn points(&self) -> &[Point] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.0.iter()
    }

    /// cumulative distance along the path, starting from 0 at the first point
    pub fn arclength(&self) -> Vec<f64> {
        let mut ret = Vec::with_capacity(self.len());
        let mut s = 0.0;
        ret.push(s);
        for w in self.0.windows(2) {
            s += (w[1] - w[0]).norm();
            ret.push(s);
        }
        ret
    }

    /// total length of the path
    pub fn length(&self) -> f64 {
        self.arclength().last().copied().unwrap_or(0.0)
    }

    /// Redistribute the points of `self` at uniform fractions of its
    /// arclength, keeping the endpoints fixed. Each coordinate is linearly
    /// interpolated against the normalized cumulative arclength, which must be
    /// strictly increasing.
    pub fn reparameterize(&self) -> Result<Self, StringError> {
        let n = self.len();
        if n < 2 {
            return Err(StringError::DegenerateArclength { segment: 0 });
        }
        let s = self.arclength();
        for k in 1..n {
            if !s[k].is_finite() || s[k] <= s[k - 1] {
                return Err(StringError::DegenerateArclength { segment: k - 1 });
            }
        }
        let total = s[n - 1];
        let t: Vec<f64> = s.iter().map(|s| s / total).collect();

        let mut ret = Vec::with_capacity(n);
        ret.push(self.0[0]);
        let mut k = 0;
        for j in 1..n - 1 {
            let u = j as f64 / (n - 1) as f64;
            while k < n - 2 && t[k + 1] < u {
                k += 1;
            }
            let f = (u - t[k]) / (t[k + 1] - t[k]);
            ret.push(self.0[k] + (self.0[k + 1] - self.0[k]) * f);
        }
        ret.push(self.0[n - 1]);
        Ok(Self(ret))
    }

    /// the largest distance between corresponding points of `self` and
    /// `other`
    pub fn max_distance(&self, other: &Self) -> f64 {
        self.0
            .iter()
            .zip(&other.0)
            .map(|(a, b)| (a - b).norm())
            .fold(0.0, f64::max)
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Point;

    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
