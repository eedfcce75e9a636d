use std::fmt::Display;

use crate::{Dmat, PesError, Point, SampleCloud};

/// A scalar field on the grid. Rows follow the sorted unique y coordinates and
/// columns follow the sorted unique x coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Field(Dmat);

impl Field {
    pub fn new(data: Dmat) -> Self {
        Self(data)
    }

    /// (rows, cols), that is (|y|, |x|)
    pub fn shape(&self) -> (usize, usize) {
        self.0.shape()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.0[(row, col)]
    }

    /// the value at flattened node `k`, counting row-major (x fastest). This
    /// is the same order as [Grid::nodes]
    pub fn node(&self, k: usize) -> f64 {
        let (_, cols) = self.0.shape();
        self.0[(k / cols, k % cols)]
    }

    pub fn as_matrix(&self) -> &Dmat {
        &self.0
    }

    /// the smallest and largest non-NaN values in the field
    pub fn range(&self) -> (f64, f64) {
        self.0
            .iter()
            .filter(|v| !v.is_nan())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// compute (∂/∂x, ∂/∂y) of `self` over the axes `x` and `y`
    fn gradient(&self, x: &[f64], y: &[f64]) -> (Field, Field) {
        let (rows, cols) = self.shape();
        let mut gx = Dmat::zeros(rows, cols);
        let mut gy = Dmat::zeros(rows, cols);
        for r in 0..rows {
            let line: Vec<f64> = self.0.row(r).iter().copied().collect();
            for c in 0..cols {
                gx[(r, c)] = derivative(&line, x, c);
            }
        }
        for c in 0..cols {
            let line: Vec<f64> = self.0.column(c).iter().copied().collect();
            for r in 0..rows {
                gy[(r, c)] = derivative(&line, y, r);
            }
        }
        (Field(gx), Field(gy))
    }
}

/// derivative of `f` with respect to the coordinates `c` at index `i`. Interior
/// points use the second-order central difference for uneven spacing, and the
/// two ends use first-order one-sided differences. Requires at least two
/// points.
fn derivative(f: &[f64], c: &[f64], i: usize) -> f64 {
    let n = f.len();
    if i == 0 {
        return (f[1] - f[0]) / (c[1] - c[0]);
    }
    if i == n - 1 {
        return (f[n - 1] - f[n - 2]) / (c[n - 1] - c[n - 2]);
    }
    let h0 = c[i] - c[i - 1];
    let h1 = c[i + 1] - c[i];
    (h0 * h0 * f[i + 1] - h1 * h1 * f[i - 1] + (h1 * h1 - h0 * h0) * f[i])
        / (h0 * h1 * (h0 + h1))
}

/// The rectangle covered by the samples
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl Bounds {
    pub fn contains(&self, p: &Point) -> bool {
        (self.xmin..=self.xmax).contains(&p.x)
            && (self.ymin..=self.ymax).contains(&p.y)
    }
}

impl Display for Bounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{:.6}, {:.6}] x [{:.6}, {:.6}]",
            self.xmin, self.xmax, self.ymin, self.ymax
        )
    }
}

/// The value field and gradient fields reconstructed from a [SampleCloud]
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    x: Vec<f64>,
    y: Vec<f64>,
    value: Field,
    grad_x: Field,
    grad_y: Field,
}

impl Grid {
    /// Place every sample of `cloud` on the grid spanned by its unique x and y
    /// coordinates and differentiate the result. Samples may come in any
    /// order, but every (x, y) combination must occur exactly once.
    pub fn new(cloud: &SampleCloud) -> Result<Self, PesError> {
        if cloud.iter().any(|s| !s.x.is_finite() || !s.y.is_finite()) {
            return Err(PesError::MalformedGrid(
                "non-finite sample coordinate".to_owned(),
            ));
        }
        let x = unique(cloud.iter().map(|s| s.x));
        let y = unique(cloud.iter().map(|s| s.y));
        let (nx, ny) = (x.len(), y.len());
        if cloud.len() != nx * ny {
            return Err(PesError::MalformedGrid(format!(
                "{} samples cannot fill a {ny} x {nx} grid",
                cloud.len()
            )));
        }
        if nx < 2 || ny < 2 {
            return Err(PesError::MalformedGrid(format!(
                "need at least 2 distinct x and y values, found {nx} and {ny}"
            )));
        }

        let mut value = Dmat::repeat(ny, nx, f64::NAN);
        let mut seen = vec![false; nx * ny];
        for s in cloud.iter() {
            let (Ok(c), Ok(r)) = (
                x.binary_search_by(|a| a.total_cmp(&normalize(s.x))),
                y.binary_search_by(|a| a.total_cmp(&normalize(s.y))),
            ) else {
                return Err(PesError::MalformedGrid(format!(
                    "sample at ({}, {}) is off the grid",
                    s.x, s.y
                )));
            };
            if std::mem::replace(&mut seen[r * nx + c], true) {
                return Err(PesError::MalformedGrid(format!(
                    "duplicate sample at ({}, {})",
                    s.x, s.y
                )));
            }
            value[(r, c)] = s.v;
        }

        let value = Field(value);
        let (grad_x, grad_y) = value.gradient(&x, &y);
        log::info!("built {ny} x {nx} grid");
        Ok(Self {
            x,
            y,
            value,
            grad_x,
            grad_y,
        })
    }

    /// the sorted unique x coordinates
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// the sorted unique y coordinates
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn value(&self) -> &Field {
        &self.value
    }

    pub fn grad_x(&self) -> &Field {
        &self.grad_x
    }

    pub fn grad_y(&self) -> &Field {
        &self.grad_y
    }

    pub fn bounds(&self) -> Bounds {
        Bounds {
            xmin: self.x[0],
            xmax: self.x[self.x.len() - 1],
            ymin: self.y[0],
            ymax: self.y[self.y.len() - 1],
        }
    }

    /// the coordinates of every grid node, flattened row-major (x fastest)
    pub fn nodes(&self) -> Vec<Point> {
        let mut ret = Vec::with_capacity(self.x.len() * self.y.len());
        for &y in &self.y {
            for &x in &self.x {
                ret.push(Point::new(x, y));
            }
        }
        ret
    }
}

/// fold -0.0 into 0.0 so that `total_cmp` agrees with `==`
fn normalize(v: f64) -> f64 {
    v + 0.0
}

fn unique(it: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut ret: Vec<f64> = it.map(normalize).collect();
    ret.sort_by(f64::total_cmp);
    ret.dedup();
    ret
}
