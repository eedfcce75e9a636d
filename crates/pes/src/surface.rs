use std::fmt::Display;

use crate::{Bounds, Field, Grid, Interpolator, PesError, Point, SampleCloud};

/// Selects one of the three fields carried by a [Surface]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Component {
    Value,
    GradX,
    GradY,
}

impl Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Component::Value => "value",
                Component::GradX => "grad_x",
                Component::GradY => "grad_y",
            }
        )
    }
}

/// A [Grid] together with an [Interpolator] over its nodes. Both are fixed at
/// construction.
#[derive(Clone, Debug)]
pub struct Surface {
    grid: Grid,
    interp: Interpolator,
}

impl Surface {
    pub fn new(cloud: &SampleCloud) -> Result<Self, PesError> {
        let grid = Grid::new(cloud)?;
        let interp = Interpolator::new(&grid.nodes());
        Ok(Self { grid, interp })
    }

    pub fn load_file<P: AsRef<std::path::Path>>(
        filename: P,
    ) -> Result<Self, PesError> {
        Self::new(&SampleCloud::load_file(filename)?)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn interpolator(&self) -> &Interpolator {
        &self.interp
    }

    pub fn bounds(&self) -> Bounds {
        self.grid.bounds()
    }

    pub fn field(&self, c: Component) -> &Field {
        match c {
            Component::Value => self.grid.value(),
            Component::GradX => self.grid.grad_x(),
            Component::GradY => self.grid.grad_y(),
        }
    }

    /// interpolate the field selected by `c` at each of `points`
    pub fn eval(&self, c: Component, points: &[Point]) -> Vec<f64> {
        self.interp.interpolate(self.field(c), points)
    }

    pub fn eval_one(&self, c: Component, p: &Point) -> f64 {
        self.interp.interpolate_one(self.field(c), p)
    }
}
