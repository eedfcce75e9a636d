//! Potential energy surfaces sampled on a rectangular grid in two dimensions.
//! A [SampleCloud] of (x, y, value) triples is turned into a [Grid] holding the
//! value field and its two partial derivatives, and a [Surface] pairs that grid
//! with an [Interpolator] for evaluating any of the three fields off the grid.

use std::error::Error;
use std::fmt::Display;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::path::Path;

use nalgebra as na;

mod delaunay;
pub mod grid;
pub mod interp;
pub mod surface;


pub use grid::{Bounds, Field, Grid};
pub use interp::Interpolator;
pub use surface::{Component, Surface};

pub type Dmat = na::DMatrix<f64>;
pub type Point = na::Vector2<f64>;

#[derive(Debug, PartialEq)]
pub enum PesError {
    /// failed to read the named file
    Io(String, std::io::ErrorKind),

    /// a line of sample input could not be parsed. `line` is 1-based
    Parse { line: usize, msg: String },

    /// the samples do not form a complete rectangular grid
    MalformedGrid(String),
}

impl PesError {
    /// Returns `true` if the pes error is [`MalformedGrid`].
    ///
    /// [`MalformedGrid`]: PesError::MalformedGrid
    #[must_use]
    pub fn is_malformed_grid(&self) -> bool {
        matches!(self, Self::MalformedGrid(..))
    }
}

impl Display for PesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PesError::Io(file, kind) => {
                write!(f, "failed to read {file}: {kind}")
            }
            PesError::Parse { line, msg } => {
                write!(f, "parse error on line {line}: {msg}")
            }
            PesError::MalformedGrid(msg) => write!(f, "malformed grid: {msg}"),
        }
    }
}

impl Error for PesError {}

/// A single sampled point of the surface
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
    pub v: f64,
}

impl Sample {
    pub fn new(x: f64, y: f64, v: f64) -> Self {
        Self { x, y, v }
    }
}

/// An unordered collection of samples, as read from a PES file
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampleCloud(pub Vec<Sample>);

impl SampleCloud {
    pub fn load_file<P: AsRef<Path>>(filename: P) -> Result<Self, PesError> {
        let filename = filename.as_ref();
        let f = std::fs::File::open(filename).map_err(|e| {
            PesError::Io(filename.display().to_string(), e.kind())
        })?;
        Self::load(f)
    }

    /// Load a [SampleCloud] from whitespace-separated columns. The first three
    /// columns of each line are x, y, and the value, and any further columns
    /// are ignored. Everything after a `#` is a comment, and blank lines are
    /// skipped.
    pub fn load(r: impl Read) -> Result<Self, PesError> {
        let mut ret = Vec::new();
        for (i, line) in BufReader::new(r).lines().enumerate() {
            let line = line.map_err(|e| {
                PesError::Io("sample input".to_owned(), e.kind())
            })?;
            let data = match line.split_once('#') {
                Some((data, _comment)) => data,
                None => &line,
            };
            let fields: Vec<_> = data.split_whitespace().take(3).collect();
            if fields.is_empty() {
                continue;
            }
            if fields.len() < 3 {
                return Err(PesError::Parse {
                    line: i + 1,
                    msg: format!("expected 3 columns, found {}", fields.len()),
                });
            }
            let mut vals = [0.0; 3];
            for (v, s) in vals.iter_mut().zip(&fields) {
                *v = s.parse().map_err(|e| PesError::Parse {
                    line: i + 1,
                    msg: format!("failed to parse `{s}` with {e}"),
                })?;
            }
            let [x, y, v] = vals;
            ret.push(Sample::new(x, y, v));
        }
        Ok(Self(ret))
    }

    /// tabulate `f` over every combination of `xs` and `ys`, with x varying
    /// fastest
    pub fn tabulate<F>(xs: &[f64], ys: &[f64], f: F) -> Self
    where
        F: Fn(f64, f64) -> f64,
    {
        let mut ret = Vec::with_capacity(xs.len() * ys.len());
        for &y in ys {
            for &x in xs {
                ret.push(Sample::new(x, y, f(x, y)));
            }
        }
        Self(ret)
    }

    /// return a copy of `self` with every value multiplied by `c`
    pub fn scale(&self, c: f64) -> Self {
        Self(
            self.0
                .iter()
                .map(|s| Sample::new(s.x, s.y, c * s.v))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.0.iter()
    }
}

/// `n` evenly spaced values from `start` to `stop`, both inclusive
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut ret: Vec<_> =
                (0..n).map(|i| start + i as f64 * step).collect();
            ret[n - 1] = stop;
            ret
        }
    }
}
