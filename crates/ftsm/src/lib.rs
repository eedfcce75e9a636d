//! String method search for minimum energy paths on two-dimensional potential
//! energy surfaces. A straight [Path] between two endpoints is repeatedly
//! pushed downhill ([evolve]) and respaced uniformly along its arclength
//! ([Path::reparameterize]), and the lowest-energy string seen over a fixed
//! number of iterations is kept ([StringMethod]).

use std::error::Error;
use std::fmt::Display;

pub use pes::{Component, PesError, Point, SampleCloud, Surface};

pub mod config;
pub mod evolve;
pub mod export;
pub mod optimize;
pub mod path;

#[cfg(test)]
mod tests;

pub use config::{Config, Params};
pub use evolve::evolve;
pub use optimize::{Outcome, Phase, Snapshot, StringMethod};
pub use path::Path;

/// print the formatted message to stderr and exit with status 1
#[macro_export]
macro_rules! die {
    ($($t:tt)*) => {{
        eprintln!($($t)*);
        std::process::exit(1);
    }};
}

#[derive(Debug, PartialEq)]
pub enum StringError {
    /// failed to load or grid the surface
    Pes(PesError),

    /// consecutive points of the string coincide, or the arclength is not
    /// finite. `segment` is the index of the first bad segment
    DegenerateArclength { segment: usize },

    /// a point of the string left the sampled domain
    OutOfDomain { index: usize, point: Point },

    /// every gradient along the string vanished, so the step has no direction
    ZeroGradient,

    /// no iteration produced a finite score
    NoFiniteScore,
}

impl StringError {
    /// Returns `true` if the string error is [`DegenerateArclength`].
    ///
    /// [`DegenerateArclength`]: StringError::DegenerateArclength
    #[must_use]
    pub fn is_degenerate_arclength(&self) -> bool {
        matches!(self, Self::DegenerateArclength { .. })
    }

    /// Returns `true` if the string error is [`OutOfDomain`].
    ///
    /// [`OutOfDomain`]: StringError::OutOfDomain
    #[must_use]
    pub fn is_out_of_domain(&self) -> bool {
        matches!(self, Self::OutOfDomain { .. })
    }
}

impl Display for StringError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StringError::Pes(e) => write!(f, "{e}"),
            StringError::DegenerateArclength { segment } => write!(
                f,
                "degenerate arclength at segment {segment} of the string"
            ),
            StringError::OutOfDomain { index, point } => write!(
                f,
                "point {index} of the string ({}, {}) left the sampled domain",
                point.x, point.y
            ),
            StringError::ZeroGradient => {
                write!(f, "the gradient vanishes along the whole string")
            }
            StringError::NoFiniteScore => {
                write!(f, "no iteration produced a finite energy sum")
            }
        }
    }
}

impl Error for StringError {}

impl From<PesError> for StringError {
    fn from(e: PesError) -> Self {
        Self::Pes(e)
    }
}

/// run the string method on `surface` between the endpoints in `config`
pub fn run(surface: &Surface, config: &Config) -> Result<Outcome, StringError> {
    let bounds = surface.bounds();
    for (name, p) in [("start", config.start()), ("end", config.end())] {
        if !bounds.contains(&p) {
            log::warn!(
                "{name} point ({}, {}) lies outside of the surface {bounds}",
                p.x,
                p.y
            );
        }
    }
    StringMethod::new(surface, config.start(), config.end(), config.params())
        .run()
}

/// set the maximum number of threads used by rayon. 0 means to use as many
/// threads as there are CPUs
pub fn max_threads(n: usize) {
    let _ = rayon::ThreadPoolBuilder::new()
        .num_threads(n)
        .build_global();
}
