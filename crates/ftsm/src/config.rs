//! Configuration settings for running the string method

use std::{
    error::Error,
    fmt::{Debug, Display},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::Point;

#[cfg(test)]
mod tests;

const DEFAULT_OUTPUT: &str = "final_string_coordinates.txt";

#[derive(Deserialize, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    /// The file containing the sampled potential energy surface, as
    /// whitespace-separated x, y, and energy columns. Every combination of the
    /// unique x and y values must be present exactly once.
    surface: String,

    /// The first endpoint of the string, as [x, y].
    start: [f64; 2],

    /// The second endpoint of the string, as [x, y].
    end: [f64; 2],

    /// Reserved for the finite-temperature variant of the method. It is
    /// reported in the output but has no effect on the optimization.
    #[serde(alias = "mu")]
    temperature_parameter: Option<f64>,

    /// The number of points used to discretize the string, including both
    /// endpoints. Defaults to 60.
    #[serde(alias = "npts")]
    point_count: Option<usize>,

    /// The number of evolution steps to take. There is no convergence check,
    /// so every step is always run, and the string with the lowest energy sum
    /// is reported. Defaults to 100.
    #[serde(alias = "stepmax")]
    max_iterations: Option<usize>,

    /// The distance moved by the point on the steepest part of the string in
    /// each step. Every other point moves proportionally less. Defaults to
    /// 0.01.
    step_size: Option<f64>,

    /// Stop with an error as soon as a point of the string leaves the sampled
    /// domain or the gradient vanishes along the whole string, instead of
    /// letting NaN values propagate. Defaults to false.
    strict: Option<bool>,

    /// The name of the tab-delimited file to write the final string to.
    /// Defaults to final_string_coordinates.txt.
    output: Option<String>,
}

#[derive(Debug)]
pub enum ConfigError {
    Io(String, std::io::ErrorKind),
    Toml(String),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(file, kind) => {
                write!(f, "failed to read config file {file}: {kind}")
            }
            ConfigError::Toml(e) => {
                write!(f, "failed to deserialize config file with {e}")
            }
            ConfigError::Invalid(e) => write!(f, "invalid config: {e}"),
        }
    }
}

impl Error for ConfigError {}

/// The settings of the optimization itself, split off of a [Config]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Params {
    /// reserved, never read by the optimization
    pub temperature_parameter: f64,
    pub point_count: usize,
    pub max_iterations: usize,
    pub step_size: f64,
    pub strict: bool,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            temperature_parameter: 9.0,
            point_count: 60,
            max_iterations: 100,
            step_size: 0.01,
            strict: false,
        }
    }
}

/// Construct a full `Config` using [Config::load] on a TOML file or use
/// [Config::new] and the Builder pattern
#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
#[serde(from = "RawConfig")]
pub struct Config {
    /// the sampled surface to load
    pub surface: String,

    /// the first endpoint of the string
    pub start: [f64; 2],

    /// the second endpoint of the string
    pub end: [f64; 2],

    /// `mu` in the finite-temperature string method. reserved
    pub temperature_parameter: f64,

    /// number of points on the string
    pub point_count: usize,

    /// number of evolution steps
    pub max_iterations: usize,

    /// largest displacement of any point in one step
    pub step_size: f64,

    /// whether to fail fast when the string leaves the surface
    pub strict: bool,

    /// file name for the tab-delimited final string
    pub output: String,
}

impl From<RawConfig> for Config {
    fn from(rc: RawConfig) -> Self {
        let d = Params::default();
        Self {
            surface: rc.surface,
            start: rc.start,
            end: rc.end,
            temperature_parameter: rc
                .temperature_parameter
                .unwrap_or(d.temperature_parameter),
            point_count: rc.point_count.unwrap_or(d.point_count),
            max_iterations: rc.max_iterations.unwrap_or(d.max_iterations),
            step_size: rc.step_size.unwrap_or(d.step_size),
            strict: rc.strict.unwrap_or(d.strict),
            output: rc.output.unwrap_or_else(|| DEFAULT_OUTPUT.to_owned()),
        }
    }
}

macro_rules! usize_builders {
    ($($name: ident$(,)*)*) => {
        $(pub fn $name(mut self, i: usize) -> Self {
            self.$name = i;
            self
        })*
    }
}

impl Config {
    /// Construct a [Config] with default values for `temperature_parameter`
    /// (9.0), `point_count` (60), `max_iterations` (100), `step_size` (0.01),
    /// `strict` (false), and `output` (final_string_coordinates.txt)
    pub fn new(
        surface: impl Into<String>,
        start: [f64; 2],
        end: [f64; 2],
    ) -> Self {
        let d = Params::default();
        Self {
            surface: surface.into(),
            start,
            end,
            temperature_parameter: d.temperature_parameter,
            point_count: d.point_count,
            max_iterations: d.max_iterations,
            step_size: d.step_size,
            strict: d.strict,
            output: DEFAULT_OUTPUT.to_owned(),
        }
    }

    usize_builders!(point_count, max_iterations);

    pub fn step_size(mut self, step_size: f64) -> Self {
        self.step_size = step_size;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }

    /// load a [Config] from the TOML file specified by `filename` and check
    /// that its settings make sense
    pub fn load<P>(filename: P) -> Result<Self, ConfigError>
    where
        P: AsRef<Path> + Debug,
    {
        let contents = std::fs::read_to_string(&filename).map_err(|e| {
            ConfigError::Io(format!("{filename:?}"), e.kind())
        })?;
        let ret: Self = toml::from_str(&contents)
            .map_err(|e| ConfigError::Toml(e.to_string()))?;
        ret.validate()?;
        Ok(ret)
    }

    /// check that the settings in `self` make any sense
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.point_count < 2 {
            return Err(ConfigError::Invalid(format!(
                "point_count must be at least 2, got {}",
                self.point_count
            )));
        }
        if !(self.step_size.is_finite() && self.step_size > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "step_size must be positive, got {}",
                self.step_size
            )));
        }
        if self.start.iter().chain(&self.end).any(|v| !v.is_finite()) {
            return Err(ConfigError::Invalid(
                "endpoints must be finite".to_owned(),
            ));
        }
        if self.start == self.end {
            return Err(ConfigError::Invalid(
                "start and end must be different points".to_owned(),
            ));
        }
        Ok(())
    }

    pub fn start(&self) -> Point {
        Point::new(self.start[0], self.start[1])
    }

    pub fn end(&self) -> Point {
        Point::new(self.end[0], self.end[1])
    }

    pub fn params(&self) -> Params {
        Params {
            temperature_parameter: self.temperature_parameter,
            point_count: self.point_count,
            max_iterations: self.max_iterations,
            step_size: self.step_size,
            strict: self.strict,
        }
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Config {
            surface,
            start,
            end,
            temperature_parameter,
            point_count,
            max_iterations,
            step_size,
            strict,
            output,
        } = self;
        write!(
            f,
            "
Configuration Options:
surface = {surface}
start = {start:?}
end = {end:?}
temperature_parameter = {temperature_parameter:?} (reserved)
point_count = {point_count}
max_iterations = {max_iterations}
step_size = {step_size:?}
strict = {strict}
output = {output}
"
        )
    }
}
