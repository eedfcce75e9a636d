use std::fmt::Display;

use crate::{Component, Params, Path, Point, StringError, Surface, evolve};

/// The lowest-scoring string seen so far
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub iteration: usize,
    pub score: f64,
    pub path: Path,
}

/// Where a [StringMethod] is in its fixed iteration budget
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Initialized,
    Iterating,
    Converged,
}

impl Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Phase::Initialized => "initialized",
                Phase::Iterating => "iterating",
                Phase::Converged => "converged",
            }
        )
    }
}

/// The result of a completed [StringMethod] run
#[derive(Clone, Debug, PartialEq)]
pub struct Outcome {
    pub best: Snapshot,

    /// score of the straight starting string
    pub initial_score: f64,

    /// score after each iteration
    pub scores: Vec<f64>,
}

/// sum of the interpolated energy at each point of `path`
pub fn score(surface: &Surface, path: &Path) -> f64 {
    surface.eval(Component::Value, path.points()).iter().sum()
}

/// Drives a string through `params.max_iterations` rounds of [evolve] and
/// [Path::reparameterize], keeping the best [Snapshot]
pub struct StringMethod<'a> {
    surface: &'a Surface,
    params: Params,
    path: Path,
    phase: Phase,
    iteration: usize,
    best: Option<Snapshot>,
    scores: Vec<f64>,
}

impl<'a> StringMethod<'a> {
    /// start from `params.point_count` points on the segment from `start` to
    /// `end`
    pub fn new(
        surface: &'a Surface,
        start: Point,
        end: Point,
        params: Params,
    ) -> Self {
        let path = Path::linear(start, end, params.point_count);
        Self::with_path(surface, path, params)
    }

    pub fn with_path(surface: &'a Surface, path: Path, params: Params) -> Self {
        Self {
            surface,
            params,
            path,
            phase: Phase::Initialized,
            iteration: 0,
            best: None,
            scores: Vec::with_capacity(params.max_iterations),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// the live string, which is not necessarily the best one
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn best(&self) -> Option<&Snapshot> {
        self.best.as_ref()
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    /// Run a single iteration and return the score of the new string, or
    /// `None` once the iteration budget is spent
    pub fn step(&mut self) -> Result<Option<f64>, StringError> {
        if self.iteration >= self.params.max_iterations {
            self.phase = Phase::Converged;
            return Ok(None);
        }
        self.phase = Phase::Iterating;
        let evolved = evolve(self.surface, &self.path, &self.params)?;
        // a string that left the surface stays NaN for the rest of the run,
        // and its NaN scores never replace the best snapshot
        let lost = evolved.iter().any(|p| p.x.is_nan() || p.y.is_nan());
        self.path = if lost && !self.params.strict {
            evolved
        } else {
            evolved.reparameterize()?
        };

        let values = self.surface.eval(Component::Value, self.path.points());
        if let Some(index) = values.iter().position(|v| v.is_nan()) {
            if self.params.strict {
                return Err(StringError::OutOfDomain {
                    index,
                    point: self.path.points()[index],
                });
            }
            log::warn!(
                "point {index} left the surface on iteration {}",
                self.iteration
            );
        }
        let score: f64 = values.iter().sum();

        // an empty snapshot stands in for +inf, which NaN never beats
        let best = self.best.as_ref().map_or(f64::INFINITY, |b| b.score);
        let improved = score < best;
        log::debug!(
            "iteration {:5} sum = {score:20.12}{}",
            self.iteration,
            if improved { " *" } else { "" }
        );
        if improved {
            self.best = Some(Snapshot {
                iteration: self.iteration,
                score,
                path: self.path.clone(),
            });
        }
        self.scores.push(score);
        self.iteration += 1;
        if self.iteration == self.params.max_iterations {
            self.phase = Phase::Converged;
        }
        Ok(Some(score))
    }

    /// run every remaining iteration and return the best string seen
    pub fn run(mut self) -> Result<Outcome, StringError> {
        let initial_score = score(self.surface, &self.path);
        log::info!(
            "starting {} iterations with {} points, initial sum = \
             {initial_score:.8}",
            self.params.max_iterations,
            self.path.len(),
        );
        while self.step()?.is_some() {}
        let best = self.best.ok_or(StringError::NoFiniteScore)?;
        log::info!(
            "best iteration: {} with free energy sum: {}",
            best.iteration,
            best.score
        );
        Ok(Outcome {
            best,
            initial_score,
            scores: self.scores,
        })
    }
}
