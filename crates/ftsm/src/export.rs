//! Writing the final string to disk

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};

use serde::Serialize;

use crate::{Component, Outcome, Surface};

/// A point of the final string with its interpolated energy
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct StringPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Summary of a finished run, in the form written to the output files
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    pub best_iteration: usize,
    pub best_score: f64,
    pub initial_score: f64,
    pub scores: Vec<f64>,
    pub points: Vec<StringPoint>,
}

impl Report {
    pub fn new(outcome: &Outcome, surface: &Surface) -> Self {
        let path = outcome.best.path.points();
        let zs = surface.eval(Component::Value, path);
        Self {
            best_iteration: outcome.best.iteration,
            best_score: outcome.best.score,
            initial_score: outcome.initial_score,
            scores: outcome.scores.clone(),
            points: path
                .iter()
                .zip(zs)
                .map(|(p, z)| StringPoint { x: p.x, y: p.y, z })
                .collect(),
        }
    }

    /// write the points of the string as a whitespace-aligned table
    pub fn write_table<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        writeln!(w, "{:>5}{:>15}{:>15}{:>20}", "Point", "X", "Y", "Z")?;
        for (i, p) in self.points.iter().enumerate() {
            writeln!(w, "{:5}{:15.8}{:15.8}{:20.12}", i, p.x, p.y, p.z)?;
        }
        Ok(())
    }
}

/// A destination for a finished [Report]
pub trait Exporter {
    fn export(&self, report: &Report) -> std::io::Result<()>;
}

/// Tab-delimited `X Y Z` rows with a commented header line
pub struct TsvExporter {
    path: PathBuf,
}

impl TsvExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Exporter for TsvExporter {
    fn export(&self, report: &Report) -> std::io::Result<()> {
        let mut w = BufWriter::new(File::create(&self.path)?);
        writeln!(w, "# X\tY\tZ")?;
        for StringPoint { x, y, z } in &report.points {
            writeln!(w, "{x:.8}\t{y:.8}\t{z:.8}")?;
        }
        w.flush()
    }
}

/// The whole [Report] as pretty-printed JSON
pub struct JsonExporter {
    path: PathBuf,
}

impl JsonExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Exporter for JsonExporter {
    fn export(&self, report: &Report) -> std::io::Result<()> {
        let mut f = File::create(&self.path)?;
        writeln!(f, "{}", serde_json::to_string_pretty(report)?)?;
        Ok(())
    }
}
