//! Command-line arguments shared by the binaries.

use std::path::{Path, PathBuf};

use clap::Args;

use crate::analysis::{PlotKind, WindowSpec};

/// Which part of the ledger history to plot
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct WindowArgs {
    /// Fractions of the sorted distinct update times, e.g. `-p 0.2 0.5`
    #[arg(short, long, num_args = 2, value_names = ["LO", "HI"], conflicts_with = "trange")]
    pub prange: Option<Vec<f64>>,

    /// Literal time range in seconds since the first update
    #[arg(short, long, num_args = 2, value_names = ["T0", "T1"], allow_negative_numbers = true)]
    pub trange: Option<Vec<f64>>,
}

impl WindowArgs {
    pub fn spec(&self) -> WindowSpec {
        match (&self.prange, &self.trange) {
            (Some(p), _) if p.len() == 2 => WindowSpec::Fraction(p[0], p[1]),
            (_, Some(t)) if t.len() == 2 => WindowSpec::Literal(t[0], t[1]),
            _ => WindowSpec::Full,
        }
    }
}

/// Output prefix `<dir>/<stem>-<kind>` for figures of `infile`
pub fn output_prefix(dir: &Path, infile: &Path, kind: PlotKind) -> PathBuf {
    let stem = infile
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("results");
    dir.join(format!("{}-{}", stem, kind))
}
