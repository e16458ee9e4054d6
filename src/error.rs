//! Error types shared by the loader and the renderer.

use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

/// Errors that can occur while loading a results file
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unexpected record shape in {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed CSV in {path}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("peer id must be a string or an integer, got {value}")]
    InvalidPeerId { value: String },

    #[error("duplicate record for peer {id}")]
    DuplicatePeer { id: String },

    #[error("{field} entry {index} of peer {peer} has an unexpected shape: {reason}")]
    Record {
        peer: String,
        field: &'static str,
        index: usize,
        reason: String,
    },

    #[error("invalid timestamp {value} in history entry {index} of peer {peer}")]
    Timestamp {
        peer: String,
        index: usize,
        value: String,
    },

    #[error("peer index {index} is out of range for a list of {count} peer ids")]
    PeerIndex { index: String, count: usize },
}

pub type LoadResult<T> = Result<T, LoadError>;

/// Rendering phase an error occurred in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotPhase {
    ConfigureAxes,
    ConfigureSemiLogAxes,
    DrawSeries,
    PostPlot,
    PostPlotSemiLog,
    Save,
}

impl fmt::Display for PlotPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = match self {
            PlotPhase::ConfigureAxes => "configuring plot axes",
            PlotPhase::ConfigureSemiLogAxes => "configuring semi-log plot axes",
            PlotPhase::DrawSeries => "drawing series",
            PlotPhase::PostPlot => "configuring axis post-plot",
            PlotPhase::PostPlotSemiLog => "configuring semi-log axis post-plot",
            PlotPhase::Save => "saving figure",
        };
        f.write_str(phase)
    }
}

/// A figure failed; carries the phase plus the underlying cause
#[derive(Debug, thiserror::Error)]
#[error("error {phase}")]
pub struct PlotError {
    pub phase: PlotPhase,
    #[source]
    pub source: Box<dyn StdError + Send + Sync + 'static>,
}

impl PlotError {
    pub fn new<E>(phase: PlotPhase, source: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync + 'static>>,
    {
        Self {
            phase,
            source: source.into(),
        }
    }
}
