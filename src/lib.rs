//! # bitswap-plots - Debt ratio analysis for Bitswap ledger experiments
//!
//! This library loads the results of a Bitswap exchange experiment and plots
//! how each peer's debt ratio towards every other peer evolves over time.
//!
//! ## Overview
//!
//! Every peer in an experiment records a ledger per partner: a running debt
//! ratio plus the cumulative bytes sent and received. A results file collects
//! those ledger histories along with each peer's experiment parameters,
//! uploaded blocks and block download times.
//!
//! ## Key Features
//!
//! - **Result Loading**: JSON results arrays and CSV ledger dumps, with
//!   timestamps normalized to seconds since the first update
//! - **Time Windows**: full history, fractional slices or literal time ranges
//! - **Plot Planning**: pair discovery, stable pairwise colors and axis layout
//! - **Rendering**: linear and symmetric-log PDF figures with transfer volume
//!   markers
//!
//! ## Architecture
//!
//! - `analysis`: Result tables, loaders, time windows, plot plans and reports
//! - `render`: Figure layout, SVG drawing and PDF output
//! - `config`: Render style and its validation
//! - `config_loader`: YAML loading of the render style
//! - `cli`: Command-line arguments shared by the binaries
//! - `error`: Load and plot error types
//! - `utils`: Formatting helpers
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use bitswap_plots::analysis::{self, PlotKind, WindowSpec};
//! use bitswap_plots::render::Renderer;
//!
//! let results = analysis::load(Path::new("results.json"))?;
//! let window = WindowSpec::Full.resolve(&results.ledgers)?;
//! let plan = analysis::plan(&results.ledgers, window, &results.params, PlotKind::All);
//!
//! // Writes results-all.pdf and results-all-semilog.pdf
//! let outcome = Renderer::default().render(
//!     &results.ledgers,
//!     window,
//!     &plan,
//!     Some(Path::new("results-all")),
//! );
//! assert!(outcome.is_ok());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Results Format
//!
//! A JSON results file is an array with one object per peer:
//!
//! ```json
//! [
//!   {
//!     "id": "QmA",
//!     "strategy": "ratio",
//!     "upload_bandwidth": 100,
//!     "round_burst": 8,
//!     "uploads": ["QmBlock1"],
//!     "dl_times": [{"block": "QmBlock2", "time": 0.42}],
//!     "history": [
//!       {"peer": "QmB", "time": "2019-05-01T10:00:00Z", "value": 1.0, "sent": 0, "recv": 0}
//!     ]
//!   }
//! ]
//! ```
//!
//! ## Error Handling
//!
//! Library errors are `thiserror` enums. Loading fails with a [`error::LoadError`];
//! each figure fails independently with a [`error::PlotError`] tagged with the
//! rendering phase. The binaries report errors through `color_eyre`.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod config_loader;
pub mod error;
pub mod render;
pub mod utils;
