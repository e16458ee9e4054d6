//! Results loading and plot configuration for Bitswap debt ratio experiments.
//!
//! This module loads a results file into typed tables, selects the time
//! window to plot and decides which peer pairs are drawn on which axis in
//! which colors.

pub mod types;
pub mod timestamp;
pub mod loader;
pub mod csv_loader;
pub mod time_window;
pub mod plan;
pub mod report;

pub use types::*;
pub use loader::{load, load_peer_list, load_with, LoadOptions, ResultFormat};
pub use time_window::{find_time_range, TimeWindow, WindowError, WindowSpec};
pub use plan::{build_title, plan, ColorPair, ObservedPair, PlotColor, PlotPlan, COLOR_PAIRS};
pub use report::{peer_summaries, print_summary, summary_lines, write_plan_json, PeerSummary};
