//! Plain-text and JSON reporting of loaded results and plot plans.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use color_eyre::eyre::{Context, Result};
use serde::Serialize;

use super::plan::PlotPlan;
use super::time_window::TimeWindow;
use super::types::*;
use crate::utils::format_bytes;

/// Per-peer counts for the results summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeerSummary {
    pub id: PeerId,
    pub uploads: usize,
    pub dl_times: usize,
    /// Peers this peer keeps a ledger for
    pub ledgers: usize,
    /// Ledger updates inside the window
    pub updates_in_window: usize,
    /// Mean debt ratio over those updates
    pub mean_debt_ratio: Option<f64>,
}

/// One row per peer seen anywhere in the results, sorted by id
pub fn peer_summaries(results: &Results, window: TimeWindow) -> Vec<PeerSummary> {
    let mut ids: BTreeSet<&PeerId> = results.ledgers.peer_ids();
    ids.extend(results.params.iter().map(|p| &p.id));
    ids.extend(results.uploads.iter().map(|u| &u.peer));
    ids.extend(results.dl_times.iter().map(|d| &d.peer));

    ids.into_iter()
        .map(|id| {
            let mut ledgers = 0;
            let mut count = 0;
            let mut sum = 0.0;
            for (_, entries) in results.ledgers.peers_of(id) {
                ledgers += 1;
                for entry in window.slice(entries) {
                    count += 1;
                    sum += entry.value;
                }
            }
            PeerSummary {
                id: id.clone(),
                uploads: results.uploads.iter().filter(|u| &u.peer == id).count(),
                dl_times: results.dl_times.iter().filter(|d| &d.peer == id).count(),
                ledgers,
                updates_in_window: count,
                mean_debt_ratio: (count > 0).then(|| sum / count as f64),
            }
        })
        .collect()
}

/// Summary of the loaded results and the plot plan
pub fn summary_lines(results: &Results, plan: &PlotPlan) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();

    lines.push("=".repeat(72));
    lines.push("                      BITSWAP DEBT RATIO SUMMARY".to_string());
    lines.push("=".repeat(72));
    lines.push(String::new());

    lines.push(format!("Title: {}", plan.title));
    lines.push(format!("Peers with parameters: {}", results.params.len()));
    lines.push(format!("Peers in ledgers: {}", results.ledgers.peer_ids().len()));
    lines.push(format!("Uploads: {}", results.uploads.len()));
    lines.push(format!("Download times: {}", results.dl_times.len()));
    lines.push(format!("Ledger updates: {}", results.ledgers.len()));
    if let Some(t0) = results.t0 {
        lines.push(format!("First update: {}", t0.to_rfc3339()));
    }
    if let Some(stats) = results.ledgers.value_stats() {
        lines.push(format!(
            "Debt ratio: min {:.3}, max {:.3}, mean {:.3}",
            stats.min, stats.max, stats.mean
        ));
    }
    lines.push(String::new());

    lines.push(format!("Window: {} ({:.1}s)", plan.window, plan.window.span()));
    lines.push(format!("Kind: {}", plan.kind));
    lines.push(format!("Axes: {}", plan.num_axes));
    lines.push(format!("Peer pairs: {}", plan.pairs));
    lines.push(String::new());

    if plan.observed.is_empty() {
        lines.push("No ledger updates in the window".to_string());
        return lines;
    }

    lines.push("Observed pairs (final in-window state):".to_string());
    for pair in &plan.observed {
        let last = results
            .ledgers
            .series(&pair.user, &pair.peer)
            .and_then(|entries| plan.window.slice(entries).last());
        match last {
            Some(entry) => lines.push(format!(
                "  {} -> {} [{}]: ratio {:.3}, sent {}, received {}",
                pair.user,
                pair.peer,
                pair.color,
                entry.value,
                format_bytes(entry.sent),
                format_bytes(entry.recv)
            )),
            None => lines.push(format!("  {} -> {} [{}]", pair.user, pair.peer, pair.color)),
        }
    }

    lines
}

/// Print the results and plan summary to stdout
pub fn print_summary(results: &Results, plan: &PlotPlan) {
    for line in summary_lines(results, plan) {
        println!("{}", line);
    }
}

/// Write the plot plan as pretty JSON
pub fn write_plan_json(plan: &PlotPlan, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(plan).context("Failed to serialize plot plan to JSON")?;

    fs::write(output_path, json)
        .with_context(|| format!("Failed to write plot plan to {}", output_path.display()))?;

    log::info!("Plot plan written to {}", output_path.display());
    Ok(())
}
