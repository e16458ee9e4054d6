//! Inspection CLI for Bitswap experiment results.
//!
//! Prints per-peer statistics, exports the reshaped ledger table as CSV and
//! dumps plot plans without rendering anything.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result};

use bitswap_plots::analysis::{self, csv_loader, LoadOptions, PlotKind, Results, TimeWindow};
use bitswap_plots::cli::WindowArgs;

#[derive(Parser)]
#[command(name = "results-info")]
#[command(about = "Inspect Bitswap experiment results files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Results file (JSON array of peers, or CSV ledger dump)
    #[arg(short, long)]
    input: PathBuf,

    /// Peer id list that CSV peer indices refer to, one id per line
    #[arg(long)]
    peers: Option<PathBuf>,

    #[command(flatten)]
    window: WindowArgs,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Show per-peer counts and window statistics
    Summary {
        /// Print the rows as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Write the ledger table in the CSV results format
    ExportLedgers {
        /// Output CSV file
        output: PathBuf,
    },

    /// Print the plot plan for the window as JSON
    Plan {
        #[arg(short, long, value_enum, default_value_t = PlotKind::All)]
        kind: PlotKind,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    let peer_ids = cli
        .peers
        .as_deref()
        .map(analysis::load_peer_list)
        .transpose()
        .context("error loading peer id list")?;
    let results = analysis::load_with(&cli.input, &LoadOptions { peer_ids })
        .context("error loading results file")?;
    let window = cli
        .window
        .spec()
        .resolve(&results.ledgers)
        .context("invalid time range")?;

    match cli.command {
        Commands::Summary { json } => print_peer_summary(&results, window, json)?,
        Commands::ExportLedgers { output } => {
            let rows = csv_loader::write_csv(&results, &output)
                .with_context(|| format!("Failed to export ledgers to {}", output.display()))?;
            println!("Exported {} ledger updates to {}", rows, output.display());
        }
        Commands::Plan { kind } => {
            let plan = analysis::plan(&results.ledgers, window, &results.params, kind);
            let json =
                serde_json::to_string_pretty(&plan).context("Failed to serialize plot plan")?;
            println!("{}", json);
        }
    }

    Ok(())
}

fn print_peer_summary(results: &Results, window: TimeWindow, json: bool) -> Result<()> {
    let summaries = analysis::peer_summaries(results, window);

    if json {
        let out = serde_json::to_string_pretty(&summaries).context("Failed to serialize summary")?;
        println!("{}", out);
        return Ok(());
    }

    println!("Window: {}", window);
    println!(
        "{:<48} {:>8} {:>10} {:>8} {:>10} {:>12}",
        "PEER", "UPLOADS", "DL_TIMES", "LEDGERS", "UPDATES", "MEAN RATIO"
    );
    for row in &summaries {
        let mean = row
            .mean_debt_ratio
            .map(|m| format!("{:.3}", m))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<48} {:>8} {:>10} {:>8} {:>10} {:>12}",
            row.id, row.uploads, row.dl_times, row.ledgers, row.updates_in_window, mean
        );
    }
    println!("{} peers", summaries.len());
    Ok(())
}
