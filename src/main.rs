use clap::Parser;
use color_eyre::eyre::{Report, WrapErr};
use color_eyre::Result;
use env_logger::Env;
use log::{error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use bitswap_plots::analysis::{self, LoadOptions, PlotKind};
use bitswap_plots::cli::{output_prefix, WindowArgs};
use bitswap_plots::config_loader;
use bitswap_plots::error::PlotError;
use bitswap_plots::render::Renderer;

/// Plot debt ratios recorded in a Bitswap experiment results file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Results file (JSON array of peers, or CSV ledger dump)
    infile: PathBuf,

    /// Plot every pair on one axis, or one axis per peer
    #[arg(short, long, value_enum, default_value_t = PlotKind::All)]
    kind: PlotKind,

    /// Do not display the figures
    #[arg(long, visible_alias = "no-plot")]
    no_show: bool,

    /// Save the figures next to the results file
    #[arg(short, long)]
    save: bool,

    #[command(flatten)]
    window: WindowArgs,

    /// Peer id list that CSV peer indices refer to, one id per line
    #[arg(long)]
    peers: Option<PathBuf>,

    /// Render style YAML file
    #[arg(long)]
    style: Option<PathBuf>,

    /// Write the plot plan as JSON
    #[arg(long)]
    plan_json: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    /// Where figures go, or None when nothing should be written
    fn figure_dir(&self) -> Result<Option<PathBuf>> {
        if self.save {
            let dir = self
                .infile
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            return Ok(Some(dir.to_path_buf()));
        }
        if self.no_show {
            return Ok(None);
        }
        let dir = std::env::temp_dir().join("bitswap-plots");
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create figure directory: {}", dir.display()))?;
        Ok(Some(dir))
    }
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let args = Args::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or(&args.log_level)).init();

    info!("Results file: {:?}", args.infile);

    let peer_ids = args
        .peers
        .as_deref()
        .map(analysis::load_peer_list)
        .transpose()
        .wrap_err("error loading peer id list")?;
    let results = analysis::load_with(&args.infile, &LoadOptions { peer_ids })
        .wrap_err("error loading results file")?;

    let window = args
        .window
        .spec()
        .resolve(&results.ledgers)
        .wrap_err("invalid time range")?;
    let plan = analysis::plan(&results.ledgers, window, &results.params, args.kind);

    analysis::print_summary(&results, &plan);

    if let Some(path) = &args.plan_json {
        analysis::write_plan_json(&plan, path)?;
    }

    let Some(dir) = args.figure_dir()? else {
        info!("Figures disabled");
        return Ok(());
    };

    let config = config_loader::load_or_default(args.style.as_deref())
        .wrap_err("error loading render style")?;
    let prefix = output_prefix(&dir, &args.infile, args.kind);

    let renderer = Renderer::new(config);
    let outcome = renderer.render(&results.ledgers, window, &plan, Some(prefix.as_path()));
    let written: Vec<PathBuf> = outcome.written().into_iter().map(Path::to_path_buf).collect();
    for e in outcome.into_errors() {
        error!("{:?}", plot_failure(e));
    }

    if written.is_empty() {
        warn!("No figures were written");
    } else if args.save {
        for path in written {
            info!("Saved {}", path.display());
        }
    } else {
        for path in written {
            info!("Figure available at {}", path.display());
        }
    }

    Ok(())
}

/// Report for a failed figure; its Debug output carries the cause chain and,
/// when enabled, a backtrace
fn plot_failure(e: PlotError) -> Report {
    Report::new(e).wrap_err("error plotting results")
}
