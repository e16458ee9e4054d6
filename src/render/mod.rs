//! Debt ratio figures.
//!
//! A render produces two figures from one [`PlotPlan`]: the linear one and a
//! semi-log one using a symmetric-log y axis. Each figure is laid out as a
//! [`FigureModel`] first and only then drawn, so a failure in one figure
//! never prevents the other. Figures are drawn as SVG and saved as PDF.

pub mod draw;
pub mod figure;
pub mod pdf;

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::analysis::{LedgerTable, PlotPlan, TimeWindow};
use crate::config::RenderConfig;
use crate::error::{PlotError, PlotPhase};

pub use figure::{
    marker_norm, symlog, symlog_inverse, AxisModel, Curve, Dot, FigureModel, SeriesSet, YScale,
};

/// Result of one figure: the written file, if an output prefix was given
pub type FigureResult = Result<Option<PathBuf>, PlotError>;

/// Per-figure results of a render
#[derive(Debug)]
pub struct RenderOutcome {
    pub linear: FigureResult,
    pub semilog: FigureResult,
}

impl RenderOutcome {
    pub fn is_ok(&self) -> bool {
        self.linear.is_ok() && self.semilog.is_ok()
    }

    /// Files that were written successfully
    pub fn written(&self) -> Vec<&Path> {
        [&self.linear, &self.semilog]
            .into_iter()
            .filter_map(|result| result.as_ref().ok().and_then(|path| path.as_deref()))
            .collect()
    }

    pub fn errors(&self) -> impl Iterator<Item = &PlotError> {
        [&self.linear, &self.semilog]
            .into_iter()
            .filter_map(|result| result.as_ref().err())
    }

    /// Take the failures, linear figure first
    pub fn into_errors(self) -> Vec<PlotError> {
        [self.linear, self.semilog]
            .into_iter()
            .filter_map(Result::err)
            .collect()
    }
}

/// `<prefix>.pdf` or `<prefix>-semilog.pdf`
pub fn output_path(prefix: &Path, scale: YScale) -> PathBuf {
    let mut name = OsString::from(prefix.as_os_str());
    name.push(scale.file_suffix());
    name.push(".pdf");
    PathBuf::from(name)
}

/// Draws debt ratio figures with a fixed style
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Lay out both figures without drawing them
    pub fn layout(
        &self,
        ledgers: &LedgerTable,
        window: TimeWindow,
        plan: &PlotPlan,
    ) -> (Result<FigureModel, PlotError>, Result<FigureModel, PlotError>) {
        let series = SeriesSet::collect(ledgers, window, plan, &self.config);
        let build = |scale| FigureModel::build(&series, ledgers, window, plan, &self.config, scale);
        (build(YScale::Linear), build(YScale::SemiLog))
    }

    /// Lay out both figures and, with a prefix, write them as PDF files
    pub fn render(
        &self,
        ledgers: &LedgerTable,
        window: TimeWindow,
        plan: &PlotPlan,
        output_prefix: Option<&Path>,
    ) -> RenderOutcome {
        info!(
            "Rendering {} plot over {} ({} axes, {} peer pairs)",
            plan.kind, window, plan.num_axes, plan.pairs
        );
        let (linear, semilog) = self.layout(ledgers, window, plan);

        RenderOutcome {
            linear: self.finish(linear, output_prefix, YScale::Linear),
            semilog: self.finish(semilog, output_prefix, YScale::SemiLog),
        }
    }

    fn finish(
        &self,
        figure: Result<FigureModel, PlotError>,
        output_prefix: Option<&Path>,
        scale: YScale,
    ) -> FigureResult {
        let figure = figure?;
        let Some(prefix) = output_prefix else {
            debug!(
                "{:?} figure laid out with {} curves, not written",
                scale,
                figure.curve_count()
            );
            return Ok(None);
        };
        let path = output_path(prefix, scale);
        let svg = draw::render_svg(&figure, &self.config)?;
        let document = pdf::svg_to_pdf(&svg)?;
        fs::write(&path, document).map_err(|e| PlotError::new(PlotPhase::Save, e))?;
        info!("Wrote {}", path.display());
        Ok(Some(path))
    }
}
