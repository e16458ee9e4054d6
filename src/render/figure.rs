//! Figure layout, computed before anything is drawn.
//!
//! Curves and markers are collected once per render; both figures are then
//! derived from the same collection so data-availability warnings are only
//! emitted once. All coordinates stored in a [`FigureModel`] are chart
//! coordinates: seconds on x, and either the raw debt ratio or its symlog
//! transform on y.

use std::collections::BTreeMap;
use std::ops::Range;

use log::{debug, warn};

use crate::analysis::{ColorPair, LedgerTable, PeerId, PlotColor, PlotPlan, TimeWindow};
use crate::config::RenderConfig;
use crate::error::{PlotError, PlotPhase};

pub(crate) const MARGIN: u32 = 10;
pub(crate) const X_LABEL_AREA: u32 = 40;
pub(crate) const Y_LABEL_AREA: u32 = 70;

pub const X_LABEL: &str = "time (seconds)";
pub const Y_LABEL: &str = "Debt Ratio";

/// Vertical scale of a figure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YScale {
    Linear,
    /// Symmetric log: linear near zero, logarithmic beyond the threshold
    SemiLog,
}

impl YScale {
    pub fn file_suffix(&self) -> &'static str {
        match self {
            YScale::Linear => "",
            YScale::SemiLog => "-semilog",
        }
    }

    pub(crate) fn configure_phase(&self) -> PlotPhase {
        match self {
            YScale::Linear => PlotPhase::ConfigureAxes,
            YScale::SemiLog => PlotPhase::ConfigureSemiLogAxes,
        }
    }

    pub(crate) fn post_plot_phase(&self) -> PlotPhase {
        match self {
            YScale::Linear => PlotPhase::PostPlot,
            YScale::SemiLog => PlotPhase::PostPlotSemiLog,
        }
    }
}

/// sign(y) * log10(1 + |y| / linthresh)
pub fn symlog(y: f64, linthresh: f64) -> f64 {
    y.signum() * (1.0 + y.abs() / linthresh).log10()
}

pub fn symlog_inverse(y: f64, linthresh: f64) -> f64 {
    y.signum() * linthresh * (10f64.powf(y.abs()) - 1.0)
}

/// Mantissa of a transfer volume: `x / 10^floor(log10 x)`, zero for `x <= 0`
pub fn marker_norm(x: f64) -> f64 {
    if x > 0.0 && x.is_finite() {
        x / 10f64.powf(x.log10().floor())
    } else {
        0.0
    }
}

/// A debt ratio curve on one axis
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub user: PeerId,
    pub peer: PeerId,
    pub label: String,
    pub color: PlotColor,
    pub points: Vec<(f64, f64)>,
}

/// Concentric markers at the last in-window update of an observed pair
#[derive(Debug, Clone, PartialEq)]
pub struct Dot {
    pub user: PeerId,
    pub peer: PeerId,
    pub time: f64,
    pub value: f64,
    /// Radius in pixels, proportional to the normalized bytes sent
    pub inner_radius: f64,
    /// Radius in pixels, proportional to normalized bytes sent plus received
    pub outer_radius: f64,
    /// Inner marker color first, outer marker color second
    pub colors: ColorPair,
}

/// Curves and markers of one axis, before any scale is applied
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AxisSeries {
    pub curves: Vec<Curve>,
    pub dots: Vec<Dot>,
}

/// Everything drawn in one render, grouped by axis
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSet {
    pub axes: Vec<AxisSeries>,
    /// Largest outer marker radius, in pixels
    pub max_extent: f64,
}

impl SeriesSet {
    /// Walk the ledger table once: one curve per ordered pair with data in the
    /// window, one marker pair per observed pair
    pub fn collect(
        ledgers: &LedgerTable,
        window: TimeWindow,
        plan: &PlotPlan,
        config: &RenderConfig,
    ) -> Self {
        let mut axes = vec![AxisSeries::default(); plan.num_axes];
        let mut cursor = vec![0usize; plan.num_axes];
        let cycles: Vec<Vec<PlotColor>> =
            (0..plan.num_axes).map(|axis| plan.axis_cycle(axis)).collect();
        let index: BTreeMap<&PeerId, usize> = ledgers
            .peer_ids()
            .into_iter()
            .enumerate()
            .map(|(i, id)| (id, i))
            .collect();
        let mut max_extent: f64 = 0.0;

        for (user, peer, entries) in ledgers.iter_series() {
            if user == peer {
                continue;
            }
            let in_window = window.slice(entries);
            if in_window.is_empty() {
                warn!(
                    "no data for peers {} ({}) and {} ({}) in {}",
                    index[user], user, index[peer], peer, window
                );
                continue;
            }
            let Some(axis) = plan.axis_for(user).filter(|&axis| axis < plan.num_axes) else {
                warn!("peer {} has no axis, skipping its curve for {}", user, peer);
                continue;
            };

            let cycle = &cycles[axis];
            let color = if cycle.is_empty() {
                PlotColor::Black
            } else {
                cycle[cursor[axis] % cycle.len()]
            };
            cursor[axis] += 1;

            axes[axis].curves.push(Curve {
                user: user.clone(),
                peer: peer.clone(),
                label: format!("Debt ratio of {} wrt {}", index[peer], index[user]),
                color,
                points: in_window.iter().map(|e| (e.time, e.value)).collect(),
            });

            if !plan.is_observed(user, peer) {
                continue;
            }
            let Some(colors) = plan.colors_for(user, peer) else {
                continue;
            };
            let Some(last) = in_window.last() else {
                continue;
            };
            let sent = marker_norm(last.sent);
            let recv = marker_norm(last.recv);
            let dot = Dot {
                user: user.clone(),
                peer: peer.clone(),
                time: last.time,
                value: last.value,
                inner_radius: sent * config.marker_scale / 2.0,
                outer_radius: (sent + recv) * config.marker_scale / 2.0,
                colors,
            };
            debug!(
                "marker for {} -> {} at t={} (radii {:.1}/{:.1} px)",
                user, peer, dot.time, dot.inner_radius, dot.outer_radius
            );
            max_extent = max_extent.max(dot.outer_radius);
            axes[axis].dots.push(dot);
        }

        Self { axes, max_extent }
    }
}

/// One sub-plot, in chart coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct AxisModel {
    pub title: Option<String>,
    pub curves: Vec<Curve>,
    pub dots: Vec<Dot>,
    /// Only the bottom axis carries the x label and tick labels
    pub show_x_labels: bool,
}

/// A complete figure ready to be drawn
#[derive(Debug, Clone, PartialEq)]
pub struct FigureModel {
    pub scale: YScale,
    pub title: String,
    pub y_label: String,
    pub x_range: Range<f64>,
    pub y_range: Range<f64>,
    pub axes: Vec<AxisModel>,
    pub width: u32,
    pub height: u32,
}

impl FigureModel {
    pub fn build(
        series: &SeriesSet,
        ledgers: &LedgerTable,
        window: TimeWindow,
        plan: &PlotPlan,
        config: &RenderConfig,
        scale: YScale,
    ) -> Result<Self, PlotError> {
        if plan.num_axes == 0 || series.axes.len() != plan.num_axes {
            return Err(PlotError::new(
                scale.configure_phase(),
                format!("cannot lay out a figure with {} axes", plan.num_axes),
            ));
        }

        let multi = plan.num_axes > 1;
        let (plot_w, plot_h) = plot_area(config, multi);

        let (mut x_lo, mut x_hi) = (window.start, window.end);
        if x_hi <= x_lo {
            x_lo -= 1.0;
            x_hi += 1.0;
        }
        x_hi += widen(series.max_extent, x_hi - x_lo, plot_w);

        let stats = ledgers.value_stats();
        let linthresh = config.symlog_linthresh;
        let (y_lo, y_hi) = match scale {
            YScale::Linear => {
                let (mut lo, mut hi) = match stats {
                    Some(s) => (
                        s.min - config.y_padding * s.mean,
                        s.max + config.y_padding * s.mean,
                    ),
                    None => (0.0, 1.0),
                };
                if hi <= lo {
                    lo -= 1.0;
                    hi += 1.0;
                }
                lo -= widen(series.max_extent, hi - lo, plot_h);
                (lo, hi)
            }
            YScale::SemiLog => {
                let (min, max) = stats.map(|s| (s.min, s.max)).unwrap_or((0.0, 1.0));
                let lo = symlog(min.min(0.0), linthresh);
                let mut hi = symlog(config.semilog_headroom * max, linthresh);
                if hi <= lo {
                    hi = lo + 1.0;
                }
                (lo, hi)
            }
        };

        let last = plan.num_axes - 1;
        let axes = series
            .axes
            .iter()
            .enumerate()
            .map(|(i, axis)| {
                let curves = match scale {
                    YScale::Linear => axis.curves.clone(),
                    YScale::SemiLog => axis
                        .curves
                        .iter()
                        .filter(|curve| {
                            let drawable = curve.points.iter().any(|&(_, y)| y != 0.0);
                            if !drawable {
                                warn!(
                                    "debt ratio of {} wrt {} is zero throughout {}, skipping it on the semi-log plot",
                                    curve.peer, curve.user, window
                                );
                            }
                            drawable
                        })
                        .map(|curve| Curve {
                            points: curve
                                .points
                                .iter()
                                .map(|&(x, y)| (x, symlog(y, linthresh)))
                                .collect(),
                            ..curve.clone()
                        })
                        .collect(),
                };
                let dots = match scale {
                    YScale::Linear => axis.dots.clone(),
                    YScale::SemiLog => axis
                        .dots
                        .iter()
                        .map(|dot| Dot {
                            value: symlog(dot.value, linthresh),
                            ..dot.clone()
                        })
                        .collect(),
                };
                AxisModel {
                    title: multi.then(|| format!("User {}", i)),
                    curves,
                    dots,
                    show_x_labels: i == last,
                }
            })
            .collect();

        let (title, y_label) = match scale {
            YScale::Linear => (plan.title.clone(), Y_LABEL.to_string()),
            YScale::SemiLog => (
                format!("{} (Semi-Log)", plan.title),
                format!("log({})", Y_LABEL),
            ),
        };

        Ok(Self {
            scale,
            title,
            y_label,
            x_range: x_lo..x_hi,
            y_range: y_lo..y_hi,
            axes,
            width: config.width,
            height: title_area(config) + config.axis_height * plan.num_axes as u32,
        })
    }

    pub fn curve_count(&self) -> usize {
        self.axes.iter().map(|axis| axis.curves.len()).sum()
    }

    pub fn dot_count(&self) -> usize {
        self.axes.iter().map(|axis| axis.dots.len()).sum()
    }
}

pub(crate) fn title_area(config: &RenderConfig) -> u32 {
    config.title_font_size * 2
}

pub(crate) fn caption_area(config: &RenderConfig) -> u32 {
    config.label_font_size + 2 * MARGIN
}

/// Approximate pixel size of one axis' plotting area
fn plot_area(config: &RenderConfig, with_caption: bool) -> (f64, f64) {
    let w = config.width.saturating_sub(2 * MARGIN + Y_LABEL_AREA);
    let mut h = config.axis_height.saturating_sub(2 * MARGIN + X_LABEL_AREA);
    if with_caption {
        h = h.saturating_sub(caption_area(config));
    }
    (f64::from(w.max(1)), f64::from(h.max(1)))
}

/// Data units to add to a range of `span` so `extent` pixels fit past its edge
fn widen(extent: f64, span: f64, plot_px: f64) -> f64 {
    if extent <= 0.0 {
        return 0.0;
    }
    if plot_px <= extent * 2.0 {
        return span;
    }
    extent * span / (plot_px - extent)
}
