//! SVG drawing of a laid-out figure.

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{FontDesc, FontFamily, FontStyle};

use super::figure::{
    symlog_inverse, AxisModel, FigureModel, YScale, MARGIN, X_LABEL, X_LABEL_AREA, Y_LABEL_AREA,
};
use crate::analysis::PlotColor;
use crate::config::RenderConfig;
use crate::error::{PlotError, PlotPhase};

fn rgb(color: PlotColor) -> RGBColor {
    let (r, g, b) = color.rgb();
    RGBColor(r, g, b)
}

fn font(size: u32) -> FontDesc<'static> {
    FontDesc::new(FontFamily::SansSerif, f64::from(size), FontStyle::Normal)
}

/// Tick label for a value on the symlog axis
fn symlog_tick(v: f64, linthresh: f64) -> String {
    let value = symlog_inverse(v, linthresh);
    if value.abs() >= 1000.0 {
        format!("{:.0e}", value)
    } else if value.abs() >= 10.0 || value == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

/// Draw `figure` as an SVG document
pub fn render_svg(figure: &FigureModel, config: &RenderConfig) -> Result<String, PlotError> {
    let configure = figure.scale.configure_phase();
    let mut svg = String::new();

    {
        let root = SVGBackend::with_string(&mut svg, (figure.width, figure.height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(|e| PlotError::new(configure, e))?;
        let body = root
            .titled(&figure.title, font(config.title_font_size))
            .map_err(|e| PlotError::new(configure, e))?;

        let areas = body.split_evenly((figure.axes.len(), 1));
        for (area, axis) in areas.iter().zip(&figure.axes) {
            draw_axis(area, axis, figure, config)?;
        }

        root.present().map_err(|e| PlotError::new(PlotPhase::Save, e))?;
    }

    Ok(svg)
}

fn draw_axis(
    area: &DrawingArea<SVGBackend<'_>, Shift>,
    axis: &AxisModel,
    figure: &FigureModel,
    config: &RenderConfig,
) -> Result<(), PlotError> {
    let configure = figure.scale.configure_phase();
    let post = figure.scale.post_plot_phase();

    let mut builder = ChartBuilder::on(area);
    builder
        .margin(MARGIN)
        .x_label_area_size(X_LABEL_AREA)
        .y_label_area_size(Y_LABEL_AREA);
    if let Some(title) = &axis.title {
        builder.caption(title, font(config.label_font_size));
    }
    let mut chart = builder
        .build_cartesian_2d(figure.x_range.clone(), figure.y_range.clone())
        .map_err(|e| PlotError::new(configure, e))?;

    let linthresh = config.symlog_linthresh;
    let scale = figure.scale;
    let y_ticks = move |v: &f64| match scale {
        YScale::Linear => format!("{:.2}", v),
        YScale::SemiLog => symlog_tick(*v, linthresh),
    };
    let x_ticks = |v: &f64| format!("{:.0}", v);
    let hidden = |_: &f64| String::new();

    {
        let mut mesh = chart.configure_mesh();
        mesh.y_desc(figure.y_label.as_str())
            .y_label_formatter(&y_ticks)
            .label_style(font(config.label_font_size))
            .axis_desc_style(font(config.label_font_size));
        if axis.show_x_labels {
            mesh.x_desc(X_LABEL).x_label_formatter(&x_ticks);
        } else {
            mesh.x_label_formatter(&hidden);
        }
        mesh.draw().map_err(|e| PlotError::new(configure, e))?;
    }

    for curve in &axis.curves {
        let color = rgb(curve.color);
        chart
            .draw_series(LineSeries::new(
                curve.points.iter().copied(),
                color.stroke_width(config.line_width),
            ))
            .map_err(|e| PlotError::new(PlotPhase::DrawSeries, e))?
            .label(curve.label.as_str())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
    }

    // outer marker first so the inner one stays visible
    for dot in &axis.dots {
        let at = (dot.time, dot.value);
        let mut markers = Vec::with_capacity(4);
        for (radius, color) in [
            (dot.outer_radius, rgb(dot.colors.second)),
            (dot.inner_radius, rgb(dot.colors.first)),
        ] {
            if radius > 0.0 {
                markers.push(Circle::new(at, radius, color.filled()));
                markers.push(Circle::new(at, radius, BLACK.stroke_width(1)));
            }
        }
        chart
            .draw_series(markers)
            .map_err(|e| PlotError::new(PlotPhase::DrawSeries, e))?;
    }

    if !axis.curves.is_empty() {
        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .label_font(font(config.label_font_size))
            .position(SeriesLabelPosition::UpperLeft)
            .draw()
            .map_err(|e| PlotError::new(post, e))?;
    }

    Ok(())
}
