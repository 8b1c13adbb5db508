use std::fs;
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::coord::ranged1d::{AsRangedCoord, ValueFormatter};
use plotters::prelude::*;

use crate::error::KpiError;
use crate::model::layout::{AxisScale, ReferenceAxis};
use crate::pipeline::stage3_chart::ChartSpec;
use crate::report::theme::{MarkerShape, Theme};

pub const DEFAULT_SIZE: (u32, u32) = (1200, 800);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Svg,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderTarget {
    pub path: PathBuf,
    pub format: OutputFormat,
    pub size: (u32, u32),
}

impl RenderTarget {
    pub fn in_dir(out_dir: &Path, file_stem: &str, format: OutputFormat, size: (u32, u32)) -> Self {
        Self {
            path: out_dir.join(format!("{file_stem}.{}", format.extension())),
            format,
            size,
        }
    }
}

pub fn run_stage4(chart: &ChartSpec, theme: &Theme, target: &RenderTarget) -> Result<(), KpiError> {
    if let Some(parent) = target.path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    match target.format {
        OutputFormat::Png => {
            let root = BitMapBackend::new(&target.path, target.size).into_drawing_area();
            draw_chart(&root, chart, theme)?;
            root.present().map_err(render_err)?;
        }
        OutputFormat::Svg => {
            let root = SVGBackend::new(&target.path, target.size).into_drawing_area();
            draw_chart(&root, chart, theme)?;
            root.present().map_err(render_err)?;
        }
    }

    tracing::info!(
        path = %target.path.display(),
        points = chart.point_count(),
        annotations = chart.annotations.len(),
        "chart written"
    );
    Ok(())
}

pub fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &ChartSpec,
    theme: &Theme,
) -> Result<(), KpiError> {
    root.fill(&theme.figure_background).map_err(render_err)?;
    let (x0, x1) = chart.x_range;
    match chart.x_scale {
        AxisScale::Linear => draw_on_axes(root, chart, theme, x0..x1),
        AxisScale::Log => draw_on_axes(root, chart, theme, (x0..x1).log_scale()),
    }
}

fn draw_on_axes<DB, X>(
    root: &DrawingArea<DB, Shift>,
    chart: &ChartSpec,
    theme: &Theme,
    x_spec: X,
) -> Result<(), KpiError>
where
    DB: DrawingBackend,
    X: AsRangedCoord<Value = f64>,
    X::CoordDescType: ValueFormatter<f64>,
{
    let fg = theme.foreground;
    let family = theme.font_family;
    let (x0, x1) = chart.x_range;
    let (y0, y1) = chart.y_range;

    let mut ctx = ChartBuilder::on(root)
        .caption(
            &chart.title,
            (family, theme.title_font_px).into_font().color(&fg),
        )
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d(x_spec, y0..y1)
        .map_err(render_err)?;

    ctx.plotting_area()
        .fill(&theme.axes_background)
        .map_err(render_err)?;

    let grid = fg.mix(theme.grid_alpha);
    let log_formatter = |v: &f64| format!("{:.0}", v);
    let mut mesh = ctx.configure_mesh();
    mesh.x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .axis_style(&fg)
        .bold_line_style(&grid)
        .light_line_style(&fg.mix(0.0))
        .label_style((family, theme.tick_font_px).into_font().color(&fg))
        .axis_desc_style((family, theme.axis_font_px).into_font().color(&fg));
    if chart.x_scale == AxisScale::Log {
        mesh.x_label_formatter(&log_formatter);
    }
    mesh.draw().map_err(render_err)?;

    for line in &chart.reference_lines {
        let points = match line.axis {
            ReferenceAxis::X => vec![(line.value, y0), (line.value, y1)],
            ReferenceAxis::Y => vec![(x0, line.value), (x1, line.value)],
        };
        ctx.draw_series(DashedLineSeries::new(
            points,
            6,
            4,
            fg.stroke_width(theme.reference_line_width),
        ))
        .map_err(render_err)?;
    }

    for series in &chart.series {
        let style = theme.series_style(series.entity_type);
        let fill = style.color.mix(series.alpha).filled();
        let size = style.size;
        let points = series.points.iter().copied();
        let anno = match style.marker {
            MarkerShape::Circle => ctx
                .draw_series(points.map(|p| Circle::new(p, size, fill)))
                .map_err(render_err)?,
            MarkerShape::Triangle => ctx
                .draw_series(points.map(|p| TriangleMarker::new(p, size, fill)))
                .map_err(render_err)?,
        };
        anno.label(series.label);
        match style.marker {
            MarkerShape::Circle => anno.legend(move |(x, y)| Circle::new((x, y), size, fill)),
            MarkerShape::Triangle => {
                anno.legend(move |(x, y)| TriangleMarker::new((x, y), size, fill))
            }
        };
    }

    ctx.draw_series(chart.annotations.iter().map(|a| {
        let font = (family, a.font_px).into_font().color(&fg);
        EmptyElement::at(a.at) + Text::new(a.text.clone(), (a.offset_px.0, -a.offset_px.1), font)
    }))
    .map_err(render_err)?;

    ctx.configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&theme.legend_background)
        .border_style(&theme.legend_border)
        .label_font((family, theme.tick_font_px).into_font().color(&fg))
        .draw()
        .map_err(render_err)?;

    Ok(())
}

fn render_err<E: std::fmt::Display>(err: E) -> KpiError {
    KpiError::Render(err.to_string())
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_draw.rs"]
mod tests;
