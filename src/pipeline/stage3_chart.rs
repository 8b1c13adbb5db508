use crate::error::KpiError;
use crate::model::entity::{EntityType, KpiRecord, entity_order};
use crate::model::flags::FlaggedRecord;
use crate::model::layout::{AxisScale, ChartLayout, Dimension, ReferenceAxis};
use crate::report::median;

/// Output resolution; the figure is 12x8 inches at this density.
pub const DPI: f64 = 100.0;

const LINEAR_PAD: f64 = 0.05;
const LOG_PAD: f64 = 1.25;

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub entity_type: EntityType,
    pub label: &'static str,
    pub points: Vec<(f64, f64)>,
    pub alpha: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub text: String,
    pub at: (f64, f64),
    /// Pixel offset, right and up.
    pub offset_px: (i32, i32),
    pub font_px: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceLine {
    pub axis: ReferenceAxis,
    pub value: f64,
}

/// Everything the drawing stage needs, already validated.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x_scale: AxisScale,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    pub series: Vec<ChartSeries>,
    pub annotations: Vec<Annotation>,
    pub reference_lines: Vec<ReferenceLine>,
}

impl ChartSpec {
    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }
}

pub fn run_stage3(flagged: &[FlaggedRecord], layout: &ChartLayout) -> Result<ChartSpec, KpiError> {
    let mut series: Vec<ChartSeries> = entity_order()
        .iter()
        .map(|&entity_type| ChartSeries {
            entity_type,
            label: entity_type.plural_label(),
            points: Vec::new(),
            alpha: layout.marker_alpha,
        })
        .collect();

    let offset_px = (
        points_to_px(layout.label_offset.0 as f64).round() as i32,
        points_to_px(layout.label_offset.1 as f64).round() as i32,
    );
    let font_px = points_to_px(layout.label_font_pt);

    let mut annotations = Vec::new();
    for f in flagged {
        let x = dimension_value(&f.record, &layout.x)?;
        let y = dimension_value(&f.record, &layout.y)?;
        if let Some(s) = series
            .iter_mut()
            .find(|s| s.entity_type == f.record.entity_type)
        {
            s.points.push((x, y));
        }
        if f.is_outlier {
            annotations.push(Annotation {
                text: f.record.entity_code.clone(),
                at: (x, y),
                offset_px,
                font_px,
            });
        }
    }

    let reference_lines = reference_lines(flagged, layout)?;
    validate_scale(layout.x_scale, &series, &reference_lines)?;

    let xs = series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.0))
        .chain(axis_lines(&reference_lines, ReferenceAxis::X))
        .collect::<Vec<_>>();
    let ys = series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.1))
        .chain(axis_lines(&reference_lines, ReferenceAxis::Y))
        .collect::<Vec<_>>();

    Ok(ChartSpec {
        title: layout.title.clone(),
        x_label: layout.x_label.clone(),
        y_label: layout.y_label.clone(),
        x_scale: layout.x_scale,
        x_range: axis_range(&xs, layout.x_scale),
        y_range: axis_range(&ys, AxisScale::Linear),
        series,
        annotations,
        reference_lines,
    })
}

pub fn points_to_px(pt: f64) -> f64 {
    pt * DPI / 72.0
}

/// Medians are taken over every record, not only the flagged ones.
fn reference_lines(
    flagged: &[FlaggedRecord],
    layout: &ChartLayout,
) -> Result<Vec<ReferenceLine>, KpiError> {
    let mut out = Vec::with_capacity(layout.reference_lines.len());
    for &axis in &layout.reference_lines {
        let dim = match axis {
            ReferenceAxis::X => &layout.x,
            ReferenceAxis::Y => &layout.y,
        };
        let values = flagged
            .iter()
            .map(|f| dimension_value(&f.record, dim))
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(value) = median(&values) {
            out.push(ReferenceLine { axis, value });
        }
    }
    Ok(out)
}

fn validate_scale(
    scale: AxisScale,
    series: &[ChartSeries],
    lines: &[ReferenceLine],
) -> Result<(), KpiError> {
    if scale != AxisScale::Log {
        return Ok(());
    }
    let bad = series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.0))
        .chain(axis_lines(lines, ReferenceAxis::X))
        .find(|&x| x <= 0.0 || !x.is_finite());
    match bad {
        Some(value) => Err(KpiError::InvalidScale { axis: "x", value }),
        None => Ok(()),
    }
}

fn axis_lines(lines: &[ReferenceLine], axis: ReferenceAxis) -> impl Iterator<Item = f64> + '_ {
    lines.iter().filter(move |l| l.axis == axis).map(|l| l.value)
}

fn dimension_value(record: &KpiRecord, dim: &Dimension) -> Result<f64, KpiError> {
    dim.value_of(record).ok_or_else(|| KpiError::MissingMeasure {
        entity: record.display_key(),
        measure: dim.name().to_string(),
    })
}

pub fn axis_range(values: &[f64], scale: AxisScale) -> (f64, f64) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    match scale {
        AxisScale::Linear => {
            if values.is_empty() {
                return (0.0, 1.0);
            }
            let span = max - min;
            if span <= 0.0 {
                let pad = (min.abs() * LINEAR_PAD).max(1.0);
                return (min - pad, max + pad);
            }
            (min - span * LINEAR_PAD, max + span * LINEAR_PAD)
        }
        AxisScale::Log => {
            if values.is_empty() {
                return (1.0, 10.0);
            }
            if max <= min {
                return (min / 10.0, max * 10.0);
            }
            (min / LOG_PAD, max * LOG_PAD)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_chart.rs"]
mod tests;
