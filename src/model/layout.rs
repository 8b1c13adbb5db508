use crate::model::entity::KpiRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dimension {
    Measure(String),
    /// Operated flights backing the record.
    Support,
}

impl Dimension {
    pub fn value_of(&self, record: &KpiRecord) -> Option<f64> {
        match self {
            Dimension::Measure(name) => record.measure(name),
            Dimension::Support => Some(record.support as f64),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Dimension::Measure(name) => name,
            Dimension::Support => "operated_flights",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisScale {
    Linear,
    Log,
}

/// Which axis a median reference line belongs to. `X` draws a vertical line, `Y` a horizontal one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceAxis {
    X,
    Y,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x: Dimension,
    pub y: Dimension,
    pub x_scale: AxisScale,
    pub reference_lines: Vec<ReferenceAxis>,
    pub marker_alpha: f64,
    /// Annotation offset in points, right and up from the marker.
    pub label_offset: (i32, i32),
    pub label_font_pt: f64,
}
