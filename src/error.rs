use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KpiError {
    #[error("KPI source unavailable: {0}")]
    DataUnavailable(String),

    #[error("no KPI records matched the filters for report {report}")]
    EmptyResult { report: String },

    #[error("log scale on the {axis} axis requires positive values, found {value}")]
    InvalidScale { axis: &'static str, value: f64 },

    #[error("record {entity} is missing measure {measure}")]
    MissingMeasure { entity: String, measure: String },

    #[error("malformed snapshot {} (line {line}): {reason}", .path.display())]
    Source {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("render failed: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl KpiError {
    pub fn is_empty_result(&self) -> bool {
        matches!(self, KpiError::EmptyResult { .. })
    }
}
