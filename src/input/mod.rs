use std::path::{Path, PathBuf};

pub mod memory;
pub mod postgres;
pub mod snapshot;

use crate::error::KpiError;
use crate::model::entity::EntityType;
use crate::model::measures::MeasureSpec;

use memory::MemorySource;
use postgres::PostgresSource;
use snapshot::load_snapshot;

pub const DEFAULT_TABLE: &str = "mart.kpi_delay_canonical";

/// One row of the canonical KPI table.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRow {
    pub entity_type: EntityType,
    pub entity_code: String,
    pub kpi_family: String,
    pub kpi_name: String,
    pub kpi_value: f64,
    pub operated_flights: u64,
}

impl CanonicalRow {
    /// Predicate applied by every backend for one measure query.
    pub fn matches(&self, spec: &MeasureSpec) -> bool {
        self.kpi_family == spec.family
            && self.kpi_name == spec.kpi_name
            && self.operated_flights >= spec.min_support
    }
}

/// Null and non-finite KPI values are dropped by every backend.
pub fn finite_value(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Read-only access to the canonical table. One call per measure family.
pub trait CanonicalSource {
    fn name(&self) -> &str;

    fn fetch_rows(&mut self, spec: &MeasureSpec) -> Result<Vec<CanonicalRow>, KpiError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    Postgres { url: String, table: String },
    Snapshot { path: PathBuf },
}

pub fn open_source(config: &SourceConfig) -> Result<Box<dyn CanonicalSource>, KpiError> {
    match config {
        SourceConfig::Postgres { url, table } => {
            tracing::info!(table = %table, "connecting to canonical KPI table");
            Ok(Box::new(PostgresSource::connect(url, table)?))
        }
        SourceConfig::Snapshot { path } => {
            tracing::info!(path = %path.display(), "loading canonical KPI snapshot");
            let rows = load_snapshot(path)?;
            Ok(Box::new(MemorySource::named(snapshot_name(path), rows)))
        }
    }
}

fn snapshot_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
