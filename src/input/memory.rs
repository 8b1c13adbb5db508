use crate::error::KpiError;
use crate::input::{CanonicalRow, CanonicalSource};
use crate::model::measures::MeasureSpec;

/// Fixed canonical rows held in memory; used for snapshots and injected test data.
#[derive(Debug, Clone)]
pub struct MemorySource {
    name: String,
    rows: Vec<CanonicalRow>,
}

impl MemorySource {
    #[cfg(test)]
    pub fn new(rows: Vec<CanonicalRow>) -> Self {
        Self::named("memory".to_string(), rows)
    }

    pub fn named(name: String, rows: Vec<CanonicalRow>) -> Self {
        Self { name, rows }
    }
}

impl CanonicalSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_rows(&mut self, spec: &MeasureSpec) -> Result<Vec<CanonicalRow>, KpiError> {
        Ok(self
            .rows
            .iter()
            .filter(|row| row.matches(spec))
            .cloned()
            .collect())
    }
}
