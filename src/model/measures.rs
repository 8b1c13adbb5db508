use crate::model::thresholds::SupportProfile;

pub const SEVERITY_ALIAS: &str = "avg_delay_severity_min";
pub const FREQUENCY_ALIAS: &str = "delay_frequency_pct";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    /// One row per entity is expected; duplicates keep the first row.
    None,
    /// Rows are averaged per entity after the support filter.
    Mean,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeasureSpec {
    pub family: String,
    pub kpi_name: String,
    pub alias: String,
    pub min_support: u64,
    pub aggregation: Aggregation,
}

impl MeasureSpec {
    pub fn severity(profile: &SupportProfile) -> Self {
        Self {
            family: "severity".to_string(),
            kpi_name: "avg_delay_severity_[min]".to_string(),
            alias: SEVERITY_ALIAS.to_string(),
            min_support: profile.min_severity_support,
            aggregation: Aggregation::None,
        }
    }

    pub fn frequency(profile: &SupportProfile) -> Self {
        Self {
            family: "frequency".to_string(),
            kpi_name: "delayed_flights_pct".to_string(),
            alias: FREQUENCY_ALIAS.to_string(),
            min_support: profile.min_frequency_support,
            aggregation: Aggregation::Mean,
        }
    }
}

/// Ordered measure families; the first one is primary and supplies `support` after a join.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiRequest {
    pub measures: Vec<MeasureSpec>,
}

impl KpiRequest {
    pub fn aliases(&self) -> Vec<String> {
        self.measures.iter().map(|m| m.alias.clone()).collect()
    }
}
