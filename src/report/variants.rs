use crate::model::layout::{AxisScale, ChartLayout, Dimension, ReferenceAxis};
use crate::model::measures::{FREQUENCY_ALIAS, KpiRequest, MeasureSpec, SEVERITY_ALIAS};
use crate::model::thresholds::SupportProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    SeverityVolume,
    FrequencySeverity,
}

impl ReportKind {
    pub fn all() -> &'static [ReportKind] {
        &[ReportKind::SeverityVolume, ReportKind::FrequencySeverity]
    }
}

/// One pipeline instantiation: what to fetch, which measures to label, how to plot.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDefinition {
    pub kind: ReportKind,
    pub slug: &'static str,
    pub file_stem: &'static str,
    pub request: KpiRequest,
    pub layout: ChartLayout,
}

impl ReportDefinition {
    pub fn build(kind: ReportKind, profile: &SupportProfile) -> Self {
        match kind {
            ReportKind::SeverityVolume => Self::severity_volume(profile),
            ReportKind::FrequencySeverity => Self::frequency_severity(profile),
        }
    }

    /// Structural severity profile: severity against operated flights on a log axis.
    pub fn severity_volume(profile: &SupportProfile) -> Self {
        Self {
            kind: ReportKind::SeverityVolume,
            slug: "severity-volume",
            file_stem: "severity_vs_volume",
            request: KpiRequest {
                measures: vec![MeasureSpec::severity(profile)],
            },
            layout: ChartLayout {
                title: "Structural Delay Severity vs Flight Volume".to_string(),
                x_label: "Operated Flights (log scale)".to_string(),
                y_label: "Average Delay Severity (minutes)".to_string(),
                x: Dimension::Support,
                y: Dimension::Measure(SEVERITY_ALIAS.to_string()),
                x_scale: AxisScale::Log,
                reference_lines: vec![ReferenceAxis::Y],
                marker_alpha: 0.6,
                label_offset: (5, 5),
                label_font_pt: 8.0,
            },
        }
    }

    pub fn frequency_severity(profile: &SupportProfile) -> Self {
        Self {
            kind: ReportKind::FrequencySeverity,
            slug: "frequency-severity",
            file_stem: "frequency_vs_severity",
            request: KpiRequest {
                measures: vec![MeasureSpec::severity(profile), MeasureSpec::frequency(profile)],
            },
            layout: ChartLayout {
                title: "Delay Frequency vs Delay Severity — Airports and Airlines".to_string(),
                x_label: "Delay Frequency (%)".to_string(),
                y_label: "Average Delay Severity (minutes)".to_string(),
                x: Dimension::Measure(FREQUENCY_ALIAS.to_string()),
                y: Dimension::Measure(SEVERITY_ALIAS.to_string()),
                x_scale: AxisScale::Linear,
                reference_lines: vec![ReferenceAxis::X, ReferenceAxis::Y],
                marker_alpha: 0.7,
                label_offset: (4, 4),
                label_font_pt: 8.0,
            },
        }
    }

    pub fn label_measures(&self) -> Vec<String> {
        self.request.aliases()
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/variants.rs"]
mod tests;
