pub mod stage1_fetch;
pub mod stage2_label;
pub mod stage3_chart;
pub mod stage4_draw;

use crate::error::KpiError;
use crate::input::{CanonicalSource, SourceConfig, open_source};
use crate::report::theme::Theme;
use crate::report::variants::ReportDefinition;

use stage1_fetch::{or_empty, run_stage1};
use stage2_label::run_stage2;
use stage3_chart::{ChartSpec, run_stage3};
use stage4_draw::{RenderTarget, run_stage4};

/// Fetch, label and lay out one report without touching the drawing backend.
pub fn prepare_chart(
    source: &mut dyn CanonicalSource,
    report: &ReportDefinition,
) -> Result<ChartSpec, KpiError> {
    let records = or_empty(run_stage1(source, &report.request, report.slug))?;
    let labeled = run_stage2(&records, &report.label_measures())?;
    run_stage3(&labeled.records, &report.layout)
}

/// Full single-shot run. The source lives only for the fetch and is dropped on every path.
pub fn run_report(
    source_config: &SourceConfig,
    report: &ReportDefinition,
    theme: &Theme,
    target: &RenderTarget,
) -> Result<ChartSpec, KpiError> {
    tracing::info!(report = report.slug, "starting report");
    let chart = {
        let mut source = open_source(source_config)?;
        prepare_chart(source.as_mut(), report)?
    };
    run_stage4(&chart, theme, target)?;
    Ok(chart)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/mod.rs"]
mod tests;
