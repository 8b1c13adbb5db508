use crate::error::KpiError;
use crate::model::entity::KpiRecord;
use crate::model::flags::{FlaggedRecord, outlier_codes};
use crate::model::thresholds::LabelThreshold;
use crate::report::{p10, p90};

#[derive(Debug, Clone, PartialEq)]
pub struct Labeled {
    pub records: Vec<FlaggedRecord>,
    pub thresholds: Vec<LabelThreshold>,
}

pub fn compute_thresholds(
    records: &[KpiRecord],
    measures: &[String],
) -> Result<Vec<LabelThreshold>, KpiError> {
    let mut out = Vec::with_capacity(measures.len());
    for measure in measures {
        let values = measure_values(records, measure)?;
        let (Some(low), Some(high)) = (p10(&values), p90(&values)) else {
            continue;
        };
        out.push(LabelThreshold {
            measure: measure.clone(),
            low,
            high,
        });
    }
    Ok(out)
}

/// Flags a record when any requested measure sits in either tail. Input order is preserved.
pub fn run_stage2(records: &[KpiRecord], measures: &[String]) -> Result<Labeled, KpiError> {
    if records.is_empty() {
        return Ok(Labeled {
            records: Vec::new(),
            thresholds: Vec::new(),
        });
    }

    let thresholds = compute_thresholds(records, measures)?;
    for t in &thresholds {
        tracing::info!(measure = %t.measure, p10 = t.low, p90 = t.high, "label thresholds");
    }

    let mut flagged = Vec::with_capacity(records.len());
    for record in records {
        let mut is_outlier = false;
        for t in &thresholds {
            let value = record
                .measure(&t.measure)
                .ok_or_else(|| missing(record, &t.measure))?;
            if t.is_tail(value) {
                is_outlier = true;
            }
        }
        flagged.push(FlaggedRecord {
            record: record.clone(),
            is_outlier,
        });
    }

    let codes = outlier_codes(&flagged);
    tracing::info!(
        flagged = codes.len(),
        total = flagged.len(),
        codes = %codes.join(","),
        "labelled outliers"
    );

    Ok(Labeled {
        records: flagged,
        thresholds,
    })
}

fn measure_values(records: &[KpiRecord], measure: &str) -> Result<Vec<f64>, KpiError> {
    records
        .iter()
        .map(|r| r.measure(measure).ok_or_else(|| missing(r, measure)))
        .collect()
}

fn missing(record: &KpiRecord, measure: &str) -> KpiError {
    KpiError::MissingMeasure {
        entity: record.display_key(),
        measure: measure.to_string(),
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_label.rs"]
mod tests;
