use std::collections::BTreeMap;

use crate::error::KpiError;
use crate::input::{CanonicalRow, CanonicalSource};
use crate::model::entity::{EntityKey, KpiRecord};
use crate::model::measures::{Aggregation, KpiRequest, MeasureSpec};

/// Per-entity value of one measure family after aggregation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FamilyValue {
    pub value: f64,
    pub support: u64,
}

pub type FamilyTable = BTreeMap<EntityKey, FamilyValue>;

/// Fetches every family of `request` independently, aggregates, and inner-joins on
/// `(entity_type, entity_code)`. Records come back sorted by that key.
pub fn run_stage1(
    source: &mut dyn CanonicalSource,
    request: &KpiRequest,
    report: &str,
) -> Result<Vec<KpiRecord>, KpiError> {
    let mut families = Vec::with_capacity(request.measures.len());
    for spec in &request.measures {
        let rows = source.fetch_rows(spec)?;
        let table = aggregate_family(spec, &rows);
        tracing::info!(
            source = source.name(),
            family = %spec.family,
            kpi = %spec.kpi_name,
            min_support = spec.min_support,
            rows = rows.len(),
            entities = table.len(),
            "fetched measure family"
        );
        families.push((spec.alias.as_str(), table));
    }

    let records = join_families(&families);
    if families.len() > 1 {
        tracing::info!(entities = records.len(), "joined measure families");
    }
    if records.is_empty() {
        return Err(KpiError::EmptyResult {
            report: report.to_string(),
        });
    }
    Ok(records)
}

/// Collapses rows to one value per entity. Rows are assumed to already satisfy the family's
/// support filter.
pub fn aggregate_family(spec: &MeasureSpec, rows: &[CanonicalRow]) -> FamilyTable {
    let mut out = FamilyTable::new();
    match spec.aggregation {
        Aggregation::None => {
            for row in rows {
                let key = (row.entity_type, row.entity_code.clone());
                if out.contains_key(&key) {
                    tracing::warn!(
                        family = %spec.family,
                        entity = %row.entity_code,
                        "duplicate row for unaggregated family; keeping first"
                    );
                    continue;
                }
                out.insert(
                    key,
                    FamilyValue {
                        value: row.kpi_value,
                        support: row.operated_flights,
                    },
                );
            }
        }
        Aggregation::Mean => {
            let mut acc: BTreeMap<EntityKey, (f64, usize, u64)> = BTreeMap::new();
            for row in rows {
                let entry = acc
                    .entry((row.entity_type, row.entity_code.clone()))
                    .or_insert((0.0, 0, 0));
                entry.0 += row.kpi_value;
                entry.1 += 1;
                entry.2 = entry.2.saturating_add(row.operated_flights);
            }
            for (key, (sum, count, support)) in acc {
                out.insert(
                    key,
                    FamilyValue {
                        value: sum / count as f64,
                        support,
                    },
                );
            }
        }
    }
    out
}

/// Inner join. `support` is taken from the first family.
pub fn join_families(families: &[(&str, FamilyTable)]) -> Vec<KpiRecord> {
    let Some(((_, primary), rest)) = families.split_first() else {
        return Vec::new();
    };

    let mut records = Vec::with_capacity(primary.len());
    'entities: for (key, primary_value) in primary {
        let mut measures = BTreeMap::new();
        measures.insert(families[0].0.to_string(), primary_value.value);
        for (alias, table) in rest {
            match table.get(key) {
                Some(v) => {
                    measures.insert(alias.to_string(), v.value);
                }
                None => continue 'entities,
            }
        }
        records.push(KpiRecord {
            entity_type: key.0,
            entity_code: key.1.clone(),
            measures,
            support: primary_value.support,
        });
    }
    records
}

/// `EmptyResult` is not fatal: the chart is still drawn, just without points.
pub fn or_empty(result: Result<Vec<KpiRecord>, KpiError>) -> Result<Vec<KpiRecord>, KpiError> {
    match result {
        Err(err) if err.is_empty_result() => {
            tracing::warn!("{err}; rendering an empty chart");
            Ok(Vec::new())
        }
        other => other,
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage1_fetch.rs"]
mod tests;
