use crate::model::entity::KpiRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct FlaggedRecord {
    pub record: KpiRecord,
    pub is_outlier: bool,
}

pub fn outlier_codes(flagged: &[FlaggedRecord]) -> Vec<&str> {
    flagged
        .iter()
        .filter(|f| f.is_outlier)
        .map(|f| f.record.entity_code.as_str())
        .collect()
}
