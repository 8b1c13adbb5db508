use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityType {
    Airport,
    Airline,
}

impl EntityType {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityType::Airport => "airport",
            EntityType::Airline => "airline",
        }
    }

    /// Legend label for the plotted series.
    pub fn plural_label(self) -> &'static str {
        match self {
            EntityType::Airport => "Airports",
            EntityType::Airline => "Airlines",
        }
    }
}

/// Series order on every chart.
pub fn entity_order() -> &'static [EntityType] {
    &[EntityType::Airport, EntityType::Airline]
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "airport" => Ok(EntityType::Airport),
            "airline" => Ok(EntityType::Airline),
            other => Err(format!("unknown entity_type: {other}")),
        }
    }
}

pub type EntityKey = (EntityType, String);

#[derive(Debug, Clone, PartialEq)]
pub struct KpiRecord {
    pub entity_type: EntityType,
    pub entity_code: String,
    pub measures: BTreeMap<String, f64>,
    pub support: u64,
}

impl KpiRecord {
    pub fn measure(&self, name: &str) -> Option<f64> {
        self.measures.get(name).copied()
    }

    pub fn display_key(&self) -> String {
        format!("{}:{}", self.entity_type, self.entity_code)
    }
}
