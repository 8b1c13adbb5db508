/// p10/p90 pair for one measure, computed once per run.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelThreshold {
    pub measure: String,
    pub low: f64,
    pub high: f64,
}

impl LabelThreshold {
    /// Both tails are inclusive.
    pub fn is_tail(&self, value: f64) -> bool {
        value <= self.low || value >= self.high
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupportProfile {
    pub min_severity_support: u64,
    pub min_frequency_support: u64,
}

impl SupportProfile {
    pub fn default_v1() -> Self {
        Self {
            min_severity_support: 5000,
            min_frequency_support: 1000,
        }
    }
}

impl Default for SupportProfile {
    fn default() -> Self {
        Self::default_v1()
    }
}
