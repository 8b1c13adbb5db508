pub mod theme;
pub mod variants;

/// Percentile with linear interpolation between order statistics: rank `p * (n - 1)`.
/// Returns `None` for an empty slice.
pub fn quantile_linear(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let rank = (sorted.len() - 1) as f64 * p.clamp(0.0, 1.0);
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(sorted[lo] + frac * (sorted[hi] - sorted[lo]))
}

pub fn median(values: &[f64]) -> Option<f64> {
    quantile_linear(values, 0.5)
}

pub fn p10(values: &[f64]) -> Option<f64> {
    quantile_linear(values, 0.10)
}

pub fn p90(values: &[f64]) -> Option<f64> {
    quantile_linear(values, 0.90)
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/mod.rs"]
mod tests;
