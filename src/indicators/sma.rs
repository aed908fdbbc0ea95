// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================

use super::align;

/// Rolling mean of `closes` over `period` values, one output per close
/// starting at index `period - 1`.
///
/// Uses a running sum, so each step is O(1).
pub fn calculate_sma(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() < period {
        return Vec::new();
    }

    let period_f = period as f64;
    let mut sum: f64 = closes[..period].iter().sum();
    let mut result = Vec::with_capacity(closes.len() - period + 1);
    result.push(sum / period_f);

    for i in period..closes.len() {
        sum += closes[i] - closes[i - period];
        result.push(sum / period_f);
    }

    result
}

/// SMA aligned to `closes`: `None` before index `period - 1`.
pub fn sma_column(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    align(calculate_sma(closes, period), period.saturating_sub(1), closes.len())
}
