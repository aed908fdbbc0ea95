// =============================================================================
// Relative Strength Index (RSI) — Wilder's smoothing
// =============================================================================
//
// Average up-move and down-move start as plain means over the first `period`
// changes, then roll forward as
//   avg = (avg * (period - 1) + move) / period
// and RSI = 100 - 100 / (1 + avg_up / avg_down).
// =============================================================================

use super::align;

/// Look-back used by the chart's RSI panel.
pub const RSI_PERIOD: usize = 14;

/// Wilder RSI over `closes`, one value per close from index `period` on.
///
/// Empty when `period` is zero or there are not `period + 1` closes. The
/// series stops early if a value comes out non-finite.
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() <= period {
        return Vec::new();
    }

    let n = period as f64;
    let mut changes = closes.windows(2).map(|w| w[1] - w[0]);

    let (up_sum, down_sum) = changes
        .by_ref()
        .take(period)
        .fold((0.0_f64, 0.0_f64), |(up, down), c| {
            (up + c.max(0.0), down + (-c).max(0.0))
        });
    let mut avg_up = up_sum / n;
    let mut avg_down = down_sum / n;

    let mut out = Vec::with_capacity(closes.len() - period);
    let Some(first) = rsi_from_averages(avg_up, avg_down) else {
        return out;
    };
    out.push(first);

    for c in changes {
        avg_up = (avg_up * (n - 1.0) + c.max(0.0)) / n;
        avg_down = (avg_down * (n - 1.0) + (-c).max(0.0)) / n;
        match rsi_from_averages(avg_up, avg_down) {
            Some(v) => out.push(v),
            None => break,
        }
    }

    out
}

/// RSI aligned to `closes`: `None` for the first `period` rows.
pub fn rsi_column(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    align(calculate_rsi(closes, period), period, closes.len())
}

// =============================================================================
// Internal helpers
// =============================================================================

/// A flat window reads 50, a window with no down moves reads 100.
fn rsi_from_averages(avg_up: f64, avg_down: f64) -> Option<f64> {
    let rsi = match (avg_up == 0.0, avg_down == 0.0) {
        (true, true) => 50.0,
        (false, true) => 100.0,
        _ => 100.0 - 100.0 / (1.0 + avg_up / avg_down),
    };
    rsi.is_finite().then_some(rsi)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_few_closes_yield_nothing() {
        assert!(calculate_rsi(&[], RSI_PERIOD).is_empty());
        assert!(calculate_rsi(&[1.0, 2.0, 3.0], 0).is_empty());
        let fourteen: Vec<f64> = (1..=14).map(f64::from).collect();
        assert!(calculate_rsi(&fourteen, RSI_PERIOD).is_empty());
    }

    #[test]
    fn one_way_markets_pin_the_extremes() {
        let rising: Vec<f64> = (1..=30).map(f64::from).collect();
        let up = calculate_rsi(&rising, RSI_PERIOD);
        assert_eq!(up.len(), 16);
        assert!(up.iter().all(|v| (v - 100.0).abs() < 1e-10));

        let falling: Vec<f64> = rising.iter().rev().copied().collect();
        assert!(calculate_rsi(&falling, RSI_PERIOD).iter().all(|v| v.abs() < 1e-10));

        assert!(calculate_rsi(&[100.0; 30], RSI_PERIOD)
            .iter()
            .all(|v| (v - 50.0).abs() < 1e-10));
    }

    #[test]
    fn rsi_wilder_reference_values() {
        // Classic period-14 worked example, unrounded intermediates.
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
            45.61, 46.28, 46.28, 46.00, 46.03, 46.41, 46.22, 45.64,
        ];
        let series = calculate_rsi(&closes, 14);
        assert_eq!(series.len(), 6);
        assert!((series[0] - 70.464).abs() < 0.01, "got {}", series[0]);
        assert!((series[1] - 66.250).abs() < 0.01, "got {}", series[1]);
        for &v in &series {
            assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
        }
    }

    #[test]
    fn column_leaves_first_period_rows_blank() {
        let closes: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        let col = rsi_column(&closes, RSI_PERIOD);
        assert_eq!(col.len(), 20);
        assert!(col[..14].iter().all(Option::is_none));
        assert!(col[14..].iter().all(Option::is_some));
    }

    #[test]
    fn column_has_no_look_ahead() {
        // Appending future closes never changes earlier rows.
        let closes: Vec<f64> = (0..80)
            .map(|i| 100.0 + (i as f64 * 0.45).sin() * 3.0 + (i % 5) as f64 * 0.2)
            .collect();
        let short = rsi_column(&closes[..50], RSI_PERIOD);
        let long = rsi_column(&closes, RSI_PERIOD);
        assert_eq!(short[..], long[..50]);
        assert!(short[14..].iter().all(Option::is_some));
    }

    #[test]
    fn column_is_all_blank_when_short() {
        let col = rsi_column(&[1.0, 2.0, 3.0], RSI_PERIOD);
        assert_eq!(col, vec![None, None, None]);
    }
}
