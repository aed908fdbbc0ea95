// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
//   macd      = EMA(fast) - EMA(slow)
//   signal    = EMA(signal) of the macd line
//   histogram = macd - signal
//
// With the standard 12/26/9 parameters the macd line is first defined at row
// 25 and the signal line at row 33.
// =============================================================================

use serde::Serialize;

use super::align;
use super::ema::calculate_ema;

pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;

/// MACD lines aligned row-for-row with the close column they came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacdSeries {
    pub macd: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
    pub histogram: Vec<Option<f64>>,
}

impl MacdSeries {
    /// MACD with the standard 12/26/9 periods.
    pub fn standard(closes: &[f64]) -> Self {
        Self::compute(closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL)
    }

    pub fn compute(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Self {
        let len = closes.len();
        let (fast_ema, slow_ema) = (calculate_ema(closes, fast), calculate_ema(closes, slow));

        // Both EMAs end at the last close; line them up from the right.
        let overlap = fast_ema.len().min(slow_ema.len());
        let macd_dense: Vec<f64> = fast_ema[fast_ema.len() - overlap..]
            .iter()
            .zip(&slow_ema[slow_ema.len() - overlap..])
            .map(|(f, s)| f - s)
            .collect();
        let macd_offset = len - macd_dense.len();

        let signal_dense = calculate_ema(&macd_dense, signal);
        let signal_offset = len - signal_dense.len();

        let macd = align(macd_dense, macd_offset, len);
        let signal = align(signal_dense, signal_offset, len);
        let histogram = macd
            .iter()
            .zip(&signal)
            .map(|(m, s)| Some((*m)? - (*s)?))
            .collect();

        Self {
            macd,
            signal,
            histogram,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wave(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0 + i as f64 * 0.1).collect()
    }

    #[test]
    fn short_input_is_all_blank() {
        let m = MacdSeries::standard(&wave(20));
        assert_eq!(m.macd.len(), 20);
        assert!(m.macd.iter().all(Option::is_none));
        assert!(m.signal.iter().all(Option::is_none));
        assert!(m.histogram.iter().all(Option::is_none));
    }

    #[test]
    fn empty_input_is_empty() {
        let m = MacdSeries::standard(&[]);
        assert!(m.macd.is_empty() && m.signal.is_empty() && m.histogram.is_empty());
    }

    #[test]
    fn first_defined_rows_match_periods() {
        let m = MacdSeries::standard(&wave(60));
        assert!(m.macd[24].is_none());
        assert!(m.macd[25].is_some());
        assert!(m.signal[32].is_none());
        assert!(m.signal[33].is_some());
        assert!(m.histogram[32].is_none());
        assert!(m.histogram[33].is_some());
    }

    #[test]
    fn macd_is_fast_minus_slow() {
        let closes = wave(60);
        let m = MacdSeries::standard(&closes);
        let fast = calculate_ema(&closes, 12);
        let slow = calculate_ema(&closes, 26);
        let expected = fast[fast.len() - 1] - slow[slow.len() - 1];
        assert!((m.macd[59].unwrap() - expected).abs() < 1e-10);
    }

    #[test]
    fn histogram_is_macd_minus_signal() {
        let m = MacdSeries::standard(&wave(80));
        for i in 33..80 {
            let h = m.histogram[i].unwrap();
            assert!((h - (m.macd[i].unwrap() - m.signal[i].unwrap())).abs() < 1e-12);
        }
    }

    #[test]
    fn flat_series_has_zero_macd() {
        let m = MacdSeries::standard(&[50.0; 40]);
        for v in m.macd.iter().flatten() {
            assert!(v.abs() < 1e-10);
        }
    }

    #[test]
    fn column_has_no_look_ahead() {
        // Appending future closes never changes earlier rows.
        let closes = wave(80);
        let short = MacdSeries::standard(&closes[..50]);
        let long = MacdSeries::standard(&closes);
        assert_eq!(short.macd[..], long.macd[..50]);
        assert_eq!(short.signal[..], long.signal[..50]);
        assert_eq!(short.histogram[..], long.histogram[..50]);
        assert!(short.signal[49].is_some());
    }

    #[test]
    fn deterministic_across_runs() {
        let closes = wave(50);
        assert_eq!(MacdSeries::standard(&closes), MacdSeries::standard(&closes));
    }
}
