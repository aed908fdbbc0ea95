// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators drawn on the chart.
// The `calculate_*` functions return only the defined values. The RSI and SMA
// `*_column` variants pad them back to one `Option` per input row so they can
// sit next to the candle table. A value at row i depends only on rows 0..=i.

pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use macd::MacdSeries;
pub use rsi::{rsi_column, RSI_PERIOD};
pub use sma::sma_column;

/// Place `values` at rows `offset..` of a column of length `len`.
///
/// Rows before `offset` and rows past the end of `values` are `None`.
pub(crate) fn align(values: Vec<f64>, offset: usize, len: usize) -> Vec<Option<f64>> {
    let mut column = vec![None; len];
    for (slot, v) in column.iter_mut().skip(offset).zip(values) {
        *slot = Some(v);
    }
    column
}
