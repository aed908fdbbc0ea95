// =============================================================================
// Candle Table — raw exchange rows to a chart-ready table
// =============================================================================
//
// The exchange delivers rows newest-first. Every derived column here is
// order-sensitive, so the rows are flipped to chronological order before
// anything is computed. Each derived value at row i depends only on rows
// 0..=i; short inputs simply leave the leading values blank.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use super::RawCandle;
use crate::indicators::{rsi_column, sma_column, MacdSeries, RSI_PERIOD};

pub const MA_LONG_PERIOD: usize = 20;
pub const MA_SHORT_PERIOD: usize = 7;

/// Direction of a candle body, used to colour its volume bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CandleColor {
    Green,
    Red,
}

impl CandleColor {
    /// Green when the candle closed at or above its open.
    pub fn from_diff(diff: f64) -> Self {
        if diff >= 0.0 {
            Self::Green
        } else {
            Self::Red
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Red => "red",
        }
    }
}

/// A candle plus its derived columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRow {
    pub timestamp: DateTime<Utc>,
    pub low: f64,
    pub high: f64,
    pub open: f64,
    pub close: f64,
    pub volume: f64,
    /// `close - open`.
    pub diff: f64,
    pub color: CandleColor,
    pub rsi: Option<f64>,
    #[serde(rename = "MA20")]
    pub ma20: Option<f64>,
    #[serde(rename = "MA7")]
    pub ma7: Option<f64>,
}

/// Chronologically ascending, enriched candle table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CandleTable {
    rows: Vec<EnrichedRow>,
}

impl CandleTable {
    pub fn rows(&self) -> &[EnrichedRow] {
        &self.rows
    }

    pub fn closes(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.close).collect()
    }

    /// Largest volume in the table, `None` when empty.
    pub fn max_volume(&self) -> Option<f64> {
        self.rows.iter().map(|r| r.volume).reduce(f64::max)
    }

    /// MACD set over the close column. Kept out of the table itself.
    pub fn macd(&self) -> MacdSeries {
        MacdSeries::standard(&self.closes())
    }
}

/// Build the enriched table from rows in the exchange's newest-first order.
pub fn build_table(raw: &[RawCandle]) -> CandleTable {
    let closes: Vec<f64> = raw.iter().rev().map(|c| c.close).collect();
    let rsi = rsi_column(&closes, RSI_PERIOD);
    let ma20 = sma_column(&closes, MA_LONG_PERIOD);
    let ma7 = sma_column(&closes, MA_SHORT_PERIOD);

    let rows: Vec<EnrichedRow> = raw
        .iter()
        .rev()
        .enumerate()
        .map(|(i, c)| {
            let diff = c.close - c.open;
            EnrichedRow {
                timestamp: c.time,
                low: c.low,
                high: c.high,
                open: c.open,
                close: c.close,
                volume: c.volume,
                diff,
                color: CandleColor::from_diff(diff),
                rsi: rsi[i],
                ma20: ma20[i],
                ma7: ma7[i],
            }
        })
        .collect();

    debug!(rows = rows.len(), "candle table built");
    CandleTable { rows }
}
