use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the exchange's candle endpoint, in the endpoint's column
/// order: `[time, low, high, open, close, volume]`.
///
/// `time` is already a valid UTC instant; rows whose time cannot be
/// represented are rejected when the response is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawCandle {
    /// Bucket start.
    pub time: DateTime<Utc>,
    pub low: f64,
    pub high: f64,
    pub open: f64,
    pub close: f64,
    pub volume: f64,
}

impl RawCandle {
    pub fn new(
        time: DateTime<Utc>,
        low: f64,
        high: f64,
        open: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            time,
            low,
            high,
            open,
            close,
            volume,
        }
    }

    /// Shorthand for tests: bucket start given in UNIX seconds.
    #[cfg(test)]
    pub fn at(secs: i64, low: f64, high: f64, open: f64, close: f64, volume: f64) -> Self {
        let time = DateTime::from_timestamp(secs, 0).expect("test timestamp in range");
        Self::new(time, low, high, open, close, volume)
    }
}
