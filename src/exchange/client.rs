// =============================================================================
// Exchange REST API Client — public market data endpoints
// =============================================================================
//
// Two unauthenticated endpoints are used:
//   GET /products/{product}/candles?granularity={seconds}
//   GET /products/{product}/ticker
//
// Every response goes through an explicit schema check before it leaves this
// module. A failed check is an `ExchangeError::Parse` naming what was wrong;
// nothing is retried.
// =============================================================================

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::error::{body_snippet, ExchangeError, ParseFailure};
use crate::market_data::RawCandle;
use crate::types::{Granularity, Product};

/// Column names of a candle row, in wire order.
const CANDLE_FIELDS: [&str; 6] = ["time", "low", "high", "open", "close", "volume"];

/// Latest trade as reported by the ticker endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticker {
    /// Last trade price exactly as the exchange formatted it.
    pub price: String,
}

/// Exchange REST API client for public market data.
#[derive(Clone)]
pub struct ExchangeClient {
    base_url: String,
    client: reqwest::Client,
}

impl ExchangeClient {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Create a new `ExchangeClient`.
    ///
    /// # Arguments
    /// * `base_url`   — API root, e.g. `https://api.exchange.coinbase.com`.
    /// * `user_agent` — sent with every request.
    /// * `timeout`    — per-request timeout; `None` keeps reqwest's default.
    pub fn new(
        base_url: impl Into<String>,
        user_agent: &str,
        timeout: Option<Duration>,
    ) -> reqwest::Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .default_headers(default_headers)
            .user_agent(user_agent);
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build()?;

        debug!(%base_url, ?timeout, "ExchangeClient initialised");

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -------------------------------------------------------------------------
    // Public market data
    // -------------------------------------------------------------------------

    /// GET /products/{product}/candles — rows newest-first, as delivered.
    #[instrument(
        skip_all,
        fields(product = %product, granularity = granularity.seconds()),
        name = "exchange::get_candles"
    )]
    pub async fn get_candles(
        &self,
        product: &Product,
        granularity: Granularity,
    ) -> Result<Vec<RawCandle>, ExchangeError> {
        let endpoint = format!("/products/{product}/candles");
        let query = [("granularity", granularity.seconds().to_string())];
        let body = self.get_json(&endpoint, &query).await?;

        let candles = parse_candles(&body).map_err(|reason| ExchangeError::Parse {
            endpoint: endpoint.clone(),
            reason,
        })?;

        debug!(count = candles.len(), "candles fetched");
        Ok(candles)
    }

    /// GET /products/{product}/ticker.
    #[instrument(skip_all, fields(product = %product), name = "exchange::get_ticker")]
    pub async fn get_ticker(&self, product: &Product) -> Result<Ticker, ExchangeError> {
        let endpoint = format!("/products/{product}/ticker");
        let body = self.get_json(&endpoint, &[]).await?;

        let ticker = parse_ticker(&body).map_err(|reason| ExchangeError::Parse {
            endpoint: endpoint.clone(),
            reason,
        })?;

        debug!(price = %ticker.price, "ticker fetched");
        Ok(ticker)
    }

    // -------------------------------------------------------------------------
    // Internal helpers
    // -------------------------------------------------------------------------

    /// Issue one GET and decode the body as JSON. Non-2xx is an error even
    /// when the body is valid JSON.
    async fn get_json(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<Value, ExchangeError> {
        let url = format!("{}{}", self.base_url, endpoint);

        let resp = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|source| ExchangeError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let status = resp.status();
        let text = resp.text().await.map_err(|source| ExchangeError::Transport {
            endpoint: endpoint.to_string(),
            source,
        })?;

        if !status.is_success() {
            warn!(endpoint, %status, "exchange returned an error status");
            return Err(ExchangeError::Status {
                endpoint: endpoint.to_string(),
                status,
                body: body_snippet(&text),
            });
        }

        serde_json::from_str(&text).map_err(|e| ExchangeError::Parse {
            endpoint: endpoint.to_string(),
            reason: ParseFailure::InvalidJson(e.to_string()),
        })
    }
}

impl std::fmt::Debug for ExchangeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

// =============================================================================
// Schema checks
// =============================================================================

/// Check the candle body: an array of fixed-arity numeric rows.
pub fn parse_candles(body: &Value) -> Result<Vec<RawCandle>, ParseFailure> {
    let rows = body.as_array().ok_or(ParseFailure::NotAnArray)?;

    let mut candles = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        let cells = row
            .as_array()
            .ok_or(ParseFailure::RowNotAnArray { index })?;
        if cells.len() != CANDLE_FIELDS.len() {
            return Err(ParseFailure::RowArity {
                index,
                arity: cells.len(),
            });
        }

        let time = candle_time(&cells[0], index)?;
        let mut values = [0.0_f64; 5];
        for (slot, (cell, field)) in values
            .iter_mut()
            .zip(cells[1..].iter().zip(CANDLE_FIELDS[1..].iter().copied()))
        {
            *slot = number_or_decimal_str(cell).ok_or(ParseFailure::NotNumeric { index, field })?;
        }
        let [low, high, open, close, volume] = values;
        candles.push(RawCandle::new(time, low, high, open, close, volume));
    }

    Ok(candles)
}

/// Check the ticker body: an object with a decimal `price`.
pub fn parse_ticker(body: &Value) -> Result<Ticker, ParseFailure> {
    let obj = body.as_object().ok_or(ParseFailure::NotAnObject)?;
    let raw = obj.get("price").ok_or(ParseFailure::MissingField("price"))?;

    let price = match raw {
        Value::String(s) if s.trim().parse::<f64>().is_ok_and(f64::is_finite) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return Err(ParseFailure::NotDecimal("price")),
    };

    Ok(Ticker { price })
}

/// Bucket start: whole UNIX seconds that chrono can represent. Fractional or
/// out-of-range times are rejected, never rounded or clamped.
fn candle_time(cell: &Value, index: usize) -> Result<DateTime<Utc>, ParseFailure> {
    let secs = match cell {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => {
            return Err(ParseFailure::NotNumeric {
                index,
                field: CANDLE_FIELDS[0],
            })
        }
    };
    secs.and_then(|s| DateTime::from_timestamp(s, 0))
        .ok_or(ParseFailure::BadTimestamp { index })
}

/// The exchange sends numbers, but some mirrors quote them as strings.
fn number_or_decimal_str(val: &Value) -> Option<f64> {
    match val {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}
