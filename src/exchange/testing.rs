// In-process stand-in for the exchange's public REST API, served by axum on
// an ephemeral loopback port. Counts hits per endpoint so tests can assert
// exactly which fetches a UI event caused.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::{json, Value};

use super::ExchangeClient;

/// Rows served by default: newest-first, as the real endpoint does.
pub fn sample_rows() -> Value {
    json!([[100, 10, 12, 10, 11, 5], [90, 9, 11, 9, 10, 3], [80, 8, 10, 8, 9, 2]])
}

#[derive(Default)]
struct FakeState {
    candle_hits: AtomicUsize,
    ticker_hits: AtomicUsize,
    /// 0 = healthy, otherwise the status code every endpoint answers with.
    fail_status: AtomicU16,
    garbage: std::sync::atomic::AtomicBool,
    candles: RwLock<Option<Value>>,
    last_candle_request: RwLock<Option<String>>,
    last_accept: RwLock<Option<String>>,
}

pub struct FakeExchange {
    addr: SocketAddr,
    state: Arc<FakeState>,
}

#[derive(Deserialize)]
struct CandleQuery {
    granularity: u32,
}

impl FakeExchange {
    pub async fn start() -> Self {
        let state = Arc::new(FakeState::default());
        let app = Router::new()
            .route("/products/:product/candles", get(candles))
            .route("/products/:product/ticker", get(ticker))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake exchange");
        let addr = listener.local_addr().expect("fake exchange addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn client(&self) -> ExchangeClient {
        ExchangeClient::new(self.url(), "candle-dash-test", None).expect("build client")
    }

    pub fn candle_hits(&self) -> usize {
        self.state.candle_hits.load(Ordering::SeqCst)
    }

    pub fn ticker_hits(&self) -> usize {
        self.state.ticker_hits.load(Ordering::SeqCst)
    }

    /// `"{product}@{granularity}"` of the latest candle request.
    pub fn last_candle_request(&self) -> Option<String> {
        self.state.last_candle_request.read().clone()
    }

    pub fn last_accept(&self) -> Option<String> {
        self.state.last_accept.read().clone()
    }

    pub fn fail_with(&self, status: u16) {
        self.state.fail_status.store(status, Ordering::SeqCst);
    }

    pub fn serve_garbage(&self) {
        self.state.garbage.store(true, Ordering::SeqCst);
    }

    pub fn serve_candles(&self, rows: Value) {
        *self.state.candles.write() = Some(rows);
    }

    fn canned(state: &FakeState) -> Option<Response> {
        let status = state.fail_status.load(Ordering::SeqCst);
        if status != 0 {
            let code = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            return Some((code, Json(json!({"message": "unavailable"}))).into_response());
        }
        if state.garbage.load(Ordering::SeqCst) {
            return Some((StatusCode::OK, "<html>not json</html>").into_response());
        }
        None
    }
}

async fn candles(
    State(state): State<Arc<FakeState>>,
    Path(product): Path<String>,
    Query(q): Query<CandleQuery>,
    headers: HeaderMap,
) -> Response {
    state.candle_hits.fetch_add(1, Ordering::SeqCst);
    *state.last_candle_request.write() = Some(format!("{product}@{}", q.granularity));
    *state.last_accept.write() = headers
        .get("accept")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    if let Some(resp) = FakeExchange::canned(&state) {
        return resp;
    }
    let rows = state.candles.read().clone().unwrap_or_else(sample_rows);
    Json(rows).into_response()
}

async fn ticker(State(state): State<Arc<FakeState>>, Path(_product): Path<String>) -> Response {
    state.ticker_hits.fetch_add(1, Ordering::SeqCst);
    if let Some(resp) = FakeExchange::canned(&state) {
        return resp;
    }
    Json(json!({"trade_id": 1, "price": "3120.50", "size": "0.1"})).into_response()
}
