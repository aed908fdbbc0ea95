// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// `/` serves the dashboard page; everything else lives under `/api/v1/`. The
// page talks to `/api/v1/callback` only; the chart and price endpoints expose
// the same pipelines for direct use.
//
// Selections are validated before any exchange call, so a bad dropdown value
// is a 400 and never reaches the network. Upstream failures are a 502 on the
// direct endpoints and an in-place error payload on the callback endpoint.
//
// CORS is permissive: the service is read-only and unauthenticated.
// =============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::app_state::AppContext;
use crate::chart::{fetch_chart, Figure};
use crate::error::{ExchangeError, SelectionError};
use crate::exchange::fetch_price_sentence;
use crate::types::Selection;
use crate::ui::{InputId, Output, OutputId, PageLayout};

// =============================================================================
// Router construction
// =============================================================================

/// Build the full router with CORS middleware and shared context.
pub fn router(ctx: Arc<AppContext>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/api/v1/health", get(health))
        .route("/api/v1/layout", get(layout))
        .route("/api/v1/callback", post(callback))
        .route("/api/v1/chart", get(chart))
        .route("/api/v1/price", get(price))
        .layer(cors)
        .with_state(ctx)
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error("unknown input id '{0}'")]
    UnknownInput(String),

    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    #[error("failed to render page: {0}")]
    Template(#[from] askama::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Selection(_) | Self::UnknownInput(_) => StatusCode::BAD_REQUEST,
            Self::Exchange(_) => StatusCode::BAD_GATEWAY,
            Self::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(error = %self, %status, "request failed");
        }
        let body = serde_json::json!({
            "error": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Page
// =============================================================================

async fn index(State(ctx): State<Arc<AppContext>>) -> Result<Html<String>, ApiError> {
    Ok(Html(ctx.layout.render_html()?))
}

async fn layout(State(ctx): State<Arc<AppContext>>) -> Json<PageLayout> {
    Json(ctx.layout.clone())
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    server_time: i64,
}

async fn health(State(ctx): State<Arc<AppContext>>) -> impl IntoResponse {
    let resp = HealthResponse {
        status: "ok",
        uptime_secs: ctx.uptime_secs(),
        server_time: chrono::Utc::now().timestamp_millis(),
    };
    Json(resp)
}

// =============================================================================
// Callback dispatch
// =============================================================================

#[derive(Debug, Deserialize)]
struct CallbackRequest {
    #[serde(default)]
    changed: Vec<String>,
    #[serde(default)]
    product: Option<String>,
    /// The page sends a number, hand-written clients often a string.
    #[serde(default)]
    granularity: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct CallbackResponse {
    outputs: BTreeMap<OutputId, Output>,
}

fn parse_input_id(raw: &str) -> Result<InputId, ApiError> {
    match raw {
        "product" => Ok(InputId::Product),
        "granularity" => Ok(InputId::Granularity),
        other => Err(ApiError::UnknownInput(other.to_string())),
    }
}

fn value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

async fn callback(
    State(ctx): State<Arc<AppContext>>,
    Json(req): Json<CallbackRequest>,
) -> Result<Json<CallbackResponse>, ApiError> {
    let changed = req
        .changed
        .iter()
        .map(|id| parse_input_id(id))
        .collect::<Result<Vec<_>, _>>()?;
    let granularity = req.granularity.as_ref().map(value_text);
    let selection = Selection::parse(req.product.as_deref(), granularity.as_deref())?;

    let outputs = ctx
        .callbacks
        .dispatch(&ctx.exchange, &changed, &selection)
        .await;
    Ok(Json(CallbackResponse { outputs }))
}

// =============================================================================
// Direct pipelines
// =============================================================================

#[derive(Debug, Deserialize)]
struct ChartQuery {
    product: Option<String>,
    granularity: Option<String>,
}

async fn chart(
    State(ctx): State<Arc<AppContext>>,
    Query(q): Query<ChartQuery>,
) -> Result<Json<Figure>, ApiError> {
    let selection = Selection::parse(q.product.as_deref(), q.granularity.as_deref())?;
    let figure = fetch_chart(&ctx.exchange, &selection).await?;
    info!(
        product = %selection.product,
        granularity = selection.granularity.seconds(),
        traces = figure.data.len(),
        "chart served"
    );
    Ok(Json(figure))
}

#[derive(Debug, Deserialize)]
struct PriceQuery {
    product: Option<String>,
}

#[derive(Serialize)]
struct PriceResponse {
    text: String,
}

async fn price(
    State(ctx): State<Arc<AppContext>>,
    Query(q): Query<PriceQuery>,
) -> Result<Json<PriceResponse>, ApiError> {
    let selection = Selection::parse(q.product.as_deref(), None)?;
    let text = fetch_price_sentence(&ctx.exchange, &selection.product).await?;
    Ok(Json(PriceResponse { text }))
}
