// Macro Tracker - Web Server
// REST API and dashboard page over the fetch -> store -> evaluate -> notify
// pipeline.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::analyzer::Analyzer;
use crate::config::AppConfig;
use crate::db::{Database, MacroReading};
use crate::fetcher::{FredClient, MacroSnapshot};
use crate::notifier::Notifier;
use crate::signal::{self, Action, Signal};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<FredClient>,
    pub db: Arc<Database>,
    pub notifier: Arc<Notifier>,
    pub analyzer: Arc<Analyzer>,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            fetcher: Arc::new(FredClient::new(config.fred_api_key.clone())),
            db: Arc::new(Database::new(
                config.supabase_url.clone(),
                config.supabase_key.clone(),
            )),
            notifier: Arc::new(Notifier::new(config.ntfy_topic.clone())),
            analyzer: Arc::new(Analyzer::new(config.gemini_api_key.clone())),
        }
    }
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Serialize)]
struct ApiError {
    success: bool,
    error: String,
}

// Per the error-handling contract: every failure is caught here, logged,
// and reported as an HTTP error response. Nothing is retried, nothing is
// fatal to the process.
fn error_response(status: StatusCode, what: &str, err: anyhow::Error) -> Response {
    log::error!("{}: {:#}", what, err);
    (
        status,
        Json(ApiError {
            success: false,
            error: format!("{}: {:#}", what, err),
        }),
    )
        .into_response()
}

fn internal_error(what: &str, err: anyhow::Error) -> Response {
    error_response(StatusCode::INTERNAL_SERVER_ERROR, what, err)
}

#[derive(Serialize)]
struct CurrentData {
    reading: MacroReading,
    signal: Signal,
}

#[derive(Serialize)]
struct UpdateResponse {
    snapshot: MacroSnapshot,
    reading: MacroReading,
    signal: Signal,
    regime_score: f64,
    notified: bool,
}

#[derive(Serialize)]
struct SummaryResponse {
    summary: String,
    snapshot: MacroSnapshot,
}

#[derive(Deserialize)]
struct HistoryParams {
    limit: Option<u32>,
}

#[derive(Deserialize)]
struct HistoricalParams {
    days: Option<i64>,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/current-data - Latest stored reading plus its signal
async fn current_data(State(state): State<AppState>) -> Response {
    match state.db.get_latest().await {
        Ok(Some(reading)) => {
            let signal = signal::evaluate(&reading);
            Json(ApiResponse::ok(CurrentData { reading, signal })).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiError {
                success: false,
                error: "No data recorded yet".to_string(),
            }),
        )
            .into_response(),
        Err(e) => internal_error("Failed to read latest data", e),
    }
}

/// GET /api/update-data - Run one fetch -> store -> evaluate -> notify cycle
async fn update_data(State(state): State<AppState>) -> Response {
    let snapshot = match state.fetcher.fetch_snapshot().await {
        Ok(snapshot) => snapshot,
        Err(e) => return error_response(StatusCode::BAD_GATEWAY, "Macro data unavailable", e),
    };

    let reading = match state.db.insert(&MacroReading::from(&snapshot)).await {
        Ok(reading) => reading,
        Err(e) => return internal_error("Failed to store reading", e),
    };

    let signal = signal::evaluate(&reading);
    let regime_score = signal::regime_score(&snapshot);

    // HOLD stays silent; a failed push is logged and the cycle still succeeds.
    let mut notified = false;
    if signal.action != Action::Hold {
        match state.notifier.send_signal(&signal, &reading).await {
            Ok(()) => notified = true,
            Err(e) => log::warn!("Notification failed: {:#}", e),
        }
    }

    Json(ApiResponse::ok(UpdateResponse {
        snapshot,
        reading,
        signal,
        regime_score,
        notified,
    }))
    .into_response()
}

/// GET /api/history?limit=N - Recent stored readings, newest first
async fn history(State(state): State<AppState>, Query(params): Query<HistoryParams>) -> Response {
    let limit = params.limit.unwrap_or(30);
    match state.db.get_history(limit).await {
        Ok(readings) => Json(ApiResponse::ok(readings)).into_response(),
        Err(e) => internal_error("Failed to read history", e),
    }
}

/// GET /api/historical-data?days=N - Per-series FRED history for the charts
async fn historical_data(
    State(state): State<AppState>,
    Query(params): Query<HistoricalParams>,
) -> Response {
    let days = params.days.unwrap_or(365);
    match state.fetcher.fetch_all_history(days).await {
        Ok(bundle) => Json(ApiResponse::ok(bundle)).into_response(),
        Err(e) => error_response(StatusCode::BAD_GATEWAY, "Historical data unavailable", e),
    }
}

/// POST /api/test-notification - Send the relay smoke-test push
async fn test_notification(State(state): State<AppState>) -> Response {
    match state.notifier.send_test().await {
        Ok(()) => Json(ApiResponse::ok("Notification sent")).into_response(),
        Err(e) => internal_error("Failed to send test notification", e),
    }
}

/// GET /api/ai-summary - Fresh snapshot plus an AI-generated trading summary
async fn ai_summary(State(state): State<AppState>) -> Response {
    let snapshot = match state.fetcher.fetch_snapshot().await {
        Ok(snapshot) => snapshot,
        Err(e) => return error_response(StatusCode::BAD_GATEWAY, "Macro data unavailable", e),
    };

    match state.analyzer.trading_summary(&snapshot).await {
        Ok(summary) => Json(ApiResponse::ok(SummaryResponse { summary, snapshot })).into_response(),
        Err(e) => internal_error("Failed to generate summary", e),
    }
}

/// GET / - Serve the dashboard page
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/current-data", get(current_data))
        .route("/update-data", get(update_data))
        .route("/history", get(history))
        .route("/historical-data", get(historical_data))
        .route("/test-notification", post(test_notification))
        .route("/ai-summary", get(ai_summary))
        .with_state(state);

    Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}
