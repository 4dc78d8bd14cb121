//! # HTTP Server Module
//!
//! Axum routes over a shared, read-only [`BookingAssistant`].
//!
//! # API Endpoints
//!
//! - `GET /health` - Server health status
//! - `POST /analytics?metric=<name>` - One of `total_revenue_july_2017`,
//!   `highest_cancellations`, `average_booking_price`
//! - `POST /ask` - Retrieve the rows nearest to the query embedding
//!
//! ### Ask
//! ```bash
//! curl -X POST http://localhost:8000/ask \
//!      -H 'Content-Type: application/json' \
//!      -d '{"query": "Show me bookings cancelled in July"}'
//! ```
//!
//! ### Analytics
//! ```bash
//! curl -X POST 'http://localhost:8000/analytics?metric=average_booking_price'
//! ```

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::analytics::MetricReport;
use crate::assistant::{AskResponse, BookingAssistant};
use crate::errors::AssistantError;
use crate::VectorIndex;

#[derive(Debug, Deserialize)]
pub struct AnalyticsParams {
    pub metric: String,
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

pub type AppState = Arc<BookingAssistant>;

impl IntoResponse for AssistantError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if self.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected: {}", self);
        }

        let body = Json(ErrorResponse {
            error: self.error_label(),
            details: self.details(),
        });

        (status, body).into_response()
    }
}

async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "booking-assistant",
        "rows": state.dataset().len(),
        "vectors": state.index().len(),
    }))
}

async fn analytics(
    State(state): State<AppState>,
    Query(params): Query<AnalyticsParams>,
) -> Result<Json<MetricReport>, AssistantError> {
    let report = state.analytics(&params.metric)?;
    info!("Computed metric '{}'", params.metric);
    Ok(Json(report))
}

async fn ask(
    State(state): State<AppState>,
    Json(payload): Json<AskRequest>,
) -> Result<Json<AskResponse>, AssistantError> {
    // Search is CPU bound; keep it off the async workers.
    let response = tokio::task::spawn_blocking(move || state.ask(&payload.query))
        .await
        .map_err(|e| AssistantError::InternalError(format!("search task failed: {}", e)))??;

    info!(
        "Answered question with {} rows in {}",
        response.retrieved_results.len(),
        response.response_time
    );
    Ok(Json(response))
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/analytics", post(analytics))
        .route("/ask", post(ask))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve `assistant` on `addr` (`host:port`) until the process stops.
pub async fn start_server(
    assistant: BookingAssistant,
    addr: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_app(Arc::new(assistant));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Booking assistant listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
