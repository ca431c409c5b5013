//! casenote-api - HTTP surface for the casenote aggregator.
//!
//! Two read routes over the aggregation pipeline:
//!
//! - `GET /api/casenotes` — every configured source, side data included;
//!   per-source failures ride along as data, the response itself is
//!   always 200 and always well-formed.
//! - `GET /api/casenotes/{ehr_id}` — one source; a source-level failure
//!   maps to the fixed status taxonomy (400/401/403/408/…) with its
//!   message template.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use casenote_client::{CaseNoteClient, ClientConfig};
use casenote_core::{AggregateResponse, CaseNoteCollection, SourceError, SourceErrorKind};

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// STATE & ERRORS
// =============================================================================

#[derive(Clone)]
struct AppState {
    client: Arc<CaseNoteClient>,
}

/// Error surface of the API, mapped onto the fixed status taxonomy.
#[derive(Debug)]
enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    Timeout(String),
    Upstream(String),
}

impl From<&SourceError> for ApiError {
    fn from(error: &SourceError) -> Self {
        let message = error.message.clone();
        match error.kind {
            SourceErrorKind::BadRequest => ApiError::BadRequest(message),
            SourceErrorKind::Unauthorized => ApiError::Unauthorized(message),
            SourceErrorKind::Forbidden => ApiError::Forbidden(message),
            SourceErrorKind::Timeout => ApiError::Timeout(message),
            SourceErrorKind::Unknown | SourceErrorKind::Network | SourceErrorKind::Parse => {
                ApiError::Upstream(message)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::Timeout(msg) => (StatusCode::REQUEST_TIMEOUT, msg),
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// Aggregate every configured source. Idempotent; failures are embedded
/// per source and per note, so the caller's state is never left
/// uninitialized.
async fn get_casenotes(State(state): State<AppState>) -> Json<AggregateResponse> {
    Json(state.client.aggregate_response().await)
}

/// Aggregate one source. A source-level failure surfaces as the matching
/// HTTP status with its fixed message template.
async fn get_casenotes_for_source(
    State(state): State<AppState>,
    Path(ehr_id): Path<String>,
) -> Result<Json<CaseNoteCollection>, ApiError> {
    let collection = state.client.aggregate(&ehr_id).await;
    if let Some(error) = &collection.error {
        return Err(ApiError::from(error));
    }
    Ok(Json(collection))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// =============================================================================
// MAIN
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env()?;
    let sources = config.ehr_ids.len();
    let client = CaseNoteClient::new(config)?;
    let state = AppState {
        client: Arc::new(client),
    };

    let app = Router::new()
        .route("/api/casenotes", get(get_casenotes))
        .route("/api/casenotes/:ehr_id", get(get_casenotes_for_source))
        .route("/health", get(health))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr: SocketAddr = std::env::var("CASENOTE_BIND")
        .unwrap_or_else(|_| "127.0.0.1:3333".to_string())
        .parse()?;
    info!(%addr, sources, "casenote-api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
