//! REST API for HashLedger
//!
//! Thin HTTP surface over [`LedgerService`]. Store access is blocking, so
//! every handler hands the ledger call to the blocking thread pool.

use axum::{
    extract::{Path, Request, State},
    http::{self, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::time::Instant;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::blockchain::{Block, BlockDraft, ChainReport};
use crate::error::LedgerError;
use crate::ledger::LedgerService;

/// Shared handler state
#[derive(Clone)]
pub struct ApiState {
    pub ledger: LedgerService,
    started: Instant,
}

impl ApiState {
    pub fn new(ledger: LedgerService) -> Self {
        Self {
            ledger,
            started: Instant::now(),
        }
    }

    /// Run a ledger operation on the blocking pool.
    async fn run<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&LedgerService) -> crate::error::Result<T> + Send + 'static,
    {
        let ledger = self.ledger.clone();
        tokio::task::spawn_blocking(move || op(&ledger))
            .await
            .map_err(|e| ApiError::Internal(format!("ledger task failed: {}", e)))?
            .map_err(ApiError::from)
    }
}

// ============================================================================
// API Error Handling
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    Ledger(LedgerError),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Ledger(e) => {
                let status = match &e {
                    LedgerError::NotFound { .. } => StatusCode::NOT_FOUND,
                    LedgerError::InvalidDraft(_) => StatusCode::BAD_REQUEST,
                    LedgerError::DuplicateId { .. } => StatusCode::CONFLICT,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if status.is_server_error() {
                    tracing::error!(error = %e, "api.ledger_error");
                }
                (status, e.to_string())
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError::Ledger(err)
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub location: String,
    pub uptime_seconds: u64,
}

#[derive(Serialize)]
pub struct ChainResponse {
    pub length: usize,
    pub blocks: Vec<Block>,
}

impl From<Vec<Block>> for ChainResponse {
    fn from(blocks: Vec<Block>) -> Self {
        ChainResponse {
            length: blocks.len(),
            blocks,
        }
    }
}

#[derive(Serialize)]
pub struct LastBlockResponse {
    pub block: Option<Block>,
    pub hash: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

async fn health_check(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        location: state.ledger.location(),
        uptime_seconds: state.started.elapsed().as_secs(),
    })
}

async fn list_blocks(State(state): State<ApiState>) -> Result<Json<ChainResponse>, ApiError> {
    let blocks = state.run(|ledger| ledger.list_all()).await?;
    Ok(Json(blocks.into()))
}

async fn get_block(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<Block>, ApiError> {
    let block = state.run(move |ledger| ledger.find_by_id(&id)).await?;
    Ok(Json(block))
}

async fn append_block(
    State(state): State<ApiState>,
    Json(draft): Json<BlockDraft>,
) -> Result<(StatusCode, Json<ChainResponse>), ApiError> {
    let blocks = state.run(move |ledger| ledger.append(draft)).await?;
    Ok((StatusCode::CREATED, Json(blocks.into())))
}

async fn last_block(State(state): State<ApiState>) -> Result<Json<LastBlockResponse>, ApiError> {
    let block = state.run(|ledger| ledger.last_block()).await?;
    let hash = block.as_ref().map(Block::digest);
    Ok(Json(LastBlockResponse { block, hash }))
}

async fn verify_chain(State(state): State<ApiState>) -> Result<Json<ChainReport>, ApiError> {
    let report = state.run(|ledger| ledger.verify()).await?;
    Ok(Json(report))
}

// ============================================================================
// Middleware
// ============================================================================

/// Logs method, path, status and duration of every request.
async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    tracing::info!(
        method = %method,
        path = %path,
        status = %response.status().as_u16(),
        duration_ms = %start.elapsed().as_millis(),
        "api.request"
    );

    response
}

// ============================================================================
// API Server
// ============================================================================

pub fn build_api_router(ledger: LedgerService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(vec![
            http::Method::GET,
            http::Method::POST,
            http::Method::OPTIONS,
        ])
        .allow_headers(vec![http::header::CONTENT_TYPE])
        .allow_credentials(true);

    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/blocks", get(list_blocks).post(append_block))
        .route("/blocks/:id", get(get_block))
        .route("/chain/last", get(last_block))
        .route("/chain/verify", get(verify_chain));

    Router::new()
        .nest("/api", api_routes)
        .layer(middleware::from_fn(logging_middleware))
        .layer(cors)
        .with_state(ApiState::new(ledger))
}

/// Bind `addr` and serve until the process is stopped.
pub async fn run_api_server(
    ledger: LedgerService,
    addr: std::net::SocketAddr,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = build_api_router(ledger);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "api.listening");
    axum::serve(listener, app).await?;
    Ok(())
}

