//! HTTP request handlers
//!
//! Thin adapters from JSON requests to engine commands. Engine errors map to
//! status codes in `api_error`.

use crate::api::server::AppContext;
use crate::error::Error;
use crate::state::PlayerSnapshot;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use riffle_common::{PlaylistId, TrackId};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct TrackRequest {
    track_id: TrackId,
}

#[derive(Debug, Deserialize)]
pub struct PlaylistRequest {
    playlist_id: PlaylistId,
    #[serde(default)]
    start_order: u32,
}

#[derive(Debug, Serialize)]
pub struct EnqueueResponse {
    status: String,
    /// None when the enqueue was overtaken by a queue reset
    entry_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct SeekRequest {
    position_ms: i64,
}

#[derive(Debug, Serialize)]
pub struct SeekResponse {
    position_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct VolumeRequest {
    volume: u8, // 0-100 user-facing scale
}

#[derive(Debug, Serialize)]
pub struct VolumeResponse {
    volume: u8,
}

type ApiError = (StatusCode, Json<StatusResponse>);

/// Map an engine error onto an HTTP status
fn api_error(e: Error) -> ApiError {
    let status = match &e {
        Error::NotFound(_) | Error::Empty(_) => StatusCode::NOT_FOUND,
        Error::Transport(_) | Error::Gateway(_) => StatusCode::BAD_GATEWAY,
        Error::BadRequest(_) => StatusCode::BAD_REQUEST,
        Error::InvalidState(_) => StatusCode::CONFLICT,
        Error::StaleResult { .. } | Error::Config(_) | Error::Io(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    if status.is_server_error() {
        error!("Request failed: {}", e);
    } else {
        warn!("Request rejected: {}", e);
    }
    (
        status,
        Json(StatusResponse {
            status: format!("error: {}", e),
        }),
    )
}

fn ok() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_string(),
    })
}

// ============================================================================
// Health & State
// ============================================================================

/// GET /health - Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "riffle-player".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /playback/state - Full player snapshot
pub async fn get_playback_state(State(ctx): State<AppContext>) -> Json<PlayerSnapshot> {
    Json(ctx.engine.snapshot().await)
}

// ============================================================================
// Playback Endpoints
// ============================================================================

/// POST /playback/track - Play one track, replacing the queue
pub async fn play_track(
    State(ctx): State<AppContext>,
    Json(req): Json<TrackRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    info!("Play track request: {}", req.track_id);
    ctx.engine
        .play_single_track(&req.track_id)
        .await
        .map_err(api_error)?;
    Ok(ok())
}

/// POST /playback/playlist - Play a playlist from an order value
pub async fn play_playlist(
    State(ctx): State<AppContext>,
    Json(req): Json<PlaylistRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    info!(
        "Play playlist request: {} from {}",
        req.playlist_id, req.start_order
    );
    ctx.engine
        .play_playlist(&req.playlist_id, req.start_order)
        .await
        .map_err(api_error)?;
    Ok(ok())
}

/// POST /playback/next
pub async fn skip_next(State(ctx): State<AppContext>) -> Result<Json<StatusResponse>, ApiError> {
    ctx.engine.advance().await.map_err(api_error)?;
    Ok(ok())
}

/// POST /playback/previous
pub async fn skip_previous(
    State(ctx): State<AppContext>,
) -> Result<Json<StatusResponse>, ApiError> {
    ctx.engine.retreat().await.map_err(api_error)?;
    Ok(ok())
}

/// POST /playback/pause
pub async fn pause(State(ctx): State<AppContext>) -> Result<Json<StatusResponse>, ApiError> {
    ctx.engine.pause().await.map_err(api_error)?;
    Ok(ok())
}

/// POST /playback/resume
pub async fn resume(State(ctx): State<AppContext>) -> Result<Json<StatusResponse>, ApiError> {
    ctx.engine.resume().await.map_err(api_error)?;
    Ok(ok())
}

/// POST /playback/toggle
pub async fn toggle(State(ctx): State<AppContext>) -> Result<Json<StatusResponse>, ApiError> {
    ctx.engine.toggle_play().await.map_err(api_error)?;
    Ok(ok())
}

/// POST /playback/seek - Returns the position the output accepted
pub async fn seek(
    State(ctx): State<AppContext>,
    Json(req): Json<SeekRequest>,
) -> Result<Json<SeekResponse>, ApiError> {
    let position_ms = ctx.engine.seek(req.position_ms).await.map_err(api_error)?;
    Ok(Json(SeekResponse { position_ms }))
}

// ============================================================================
// Queue Endpoints
// ============================================================================

/// POST /playback/queue/play - Jump to a queued track (or play it directly)
pub async fn play_from_queue(
    State(ctx): State<AppContext>,
    Json(req): Json<TrackRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    ctx.engine
        .play_from_queue(&req.track_id)
        .await
        .map_err(api_error)?;
    Ok(ok())
}

/// POST /playback/queue/enqueue - Append to the priority queue
pub async fn enqueue(
    State(ctx): State<AppContext>,
    Json(req): Json<TrackRequest>,
) -> Result<Json<EnqueueResponse>, ApiError> {
    let entry_id = ctx
        .engine
        .enqueue_priority(&req.track_id)
        .await
        .map_err(api_error)?;
    let status = if entry_id.is_some() { "ok" } else { "discarded" };
    Ok(Json(EnqueueResponse {
        status: status.to_string(),
        entry_id,
    }))
}

/// DELETE /playback/queue/:entry_id
pub async fn remove_from_queue(
    State(ctx): State<AppContext>,
    Path(entry_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    ctx.engine
        .remove_from_queue(entry_id)
        .await
        .map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /playback/queue/clear
pub async fn clear_queue(State(ctx): State<AppContext>) -> Result<Json<StatusResponse>, ApiError> {
    ctx.engine.clear_queue().await.map_err(api_error)?;
    Ok(ok())
}

// ============================================================================
// Volume Endpoints
// ============================================================================

/// GET /audio/volume
pub async fn get_volume(State(ctx): State<AppContext>) -> Json<VolumeResponse> {
    Json(VolumeResponse {
        volume: ctx.engine.volume().await,
    })
}

/// POST /audio/volume
pub async fn set_volume(
    State(ctx): State<AppContext>,
    Json(req): Json<VolumeRequest>,
) -> Result<Json<VolumeResponse>, ApiError> {
    if req.volume > 100 {
        return Err(api_error(Error::BadRequest(format!(
            "Volume must be 0-100, got {}",
            req.volume
        ))));
    }
    ctx.engine.set_volume(req.volume).await.map_err(api_error)?;
    Ok(Json(VolumeResponse { volume: req.volume }))
}
