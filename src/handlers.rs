use crate::completion;
use crate::config::Config;
use crate::draft_store::DraftStore;
use crate::errors::{AppError, ResultExt};
use crate::fields::STEPS;
use crate::models::{CompletionStatus, DraftRecord, ProfileRecord, ProgressReport};
use crate::profile_client::ProfileApiClient;
use crate::progress;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use moka::future::Cache;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Client for the upstream profile API.
    pub profile_client: ProfileApiClient,
    /// Short-TTL cache of raw upstream profile payloads, keyed by user id.
    pub profile_cache: Cache<String, Value>,
    /// Per-user draft storage.
    pub draft_store: DraftStore,
}

/// Body for `PUT /api/v1/users/:user_id/draft`.
///
/// The owner comes from the path, never the body; `last_updated` is stamped
/// server-side.
#[derive(Debug, Deserialize)]
pub struct DraftPayload {
    pub step: u32,
    #[serde(default)]
    pub form_data: Map<String, Value>,
}

/// Body for `POST /api/v1/progress/preview`.
#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    /// Raw profile payload in any of the accepted envelope shapes.
    pub profile: Option<Value>,
    pub draft: Option<DraftRecord>,
}

/// Health check endpoint.
///
/// Returns the service status, version, and health information.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "profile-progress-api",
            "version": "0.1.0"
        })),
    )
}

/// Fetches a user's raw profile payload, serving from the short-TTL cache
/// when possible.
async fn fetch_profile_cached(state: &Arc<AppState>, user_id: &str) -> Result<Value, AppError> {
    if let Some(cached) = state.profile_cache.get(user_id).await {
        tracing::debug!("Profile cache hit for user {}", user_id);
        return Ok(cached);
    }

    let raw = state.profile_client.fetch_profile(user_id).await?;
    state
        .profile_cache
        .insert(user_id.to_string(), raw.clone())
        .await;
    Ok(raw)
}

/// GET /api/v1/users/:user_id/progress
///
/// Fetches the server profile, overlays the user's stored draft (ownership
/// and integrity checked by the store), and returns the computed progress
/// report.
pub async fn get_progress(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<ProgressReport>, AppError> {
    tracing::info!("GET /users/{}/progress", user_id);

    let raw = fetch_profile_cached(&state, &user_id)
        .await
        .context(format!("computing progress for user {}", user_id))?;
    let record = ProfileRecord::from_value(&raw);
    let draft = state.draft_store.load(&user_id).await;

    let report = progress::compute_progress(Some(&record), draft.as_ref());
    tracing::info!(
        "Progress for user {}: {}% ({} of {} fields)",
        user_id,
        report.progress,
        report.completed_fields,
        report.total_fields
    );

    Ok(Json(report))
}

/// POST /api/v1/progress/preview
///
/// Computes a progress report from a caller-supplied profile and/or draft
/// without touching the upstream API. Absent or malformed data yields a
/// zero-valued report, never an error.
pub async fn preview_progress(Json(request): Json<PreviewRequest>) -> Json<ProgressReport> {
    let record = request.profile.as_ref().map(ProfileRecord::from_value);
    let report = progress::compute_progress(record.as_ref(), request.draft.as_ref());
    Json(report)
}

/// GET /api/v1/users/:user_id/completion
///
/// Runs the three gate heuristics plus the route-guard resolution over the
/// server profile and any stored draft.
pub async fn get_completion(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<CompletionStatus>, AppError> {
    tracing::info!("GET /users/{}/completion", user_id);

    let raw = fetch_profile_cached(&state, &user_id)
        .await
        .context(format!("resolving completion for user {}", user_id))?;
    let record = ProfileRecord::from_value(&raw);
    let draft = state.draft_store.load(&user_id).await;

    let status = completion::resolve_completion_status(&record, draft.as_ref());
    tracing::info!(
        "Completion for user {}: complete={}, api_gate={}, empty={}",
        user_id,
        status.is_profile_complete,
        status.api_profile_complete,
        status.profile_empty
    );

    Ok(Json(status))
}

/// PUT /api/v1/users/:user_id/draft
///
/// Stores the user's in-progress form data. Returns the stored draft plus a
/// freshly computed report so clients can update their progress UI in one
/// round trip.
pub async fn save_draft(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(payload): Json<DraftPayload>,
) -> Result<Json<serde_json::Value>, AppError> {
    let max_step = STEPS.last().map(|s| s.number).unwrap_or(1);
    if payload.step == 0 || payload.step > max_step {
        return Err(AppError::BadRequest(format!(
            "step must be between 1 and {}",
            max_step
        )));
    }

    let draft = DraftRecord {
        user_id: user_id.clone(),
        step: payload.step,
        last_updated: Utc::now(),
        form_data: payload.form_data,
    };
    state.draft_store.save(&draft).await;

    // Best-effort report against whatever profile is cached; skip the
    // upstream round trip on the draft-save hot path.
    let record = state
        .profile_cache
        .get(&user_id)
        .await
        .map(|raw| ProfileRecord::from_value(&raw));
    let report = progress::compute_progress(record.as_ref(), Some(&draft));

    Ok(Json(json!({
        "status": "saved",
        "last_updated": draft.last_updated,
        "progress": report,
    })))
}

/// DELETE /api/v1/users/:user_id/draft
pub async fn delete_draft(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Json<serde_json::Value> {
    state.draft_store.delete(&user_id).await;
    Json(json!({ "status": "deleted" }))
}
