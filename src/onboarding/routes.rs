//! REST endpoints for hosted onboarding sessions.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use super::model::SectionUpdate;
use super::processing::{ProcessingStatus, SubmissionBackend, prepare, settle};
use super::session::{Session, SessionStore};
use super::step::{Step, step_table};
use crate::error::SessionError;

/// Shared state for onboarding routes.
#[derive(Clone)]
pub struct OnboardingRouteState {
    pub sessions: Arc<SessionStore>,
    pub backend: Arc<dyn SubmissionBackend>,
    /// Route clients are sent to after a successful submission.
    pub dashboard_route: String,
}

/// Build the onboarding REST routes.
pub fn onboarding_routes(state: OnboardingRouteState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/onboarding/steps", get(list_steps))
        .route("/api/onboarding/sessions", post(create_session))
        .route(
            "/api/onboarding/sessions/{id}",
            get(get_session).delete(delete_session),
        )
        .route("/api/onboarding/sessions/{id}/sections", patch(update_section))
        .route("/api/onboarding/sessions/{id}/advance", post(advance))
        .route("/api/onboarding/sessions/{id}/retreat", post(retreat))
        .route("/api/onboarding/sessions/{id}/jump", post(jump))
        .route("/api/onboarding/sessions/{id}/finalize", post(finalize))
        .route("/api/onboarding/sessions/{id}/retry", post(retry))
        .with_state(state)
}

// ── Helpers ─────────────────────────────────────────────────────────────

fn parse_id(raw: &str) -> Result<Uuid, SessionError> {
    Uuid::parse_str(raw).map_err(|_| SessionError::InvalidId(raw.to_string()))
}

fn error_response(err: SessionError) -> Response {
    let status = match err {
        SessionError::NotFound { .. } => StatusCode::NOT_FOUND,
        SessionError::InvalidId(_) => StatusCode::BAD_REQUEST,
    };
    (status, Json(serde_json::json!({"error": err.to_string()}))).into_response()
}

/// `{ "ok": .., "session": .. }` for the session's current state.
async fn outcome(store: &SessionStore, id: Uuid, ok: bool) -> Response {
    match store.view(id).await {
        Ok(view) => (
            StatusCode::OK,
            Json(serde_json::json!({"ok": ok, "session": view})),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// Run a controller operation on the session named by `raw_id`.
async fn run<F>(store: &SessionStore, raw_id: &str, op: F) -> Response
where
    F: FnOnce(&mut Session) -> bool,
{
    let id = match parse_id(raw_id) {
        Ok(id) => id,
        Err(e) => return error_response(e),
    };
    match store.with_session(id, op).await {
        Ok(ok) => outcome(store, id, ok).await,
        Err(e) => error_response(e),
    }
}

// ── Health / static ─────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "school-onboard"
    }))
}

async fn list_steps() -> impl IntoResponse {
    Json(step_table())
}

// ── Sessions ────────────────────────────────────────────────────────────

async fn create_session(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    let view = state.sessions.create().await;
    (StatusCode::CREATED, Json(view))
}

async fn get_session(State(state): State<OnboardingRouteState>, Path(id): Path<String>) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(e) => return error_response(e),
    };
    match state.sessions.view(id).await {
        Ok(view) => Json(view).into_response(),
        Err(e) => error_response(e),
    }
}

async fn delete_session(
    State(state): State<OnboardingRouteState>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(e) => return error_response(e),
    };
    if state.sessions.remove(id).await {
        StatusCode::NO_CONTENT.into_response()
    } else {
        error_response(SessionError::NotFound { id })
    }
}

// ── Flow operations ─────────────────────────────────────────────────────

async fn update_section(
    State(state): State<OnboardingRouteState>,
    Path(id): Path<String>,
    Json(update): Json<SectionUpdate>,
) -> Response {
    run(&state.sessions, &id, |s| {
        s.controller.update_section(update);
        true
    })
    .await
}

async fn advance(State(state): State<OnboardingRouteState>, Path(id): Path<String>) -> Response {
    run(&state.sessions, &id, |s| s.controller.advance()).await
}

async fn retreat(State(state): State<OnboardingRouteState>, Path(id): Path<String>) -> Response {
    run(&state.sessions, &id, |s| s.controller.retreat()).await
}

#[derive(Deserialize)]
struct JumpRequest {
    /// Step name (`"plan"`) or number (`"2"`).
    step: String,
}

async fn jump(
    State(state): State<OnboardingRouteState>,
    Path(id): Path<String>,
    Json(body): Json<JumpRequest>,
) -> Response {
    let step: Step = match body.step.parse() {
        Ok(step) => step,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": e})),
            )
                .into_response();
        }
    };
    run(&state.sessions, &id, |s| s.controller.jump_to_step(step)).await
}

/// Confirm review, then submit. The lock is released while the backend call
/// is in flight; the session is marked `Submitting` until it settles.
async fn finalize(State(state): State<OnboardingRouteState>, Path(id): Path<String>) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(e) => return error_response(e),
    };

    let prepared = state
        .sessions
        .with_session(id, |s| {
            if s.processing == ProcessingStatus::Submitting {
                debug!("Finalize ignored while a submission is in flight");
                return None;
            }
            if !s.controller.finalize_step() {
                return None;
            }
            let data = prepare(&s.controller).ok()?;
            s.processing = ProcessingStatus::Submitting;
            Some(data)
        })
        .await;

    let data = match prepared {
        Ok(Some(data)) => data,
        Ok(None) => return outcome(&state.sessions, id, false).await,
        Err(e) => return error_response(e),
    };

    let result = state.backend.submit(&data).await;
    let route = state.dashboard_route.clone();
    let settled = state
        .sessions
        .with_session(id, |s| {
            let status = settle(&s.controller, result, &route);
            let ok = matches!(status, ProcessingStatus::Completed { .. });
            s.processing = status;
            ok
        })
        .await;

    match settled {
        Ok(ok) => outcome(&state.sessions, id, ok).await,
        Err(e) => error_response(e),
    }
}

/// Back to review after a failed submission. Completed and in-flight
/// sessions stay put.
async fn retry(State(state): State<OnboardingRouteState>, Path(id): Path<String>) -> Response {
    run(&state.sessions, &id, |s| {
        match s.processing {
            ProcessingStatus::Completed { .. } => {
                debug!("Retry ignored for completed onboarding");
                return false;
            }
            ProcessingStatus::Submitting => {
                debug!("Retry ignored while a submission is in flight");
                return false;
            }
            ProcessingStatus::Idle | ProcessingStatus::Failed { .. } => {}
        }
        if !s.controller.retry_from_processing() {
            return false;
        }
        s.processing = ProcessingStatus::Idle;
        true
    })
    .await
}
