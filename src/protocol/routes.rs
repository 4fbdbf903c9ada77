//! REST endpoints exposing the session to a presentation layer.
//!
//! The UI gets exactly the narrow surface the core promises: current phase,
//! visible messages, the ATS result, and the four action kinds. Input
//! errors come back as 400s with a JSON body; collaborator failures are
//! part of the outcome, not transport errors.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::Error;
use crate::extract::DocumentExtractor;

use super::orchestrator::{Action, Coach, Outcome};
use super::session::CandidateProfile;

/// Shared state for session routes.
#[derive(Clone)]
pub struct CoachRouteState {
    pub coach: Arc<Coach>,
    pub extractor: Arc<dyn DocumentExtractor>,
}

#[derive(Debug, Deserialize)]
struct DocumentBody {
    text: String,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    text: String,
}

#[derive(Debug, Deserialize)]
struct CommandBody {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ProfileBody {
    position: String,
    monthly_salary: Decimal,
}

/// GET /api/session/status
async fn get_status(State(state): State<CoachRouteState>) -> impl IntoResponse {
    let coach = &state.coach;
    Json(serde_json::json!({
        "phase": coach.current_phase().await,
        "target_role": coach.target_role().await,
        "ats_scored": coach.ats_result().await.is_some(),
        "transitions": coach.transition_log().await,
    }))
}

/// GET /api/session/messages
///
/// Visible transcript only — system and synthetic trigger messages never
/// leave the core.
async fn get_messages(State(state): State<CoachRouteState>) -> impl IntoResponse {
    Json(state.coach.visible_messages().await)
}

/// GET /api/session/ats — 404 until a score has been computed.
async fn get_ats(State(state): State<CoachRouteState>) -> impl IntoResponse {
    match state.coach.ats_result().await {
        Some(result) => Json(serde_json::to_value(result).unwrap_or_default()).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "No ATS result has been computed yet"})),
        )
            .into_response(),
    }
}

/// POST /api/session/document — resume text that is already extracted.
async fn post_document(
    State(state): State<CoachRouteState>,
    Json(body): Json<DocumentBody>,
) -> impl IntoResponse {
    respond(state.coach.invoke(Action::FileUploaded { text: body.text }).await)
}

/// POST /api/session/upload — a raw document body, run through the
/// extractor first. Extraction failures are input errors, not faults.
async fn post_upload(
    State(state): State<CoachRouteState>,
    body: Bytes,
) -> axum::response::Response {
    match state.extractor.extract_text(&body).await {
        Ok(text) => respond(state.coach.invoke(Action::FileUploaded { text }).await),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}

/// POST /api/session/message
async fn post_message(
    State(state): State<CoachRouteState>,
    Json(body): Json<MessageBody>,
) -> impl IntoResponse {
    respond(state.coach.invoke(Action::UserReplied { text: body.text }).await)
}

/// POST /api/session/command
async fn post_command(
    State(state): State<CoachRouteState>,
    Json(body): Json<CommandBody>,
) -> impl IntoResponse {
    respond(state.coach.invoke(Action::CommandInvoked { id: body.id }).await)
}

/// POST /api/session/profile — the deterministic eligibility gate.
async fn post_profile(
    State(state): State<CoachRouteState>,
    Json(body): Json<ProfileBody>,
) -> impl IntoResponse {
    let verdict = state
        .coach
        .set_candidate_profile(CandidateProfile {
            position: body.position,
            monthly_salary: body.monthly_salary,
        })
        .await;
    Json(verdict)
}

/// POST /api/session/reset
async fn post_reset(State(state): State<CoachRouteState>) -> impl IntoResponse {
    respond(state.coach.invoke(Action::Reset).await)
}

fn respond(result: crate::error::Result<Outcome>) -> axum::response::Response {
    match result {
        Ok(outcome) => Json(serde_json::json!({
            "phase": outcome.phase,
            "reply": outcome.reply,
            "failure": outcome.failure,
        }))
        .into_response(),
        Err(Error::Session(e)) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}

/// Build the session REST routes.
pub fn session_routes(state: CoachRouteState) -> Router {
    Router::new()
        .route("/api/session/status", get(get_status))
        .route("/api/session/messages", get(get_messages))
        .route("/api/session/ats", get(get_ats))
        .route("/api/session/document", post(post_document))
        .route("/api/session/upload", post(post_upload))
        .route("/api/session/message", post(post_message))
        .route("/api/session/command", post(post_command))
        .route("/api/session/profile", post(post_profile))
        .route("/api/session/reset", post(post_reset))
        .with_state(state)
}
