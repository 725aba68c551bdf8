//! Axum route handlers for the Session API.

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::application::models::{ApplicationState, ChatTranscript, Field};
use crate::application::session::{Session, TurnOutcome};
use crate::application::summary::{render_summary, SUMMARY_FILE_NAME};
use crate::documents::extract_pdf_text;
use crate::errors::AppError;
use crate::state::AppState;

const RESUME_FIELD: &str = "file";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub application: ApplicationState,
    pub missing_fields: Vec<Field>,
    pub complete: bool,
    pub transcript: ChatTranscript,
}

impl SessionSnapshot {
    fn of(session: &Session) -> Self {
        Self {
            session_id: session.id(),
            created_at: session.created_at(),
            application: session.state().clone(),
            missing_fields: session.state().missing_fields(),
            complete: session.state().is_complete(),
            transcript: session.transcript().clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct TurnResponse {
    #[serde(flatten)]
    pub outcome: TurnOutcome,
    pub session: SessionSnapshot,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionSnapshot>) {
    let handle = state.sessions.create().await;
    let session = handle.lock().await;
    (StatusCode::CREATED, Json(SessionSnapshot::of(&session)))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let handle = state.sessions.get(id).await?;
    let session = handle.lock().await;
    Ok(Json(SessionSnapshot::of(&session)))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/:id/messages
///
/// One chat turn. The session stays locked until the agent has answered.
pub async fn handle_chat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<TurnResponse>, AppError> {
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;

    let outcome = session
        .chat(
            &request.message,
            state.agent.as_ref(),
            &state.config.turn_settings(),
        )
        .await?;

    Ok(Json(TurnResponse {
        outcome,
        session: SessionSnapshot::of(&session),
    }))
}

/// POST /api/v1/sessions/:id/resume
///
/// Multipart upload with the PDF in part `file`. An unreadable or empty document
/// is reported as a notice, not an error.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<TurnResponse>, AppError> {
    let handle = state.sessions.get(id).await?;

    let mut payload = None;
    while let Some(part) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))?
    {
        if part.name() == Some(RESUME_FIELD) {
            payload = Some(
                part.bytes()
                    .await
                    .map_err(|e| AppError::Validation(e.body_text()))?,
            );
            break;
        }
    }
    let payload = payload.ok_or_else(|| {
        AppError::Validation(format!("multipart part '{RESUME_FIELD}' is required"))
    })?;

    let mut session = handle.lock().await;
    let outcome = match extract_pdf_text(payload).await {
        Ok(text) => {
            session
                .ingest_resume_text(
                    &text,
                    state.agent.as_ref(),
                    &state.config.turn_settings(),
                )
                .await?
        }
        Err(e) => {
            warn!(session = %id, "resume upload skipped: {e}");
            TurnOutcome::skipped(format!("{e}. Resume parsing was skipped."))
        }
    };

    Ok(Json(TurnResponse {
        outcome,
        session: SessionSnapshot::of(&session),
    }))
}

/// POST /api/v1/sessions/:id/reset
pub async fn handle_reset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;
    session.reset();
    Ok(Json(SessionSnapshot::of(&session)))
}

/// GET /api/v1/sessions/:id/summary
///
/// Plain-text summary download, available once all fields are present.
pub async fn handle_summary(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let handle = state.sessions.get(id).await?;
    let session = handle.lock().await;

    let summary = render_summary(session.state()).ok_or_else(|| {
        let missing = session
            .state()
            .missing_fields()
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        AppError::UnprocessableEntity(format!("Application is incomplete; missing: {missing}"))
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{SUMMARY_FILE_NAME}\""),
            ),
        ],
        summary,
    ))
}
