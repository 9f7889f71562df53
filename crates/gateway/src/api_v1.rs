//! HTTP API v1 — REST surface over the query pipeline.
//!
//! Endpoints:
//!
//! - `POST /v1/chat`             — Ask a question, log the exchange in a session
//! - `GET  /v1/sessions`         — List chat sessions
//! - `POST /v1/sessions`         — Create a new session
//! - `GET  /v1/sessions/{name}`  — Get a session's message log
//! - `GET  /v1/presets`          — The canned starter questions
//! - `GET  /v1/documents`        — Patient-data and guideline documents in the store
//! - `GET  /v1/frameworks`       — The framework catalog and its skip report

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

use caretutor_core::session::{ChatSession, PRESET_QUERIES, Role};
use caretutor_core::store::DocumentStore;
use caretutor_core::Error;
use caretutor_pipeline::catalog::{FrameworkLoader, SkipReason};
use caretutor_pipeline::context::ContextMetadata;
use caretutor_pipeline::TutorPipeline;

// ── State ─────────────────────────────────────────────────────────────────

/// Maximum number of in-memory sessions before the stalest is evicted.
const MAX_SESSIONS: usize = 100;

/// Session used when a chat request names none.
const DEFAULT_SESSION: &str = "Session 1";

/// Shared state for the v1 API.
pub struct ApiState {
    pub pipeline: TutorPipeline,
    pub store: Arc<dyn DocumentStore>,
    pub loader: FrameworkLoader,
    pub sessions: RwLock<HashMap<String, ChatSession>>,
}

pub type SharedApiState = Arc<ApiState>;

// ── Router ────────────────────────────────────────────────────────────────

/// Build the v1 API router. Nest this under "/v1" in the main router.
pub fn v1_router(state: SharedApiState) -> Router {
    Router::new()
        .route("/chat", post(chat_handler))
        .route("/sessions", get(list_sessions_handler))
        .route("/sessions", post(create_session_handler))
        .route("/sessions/{name}", get(get_session_handler))
        .route("/presets", get(presets_handler))
        .route("/documents", get(list_documents_handler))
        .route("/frameworks", get(frameworks_handler))
        .with_state(state)
}

// ── Request / Response types ──────────────────────────────────────────────

#[derive(Deserialize)]
struct ChatRequest {
    /// Session to log the exchange in (omit for "Session 1").
    #[serde(default)]
    session: Option<String>,
    /// The user's question.
    query: String,
}

#[derive(Serialize, Deserialize)]
struct ChatResponse {
    session: String,
    answer: String,
    framework: String,
    context: ContextMetadataDto,
}

#[derive(Serialize, Deserialize)]
struct ContextMetadataDto {
    patient_docs: usize,
    guideline_docs: usize,
    selected_guidelines: Vec<String>,
    selection_fallback: bool,
}

#[derive(Serialize, Deserialize)]
struct SessionListResponse {
    sessions: Vec<SessionSummaryDto>,
}

#[derive(Serialize, Deserialize)]
struct SessionSummaryDto {
    name: String,
    message_count: usize,
    created_at: String,
    updated_at: String,
}

#[derive(Serialize, Deserialize)]
struct SessionDetailResponse {
    name: String,
    messages: Vec<MessageDto>,
    created_at: String,
    updated_at: String,
}

#[derive(Serialize, Deserialize)]
struct MessageDto {
    id: String,
    role: String,
    content: String,
    timestamp: String,
}

#[derive(Serialize, Deserialize)]
struct CreateSessionResponse {
    name: String,
    created_at: String,
}

#[derive(Serialize, Deserialize)]
struct PresetsResponse {
    presets: Vec<String>,
}

#[derive(Serialize, Deserialize)]
struct DocumentListResponse {
    documents: Vec<DocumentDto>,
    count: usize,
}

#[derive(Serialize, Deserialize)]
struct DocumentDto {
    id: String,
    name: String,
    mime_type: String,
    source: String,
}

#[derive(Serialize, Deserialize)]
struct FrameworkListResponse {
    frameworks: Vec<String>,
    report: CatalogReportDto,
}

#[derive(Serialize, Deserialize)]
struct CatalogReportDto {
    documents_seen: usize,
    loaded: usize,
    skipped: Vec<SkippedDocumentDto>,
}

#[derive(Serialize, Deserialize)]
struct SkippedDocumentDto {
    name: String,
    reason: String,
}

#[derive(Serialize, Deserialize)]
struct ErrorResponse {
    error: String,
}

// ── Chat ──────────────────────────────────────────────────────────────────

/// `POST /v1/chat` — run one query through the pipeline.
async fn chat_handler(
    State(state): State<SharedApiState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ErrorResponse>)> {
    let session_name = payload
        .session
        .unwrap_or_else(|| DEFAULT_SESSION.to_string());

    info!(session = %session_name, "chat request");

    // The pipeline runs before the session lock is taken: a failed query
    // must leave the log untouched, and the model calls must not block
    // readers of the session list.
    let outcome = state
        .pipeline
        .run(&payload.query)
        .await
        .map_err(internal_error)?;

    let mut sessions = state.sessions.write().await;

    // Evict the stalest session if at capacity
    if sessions.len() >= MAX_SESSIONS && !sessions.contains_key(&session_name) {
        if let Some(stalest) = sessions
            .iter()
            .min_by_key(|(_, s)| s.updated_at)
            .map(|(name, _)| name.clone())
        {
            sessions.remove(&stalest);
        }
    }

    let session = sessions
        .entry(session_name.clone())
        .or_insert_with(|| ChatSession::new(&session_name));
    session.push_exchange(&payload.query, &outcome.answer);

    Ok(Json(ChatResponse {
        session: session_name,
        answer: outcome.answer,
        framework: outcome.framework,
        context: context_dto(&outcome.context),
    }))
}

// ── Sessions ──────────────────────────────────────────────────────────────

async fn list_sessions_handler(State(state): State<SharedApiState>) -> Json<SessionListResponse> {
    let sessions = state.sessions.read().await;

    let mut summaries: Vec<SessionSummaryDto> = sessions
        .values()
        .map(|s| SessionSummaryDto {
            name: s.name.clone(),
            message_count: s.messages.len(),
            created_at: s.created_at.to_rfc3339(),
            updated_at: s.updated_at.to_rfc3339(),
        })
        .collect();

    summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

    Json(SessionListResponse {
        sessions: summaries,
    })
}

async fn create_session_handler(
    State(state): State<SharedApiState>,
) -> (StatusCode, Json<CreateSessionResponse>) {
    let mut sessions = state.sessions.write().await;

    // Evict the stalest if at capacity
    if sessions.len() >= MAX_SESSIONS {
        if let Some(stalest) = sessions
            .iter()
            .min_by_key(|(_, s)| s.updated_at)
            .map(|(name, _)| name.clone())
        {
            sessions.remove(&stalest);
        }
    }

    // First free "Session {n}" name
    let mut n = sessions.len() + 1;
    let name = loop {
        let candidate = format!("Session {n}");
        if !sessions.contains_key(&candidate) {
            break candidate;
        }
        n += 1;
    };

    let session = ChatSession::new(&name);
    let created_at = session.created_at.to_rfc3339();
    sessions.insert(name.clone(), session);

    (
        StatusCode::CREATED,
        Json(CreateSessionResponse { name, created_at }),
    )
}

async fn get_session_handler(
    State(state): State<SharedApiState>,
    Path(name): Path<String>,
) -> Result<Json<SessionDetailResponse>, StatusCode> {
    let sessions = state.sessions.read().await;

    let session = sessions.get(&name).ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(SessionDetailResponse {
        name: session.name.clone(),
        messages: session
            .messages
            .iter()
            .map(|m| MessageDto {
                id: m.id.clone(),
                role: role_label(m.role).to_string(),
                content: m.content.clone(),
                timestamp: m.timestamp.to_rfc3339(),
            })
            .collect(),
        created_at: session.created_at.to_rfc3339(),
        updated_at: session.updated_at.to_rfc3339(),
    }))
}

// ── Presets / Documents / Frameworks ──────────────────────────────────────

async fn presets_handler() -> Json<PresetsResponse> {
    Json(PresetsResponse {
        presets: PRESET_QUERIES.iter().map(|q| q.to_string()).collect(),
    })
}

/// `GET /v1/documents` — what the store currently lists for this patient.
async fn list_documents_handler(
    State(state): State<SharedApiState>,
) -> Result<Json<DocumentListResponse>, (StatusCode, Json<ErrorResponse>)> {
    let documents: Vec<DocumentDto> = state
        .store
        .list_data_files()
        .await
        .map_err(|e| internal_error(e.into()))?
        .into_iter()
        .map(|d| DocumentDto {
            id: d.id,
            name: d.name,
            mime_type: d.mime_type,
            source: d.source.as_str().to_string(),
        })
        .collect();

    let count = documents.len();
    Ok(Json(DocumentListResponse { documents, count }))
}

/// `GET /v1/frameworks` — load the catalog afresh and report what was
/// admitted and what was skipped.
async fn frameworks_handler(
    State(state): State<SharedApiState>,
) -> Result<Json<FrameworkListResponse>, (StatusCode, Json<ErrorResponse>)> {
    let (catalog, report) = state
        .loader
        .load()
        .await
        .map_err(|e| internal_error(e.into()))?;

    Ok(Json(FrameworkListResponse {
        frameworks: catalog.into_iter().map(|f| f.name).collect(),
        report: CatalogReportDto {
            documents_seen: report.documents_seen,
            loaded: report.loaded,
            skipped: report
                .skipped
                .into_iter()
                .map(|s| SkippedDocumentDto {
                    name: s.name,
                    reason: reason_label(s.reason).to_string(),
                })
                .collect(),
        },
    }))
}

// ── Helpers ───────────────────────────────────────────────────────────────

fn internal_error(err: Error) -> (StatusCode, Json<ErrorResponse>) {
    error!(error = %err, "request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

fn context_dto(metadata: &ContextMetadata) -> ContextMetadataDto {
    ContextMetadataDto {
        patient_docs: metadata.patient_docs,
        guideline_docs: metadata.guideline_docs,
        selected_guidelines: metadata.selected_guidelines.clone(),
        selection_fallback: metadata.selection_fallback,
    }
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

fn reason_label(reason: SkipReason) -> &'static str {
    match reason {
        SkipReason::EmptyContent => "empty_content",
        SkipReason::MissingHeader => "missing_header",
        SkipReason::Unreadable => "unreadable",
    }
}
