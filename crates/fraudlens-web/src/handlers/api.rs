//! JSON API over the same flows as the dashboard.
//!
//! Unretried inference failures come back as `502 {error, kind}`; invalid
//! uploads as `400`. Sessions use the same cookie as the HTML routes.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::Json,
};
use axum_extra::extract::cookie::CookieJar;
use fraudlens_analysis::EmailReport;
use fraudlens_llm::{Completion, Message};
use serde::{Deserialize, Serialize};

use crate::error::WebError;
use crate::session;
use crate::state::SharedState;
use crate::upload;

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct EmailResponse {
    /// `null` when the submitted text was empty.
    pub report: Option<EmailReport>,
}

#[derive(Debug, Serialize)]
pub struct NarrativeResponse {
    pub narrative: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub file_name: String,
    pub text: String,
    pub degraded: bool,
    pub attempts: Option<u32>,
    /// `LlmError::kind` of the last failed attempt when degraded.
    pub error_kind: Option<&'static str>,
}

pub async fn analyze_email(
    State(state): State<SharedState>,
    Json(req): Json<TextRequest>,
) -> Result<Json<EmailResponse>, WebError> {
    let report = state.lens.analyze_email(&req.text).await?;
    Ok(Json(EmailResponse { report }))
}

pub async fn analyze_chat(
    State(state): State<SharedState>,
    Json(req): Json<TextRequest>,
) -> Result<Json<NarrativeResponse>, WebError> {
    let narrative = state.lens.audit_chat(&req.text).await?;
    Ok(Json(NarrativeResponse { narrative }))
}

pub async fn analyze_ai(
    State(state): State<SharedState>,
    Json(req): Json<TextRequest>,
) -> Result<Json<NarrativeResponse>, WebError> {
    let narrative = state.lens.detect_ai(&req.text).await?;
    Ok(Json(NarrativeResponse { narrative: Some(narrative) }))
}

pub async fn analyze_document(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Result<Json<DocumentResponse>, WebError> {
    let upload = upload::read_image(&mut multipart).await?;
    let completion = state.lens.inspect_document(&upload.bytes).await;

    let (attempts, error_kind) = match &completion {
        Completion::Answered(_) => (None, None),
        Completion::Degraded { attempts, last_error, .. } => (Some(*attempts), Some(last_error.kind())),
    };
    Ok(Json(DocumentResponse {
        file_name: upload.file_name,
        degraded: completion.is_degraded(),
        text: completion.into_text(),
        attempts,
        error_kind,
    }))
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub reply: String,
    pub transcript_len: usize,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub messages: Vec<Message>,
}

pub async fn transcript(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> (CookieJar, Json<TranscriptResponse>) {
    let (jar, session) = session::from_jar(&state.sessions, jar).await;
    let messages = session.lock().await.transcript.messages().to_vec();
    (jar, Json(TranscriptResponse { messages }))
}

pub async fn ask(
    State(state): State<SharedState>,
    jar: CookieJar,
    Json(req): Json<AskRequest>,
) -> Result<(CookieJar, Json<AskResponse>), (CookieJar, WebError)> {
    let (jar, session) = session::from_jar(&state.sessions, jar).await;
    let mut session = session.lock().await;
    // The question is kept even when the call fails, so the cookie must go out either way.
    match state.lens.ask_assistant(&mut session.transcript, &req.question).await {
        Ok(reply) => Ok((jar, Json(AskResponse { reply, transcript_len: session.transcript.len() }))),
        Err(e) => Err((jar, e.into())),
    }
}

pub async fn clear_transcript(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> (CookieJar, StatusCode) {
    let (jar, session) = session::from_jar(&state.sessions, jar).await;
    session.lock().await.transcript.clear();
    (jar, StatusCode::NO_CONTENT)
}
