//! Dashboard page: the four analysis tabs plus the assistant sidebar.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use fraudlens_analysis::{Band, EmailReport};
use fraudlens_llm::Completion;
use minijinja::context;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::WebError;
use crate::session::{self, Session};
use crate::state::{AppState, SharedState};
use crate::upload::Upload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Email,
    Chat,
    Document,
    Ai,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Email, Tab::Chat, Tab::Document, Tab::Ai];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Email    => "email",
            Tab::Chat     => "chat",
            Tab::Document => "document",
            Tab::Ai       => "ai",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Email    => "Email Scan",
            Tab::Chat     => "Chat Audit",
            Tab::Document => "Document Forensics",
            Tab::Ai       => "AI vs AI Defense",
        }
    }
}

/// What a finished action shows under its tab.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Email {
        score: u64,
        narrative: String,
        band: Band,
        band_label: &'static str,
        figure: Value,
        defanged_input: String,
    },
    /// Plain model text, no gauge.
    Narrative { text: String },
    Document {
        file_name: String,
        /// `data:` URL of the uploaded image.
        preview: String,
        text: String,
        degraded: bool,
    },
}

impl Outcome {
    pub fn email(report: EmailReport) -> Self {
        let band = report.gauge.band();
        Outcome::Email {
            score: report.assessment.score,
            narrative: report.assessment.narrative,
            band,
            band_label: band.label(),
            figure: report.gauge.to_plotly(),
            defanged_input: report.defanged_input,
        }
    }

    pub fn document(upload: Upload, completion: Completion) -> Self {
        let degraded = completion.is_degraded();
        Outcome::Document {
            preview: upload.data_url(),
            file_name: upload.file_name,
            text: completion.into_text(),
            degraded,
        }
    }
}

#[derive(Debug, Default)]
pub struct PageView {
    pub tab: Tab,
    pub input: String,
    pub outcome: Option<Outcome>,
    pub error: Option<String>,
    pub status: Option<StatusCode>,
}

impl PageView {
    pub fn new(tab: Tab) -> Self {
        Self { tab, ..Self::default() }
    }

    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = input.into();
        self
    }

    /// Show the error as a banner and answer with its status.
    pub fn fail(&mut self, err: WebError) {
        err.log();
        self.error = Some(err.banner());
        self.status = Some(err.status());
    }
}

#[derive(Debug, Deserialize)]
pub struct TabQuery {
    #[serde(default)]
    pub tab: Tab,
}

pub async fn dashboard(
    State(state): State<SharedState>,
    jar: CookieJar,
    Query(query): Query<TabQuery>,
) -> Result<Response, WebError> {
    let (jar, session) = session::from_jar(&state.sessions, jar).await;
    let session = session.lock().await;
    respond(&state, jar, &session, PageView::new(query.tab))
}

/// Render the page for `view` and attach the session cookie.
pub fn respond(
    state: &AppState,
    jar: CookieJar,
    session: &Session,
    view: PageView,
) -> Result<Response, WebError> {
    let status = view.status.unwrap_or(StatusCode::OK);
    let html = render(state, session, view)?;
    Ok((status, jar, Html(html)).into_response())
}

pub fn render(state: &AppState, session: &Session, view: PageView) -> Result<String, WebError> {
    let tabs: Vec<Value> = Tab::ALL
        .iter()
        .map(|t| json!({ "id": t.as_str(), "label": t.label(), "active": *t == view.tab }))
        .collect();
    let transcript: Vec<Value> = session
        .transcript
        .messages()
        .iter()
        .map(|m| json!({ "role": m.role().as_str(), "text": m.text() }))
        .collect();

    let template = state.templates.get_template("dashboard.html")?;
    let html = template.render(context! {
        tabs,
        tab => view.tab.as_str(),
        input => view.input,
        outcome => view.outcome,
        error => view.error,
        assistant_open => session.assistant_open,
        transcript,
        text_model => state.lens.models().text.clone(),
        vision_model => state.lens.models().vision.clone(),
    })?;
    Ok(html)
}
