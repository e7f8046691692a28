//! Form posts from the four analysis tabs. Each renders the dashboard with the
//! outcome (or an error banner) under the tab that was used.

use axum::{
    extract::{Multipart, State},
    response::Response,
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::error::WebError;
use crate::handlers::dashboard::{respond, Outcome, PageView, Tab};
use crate::session;
use crate::state::SharedState;
use crate::upload;

#[derive(Debug, Deserialize)]
pub struct TextForm {
    #[serde(default)]
    pub text: String,
}

pub async fn email(
    State(state): State<SharedState>,
    jar: CookieJar,
    Form(form): Form<TextForm>,
) -> Result<Response, WebError> {
    let (jar, session) = session::from_jar(&state.sessions, jar).await;
    let session = session.lock().await;

    let mut view = PageView::new(Tab::Email).with_input(form.text.as_str());
    match state.lens.analyze_email(&form.text).await {
        Ok(report) => view.outcome = report.map(Outcome::email),
        Err(e) => view.fail(e.into()),
    }
    respond(&state, jar, &session, view)
}

pub async fn chat(
    State(state): State<SharedState>,
    jar: CookieJar,
    Form(form): Form<TextForm>,
) -> Result<Response, WebError> {
    let (jar, session) = session::from_jar(&state.sessions, jar).await;
    let session = session.lock().await;

    let mut view = PageView::new(Tab::Chat).with_input(form.text.as_str());
    match state.lens.audit_chat(&form.text).await {
        Ok(text) => view.outcome = text.map(|text| Outcome::Narrative { text }),
        Err(e) => view.fail(e.into()),
    }
    respond(&state, jar, &session, view)
}

pub async fn document(
    State(state): State<SharedState>,
    jar: CookieJar,
    mut multipart: Multipart,
) -> Result<Response, WebError> {
    let (jar, session) = session::from_jar(&state.sessions, jar).await;
    let session = session.lock().await;

    let mut view = PageView::new(Tab::Document);
    match upload::read_image(&mut multipart).await {
        Ok(upload) => {
            let completion = state.lens.inspect_document(&upload.bytes).await;
            view.outcome = Some(Outcome::document(upload, completion));
        }
        Err(e) => view.fail(e),
    }
    respond(&state, jar, &session, view)
}

pub async fn ai(
    State(state): State<SharedState>,
    jar: CookieJar,
    Form(form): Form<TextForm>,
) -> Result<Response, WebError> {
    let (jar, session) = session::from_jar(&state.sessions, jar).await;
    let session = session.lock().await;

    let mut view = PageView::new(Tab::Ai).with_input(form.text.as_str());
    match state.lens.detect_ai(&form.text).await {
        Ok(text) => view.outcome = Some(Outcome::Narrative { text }),
        Err(e) => view.fail(e.into()),
    }
    respond(&state, jar, &session, view)
}
