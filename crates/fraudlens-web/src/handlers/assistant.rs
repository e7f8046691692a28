//! Sidebar compliance assistant: open/close, ask, clear history.

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::debug;

use crate::error::WebError;
use crate::handlers::dashboard::{respond, PageView, Tab};
use crate::session;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct SidebarForm {
    #[serde(default)]
    pub tab: Tab,
}

#[derive(Debug, Deserialize)]
pub struct AskForm {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub tab: Tab,
}

fn back_to(tab: Tab) -> Redirect {
    Redirect::to(&format!("/?tab={}", tab.as_str()))
}

pub async fn toggle(
    State(state): State<SharedState>,
    jar: CookieJar,
    Form(form): Form<SidebarForm>,
) -> (CookieJar, Redirect) {
    let (jar, session) = session::from_jar(&state.sessions, jar).await;
    let mut session = session.lock().await;
    session.assistant_open = !session.assistant_open;
    debug!(open = session.assistant_open, "Assistant toggled");
    (jar, back_to(form.tab))
}

/// A blank question is ignored. A failed call leaves the question in the
/// history and shows the error banner.
pub async fn ask(
    State(state): State<SharedState>,
    jar: CookieJar,
    Form(form): Form<AskForm>,
) -> Result<Response, WebError> {
    let (jar, session) = session::from_jar(&state.sessions, jar).await;
    let mut session = session.lock().await;

    if form.question.trim().is_empty() {
        return Ok((jar, back_to(form.tab)).into_response());
    }
    match state.lens.ask_assistant(&mut session.transcript, &form.question).await {
        Ok(_) => Ok((jar, back_to(form.tab)).into_response()),
        Err(e) => {
            let mut view = PageView::new(form.tab);
            view.fail(e.into());
            respond(&state, jar, &session, view)
        }
    }
}

pub async fn clear(
    State(state): State<SharedState>,
    jar: CookieJar,
    Form(form): Form<SidebarForm>,
) -> (CookieJar, Redirect) {
    let (jar, session) = session::from_jar(&state.sessions, jar).await;
    session.lock().await.transcript.clear();
    (jar, back_to(form.tab))
}
