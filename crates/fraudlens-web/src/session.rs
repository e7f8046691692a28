//! Cookie-keyed browser sessions.
//!
//! Each session owns the assistant transcript and the sidebar toggle. Its
//! async mutex is held for the whole of a user action, so one session
//! processes one action at a time while other sessions proceed independently.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use fraudlens_analysis::Transcript;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "fraudlens_session";

#[derive(Debug, Default)]
pub struct Session {
    pub transcript: Transcript,
    pub assistant_open: bool,
}

pub type SessionHandle = Arc<Mutex<Session>>;

struct Entry {
    session: SessionHandle,
    last_seen: Instant,
}

pub struct SessionStore {
    entries: RwLock<HashMap<Uuid, Entry>>,
    idle: Duration,
}

impl SessionStore {
    pub fn new(idle: Duration) -> Self {
        Self { entries: RwLock::new(HashMap::new()), idle }
    }

    /// The session for `id`, or a fresh one when the id is absent or unknown.
    pub async fn resolve(&self, id: Option<Uuid>) -> (Uuid, SessionHandle) {
        let mut entries = self.entries.write().await;
        if let Some(id) = id {
            if let Some(entry) = entries.get_mut(&id) {
                entry.last_seen = Instant::now();
                return (id, entry.session.clone());
            }
        }

        let id = Uuid::new_v4();
        let session = SessionHandle::default();
        entries.insert(id, Entry { session: session.clone(), last_seen: Instant::now() });
        debug!(%id, sessions = entries.len(), "Session created");
        (id, session)
    }

    /// Drop sessions idle past the window. A session with an action in
    /// flight is kept regardless of age.
    pub async fn purge_idle(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| {
            e.last_seen.elapsed() < self.idle || Arc::strong_count(&e.session) > 1
        });
        let purged = before - entries.len();
        if purged > 0 {
            debug!(purged, remaining = entries.len(), "Expired idle sessions");
        }
        purged
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

/// Resolve the request's session from its cookie. The returned jar carries a
/// new cookie when the session had to be created.
pub async fn from_jar(store: &SessionStore, jar: CookieJar) -> (CookieJar, SessionHandle) {
    let presented = jar
        .get(SESSION_COOKIE)
        .and_then(|c| Uuid::parse_str(c.value()).ok());
    let (id, session) = store.resolve(presented).await;
    if presented == Some(id) {
        (jar, session)
    } else {
        (jar.add(session_cookie(id)), session)
    }
}

fn session_cookie(id: Uuid) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fraudlens_llm::Message;

    const IDLE: Duration = Duration::from_secs(120 * 60);

    #[tokio::test]
    async fn test_known_id_resolves_to_same_session() {
        let store = SessionStore::new(IDLE);
        let (id, first) = store.resolve(None).await;
        first.lock().await.transcript.append(Message::user("hello"));

        let (again, second) = store.resolve(Some(id)).await;
        assert_eq!(again, id);
        assert_eq!(second.lock().await.transcript.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_id_gets_fresh_session() {
        let store = SessionStore::new(IDLE);
        let stale = Uuid::new_v4();
        let (id, session) = store.resolve(Some(stale)).await;
        assert_ne!(id, stale);
        assert!(session.lock().await.transcript.is_empty());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = SessionStore::new(IDLE);
        let (_, a) = store.resolve(None).await;
        let (_, b) = store.resolve(None).await;
        a.lock().await.assistant_open = true;
        assert!(!b.lock().await.assistant_open);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_sessions_expire() {
        let store = SessionStore::new(IDLE);
        let (old, handle) = store.resolve(None).await;
        drop(handle);

        tokio::time::advance(Duration::from_secs(119 * 60)).await;
        let (_, fresh) = store.resolve(None).await;
        drop(fresh);
        assert_eq!(store.purge_idle().await, 0);

        tokio::time::advance(Duration::from_secs(2 * 60)).await;
        assert_eq!(store.purge_idle().await, 1);
        assert_eq!(store.len().await, 1);

        let (id, _) = store.resolve(Some(old)).await;
        assert_ne!(id, old);
    }

    #[tokio::test(start_paused = true)]
    async fn test_busy_session_survives_purge() {
        let store = SessionStore::new(IDLE);
        let (_, held) = store.resolve(None).await;
        tokio::time::advance(IDLE * 2).await;
        assert_eq!(store.purge_idle().await, 0);
        drop(held);
        assert_eq!(store.purge_idle().await, 1);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_cookie_only_set_for_new_sessions() {
        let store = SessionStore::new(IDLE);
        let (jar, _) = from_jar(&store, CookieJar::new()).await;
        let cookie = jar.get(SESSION_COOKIE).unwrap().clone();
        assert!(Uuid::parse_str(cookie.value()).is_ok());
        assert_eq!(cookie.http_only(), Some(true));

        let (jar, _) = from_jar(&store, CookieJar::new().add(cookie.clone())).await;
        assert_eq!(jar.get(SESSION_COOKIE).map(|c| c.value().to_string()), Some(cookie.value().to_string()));
        assert_eq!(store.len().await, 1);
    }
}
