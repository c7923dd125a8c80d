//! In-memory sessions keyed by a cookie.
//!
//! Each browser session owns its own `Collection`. Nothing is persisted: a
//! server restart starts every session from an empty table.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use axum::extract::{Request, State};
use axum::http::header::SET_COOKIE;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::headers::{Cookie, HeaderMapExt};
use bibliomed_ingestion::{Collection, Record};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::state::SharedState;

pub const SESSION_COOKIE: &str = "bibliomed_session";

/// Sessions idle longer than this are dropped.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(12 * 60 * 60);
/// Upper bound on live sessions; the least recently seen one is evicted past it.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Identifies the caller's session; inserted into request extensions by `session_layer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

/// The latest action's outcome, shown once on the next page load.
#[derive(Debug, Clone)]
pub struct LastBatch {
    pub action: String,
    pub records: Vec<Record>,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub authenticated: bool,
    pub collection: Collection,
    pub last_batch: Option<LastBatch>,
    pub notice: Option<String>,
}

struct Entry {
    session: Session,
    last_seen: Instant,
}

impl Entry {
    fn new() -> Self {
        Self { session: Session::default(), last_seen: Instant::now() }
    }
}

pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, Entry>>,
    idle_timeout: Duration,
    max_sessions: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_limits(DEFAULT_IDLE_TIMEOUT, DEFAULT_MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(idle_timeout: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
            max_sessions: max_sessions.max(1),
        }
    }

    /// Return the live session for `id`, or create a fresh one.
    /// The flag is true when a new session was created.
    pub async fn resolve(&self, id: Option<SessionId>) -> (SessionId, bool) {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();

        if let Some(id) = id {
            if let Some(entry) = sessions.get_mut(&id) {
                if now.duration_since(entry.last_seen) <= self.idle_timeout {
                    entry.last_seen = now;
                    return (id, false);
                }
                sessions.remove(&id);
            }
        }

        let idle_timeout = self.idle_timeout;
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) <= idle_timeout);
        while sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| *id);
            match oldest {
                Some(oldest) => {
                    debug!(session = %oldest.0, "Evicting least recently seen session");
                    sessions.remove(&oldest);
                }
                None => break,
            }
        }

        let id = SessionId(Uuid::new_v4());
        sessions.insert(id, Entry::new());
        (id, true)
    }

    pub async fn snapshot(&self, id: SessionId) -> Session {
        self.sessions
            .read()
            .await
            .get(&id)
            .map(|entry| entry.session.clone())
            .unwrap_or_default()
    }

    /// Clone the session for rendering and clear its one-shot display state
    /// (last batch and notice) under the same lock.
    pub async fn take_view(&self, id: SessionId) -> Session {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&id) {
            Some(entry) => {
                let view = entry.session.clone();
                entry.session.last_batch = None;
                entry.session.notice = None;
                view
            }
            None => Session::default(),
        }
    }

    pub async fn is_authenticated(&self, id: SessionId) -> bool {
        self.sessions
            .read()
            .await
            .get(&id)
            .map(|entry| entry.session.authenticated)
            .unwrap_or(false)
    }

    pub async fn set_authenticated(&self, id: SessionId, authenticated: bool) {
        let mut sessions = self.sessions.write().await;
        sessions.entry(id).or_insert_with(Entry::new).session.authenticated = authenticated;
    }

    /// Append a finished batch to the session's collection and remember it for display.
    pub async fn append(&self, id: SessionId, action: String, batch: Vec<Record>) -> usize {
        let mut sessions = self.sessions.write().await;
        let session = &mut sessions.entry(id).or_insert_with(Entry::new).session;
        let collection = std::mem::take(&mut session.collection);
        session.collection = collection.append(batch.clone());
        session.last_batch = Some(LastBatch { action, records: batch });
        session.notice = None;
        session.collection.len()
    }

    pub async fn set_notice(&self, id: SessionId, notice: impl Into<String>) {
        let mut sessions = self.sessions.write().await;
        sessions.entry(id).or_insert_with(Entry::new).session.notice = Some(notice.into());
    }

    /// Drop the session and everything it collected.
    pub async fn remove(&self, id: SessionId) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Cookie value that makes the browser forget the session.
pub fn expired_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

/// Middleware: resolve the session cookie, create a session when needed, and
/// set the cookie on the response for new sessions.
pub async fn session_layer(
    State(state): State<SharedState>,
    mut req: Request,
    next: Next,
) -> Response {
    let presented = req
        .headers()
        .typed_get::<Cookie>()
        .and_then(|c| c.get(SESSION_COOKIE).and_then(|v| Uuid::parse_str(v).ok()))
        .map(SessionId);

    let (id, created) = state.sessions.resolve(presented).await;
    req.extensions_mut().insert(id);

    let mut response = next.run(req).await;
    if created && !response.headers().contains_key(SET_COOKIE) {
        debug!(session = %id.0, "Created session");
        let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id.0);
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }
    response
}
