//! Login gate backed by a configured argon2 password hash.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use bibliomed_config::AuthConfig;
use secrecy::{ExposeSecret, SecretString};
use tracing::warn;

use crate::session::SessionId;
use crate::state::SharedState;

pub struct Credentials {
    enabled: bool,
    username: String,
    password_hash: Option<SecretString>,
}

impl Credentials {
    /// No login required.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            username: String::new(),
            password_hash: None,
        }
    }

    pub fn new(username: impl Into<String>, password_hash: SecretString) -> Self {
        Self {
            enabled: true,
            username: username.into(),
            password_hash: Some(password_hash),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        match (config.enabled, &config.password_hash) {
            (true, Some(hash)) => Self::new(
                config.username.clone(),
                SecretString::from(hash.expose_secret().to_string()),
            ),
            _ => Self::disabled(),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Check a login attempt. Always true when the gate is disabled.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        if !self.enabled {
            return true;
        }
        if username != self.username {
            return false;
        }
        let Some(hash) = &self.password_hash else {
            return false;
        };

        match PasswordHash::new(hash.expose_secret()) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                warn!(error = %e, "Configured password hash is not a valid PHC string");
                false
            }
        }
    }
}

/// Route layer for protected routes. Unauthenticated page requests are sent
/// back to `/`; API requests get a 401.
pub async fn require_login(State(state): State<SharedState>, req: Request, next: Next) -> Response {
    if !state.credentials.enabled() {
        return next.run(req).await;
    }

    let authenticated = match req.extensions().get::<SessionId>() {
        Some(id) => state.sessions.is_authenticated(*id).await,
        None => false,
    };
    if authenticated {
        return next.run(req).await;
    }

    if req.uri().path().starts_with("/api/") {
        (StatusCode::UNAUTHORIZED, "login required").into_response()
    } else {
        Redirect::to("/").into_response()
    }
}
