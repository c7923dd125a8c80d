//! Login and logout.

use axum::extract::{Extension, State};
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use minijinja::context;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::session::{expired_cookie, SessionId};
use crate::state::SharedState;
use crate::templates::render;

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// POST /login
pub async fn login(
    State(state): State<SharedState>,
    Extension(session_id): Extension<SessionId>,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    if state.credentials.verify(&form.username, &form.password) {
        state.sessions.set_authenticated(session_id, true).await;
        info!(user = %form.username, "Login succeeded");
        return Ok(Redirect::to("/").into_response());
    }

    warn!(user = %form.username, "Login failed");
    let page = render(
        &state.templates,
        "login.html",
        context! { auth_enabled => true, error => "Invalid username or password." },
    )?;
    Ok((StatusCode::UNAUTHORIZED, page).into_response())
}

/// POST /logout: drops the session and its collection.
pub async fn logout(
    State(state): State<SharedState>,
    Extension(session_id): Extension<SessionId>,
) -> impl IntoResponse {
    state.sessions.remove(session_id).await;
    info!(session = %session_id.0, "Logged out");
    ([(SET_COOKIE, expired_cookie())], Redirect::to("/"))
}
