//! Error type returned by handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

/// Any handler failure; rendered as a 500 with a short message.
#[derive(Debug)]
pub struct ApiError(anyhow::Error);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(error = %self.0, "Request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, format!("Internal error: {}", self.0)).into_response()
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
