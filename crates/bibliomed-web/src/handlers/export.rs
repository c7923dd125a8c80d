//! CSV and PDF downloads of the session's collection.

use axum::extract::{Extension, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::IntoResponse;
use bibliomed_export::{render_pdf, to_csv_bytes};
use tracing::debug;

use crate::error::ApiError;
use crate::session::SessionId;
use crate::state::SharedState;

fn attachment(file_name: &str) -> String {
    format!("attachment; filename=\"{}\"", file_name)
}

/// GET /export/csv
pub async fn export_csv(
    State(state): State<SharedState>,
    Extension(session_id): Extension<SessionId>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.sessions.snapshot(session_id).await;
    let bytes = to_csv_bytes(session.collection.records())?;
    debug!(rows = session.collection.len(), "Serving CSV export");
    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (CONTENT_DISPOSITION, attachment(&state.export_names.csv)),
        ],
        bytes,
    ))
}

/// GET /export/pdf
pub async fn export_pdf(
    State(state): State<SharedState>,
    Extension(session_id): Extension<SessionId>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.sessions.snapshot(session_id).await;
    let records = session.collection.into_records();
    let report = state.report.clone();
    // lopdf is synchronous; keep it off the async workers.
    let bytes = tokio::task::spawn_blocking(move || render_pdf(&records, &report)).await??;
    Ok((
        [
            (CONTENT_TYPE, "application/pdf".to_string()),
            (CONTENT_DISPOSITION, attachment(&state.export_names.pdf)),
        ],
        bytes,
    ))
}
