//! JSON view of the session's collection.

use axum::extract::{Extension, State};
use axum::Json;
use bibliomed_ingestion::Collection;

use crate::session::SessionId;
use crate::state::SharedState;

/// GET /api/records
pub async fn records(
    State(state): State<SharedState>,
    Extension(session_id): Extension<SessionId>,
) -> Json<Collection> {
    Json(state.sessions.snapshot(session_id).await.collection)
}
