//! Search and scrape actions. Each runs to completion, then its batch is
//! appended to the session's collection and the browser is redirected home.

use axum::extract::{Extension, State};
use axum::response::Redirect;
use axum::Form;
use bibliomed_ingestion::parse_url_list;
use serde::Deserialize;
use tracing::info;

use crate::session::SessionId;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub keyword: String,
}

#[derive(Deserialize)]
pub struct ScrapeForm {
    #[serde(default)]
    pub urls: String,
}

/// POST /search
pub async fn search(
    State(state): State<SharedState>,
    Extension(session_id): Extension<SessionId>,
    Form(form): Form<SearchForm>,
) -> Redirect {
    let keyword = form.keyword.trim();
    if keyword.is_empty() {
        state.sessions.set_notice(session_id, "Enter a keyword to search.").await;
        return Redirect::to("/");
    }

    let batch = state.collector.search(keyword).await;
    let found = batch.len();
    let total = state.sessions.append(session_id, format!("search for \"{}\"", keyword), batch).await;
    info!(keyword, found, total, "Search appended to session");
    if found == 0 {
        state
            .sessions
            .set_notice(session_id, format!("No results for \"{}\".", keyword))
            .await;
    }
    Redirect::to("/")
}

/// POST /scrape
pub async fn scrape(
    State(state): State<SharedState>,
    Extension(session_id): Extension<SessionId>,
    Form(form): Form<ScrapeForm>,
) -> Redirect {
    let urls = parse_url_list(&form.urls);
    if urls.is_empty() {
        state.sessions.set_notice(session_id, "Paste at least one link to scrape.").await;
        return Redirect::to("/");
    }

    let batch = state.collector.scrape(&urls).await;
    let total = state.sessions.append(session_id, "scrape".to_string(), batch).await;
    info!(urls = urls.len(), total, "Scrape appended to session");
    Redirect::to("/")
}
