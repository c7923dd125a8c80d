//! The workspace page: search and scrape forms, the latest batch, the
//! session's collection and a per-year breakdown.

use axum::extract::{Extension, State};
use axum::response::Html;
use bibliomed_export::histogram::counts_by_year;
use bibliomed_ingestion::Record;
use minijinja::context;
use serde::Serialize;

use crate::error::ApiError;
use crate::session::SessionId;
use crate::state::SharedState;
use crate::templates::render;

/// A record as shown in the page tables.
#[derive(Debug, Serialize)]
pub struct RecordView<'a> {
    pub title: &'a str,
    pub date: &'a str,
    pub source_label: &'static str,
    pub summary: &'a str,
    pub url: &'a str,
}

impl<'a> From<&'a Record> for RecordView<'a> {
    fn from(record: &'a Record) -> Self {
        Self {
            title: &record.title,
            date: &record.publication_date,
            source_label: record.source.label(),
            summary: &record.summary,
            url: &record.url,
        }
    }
}

#[derive(Debug, Serialize)]
struct YearRow {
    year: i32,
    count: usize,
}

/// GET /: login form when the gate is on and the session is anonymous,
/// otherwise the workspace.
pub async fn index(
    State(state): State<SharedState>,
    Extension(session_id): Extension<SessionId>,
) -> Result<Html<String>, ApiError> {
    let auth_enabled = state.credentials.enabled();
    let authenticated = state.sessions.is_authenticated(session_id).await;

    if auth_enabled && !authenticated {
        return render(&state.templates, "login.html", context! { auth_enabled });
    }

    let session = state.sessions.take_view(session_id).await;

    let records: Vec<RecordView> = session.collection.records().iter().map(RecordView::from).collect();
    let years: Vec<YearRow> = counts_by_year(session.collection.records())
        .into_iter()
        .map(|(year, count)| YearRow { year, count })
        .collect();
    let last_batch = session.last_batch.as_ref().map(|batch| {
        context! {
            action => batch.action,
            records => batch.records.iter().map(RecordView::from).collect::<Vec<_>>(),
        }
    });

    render(
        &state.templates,
        "index.html",
        context! {
            auth_enabled,
            authenticated,
            notice => session.notice,
            last_batch,
            records,
            years,
            csv_name => state.export_names.csv,
            pdf_name => state.export_names.pdf,
        },
    )
}

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}
