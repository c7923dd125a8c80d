//! Shared application state for the web server.

use std::sync::Arc;
use std::time::Duration;

use bibliomed_config::Config;
use bibliomed_export::ReportOptions;
use bibliomed_ingestion::Collector;
use minijinja::Environment;

use crate::auth::Credentials;
use crate::session::SessionStore;
use crate::templates;

/// Download names for the two exports.
#[derive(Debug, Clone)]
pub struct ExportNames {
    pub csv: String,
    pub pdf: String,
}

impl Default for ExportNames {
    fn default() -> Self {
        Self {
            csv: "references.csv".to_string(),
            pdf: "bibliographic_report.pdf".to_string(),
        }
    }
}

/// Shared state injected into every Axum handler.
pub struct AppState {
    pub collector: Collector,
    pub credentials: Credentials,
    pub sessions: SessionStore,
    pub templates: Environment<'static>,
    pub report: ReportOptions,
    pub export_names: ExportNames,
}

impl AppState {
    pub fn new(collector: Collector, credentials: Credentials) -> anyhow::Result<Self> {
        Ok(Self {
            collector,
            credentials,
            sessions: SessionStore::new(),
            templates: templates::environment()?,
            report: ReportOptions::default(),
            export_names: ExportNames::default(),
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let collector = Collector::from_config(config)?;
        let credentials = Credentials::from_config(&config.auth);
        let mut state = Self::new(collector, credentials)?;
        state.sessions = SessionStore::with_limits(
            Duration::from_secs(config.server.session_idle_minutes.saturating_mul(60)),
            config.server.max_sessions,
        );
        state.report = ReportOptions {
            title: config.export.report_title.clone(),
            include_summary: config.export.include_summary,
        };
        state.export_names = ExportNames {
            csv: config.export.csv_file_name.clone(),
            pdf: config.export.pdf_file_name.clone(),
        };
        Ok(state)
    }
}

pub type SharedState = Arc<AppState>;
