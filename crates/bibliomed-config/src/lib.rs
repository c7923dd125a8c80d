//! Configuration loading for Bibliomed.
//! Reads bibliomed.toml (or .yaml/.yml) from the current directory or the path in
//! the BIBLIOMED_CONFIG env var, then applies environment overrides.

use secrecy::SecretString;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid config value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub pubmed: PubMedConfig,
    pub scraper: ScraperConfig,
    pub collection: CollectionConfig,
    pub auth: AuthConfig,
    pub export: ExportConfig,
}

// ── Server ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Sessions untouched for this long are dropped with their collection.
    #[serde(default = "default_session_idle_minutes")]
    pub session_idle_minutes: u64,
    /// Live session cap; the least recently seen session is evicted past it.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_bind()                 -> String { "127.0.0.1:3001".to_string() }
fn default_session_idle_minutes() -> u64    { 720 }
fn default_max_sessions()         -> usize  { 10_000 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            session_idle_minutes: default_session_idle_minutes(),
            max_sessions: default_max_sessions(),
        }
    }
}

// ── Literature index ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PubMedConfig {
    /// E-utilities base; `esearch.fcgi` and `esummary.fcgi` are appended.
    #[serde(default = "default_eutils_base")]
    pub base_url: String,
    /// Record links are `{permalink_base}{pmid}/`.
    #[serde(default = "default_permalink_base")]
    pub permalink_base: String,
    pub api_key: Option<SecretString>,
    /// Parallel esummary calls per search. 1 keeps them sequential.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_eutils_base()    -> String { "https://eutils.ncbi.nlm.nih.gov/entrez/eutils".to_string() }
fn default_permalink_base() -> String { "https://pubmed.ncbi.nlm.nih.gov/".to_string() }
fn default_concurrency()    -> usize  { 1 }

impl Default for PubMedConfig {
    fn default() -> Self {
        Self {
            base_url: default_eutils_base(),
            permalink_base: default_permalink_base(),
            api_key: None,
            concurrency: default_concurrency(),
        }
    }
}

// ── Scraper ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ScraperConfig {
    /// Parallel page fetches per batch. 1 keeps them sequential.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self { concurrency: default_concurrency() }
    }
}

// ── Collection ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionConfig {
    /// Populate `summary` on every newly collected record.
    #[serde(default = "bool_true")]
    pub summaries: bool,
}

fn bool_true() -> bool { true }

impl Default for CollectionConfig {
    fn default() -> Self {
        Self { summaries: true }
    }
}

// ── Auth ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_username")]
    pub username: String,
    /// Argon2 PHC string, e.g. `$argon2id$v=19$...`.
    pub password_hash: Option<SecretString>,
}

fn default_username() -> String { "admin".to_string() }

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            username: default_username(),
            password_hash: None,
        }
    }
}

// ── Export ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_report_title")]
    pub report_title: String,
    /// Print the summary line for each record in the PDF report.
    #[serde(default = "bool_true")]
    pub include_summary: bool,
    #[serde(default = "default_csv_name")]
    pub csv_file_name: String,
    #[serde(default = "default_pdf_name")]
    pub pdf_file_name: String,
}

fn default_report_title() -> String { "Bibliographic References Report".to_string() }
fn default_csv_name()     -> String { "references.csv".to_string() }
fn default_pdf_name()     -> String { "bibliographic_report.pdf".to_string() }

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            report_title: default_report_title(),
            include_summary: true,
            csv_file_name: default_csv_name(),
            pdf_file_name: default_pdf_name(),
        }
    }
}


impl Config {
    /// Load configuration.
    /// Checks BIBLIOMED_CONFIG env var first, then ./bibliomed.toml. A missing file
    /// means defaults; a present but invalid one is an error.
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let path = std::env::var("BIBLIOMED_CONFIG")
            .unwrap_or_else(|_| "bibliomed.toml".to_string());

        let mut config = if Path::new(&path).exists() {
            info!(%path, "Loading configuration");
            Self::from_path(Path::new(&path))?
        } else {
            info!(%path, "Config file not found, using defaults");
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Like `load`, but from an explicit file that must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        info!(path = %path.display(), "Loading configuration");
        let mut config = Self::from_path(path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a config file, choosing YAML for `.yaml`/`.yml` and TOML otherwise.
    /// Not validated; `load`/`load_from` validate after env overrides.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );

        let config: Config = if is_yaml {
            serde_yaml::from_str(&content)?
        } else {
            toml::from_str(&content)?
        };
        Ok(config)
    }

    /// Apply BIBLIOMED_* overrides. `lookup` is injected so tests don't touch the process env.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(bind) = lookup("BIBLIOMED_BIND") {
            self.server.bind = bind;
        }
        if let Some(key) = lookup("BIBLIOMED_PUBMED_API_KEY").filter(|k| !k.is_empty()) {
            self.pubmed.api_key = Some(SecretString::from(key));
        }
        if let Some(user) = lookup("BIBLIOMED_AUTH_USERNAME") {
            self.auth.username = user;
        }
        if let Some(hash) = lookup("BIBLIOMED_AUTH_PASSWORD_HASH").filter(|h| !h.is_empty()) {
            self.auth.password_hash = Some(SecretString::from(hash));
            self.auth.enabled = true;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.bind.parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
            key: "server.bind",
            message: e.to_string(),
        })?;

        if self.server.max_sessions == 0 {
            return Err(ConfigError::Invalid {
                key: "server.max_sessions",
                message: "must be at least 1".to_string(),
            });
        }
        if self.pubmed.concurrency == 0 {
            return Err(ConfigError::Invalid {
                key: "pubmed.concurrency",
                message: "must be at least 1".to_string(),
            });
        }
        if self.scraper.concurrency == 0 {
            return Err(ConfigError::Invalid {
                key: "scraper.concurrency",
                message: "must be at least 1".to_string(),
            });
        }
        if self.auth.enabled && self.auth.password_hash.is_none() {
            return Err(ConfigError::Invalid {
                key: "auth.password_hash",
                message: "required when auth is enabled".to_string(),
            });
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server.bind.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
            key: "server.bind",
            message: e.to_string(),
        })
    }
}
