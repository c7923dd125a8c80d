use reqwest::redirect::Policy;
use reqwest::{Client, ClientBuilder};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;
use crate::error::BibliomedError;

const USER_AGENT: &str = concat!("bibliomed/", env!("CARGO_PKG_VERSION"));
const MAX_REDIRECTS: usize = 10;

/// Host policy applied before any request leaves the process.
#[derive(Debug, Clone)]
enum HostPolicy {
    /// Only hosts in the allowlist (or their subdomains).
    Allowlist(HashSet<String>),
    /// Any host, used for user-supplied article links.
    AnyHost,
}

impl HostPolicy {
    /// Scheme and host check shared by the request path and every redirect hop.
    fn permits(&self, parsed: &Url) -> Result<(), String> {
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(format!(
                "Network capabilities capped: scheme '{}' is not allowed for URL {}",
                parsed.scheme(),
                parsed
            ));
        }

        let host = parsed.host_str().unwrap_or_default();
        let allowed = match self {
            HostPolicy::AnyHost => !host.is_empty(),
            HostPolicy::Allowlist(list) => list
                .iter()
                .any(|allowed| host == allowed || host.ends_with(&format!(".{}", allowed))),
        };

        if !allowed {
            return Err(format!(
                "Network capabilities capped: domain not in allowlist for URL {}",
                parsed
            ));
        }
        Ok(())
    }

    /// Redirects are followed only to targets this policy permits.
    fn redirect_policy(&self) -> Policy {
        let policy = self.clone();
        Policy::custom(move |attempt| {
            if attempt.previous().len() >= MAX_REDIRECTS {
                return attempt.error("too many redirects");
            }
            match policy.permits(attempt.url()) {
                Ok(()) => attempt.follow(),
                Err(reason) => attempt.error(reason),
            }
        })
    }
}

/// A capability-capped HTTP client.
///
/// Every request goes through a scheme check (`http`/`https` only) and a host
/// policy check. The literature-index client runs with an allowlist; the page
/// scraper runs with [`SandboxClient::web`], which accepts any host but still
/// refuses `file:`, `ftp:` and friends.
#[derive(Debug, Clone)]
pub struct SandboxClient {
    client: Client,
    policy: HostPolicy,
}

impl SandboxClient {
    /// Creates a new SandboxClient with the default allowlist of literature-index domains.
    pub fn new() -> Result<Self, BibliomedError> {
        let domains = [
            "eutils.ncbi.nlm.nih.gov", // PubMed E-utilities
            "pubmed.ncbi.nlm.nih.gov", // PubMed permalinks
            "localhost",
            "127.0.0.1",
        ];
        let policy = HostPolicy::Allowlist(domains.iter().map(|d| d.to_string()).collect());

        Ok(Self {
            client: build_client(&policy)?,
            policy,
        })
    }

    /// Creates a client that may reach any http(s) host.
    pub fn web() -> Result<Self, BibliomedError> {
        let policy = HostPolicy::AnyHost;
        Ok(Self {
            client: build_client(&policy)?,
            policy,
        })
    }

    /// Appends a hostname (and its subdomains) to the allowlist. No-op for
    /// [`SandboxClient::web`] clients. The inner client is rebuilt so redirects
    /// see the new entry.
    pub fn allow_domain(&mut self, domain: &str) -> Result<(), BibliomedError> {
        if let HostPolicy::Allowlist(list) = &mut self.policy {
            if list.insert(domain.to_string()) {
                self.client = build_client(&self.policy)?;
            }
        }
        Ok(())
    }

    /// Validates a URL against the scheme and host policy.
    pub fn check(&self, url: &str) -> Result<Url, BibliomedError> {
        let parsed = Url::parse(url)?;
        self.policy
            .permits(&parsed)
            .map_err(BibliomedError::SecurityError)?;
        Ok(parsed)
    }

    /// Validates if a URL is permitted under the current sandbox policy.
    pub fn is_allowed(&self, url: &str) -> bool {
        self.check(url).is_ok()
    }

    /// Exposes the inner `reqwest::Client` builder pattern safely for GET requests.
    pub fn get(&self, url: &str) -> Result<reqwest::RequestBuilder, BibliomedError> {
        let parsed = self.check(url)?;
        Ok(self.client.get(parsed))
    }
}

fn build_client(policy: &HostPolicy) -> Result<Client, BibliomedError> {
    ClientBuilder::new()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(30))
        .redirect(policy.redirect_policy())
        .build()
        .map_err(|e| BibliomedError::Config(format!("Failed to build HTTP client: {}", e)))
}
