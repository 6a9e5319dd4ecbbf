use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// GitHub caps `per_page` on the search endpoint at 100.
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Token used to authenticate against the GitHub API
    #[serde(skip_serializing)]
    pub github_token: String,
    /// Port the HTTP server listens on
    pub port: u16,
    /// Host/interface the HTTP server binds to
    pub bind_host: String,
    /// Base URL of the GitHub REST API
    pub github_api_url: String,
    /// Ingestion settings
    pub ingest: IngestConfig,
    /// Request timeout for outbound GitHub calls
    pub http_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Number of repositories to collect per cycle
    pub target_count: usize,
    /// Look-back window for the `created:` range, in minutes
    pub window_minutes: i64,
    /// Search page size (capped at 100)
    pub page_size: u32,
    /// Maximum in-flight language lookups
    pub max_concurrent_fetches: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            target_count: 100,
            window_minutes: 5,
            page_size: MAX_PAGE_SIZE,
            max_concurrent_fetches: 100,
        }
    }
}

impl Config {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }

    /// Load from the process environment. Fails if `GITHUB_TOKEN` or `PORT`
    /// is missing.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let github_token = match lookup("GITHUB_TOKEN") {
            Some(token) if !token.trim().is_empty() => token,
            _ => bail!("GITHUB_TOKEN is not set"),
        };

        let port = match lookup("PORT") {
            Some(port) if !port.trim().is_empty() => port,
            _ => bail!("PORT is not set"),
        };
        let port: u16 = match port.trim().parse() {
            Ok(p) => p,
            Err(_) => bail!("PORT is not a valid port number: {port}"),
        };

        let mut config = Self {
            github_token,
            port,
            bind_host: "0.0.0.0".to_string(),
            github_api_url: "https://api.github.com".to_string(),
            ingest: IngestConfig::default(),
            http_timeout_secs: 30,
        };

        if let Some(host) = lookup("FRESH_REPOS_BIND_HOST") {
            config.bind_host = host;
        }
        if let Some(url) = lookup("GITHUB_API_URL") {
            config.github_api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(v) = parse_var(&lookup, "FRESH_REPOS_TARGET_COUNT") {
            config.ingest.target_count = v;
        }
        if let Some(v) = parse_var::<i64, _>(&lookup, "FRESH_REPOS_WINDOW_MINUTES") {
            if v > 0 {
                config.ingest.window_minutes = v;
            }
        }
        if let Some(v) = parse_var::<u32, _>(&lookup, "FRESH_REPOS_PAGE_SIZE") {
            config.ingest.page_size = v.clamp(1, MAX_PAGE_SIZE);
        }
        if let Some(v) = parse_var::<usize, _>(&lookup, "FRESH_REPOS_MAX_CONCURRENT_FETCHES") {
            config.ingest.max_concurrent_fetches = v.max(1);
        }
        if let Some(v) = parse_var(&lookup, "FRESH_REPOS_HTTP_TIMEOUT_SECS") {
            config.http_timeout_secs = v;
        }

        Ok(config)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("Ignoring unparsable {key}={raw}");
            None
        }
    }
}
