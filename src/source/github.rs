//! GitHub REST backend for [`RepositorySource`].

use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

use super::{RepositorySource, SearchPage, SearchRequest};
use crate::config::Config;
use crate::models::{LanguageBreakdown, RawRepository};

const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = "fresh-repos";

pub struct GitHubSource {
    client: reqwest::Client,
    api_url: String,
    token: String,
}

#[derive(Deserialize)]
struct SearchResponseBody {
    #[serde(default)]
    total_count: u64,
    #[serde(default)]
    items: Vec<RawRepository>,
}

impl GitHubSource {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build GitHub HTTP client")?;

        tracing::info!("GitHub source using authenticated client against {}", config.github_api_url);

        Ok(Self {
            client,
            api_url: config.github_api_url.clone(),
            token: config.github_token.clone(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let resp = self
            .client
            .get(url)
            .query(query)
            .bearer_auth(&self.token)
            .header("Accept", ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION)
            .send()
            .await
            .with_context(|| format!("GitHub request to {url} failed"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("GitHub API returned {status} for {url}: {body}");
        }

        resp.json()
            .await
            .with_context(|| format!("Failed to parse GitHub response from {url}"))
    }
}

/// Query parameters for the search endpoint.
fn search_params(request: &SearchRequest) -> Vec<(&'static str, String)> {
    vec![
        ("q", request.query.clone()),
        ("sort", request.sort.clone()),
        ("order", request.order.as_str().to_string()),
        ("per_page", request.per_page.to_string()),
        ("page", request.page.to_string()),
    ]
}

/// The search API serves at most this many results per query, whatever
/// `total_count` says.
const SEARCH_RESULT_LIMIT: u64 = 1000;

/// A page is the last one when it is short or when it reaches the reported
/// total (capped at [`SEARCH_RESULT_LIMIT`]).
fn has_more(request: &SearchRequest, returned: usize, total_count: u64) -> bool {
    let seen = u64::from(request.page.saturating_sub(1)) * u64::from(request.per_page)
        + returned as u64;
    returned >= request.per_page as usize && seen < total_count.min(SEARCH_RESULT_LIMIT)
}

#[async_trait::async_trait]
impl RepositorySource for GitHubSource {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage> {
        let url = format!("{}/search/repositories", self.api_url);
        let body: SearchResponseBody = self.get_json(&url, &search_params(request)).await?;

        tracing::debug!(
            "Search page {} returned {} of {} repositories",
            request.page,
            body.items.len(),
            body.total_count
        );

        let has_more = has_more(request, body.items.len(), body.total_count);
        Ok(SearchPage {
            repositories: body.items,
            has_more,
        })
    }

    async fn languages(&self, owner: &str, repo: &str) -> Result<LanguageBreakdown> {
        let url = format!("{}/repos/{owner}/{repo}/languages", self.api_url);
        self.get_json(&url, &[]).await
    }
}
