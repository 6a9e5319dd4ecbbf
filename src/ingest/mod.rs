//! Ingestion cycle: search → language lookups → sort → transform → publish.
//!
//! Search pagination runs sequentially until enough repositories with a
//! primary language are collected. Language lookups then fan out as
//! independent tasks gated by a semaphore and joined before sorting. A failed
//! lookup only degrades that repository to an empty language map; a failed
//! search or transform aborts the cycle and leaves the cache untouched.

pub mod transform;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use futures_util::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::cache::SnapshotCache;
use crate::config::{IngestConfig, MAX_PAGE_SIZE};
use crate::error::IngestError;
use crate::models::{LanguageBreakdown, RawRepository, Repository};
use crate::source::{RepositorySource, SearchRequest, SortOrder};

pub use transform::transform;

/// Parameters of one ingestion cycle.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub target_count: usize,
    pub window: Duration,
    pub page_size: u32,
    pub max_concurrent_fetches: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self::from(&IngestConfig::default())
    }
}

impl From<&IngestConfig> for IngestOptions {
    fn from(config: &IngestConfig) -> Self {
        Self {
            target_count: config.target_count,
            window: Duration::minutes(config.window_minutes),
            page_size: config.page_size,
            max_concurrent_fetches: config.max_concurrent_fetches,
        }
    }
}

/// Creation-time range searched in one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn ending_at(end: DateTime<Utc>, length: Duration) -> Self {
        Self {
            start: end - length,
            end,
        }
    }

    /// Search query selecting public repositories created inside the window.
    pub fn query(&self) -> String {
        format!(
            "is:public created:{}..{}",
            self.start.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.end.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }
}

/// Run one cycle over the window ending now.
pub async fn ingest<S>(
    source: &Arc<S>,
    options: &IngestOptions,
) -> Result<Vec<Repository>, IngestError>
where
    S: RepositorySource + ?Sized + 'static,
{
    let window = TimeWindow::ending_at(Utc::now(), options.window);
    ingest_window(source, options, window).await
}

/// Run one cycle over an explicit window.
pub async fn ingest_window<S>(
    source: &Arc<S>,
    options: &IngestOptions,
    window: TimeWindow,
) -> Result<Vec<Repository>, IngestError>
where
    S: RepositorySource + ?Sized + 'static,
{
    if options.target_count == 0 {
        return Ok(Vec::new());
    }

    let candidates = collect_candidates(source.as_ref(), options, &window).await?;
    let languages = fetch_languages(source, &candidates, options.max_concurrent_fetches).await;

    let mut pairs: Vec<(RawRepository, LanguageBreakdown)> =
        candidates.into_iter().zip(languages).collect();

    // Stable: equal timestamps keep fetch order
    pairs.sort_by(|a, b| b.0.created_at.cmp(&a.0.created_at));

    let records = pairs
        .into_iter()
        .map(|(raw, langs)| transform(raw, langs))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!("Ingestion cycle produced {} repositories", records.len());
    Ok(records)
}

/// Run a cycle and publish its output. On failure the cache keeps its
/// current snapshot.
pub async fn refresh<S>(
    source: &Arc<S>,
    options: &IngestOptions,
    cache: &SnapshotCache,
) -> Result<usize, IngestError>
where
    S: RepositorySource + ?Sized + 'static,
{
    match ingest(source, options).await {
        Ok(records) => {
            let count = records.len();
            cache.publish(records);
            Ok(count)
        }
        Err(e) => {
            tracing::error!("Ingestion cycle failed, keeping previous snapshot: {e}");
            Err(e)
        }
    }
}

/// Page through search results until `target_count` distinct repositories
/// with a primary language are collected or the source runs dry.
async fn collect_candidates<S>(
    source: &S,
    options: &IngestOptions,
    window: &TimeWindow,
) -> Result<Vec<RawRepository>, IngestError>
where
    S: RepositorySource + ?Sized,
{
    let target = options.target_count;
    let per_page = options.page_size.clamp(1, MAX_PAGE_SIZE);
    let query = window.query();

    tracing::info!("Collecting up to {target} repositories matching `{query}`");

    let mut collected: Vec<RawRepository> = Vec::with_capacity(target);
    let mut seen: HashSet<String> = HashSet::new();
    let mut page = 1u32;

    while collected.len() < target {
        let request = SearchRequest {
            query: query.clone(),
            sort: "created".to_string(),
            order: SortOrder::Desc,
            page,
            per_page,
        };

        let result = source
            .search(&request)
            .await
            .map_err(IngestError::SourceUnavailable)?;
        let returned = result.repositories.len();

        for repo in result.repositories {
            if repo.primary_language().is_none() {
                continue;
            }
            // Pages shift while repositories are being created
            if !seen.insert(repo.full_name.clone()) {
                continue;
            }
            collected.push(repo);
            if collected.len() >= target {
                break;
            }
        }

        tracing::debug!(
            "Search page {page}: {returned} results, {} collected",
            collected.len()
        );

        if returned < per_page as usize || !result.has_more {
            break;
        }
        page += 1;
    }

    tracing::info!("Fetched {} repositories", collected.len());
    Ok(collected)
}

/// Look up languages for every repository, at most `max_in_flight` at a
/// time. Output is parallel to `repos`; failures become empty maps.
async fn fetch_languages<S>(
    source: &Arc<S>,
    repos: &[RawRepository],
    max_in_flight: usize,
) -> Vec<LanguageBreakdown>
where
    S: RepositorySource + ?Sized + 'static,
{
    tracing::info!(
        "Fetching language details for {} repositories ({} in flight max)",
        repos.len(),
        max_in_flight.max(1)
    );

    let semaphore = Arc::new(Semaphore::new(max_in_flight.max(1)));

    let handles: Vec<_> = repos
        .iter()
        .map(|repo| {
            let source = Arc::clone(source);
            let sem = Arc::clone(&semaphore);
            let owner = repo.owner.login.clone();
            let name = repo.name.clone();

            tokio::spawn(async move {
                let _permit = sem
                    .acquire()
                    .await
                    .map_err(|_| anyhow::anyhow!("Fetch semaphore closed"))?;
                source.languages(&owner, &name).await
            })
        })
        .collect();

    let outcomes = join_all(handles).await;

    let mut failures = 0usize;
    let languages: Vec<LanguageBreakdown> = outcomes
        .into_iter()
        .zip(repos)
        .map(|(outcome, repo)| match outcome {
            Ok(Ok(langs)) => langs,
            Ok(Err(e)) => {
                failures += 1;
                tracing::warn!("Error fetching languages for {}: {e:#}", repo.full_name);
                LanguageBreakdown::new()
            }
            Err(e) => {
                failures += 1;
                tracing::warn!("Language task for {} failed: {e}", repo.full_name);
                LanguageBreakdown::new()
            }
        })
        .collect();

    if failures > 0 {
        tracing::warn!(
            "{failures} of {} language lookups failed; those repositories have no language data",
            repos.len()
        );
    }

    languages
}
