//! Integration tests for the ingestion → cache → search flow.
//!
//! These run against an in-memory repository source, so no network access or
//! GitHub token is needed.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::Uri;
use axum::Json;
use chrono::{DateTime, Duration, TimeZone, Utc};

use fresh_repos::api::router;
use fresh_repos::api::search::search;
use fresh_repos::cache::SnapshotCache;
use fresh_repos::ingest::{ingest_window, refresh, IngestOptions, TimeWindow};
use fresh_repos::models::{LanguageBreakdown, RawLicense, RawOwner, RawRepository};
use fresh_repos::source::{RepositorySource, SearchPage, SearchRequest};
use fresh_repos::state::AppState;

/// Source serving fixed pages; language maps are looked up by repo name.
struct StaticSource {
    pages: Vec<Vec<RawRepository>>,
    languages: BTreeMap<String, LanguageBreakdown>,
    broken: HashSet<String>,
    queries: parking_lot::Mutex<Vec<SearchRequest>>,
    language_calls: AtomicUsize,
}

impl StaticSource {
    fn new(pages: Vec<Vec<RawRepository>>) -> Self {
        Self {
            pages,
            languages: BTreeMap::new(),
            broken: HashSet::new(),
            queries: parking_lot::Mutex::new(Vec::new()),
            language_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl RepositorySource for StaticSource {
    async fn search(&self, request: &SearchRequest) -> anyhow::Result<SearchPage> {
        self.queries.lock().push(request.clone());
        let idx = (request.page - 1) as usize;
        Ok(SearchPage {
            repositories: self.pages.get(idx).cloned().unwrap_or_default(),
            has_more: idx + 1 < self.pages.len(),
        })
    }

    async fn languages(&self, _owner: &str, repo: &str) -> anyhow::Result<LanguageBreakdown> {
        self.language_calls.fetch_add(1, Ordering::SeqCst);
        if self.broken.contains(repo) {
            anyhow::bail!("502 Bad Gateway");
        }
        Ok(self.languages.get(repo).cloned().unwrap_or_default())
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

fn raw(name: &str, age_secs: i64, language: &str, stars: u64, license: Option<&str>) -> RawRepository {
    let created = now() - Duration::seconds(age_secs);
    RawRepository {
        name: name.to_string(),
        full_name: format!("dev/{name}"),
        owner: RawOwner {
            login: "dev".to_string(),
        },
        language: Some(language.to_string()),
        license: license.map(|n| RawLicense {
            name: Some(n.to_string()),
        }),
        created_at: Some(created),
        updated_at: Some(created),
        pushed_at: None,
        stargazers_count: stars,
        forks_count: 0,
        open_issues_count: 0,
    }
}

fn langs(entries: &[(&str, u64)]) -> LanguageBreakdown {
    entries.iter().map(|(l, b)| (l.to_string(), *b)).collect()
}

fn app_state(cache: Arc<SnapshotCache>) -> AppState {
    AppState::new(cache)
}

fn query(pairs: &[(&str, &str)]) -> Query<Vec<(String, String)>> {
    Query(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

fn query_string(uri: &str) -> Query<Vec<(String, String)>> {
    let uri: Uri = uri.parse().unwrap();
    Query::try_from_uri(&uri).unwrap()
}

fn fixture() -> StaticSource {
    let mut source = StaticSource::new(vec![vec![
        raw("api-server", 30, "Go", 12, Some("MIT License")),
        raw("game", 5, "C#", 0, None),
        raw("cli", 60, "Rust", 80, Some("Apache License 2.0")),
        raw("scraper", 10, "Python", 51, Some("GNU General Public License v3.0")),
        raw("flaky", 20, "Go", 3, Some("MIT License")),
    ]]);
    source.languages = BTreeMap::from([
        ("api-server".to_string(), langs(&[("Go", 9000), ("Dockerfile", 120)])),
        ("game".to_string(), langs(&[("C#", 40000), ("ShaderLab", 300)])),
        ("cli".to_string(), langs(&[("Rust", 15000), ("go", 10)])),
        ("scraper".to_string(), langs(&[("Python", 700)])),
    ]);
    source.broken = HashSet::from(["flaky".to_string()]);
    source
}

#[tokio::test]
async fn test_end_to_end_ingest_publish_search() {
    let source = Arc::new(fixture());
    let options = IngestOptions::default();
    let window = TimeWindow::ending_at(now(), Duration::minutes(5));

    let records = ingest_window(&source, &options, window).await.unwrap();
    assert_eq!(records.len(), 5);
    assert_eq!(source.language_calls.load(Ordering::SeqCst), 5);

    let query_string = source.queries.lock()[0].query.clone();
    assert_eq!(
        query_string,
        "is:public created:2024-05-01T11:55:00Z..2024-05-01T12:00:00Z"
    );

    let names: Vec<&str> = records.iter().map(|r| r.repository.as_str()).collect();
    assert_eq!(names, vec!["game", "scraper", "flaky", "api-server", "cli"]);

    // Failed lookup is kept with no language data
    let flaky = records.iter().find(|r| r.repository == "flaky").unwrap();
    assert!(flaky.languages.is_empty());

    let cache = Arc::new(SnapshotCache::new());
    cache.publish(records);
    let state = app_state(cache);

    let Json(all) = search(State(state.clone()), query(&[])).await;
    assert_eq!(all.total_results, 5);
    assert!(all.last_updated.is_some());

    let Json(go) = search(State(state.clone()), query(&[("lang", "Go")])).await;
    let go_names: Vec<&str> = go.repositories.iter().map(|r| r.repository.as_str()).collect();
    // "flaky" lost its languages, "cli" only has lowercase "go"
    assert_eq!(go_names, vec!["api-server"]);

    let Json(licensed) = search(State(state.clone()), query(&[("license", "LICENSE")])).await;
    assert_eq!(licensed.total_results, 4);

    let Json(popular) = search(State(state.clone()), query(&[("stars", "50")])).await;
    let popular_names: Vec<&str> = popular
        .repositories
        .iter()
        .map(|r| r.repository.as_str())
        .collect();
    assert_eq!(popular_names, vec!["scraper", "cli"]);

    let Json(bad) = search(State(state.clone()), query(&[("stars", "lots")])).await;
    assert_eq!(bad.total_results, 0);
    assert!(bad.last_updated.is_some());
}

#[tokio::test]
async fn test_search_response_json_shape() {
    let source = Arc::new(fixture());
    let cache = Arc::new(SnapshotCache::new());
    refresh(&source, &IngestOptions::default(), &cache).await.unwrap();

    let Json(resp) = search(State(app_state(cache)), query(&[("lang", "Rust")])).await;
    let json = serde_json::to_value(&resp).unwrap();

    assert_eq!(json["total_results"], 1);
    assert!(json["last_updated"].is_string());
    let repo = &json["repositories"][0];
    assert_eq!(repo["full_name"], "dev/cli");
    assert_eq!(repo["owner"], "dev");
    assert_eq!(repo["repository"], "cli");
    assert_eq!(repo["languages"]["Rust"]["bytes"], 15000);
    assert_eq!(repo["license"], "Apache License 2.0");
    assert_eq!(repo["stars"], 80);
    assert!(repo["pushed_at"].is_null());
}

#[tokio::test]
async fn test_target_count_caps_snapshot_across_pages() {
    let first: Vec<_> = (0..100)
        .map(|i| raw(&format!("p1-{i}"), i, "Go", 0, None))
        .collect();
    let second: Vec<_> = (0..50)
        .map(|i| raw(&format!("p2-{i}"), 100 + i, "Go", 0, None))
        .collect();
    let source = Arc::new(StaticSource::new(vec![first, second]));

    let cache = Arc::new(SnapshotCache::new());
    let count = refresh(&source, &IngestOptions::default(), &cache).await.unwrap();

    assert_eq!(count, 100);
    assert_eq!(source.queries.lock().len(), 1);
    assert_eq!(source.language_calls.load(Ordering::SeqCst), 100);
    assert_eq!(cache.read().repositories.len(), 100);
}

#[tokio::test]
async fn test_fewer_than_target_is_not_an_error() {
    let only: Vec<_> = (0..60)
        .map(|i| raw(&format!("r{i}"), i, "Go", 0, None))
        .collect();
    let source = Arc::new(StaticSource::new(vec![only]));

    let cache = Arc::new(SnapshotCache::new());
    let count = refresh(&source, &IngestOptions::default(), &cache).await.unwrap();
    assert_eq!(count, 60);
}

#[tokio::test]
async fn test_search_over_raw_query_strings() {
    let source = Arc::new(fixture());
    let cache = Arc::new(SnapshotCache::new());
    refresh(&source, &IngestOptions::default(), &cache).await.unwrap();
    let state = app_state(cache);

    let Json(resp) = search(State(state.clone()), query_string("/api/search?lang=Rust&lang=Go")).await;
    assert_eq!(resp.total_results, 1);
    assert_eq!(resp.repositories[0].repository, "cli");

    for uri in ["/api/search?minStars=abc", "/api/search?language=Rust"] {
        let Json(resp) = search(State(state.clone()), query_string(uri)).await;
        assert_eq!(resp.total_results, 5, "{uri}");
    }

    let Json(resp) = search(State(state), query_string("/api/search?license=public&stars=")).await;
    assert_eq!(resp.total_results, 1);
    assert_eq!(resp.repositories[0].repository, "scraper");
}

#[tokio::test]
async fn test_router_serves_ping_and_search_over_http() {
    let source = Arc::new(fixture());
    let cache = Arc::new(SnapshotCache::new());
    refresh(&source, &IngestOptions::default(), &cache).await.unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(app_state(cache))).await.unwrap();
    });

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let ping: serde_json::Value = client
        .get(format!("http://{addr}/ping"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(ping["status"], "pong");

    let resp = client
        .get(format!("http://{addr}/api/search?lang=Go&lang=Rust&minStars=abc"))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["total_results"], 1);
    assert_eq!(body["repositories"][0]["repository"], "api-server");
}
