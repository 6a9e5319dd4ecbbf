use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Language name -> byte count for one repository, as reported by the source.
/// A failed lookup is represented by an empty map.
pub type LanguageBreakdown = BTreeMap<String, u64>;

/// A repository summary as returned by the search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawRepository {
    pub name: String,
    pub full_name: String,
    pub owner: RawOwner,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub license: Option<RawLicense>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// `null` for repositories that never received a push
    #[serde(default)]
    pub pushed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub open_issues_count: u64,
}

impl RawRepository {
    /// Primary language tag, `None` when missing or empty.
    pub fn primary_language(&self) -> Option<&str> {
        self.language.as_deref().filter(|l| !l.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawOwner {
    pub login: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawLicense {
    #[serde(default)]
    pub name: Option<String>,
}

/// Per-language stats stored on a cached repository.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LanguageStats {
    pub bytes: u64,
}

/// The cached, externally visible record for one ingested repository.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Repository {
    pub full_name: String,
    pub owner: String,
    pub repository: String,
    pub languages: BTreeMap<String, LanguageStats>,
    /// Empty when the repository has no license
    pub license: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub pushed_at: Option<DateTime<Utc>>,
    pub stars: u64,
    pub forks: u64,
    pub issues: u64,
}

/// Search response
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    /// `None` until the first ingestion cycle has been published
    pub last_updated: Option<DateTime<Utc>>,
    pub total_results: usize,
    pub repositories: Vec<Repository>,
}

/// Ping response
#[derive(Debug, Clone, Serialize)]
pub struct PingResponse {
    pub status: &'static str,
}
