//! Remote repository source abstraction.
//!
//! The ingestion pipeline talks to the code host only through the
//! [`RepositorySource`] trait: a paginated repository search and a
//! per-repository language lookup. [`github::GitHubSource`] is the
//! production implementation.

pub mod github;

use anyhow::Result;

use crate::models::{LanguageBreakdown, RawRepository};

/// Sort order for search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// One page request against the search capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub sort: String,
    pub order: SortOrder,
    /// 1-based page number
    pub page: u32,
    pub per_page: u32,
}

/// One page of search results.
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub repositories: Vec<RawRepository>,
    /// Whether the source reports further pages after this one
    pub has_more: bool,
}

#[async_trait::async_trait]
pub trait RepositorySource: Send + Sync {
    /// Fetch one page of repository summaries.
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage>;

    /// Fetch the language byte counts of a single repository.
    async fn languages(&self, owner: &str, repo: &str) -> Result<LanguageBreakdown>;
}
