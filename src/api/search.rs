use axum::extract::{Query, State};
use axum::Json;

use crate::filter::{filter_repositories, Filters};
use crate::models::SearchResponse;
use crate::state::AppState;

/// GET /api/search?lang=&license=&stars= - Filter the cached repositories.
///
/// Only `lang`, `license` and `stars` select predicates; any other parameter,
/// including `language` and `minStars`, is ignored.
///
/// Always succeeds against whatever snapshot is current. Before the first
/// ingestion cycle is published `last_updated` is `null` and the list is
/// empty. Params are kept in request order so a repeated key resolves to its
/// first value.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Json<SearchResponse> {
    let snapshot = state.cache.read();
    if !snapshot.is_ready() {
        tracing::debug!("Search served before the first ingestion cycle was published");
    }
    let filters = Filters::from_query_pairs(params);

    let repositories = filter_repositories(&snapshot.repositories, &filters);

    tracing::debug!(
        "Search {:?} matched {} of {} repositories",
        filters,
        repositories.len(),
        snapshot.repositories.len()
    );

    Json(SearchResponse {
        last_updated: snapshot.last_updated,
        total_results: repositories.len(),
        repositories,
    })
}
