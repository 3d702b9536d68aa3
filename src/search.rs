use std::collections::HashSet;

use url::Url;

use crate::config::ReachConfig;
use crate::error::ReachError;
use crate::fetcher::Fetcher;
use crate::post::{Post, SearchPage};
use crate::progress::RequestKind;

pub fn build_search_url(endpoint: &Url, query: &str, results_per_page: u32) -> Url {
    let mut url = endpoint.clone();
    url.query_pairs_mut()
        .clear()
        .append_pair("rpp", &results_per_page.to_string())
        .append_pair("q", query);
    url
}

fn page_key(next_page: &str) -> &str {
    next_page.trim().trim_start_matches('?')
}

/// Resolves a `next_page` fragment (e.g. `?page=2&max_id=…&q=…`) against the
/// search endpoint.
pub fn next_page_url(endpoint: &Url, next_page: &str) -> Url {
    let mut url = endpoint.clone();
    url.set_query(Some(page_key(next_page)));
    url
}

/// Fetches every page of results for `query`, following `next_page` until the
/// chain ends, repeats itself, or `max_pages` is reached. Any failed page
/// aborts the whole fetch.
pub async fn fetch_posts(
    fetcher: &Fetcher,
    config: &ReachConfig,
    query: &str,
) -> Result<Vec<Post>, ReachError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ReachError::EmptyQuery);
    }

    let mut posts = Vec::new();
    let mut followed: HashSet<String> = HashSet::new();
    let mut url = build_search_url(&config.search_endpoint, query, config.results_per_page);
    followed.insert(url.query().unwrap_or_default().to_string());
    let mut pages = 0usize;

    loop {
        let page: SearchPage = fetcher
            .get_json(&url, RequestKind::Search)
            .await
            .map_err(ReachError::Search)?;
        pages += 1;
        tracing::debug!(page = pages, results = page.results.len(), %url, "search page");
        if let Some(p) = fetcher.progress() {
            p.posts_fetched(page.results.len());
        }
        posts.extend(page.results);

        let Some(next) = page.next_page.filter(|n| !n.trim().is_empty()) else {
            break;
        };
        if pages >= config.max_pages.max(1) {
            tracing::info!(pages, "page limit reached; not following next_page");
            break;
        }
        if !followed.insert(page_key(&next).to_string()) {
            tracing::warn!(next_page = %next, "next_page repeats an earlier page; stopping");
            break;
        }
        url = next_page_url(&config.search_endpoint, &next);
    }

    tracing::info!(pages, posts = posts.len(), "fetched search results");
    Ok(posts)
}
