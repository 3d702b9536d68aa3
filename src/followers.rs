use std::collections::{BTreeMap, HashSet};

use url::Url;

use crate::config::ReachConfig;
use crate::error::{LookupError, ReachError};
use crate::fetcher::Fetcher;
use crate::post::Author;
use crate::progress::RequestKind;

/// Follower count per author. Handles are case-insensitive, so `alice` and
/// `Alice` share one entry and count once towards the total.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FollowerMap {
    counts: BTreeMap<String, u64>,
}

impl FollowerMap {
    /// One zero-valued placeholder per handle.
    pub fn seeded<I, S>(handles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            counts: handles
                .into_iter()
                .map(|h| {
                    let handle: String = h.into();
                    (handle_key(&handle), 0)
                })
                .collect(),
        }
    }

    pub fn set(&mut self, handle: &str, followers: u64) {
        self.counts.insert(handle_key(handle), followers);
    }

    pub fn get(&self, handle: &str) -> Option<u64> {
        self.counts.get(&handle_key(handle)).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum over distinct authors; an author with several posts counts once.
    pub fn total(&self) -> u64 {
        self.counts.values().fold(0u64, |acc, n| acc.saturating_add(*n))
    }

    /// Entries keyed by the lowercased handle.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(h, n)| (h.as_str(), *n))
    }
}

impl FromIterator<(String, u64)> for FollowerMap {
    fn from_iter<T: IntoIterator<Item = (String, u64)>>(iter: T) -> Self {
        Self {
            counts: iter.into_iter().map(|(h, n)| (handle_key(&h), n)).collect(),
        }
    }
}

pub(crate) fn handle_key(handle: &str) -> String {
    handle.to_ascii_lowercase()
}

pub fn build_lookup_url(endpoint: &Url, handles: &[String]) -> Url {
    let mut url = endpoint.clone();
    url.query_pairs_mut()
        .clear()
        .append_pair("include_entities", "true")
        .append_pair("screen_name", &handles.join(","));
    url
}

/// Looks up follower counts for `handles` in sequential batches. The first
/// failing batch aborts the lookup, and every requested handle must come back
/// in some response.
pub async fn resolve(
    fetcher: &Fetcher,
    config: &ReachConfig,
    handles: &[String],
) -> Result<FollowerMap, ReachError> {
    let mut seen = HashSet::new();
    let distinct: Vec<String> = handles
        .iter()
        .filter(|h| seen.insert(handle_key(h)))
        .cloned()
        .collect();

    let mut followers = FollowerMap::seeded(distinct.iter().cloned());
    let mut resolved: HashSet<&str> = HashSet::new();
    let batch_size = config.effective_batch_size();

    for (batch, chunk) in distinct.chunks(batch_size).enumerate() {
        let url = build_lookup_url(&config.lookup_endpoint, chunk);
        let authors: Vec<Author> = fetcher
            .get_json(&url, RequestKind::Lookup)
            .await
            .map_err(|source| LookupError::Batch { batch, source })?;
        tracing::debug!(batch, requested = chunk.len(), returned = authors.len(), "lookup batch");

        for author in &authors {
            for handle in chunk.iter().filter(|h| h.eq_ignore_ascii_case(&author.handle)) {
                followers.set(handle, author.followers_count);
                resolved.insert(handle.as_str());
            }
        }
        if let Some(p) = fetcher.progress() {
            p.authors_resolved(chunk.iter().filter(|h| resolved.contains(h.as_str())).count());
        }
    }

    if let Some(missing) = distinct.iter().find(|h| !resolved.contains(h.as_str())) {
        return Err(LookupError::NotFound {
            handle: missing.clone(),
        }
        .into());
    }

    tracing::info!(
        authors = followers.len(),
        batches = distinct.len().div_ceil(batch_size),
        "resolved follower counts"
    );
    Ok(followers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::fetcher::RetryPolicy;
    use httpmock::Method::GET;
    use httpmock::MockServer;
    use serde_json::json;

    fn config_for(server: &MockServer, batch_size: usize) -> ReachConfig {
        let mut config = ReachConfig::new(
            Url::parse(&server.url("/search.json")).unwrap(),
            Url::parse(&server.url("/users/lookup.json")).unwrap(),
        );
        config.batch_size = batch_size;
        config
    }

    fn fetcher() -> Fetcher {
        Fetcher::new("test-agent", RetryPolicy::default(), None).unwrap()
    }

    fn handles(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn profile(handle: &str, followers: u64) -> serde_json::Value {
        json!({ "screen_name": handle, "name": handle, "followers_count": followers })
    }

    #[test]
    fn seeded_map_has_zero_placeholders() {
        let map = FollowerMap::seeded(["alice", "bob", "alice", "Bob"]);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("BOB"), Some(0));
        assert_eq!(map.get("alice"), Some(0));
        assert_eq!(map.total(), 0);
    }

    #[test]
    fn total_counts_each_author_once() {
        let map: FollowerMap = [("alice".to_string(), 10), ("bob".to_string(), 5)]
            .into_iter()
            .collect();
        assert_eq!(map.total(), 15);
    }

    #[test]
    fn lookup_url_joins_handles() {
        let endpoint = Url::parse("http://api.twitter.com/1/users/lookup.json").unwrap();
        let url = build_lookup_url(&endpoint, &handles(&["alice", "bob"]));
        assert_eq!(
            url.as_str(),
            "http://api.twitter.com/1/users/lookup.json?include_entities=true&screen_name=alice%2Cbob"
        );
    }

    #[tokio::test]
    async fn empty_handle_set_makes_no_request() {
        let server = MockServer::start();
        let any = server.mock(|when, then| {
            when.method(GET);
            then.status(200).json_body(json!([]));
        });

        let map = resolve(&fetcher(), &config_for(&server, 100), &[])
            .await
            .unwrap();
        assert!(map.is_empty());
        any.assert_hits(0);
    }

    #[tokio::test]
    async fn batches_are_merged_into_one_map() {
        let server = MockServer::start();
        let first = server.mock(|when, then| {
            when.method(GET)
                .path("/users/lookup.json")
                .query_param("screen_name", "a,b");
            then.status(200)
                .json_body(json!([profile("a", 1), profile("b", 2)]));
        });
        let second = server.mock(|when, then| {
            when.method(GET)
                .path("/users/lookup.json")
                .query_param("screen_name", "c,d");
            then.status(200)
                .json_body(json!([profile("d", 4), profile("c", 3)]));
        });
        let third = server.mock(|when, then| {
            when.method(GET)
                .path("/users/lookup.json")
                .query_param("screen_name", "e");
            then.status(200).json_body(json!([profile("e", 5)]));
        });

        let requested = handles(&["a", "b", "c", "d", "e", "a"]);
        let map = resolve(&fetcher(), &config_for(&server, 2), &requested)
            .await
            .unwrap();
        assert_eq!(map.len(), 5);
        assert_eq!(map.get("d"), Some(4));
        assert_eq!(map.total(), 15);
        first.assert_hits(1);
        second.assert_hits(1);
        third.assert_hits(1);
    }

    #[tokio::test]
    async fn batch_size_does_not_change_the_result() {
        let server = MockServer::start();
        let names = ["a", "b", "c", "d", "e"];
        for (i, name) in names.iter().enumerate() {
            let count = i as u64 + 1;
            server.mock(|when, then| {
                when.method(GET)
                    .path("/users/lookup.json")
                    .query_param("screen_name", *name);
                then.status(200).json_body(json!([profile(name, count)]));
            });
        }
        server.mock(|when, then| {
            when.method(GET)
                .path("/users/lookup.json")
                .query_param("screen_name", "a,b,c,d,e");
            then.status(200).json_body(json!([
                profile("a", 1),
                profile("b", 2),
                profile("c", 3),
                profile("d", 4),
                profile("e", 5)
            ]));
        });

        let requested = handles(&names);
        let one_by_one = resolve(&fetcher(), &config_for(&server, 1), &requested)
            .await
            .unwrap();
        let all_at_once = resolve(&fetcher(), &config_for(&server, 100), &requested)
            .await
            .unwrap();
        assert_eq!(one_by_one, all_at_once);
        assert_eq!(one_by_one.len(), names.len());
    }

    #[tokio::test]
    async fn handles_match_case_insensitively() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/users/lookup.json");
            then.status(200).json_body(json!([profile("Alice", 10)]));
        });

        let map = resolve(&fetcher(), &config_for(&server, 100), &handles(&["alice"]))
            .await
            .unwrap();
        assert_eq!(map.get("alice"), Some(10));
    }

    #[tokio::test]
    async fn mixed_case_spellings_count_once() {
        let server = MockServer::start();
        let lookup = server.mock(|when, then| {
            when.method(GET)
                .path("/users/lookup.json")
                .query_param("screen_name", "alice");
            then.status(200).json_body(json!([profile("Alice", 10)]));
        });

        let map = resolve(
            &fetcher(),
            &config_for(&server, 100),
            &handles(&["alice", "Alice", "ALICE"]),
        )
        .await
        .unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.total(), 10);
        assert_eq!(map.get("Alice"), Some(10));
        assert_eq!(map.get("alice"), Some(10));
        lookup.assert_hits(1);
    }

    #[tokio::test]
    async fn missing_handle_is_a_lookup_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/users/lookup.json");
            then.status(200).json_body(json!([profile("alice", 10)]));
        });

        let err = resolve(
            &fetcher(),
            &config_for(&server, 100),
            &handles(&["alice", "ghost"]),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Lookup);
        assert!(matches!(
            err,
            ReachError::Lookup(LookupError::NotFound { ref handle }) if handle == "ghost"
        ));
    }

    #[tokio::test]
    async fn failed_batch_aborts_without_partial_map() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/users/lookup.json")
                .query_param("screen_name", "a");
            then.status(200).json_body(json!([profile("a", 1)]));
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/users/lookup.json")
                .query_param("screen_name", "b");
            then.status(500);
        });
        let never = server.mock(|when, then| {
            when.method(GET)
                .path("/users/lookup.json")
                .query_param("screen_name", "c");
            then.status(200).json_body(json!([profile("c", 3)]));
        });

        let err = resolve(&fetcher(), &config_for(&server, 1), &handles(&["a", "b", "c"]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ReachError::Lookup(LookupError::Batch { batch: 1, .. })
        ));
        assert!(err.url().unwrap().as_str().contains("screen_name=b"));
        never.assert_hits(0);
    }
}
