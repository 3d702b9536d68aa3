use url::Url;

pub const DEFAULT_SEARCH_ENDPOINT: &str = "http://search.twitter.com/search.json";
pub const DEFAULT_LOOKUP_ENDPOINT: &str = "http://api.twitter.com/1/users/lookup.json";

/// The lookup endpoint refuses more handles than this per request.
pub const MAX_LOOKUP_BATCH: usize = 100;

/// Endpoints and limits for one pipeline run.
#[derive(Debug, Clone)]
pub struct ReachConfig {
    pub search_endpoint: Url,
    pub lookup_endpoint: Url,
    pub results_per_page: u32,
    /// Upper bound on search pages followed through `next_page`.
    pub max_pages: usize,
    pub batch_size: usize,
}

impl ReachConfig {
    pub fn new(search_endpoint: Url, lookup_endpoint: Url) -> Self {
        Self {
            search_endpoint,
            lookup_endpoint,
            results_per_page: 100,
            max_pages: 15,
            batch_size: MAX_LOOKUP_BATCH,
        }
    }

    /// Batch size clamped to what the lookup endpoint accepts.
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.clamp(1, MAX_LOOKUP_BATCH)
    }
}
