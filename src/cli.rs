use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use url::Url;

use crate::config::{DEFAULT_LOOKUP_ENDPOINT, DEFAULT_SEARCH_ENDPOINT, ReachConfig};
use crate::fetcher::RetryPolicy;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ProgressMode {
    /// Enable progress UI when stderr is a TTY.
    Auto,
    /// Always enable progress UI (even when piped).
    Always,
    /// Never show progress UI.
    Never,
}

#[derive(Debug, Parser)]
#[command(author, version, about = "Estimate the reach of a Twitter search query")]
pub struct Args {
    /// Search query.
    pub query: String,

    /// Search endpoint; `rpp` and `q` are appended as query parameters.
    #[arg(long, default_value = DEFAULT_SEARCH_ENDPOINT)]
    pub search_endpoint: Url,

    /// User lookup endpoint; `screen_name` is appended as a comma-joined list.
    #[arg(long, default_value = DEFAULT_LOOKUP_ENDPOINT)]
    pub lookup_endpoint: Url,

    /// Maximum number of search result pages to follow.
    #[arg(long, default_value_t = 15)]
    pub max_pages: usize,

    /// Results requested per search page.
    #[arg(long, default_value_t = 100)]
    pub results_per_page: u32,

    /// Handles per lookup request (at most 100).
    #[arg(long, default_value_t = 100)]
    pub batch_size: usize,

    /// Attempts per request when the API answers 429/503. `1` disables retries.
    #[arg(long, default_value_t = 1)]
    pub max_attempts: usize,

    /// HTTP User-Agent.
    #[arg(long, default_value = "twitter-reach/0.1")]
    pub user_agent: String,

    /// Output HTML file. Defaults to stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Emit only the summary and post rows, without the page around them.
    #[arg(long)]
    pub fragment: bool,

    /// Progress display: `auto`, `always`, or `never`.
    #[arg(long, value_enum, default_value = "auto")]
    pub progress: ProgressMode,
}

impl Args {
    pub fn reach_config(&self) -> ReachConfig {
        ReachConfig {
            search_endpoint: self.search_endpoint.clone(),
            lookup_endpoint: self.lookup_endpoint.clone(),
            results_per_page: self.results_per_page,
            max_pages: self.max_pages,
            batch_size: self.batch_size,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::with_max_attempts(self.max_attempts)
    }
}
