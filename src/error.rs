use thiserror::Error;
use url::Url;

/// Failure of a single HTTP round trip.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Transport failure, non-success status or an empty body.
    #[error("can't retrieve data from url: {url} ({reason})")]
    Fetch { url: Url, reason: String },

    /// The body arrived but is not the JSON we expected.
    #[error("can't parse data from url: {url} ({reason})")]
    Decode { url: Url, reason: String },
}

impl HttpError {
    pub fn url(&self) -> &Url {
        match self {
            HttpError::Fetch { url, .. } | HttpError::Decode { url, .. } => url,
        }
    }
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("user lookup batch {batch} failed")]
    Batch {
        batch: usize,
        #[source]
        source: HttpError,
    },

    #[error("user lookup returned no profile for @{handle}")]
    NotFound { handle: String },
}

#[derive(Debug, Error)]
pub enum ReachError {
    #[error(transparent)]
    Search(#[from] HttpError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("author @{handle} is missing from the follower map")]
    MissingAuthor { handle: String },

    #[error("a search query is required")]
    EmptyQuery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Fetch,
    Decode,
    Lookup,
    MissingAuthor,
    EmptyQuery,
}

impl ReachError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReachError::Search(HttpError::Fetch { .. }) => ErrorKind::Fetch,
            ReachError::Search(HttpError::Decode { .. }) => ErrorKind::Decode,
            ReachError::Lookup(_) => ErrorKind::Lookup,
            ReachError::MissingAuthor { .. } => ErrorKind::MissingAuthor,
            ReachError::EmptyQuery => ErrorKind::EmptyQuery,
        }
    }

    /// The URL of the request that failed, if the failure came from the network.
    pub fn url(&self) -> Option<&Url> {
        match self {
            ReachError::Search(e) => Some(e.url()),
            ReachError::Lookup(LookupError::Batch { source, .. }) => Some(source.url()),
            _ => None,
        }
    }
}
