use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use bytes::Bytes;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::HttpError;
use crate::progress::{Progress, RequestKind};

/// How throttled requests are retried. Only 429 and 503 responses are
/// ever retried; everything else fails on the first attempt.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(max_attempts: usize) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }
}

#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    retry: RetryPolicy,
    progress: Option<Arc<Progress>>,
}

impl Fetcher {
    pub fn new(
        user_agent: &str,
        retry: RetryPolicy,
        progress: Option<Arc<Progress>>,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("build reqwest client")?;
        Ok(Self {
            client,
            retry,
            progress,
        })
    }

    pub fn progress(&self) -> Option<&Progress> {
        self.progress.as_deref()
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        kind: RequestKind,
    ) -> Result<T, HttpError> {
        let body = self.get_bytes(url, kind).await?;
        serde_json::from_slice(&body).map_err(|e| HttpError::Decode {
            url: url.clone(),
            reason: e.to_string(),
        })
    }

    pub async fn get_bytes(&self, url: &Url, kind: RequestKind) -> Result<Bytes, HttpError> {
        if let Some(p) = &self.progress {
            p.http_start(kind, url);
        }
        let res = self.get_bytes_inner(url, kind).await;
        if let Some(p) = &self.progress {
            match &res {
                Ok(bytes) => p.http_ok(kind, url, bytes.len()),
                Err(_) => p.http_err(kind, url),
            }
        }
        res
    }

    async fn get_bytes_inner(&self, url: &Url, kind: RequestKind) -> Result<Bytes, HttpError> {
        let fetch_err = |reason: String| HttpError::Fetch {
            url: url.clone(),
            reason,
        };

        let mut backoff = self.retry.initial_backoff;
        let max_attempts = self.retry.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            tracing::debug!(%url, attempt, "GET");
            let resp = self
                .client
                .get(url.clone())
                .send()
                .await
                .map_err(|e| fetch_err(e.to_string()))?;

            let status = resp.status();

            if status.is_success() {
                let bytes = resp
                    .bytes()
                    .await
                    .map_err(|e| fetch_err(format!("read response body: {e}")))?;
                if bytes.iter().all(u8::is_ascii_whitespace) {
                    return Err(fetch_err("empty response body".to_string()));
                }
                return Ok(bytes);
            }

            let throttled = status.as_u16() == 429 || status.as_u16() == 503;
            if throttled && attempt < max_attempts {
                let wait = retry_after_duration(resp.headers()).unwrap_or(backoff);
                tracing::warn!(
                    %status,
                    attempt,
                    wait_ms = wait.as_millis(),
                    "throttled; backing off"
                );
                if let Some(p) = &self.progress {
                    p.http_throttled(kind, url, status.as_u16(), wait);
                }
                tokio::time::sleep(wait).await;
                backoff = (backoff * 2).min(self.retry.max_backoff);
                continue;
            }

            return Err(fetch_err(format!("status {status}")));
        }

        Err(fetch_err(format!("gave up after {max_attempts} attempts")))
    }
}

fn retry_after_duration(headers: &HeaderMap) -> Option<Duration> {
    let v = headers.get(RETRY_AFTER)?;
    let s = v.to_str().ok()?.trim();
    let seconds: u64 = s.parse().ok()?;
    Some(Duration::from_secs(seconds))
}
