use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use indicatif::{
    HumanBytes, HumanDuration, MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle,
};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Search,
    Lookup,
}

impl RequestKind {
    fn label(self) -> &'static str {
        match self {
            RequestKind::Search => "search",
            RequestKind::Lookup => "lookup",
        }
    }
}

#[derive(Debug, Default)]
struct RequestCounters {
    search: AtomicU64,
    lookup: AtomicU64,
}

impl RequestCounters {
    fn inc(&self, kind: RequestKind) {
        match kind {
            RequestKind::Search => {
                self.search.fetch_add(1, Ordering::Relaxed);
            }
            RequestKind::Lookup => {
                self.lookup.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn snapshot(&self) -> (u64, u64) {
        (
            self.search.load(Ordering::Relaxed),
            self.lookup.load(Ordering::Relaxed),
        )
    }
}

pub struct Progress {
    enabled: bool,
    start: Instant,

    mp: Option<MultiProgress>,
    stage: ProgressBar,
    requests: ProgressBar,

    posts_seen: AtomicU64,
    authors_total: AtomicU64,
    authors_resolved: AtomicU64,

    http_done: AtomicU64,
    http_failed: AtomicU64,
    http_bytes: AtomicU64,

    done_by_kind: RequestCounters,
    last_http_label: Mutex<String>,
}

impl Progress {
    pub fn new(enabled: bool) -> Arc<Self> {
        let start = Instant::now();

        let (mp, stage, requests) = if enabled {
            let mp = MultiProgress::with_draw_target(ProgressDrawTarget::stderr());

            let stage = mp.add(ProgressBar::new_spinner());
            if let Ok(style) =
                ProgressStyle::with_template("{spinner} {msg}  [{elapsed_precise}]")
            {
                stage.set_style(style);
            }
            stage.enable_steady_tick(Duration::from_millis(80));
            stage.set_message("starting");

            let requests = mp.add(ProgressBar::new_spinner());
            if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
                requests.set_style(style);
            }
            requests.enable_steady_tick(Duration::from_millis(120));
            requests.set_message("requests");

            (Some(mp), stage, requests)
        } else {
            (None, ProgressBar::hidden(), ProgressBar::hidden())
        };

        Arc::new(Self {
            enabled,
            start,
            mp,
            stage,
            requests,
            posts_seen: AtomicU64::new(0),
            authors_total: AtomicU64::new(0),
            authors_resolved: AtomicU64::new(0),
            http_done: AtomicU64::new(0),
            http_failed: AtomicU64::new(0),
            http_bytes: AtomicU64::new(0),
            done_by_kind: RequestCounters::default(),
            last_http_label: Mutex::new(String::new()),
        })
    }

    pub fn set_stage(&self, msg: impl Into<String>) {
        if !self.enabled {
            return;
        }
        self.stage.set_message(msg.into());
    }

    pub fn posts_fetched(&self, count: usize) {
        self.posts_seen.fetch_add(count as u64, Ordering::Relaxed);
        self.refresh_requests();
    }

    pub fn set_authors_total(&self, total: usize) {
        self.authors_total.store(total as u64, Ordering::Relaxed);
        self.refresh_requests();
    }

    pub fn authors_resolved(&self, count: usize) {
        self.authors_resolved
            .fetch_add(count as u64, Ordering::Relaxed);
        self.refresh_requests();
    }

    pub fn http_start(&self, kind: RequestKind, url: &Url) {
        if !self.enabled {
            return;
        }
        if let Ok(mut last) = self.last_http_label.lock() {
            *last = format!("GET {} ({})", url, kind.label());
        }
        self.refresh_requests();
    }

    pub fn http_throttled(&self, kind: RequestKind, url: &Url, status: u16, wait: Duration) {
        if !self.enabled {
            return;
        }
        if let Ok(mut last) = self.last_http_label.lock() {
            *last = format!(
                "GET {} ({}) throttled {} wait {}ms",
                url,
                kind.label(),
                status,
                wait.as_millis()
            );
        }
        self.refresh_requests();
    }

    pub fn http_ok(&self, kind: RequestKind, url: &Url, bytes: usize) {
        self.http_done.fetch_add(1, Ordering::Relaxed);
        self.http_bytes.fetch_add(bytes as u64, Ordering::Relaxed);
        self.done_by_kind.inc(kind);

        if self.enabled {
            if let Ok(mut last) = self.last_http_label.lock() {
                *last = format!("GET {} ({}) ok {}B", url, kind.label(), bytes);
            }
            self.refresh_requests();
        }
    }

    pub fn http_err(&self, kind: RequestKind, url: &Url) {
        self.http_failed.fetch_add(1, Ordering::Relaxed);
        if self.enabled {
            if let Ok(mut last) = self.last_http_label.lock() {
                *last = format!("GET {} ({}) failed", url, kind.label());
            }
            self.refresh_requests();
        }
    }

    /// Requests completed so far, as `(search pages, lookup batches)`.
    #[cfg(test)]
    fn completed(&self) -> (u64, u64) {
        self.done_by_kind.snapshot()
    }

    pub fn finish(&self) {
        if !self.enabled {
            return;
        }
        self.refresh_requests();
        self.stage.finish_with_message("done");
        self.requests.finish_and_clear();
        if let Some(mp) = &self.mp {
            let _ = mp.println(format!("Done in {}", HumanDuration(self.start.elapsed())));
        }
    }

    fn refresh_requests(&self) {
        if !self.enabled {
            return;
        }

        let done = self.http_done.load(Ordering::Relaxed);
        let failed = self.http_failed.load(Ordering::Relaxed);
        let bytes = self.http_bytes.load(Ordering::Relaxed);
        let posts = self.posts_seen.load(Ordering::Relaxed);
        let authors_total = self.authors_total.load(Ordering::Relaxed);
        let authors_resolved = self.authors_resolved.load(Ordering::Relaxed);
        let (pages, batches) = self.done_by_kind.snapshot();

        let last = self
            .last_http_label
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default();
        self.requests.set_message(format!(
            "HTTP: done {done} failed {failed} | {bytes} | pages {pages} posts {posts} | batches {batches} authors {authors_resolved}/{authors_total} | {last}",
            bytes = HumanBytes(bytes),
        ));
    }
}
