mod authors;
mod builtin;
mod cli;
mod config;
mod error;
mod fetcher;
mod followers;
mod html;
mod post;
mod progress;
mod reach;
mod search;

use std::io::Write as _;
use std::path::Path;

use anyhow::Context as _;
use cli::Args;

pub use authors::collect_authors;
pub use cli::ProgressMode;
pub use cli::Args as CliArgs;
pub use config::{DEFAULT_LOOKUP_ENDPOINT, DEFAULT_SEARCH_ENDPOINT, MAX_LOOKUP_BATCH, ReachConfig};
pub use error::{ErrorKind, HttpError, LookupError, ReachError};
pub use fetcher::{Fetcher, RetryPolicy};
pub use followers::{FollowerMap, resolve};
pub use html::{build_fragment, build_report_html, format_date, group_thousands, render_embed};
pub use post::{Author, Post};
pub use progress::{Progress, RequestKind};
pub use reach::{RankedPost, ReachReport, aggregate, compute_reach, sort_by_reach};
pub use search::fetch_posts;

pub async fn run(args: Args) -> anyhow::Result<()> {
    use std::io::IsTerminal as _;

    let progress_enabled = match args.progress {
        ProgressMode::Always => true,
        ProgressMode::Never => false,
        ProgressMode::Auto => std::io::stderr().is_terminal(),
    };
    let progress = Progress::new(progress_enabled);

    let fetcher = Fetcher::new(
        &args.user_agent,
        args.retry_policy(),
        Some(progress.clone()),
    )?;

    let res = render(&args, &fetcher).await;
    progress.finish();
    res
}

async fn render(args: &Args, fetcher: &Fetcher) -> anyhow::Result<()> {
    let config = args.reach_config();
    let report = compute_reach(fetcher, &config, &args.query)
        .await
        .with_context(|| format!("compute reach for {:?}", args.query))?;

    if let Some(p) = fetcher.progress() {
        p.set_stage("rendering");
    }
    let html = if args.fragment {
        build_fragment(&report)
    } else {
        build_report_html(&report)
    };

    match &args.out {
        Some(path) => write_output(path, &html)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(html.as_bytes()).context("write stdout")?;
            stdout.flush().context("flush stdout")?;
        }
    }
    tracing::info!(
        total_reach = report.total_reach,
        results = report.posts.len(),
        "report written"
    );
    Ok(())
}

fn write_output(path: &Path, html: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
    }
    std::fs::write(path, html).with_context(|| format!("write {}", path.display()))
}
