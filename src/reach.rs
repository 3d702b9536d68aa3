use crate::authors::collect_authors;
use crate::config::ReachConfig;
use crate::error::ReachError;
use crate::fetcher::Fetcher;
use crate::followers::{self, FollowerMap};
use crate::post::Post;
use crate::search;

/// A post with its author's follower count attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedPost {
    pub post: Post,
    pub reach: u64,
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct ReachReport {
    pub query: String,
    /// Ordered by reach, highest first.
    pub posts: Vec<RankedPost>,
    pub followers: FollowerMap,
    pub total_reach: u64,
}

/// Attaches each post's reach and computes the total over distinct authors.
pub fn aggregate(
    posts: Vec<Post>,
    followers: &FollowerMap,
) -> Result<(Vec<RankedPost>, u64), ReachError> {
    let ranked = posts
        .into_iter()
        .map(|post| match followers.get(&post.author) {
            Some(reach) => Ok(RankedPost { post, reach }),
            None => Err(ReachError::MissingAuthor {
                handle: post.author,
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok((ranked, followers.total()))
}

/// Highest reach first. Equal reach has no secondary key.
pub fn sort_by_reach(posts: Vec<RankedPost>) -> Vec<RankedPost> {
    let mut sorted = posts;
    sorted.sort_by(|a, b| b.reach.cmp(&a.reach));
    sorted
}

/// Runs search, author collection, follower lookup, aggregation and sorting.
pub async fn compute_reach(
    fetcher: &Fetcher,
    config: &ReachConfig,
    query: &str,
) -> Result<ReachReport, ReachError> {
    let progress = fetcher.progress();

    if let Some(p) = progress {
        p.set_stage("searching");
    }
    let posts = search::fetch_posts(fetcher, config, query).await?;

    let handles = collect_authors(&posts);
    if let Some(p) = progress {
        p.set_authors_total(handles.len());
        p.set_stage("resolving followers");
    }
    let followers = followers::resolve(fetcher, config, &handles).await?;

    if let Some(p) = progress {
        p.set_stage("aggregating");
    }
    let (ranked, total_reach) = aggregate(posts, &followers)?;
    let posts = sort_by_reach(ranked);

    tracing::info!(posts = posts.len(), authors = followers.len(), total_reach, "computed reach");
    Ok(ReachReport {
        query: query.trim().to_string(),
        posts,
        followers,
        total_reach,
    })
}
