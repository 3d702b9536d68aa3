use std::collections::HashSet;

use crate::followers::handle_key;
use crate::post::Post;

/// Distinct author handles in order of first appearance. Handles differing
/// only in case are one author; the first spelling is kept.
pub fn collect_authors(posts: &[Post]) -> Vec<String> {
    let mut seen = HashSet::new();
    posts
        .iter()
        .filter(|p| seen.insert(handle_key(&p.author)))
        .map(|p| p.author.clone())
        .collect()
}
