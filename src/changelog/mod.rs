//! Changelog generation pipeline.
//!
//! - `tags`: previous release tag resolution
//! - `commits`: commit range retrieval
//! - `conventional`: commit classification
//! - `render`: grouped markdown output

mod commits;
mod conventional;
mod render;
mod tags;

pub use commits::{FULL_HISTORY_BASE, fetch_commits};
pub use conventional::{
    ConventionalMessage, ParsedCommit, SHORT_SHA_LEN, classify, is_breaking, is_merge_commit,
};
pub use render::{ChangelogSection, format_entry, full_changelog_link, render};
pub use tags::{parse_tag_version, resolve_previous_tag};

use crate::error::Result;
use crate::github::HostingApi;

/// Fetch, classify and render the changelog for `target_sha`.
///
/// Pull requests are looked up for every non-merge commit in the range.
pub async fn generate<H: HostingApi>(
    host: &H,
    previous_tag: Option<&str>,
    target_sha: &str,
) -> Result<String> {
    let commits = fetch_commits(host, previous_tag, target_sha).await;
    let mut parsed = Vec::with_capacity(commits.len());

    for commit in &commits {
        if is_merge_commit(&commit.message) {
            log::debug!("Ignoring merge commit {}", commit.sha);
            continue;
        }

        let pulls = host.pulls_for_commit(&commit.sha).await?;
        if !pulls.is_empty() {
            log::info!(
                "Found {} pull request(s) associated with commit {}",
                pulls.len(),
                commit.sha
            );
        }

        if let Some(entry) = classify(commit, pulls) {
            parsed.push(entry);
        }
    }

    Ok(render(&parsed))
}
