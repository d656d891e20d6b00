//! Commit range retrieval since the previous release.

use crate::github::{CommitRecord, HostingApi};

/// Comparison base used when there is no previous release
pub const FULL_HISTORY_BASE: &str = "HEAD";

/// Fetch commits between the previous release tag and `target_sha`.
///
/// A missing or unresolvable previous tag falls back to [`FULL_HISTORY_BASE`];
/// a failed comparison yields an empty list so the release still goes out.
pub async fn fetch_commits<H: HostingApi>(
    host: &H,
    previous_tag: Option<&str>,
    target_sha: &str,
) -> Vec<CommitRecord> {
    let base = match previous_tag.filter(|tag| !tag.is_empty()) {
        Some(tag) => match host.tag_ref_sha(tag).await {
            Ok(sha) => {
                log::debug!("Tag '{}' points at {}", tag, sha);
                tag.to_string()
            }
            Err(e) => {
                log::info!(
                    "Could not find SHA corresponding to tag '{}' ({}). Assuming this is the first release.",
                    tag,
                    e
                );
                FULL_HISTORY_BASE.to_string()
            }
        },
        None => FULL_HISTORY_BASE.to_string(),
    };

    log::info!("Retrieving commits between {} and {}", base, target_sha);
    match host.compare_commits(&base, target_sha).await {
        Ok(commits) => {
            log::info!(
                "Retrieved {} commit(s) between {} and {}",
                commits.len(),
                base,
                target_sha
            );
            commits
        }
        Err(e) => {
            log::warn!(
                "Could not find any commits between {} and {}: {}",
                base,
                target_sha,
                e
            );
            Vec::new()
        }
    }
}
