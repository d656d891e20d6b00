//! Hosting platform operations trait and types for release automation.
//!
//! This module defines the HostingApi trait that specifies every platform call
//! the release pipeline makes. The production implementation is
//! [`GitHubClient`](super::GitHubClient); `MockHost` (behind the `testing` feature) serves tests.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::Path;

/// Trait defining all hosting platform operations needed for a release run
pub trait HostingApi {
    /// List every tag name in the repository (all pages)
    fn list_tags(&self) -> impl Future<Output = Result<Vec<String>>>;

    /// Resolve `refs/tags/<tag>` to the object sha it points at
    fn tag_ref_sha(&self, tag: &str) -> impl Future<Output = Result<String>>;

    /// Commits reachable from `head` but not from `base`, oldest first
    fn compare_commits(
        &self,
        base: &str,
        head: &str,
    ) -> impl Future<Output = Result<Vec<CommitRecord>>>;

    /// Pull requests associated with a commit
    fn pulls_for_commit(&self, sha: &str) -> impl Future<Output = Result<Vec<PullRef>>>;

    /// Create an annotated tag object, returning its sha
    fn create_tag_object(
        &self,
        tag: &str,
        message: &str,
        sha: &str,
    ) -> impl Future<Output = Result<String>>;

    /// Create a reference (`refs/tags/<tag>`); fails with a conflict if it exists
    fn create_ref(&self, git_ref: &str, sha: &str) -> impl Future<Output = Result<()>>;

    /// Move an existing reference (`tags/<tag>`) to a new sha
    fn update_ref(&self, git_ref: &str, sha: &str, force: bool)
    -> impl Future<Output = Result<()>>;

    /// Look up the release attached to a tag
    fn release_by_tag(&self, tag: &str) -> impl Future<Output = Result<ReleaseRecord>>;

    /// Delete a release by id
    fn delete_release(&self, release_id: u64) -> impl Future<Output = Result<()>>;

    /// Create a release
    fn create_release(&self, release: &NewRelease) -> impl Future<Output = Result<ReleaseRecord>>;

    /// Upload a file as a release asset
    fn upload_asset(
        &self,
        upload_url: &str,
        path: &Path,
        name: &str,
    ) -> impl Future<Output = Result<AssetRecord>>;
}

/// A commit returned by a range comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    /// Full commit sha
    pub sha: String,
    /// Full commit message (header, body, footer)
    pub message: String,
    /// Web URL of the commit, when the platform reports one
    pub html_url: Option<String>,
}

impl CommitRecord {
    /// Create a commit record without a web URL
    pub fn new(sha: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            sha: sha.into(),
            message: message.into(),
            html_url: None,
        }
    }
}

/// Pull request associated with a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRef {
    /// Pull request number
    pub number: u64,
    /// Pull request web URL
    pub url: String,
}

/// Parameters for creating a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRelease {
    /// Tag the release is attached to
    pub tag_name: String,
    /// Release title
    pub name: String,
    /// Markdown body
    pub body: String,
    /// Whether to create a draft
    pub draft: bool,
    /// Whether to mark as prerelease
    pub prerelease: bool,
}

/// A release as reported by the platform
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseRecord {
    /// Release id
    pub id: u64,
    /// Tag name
    pub tag_name: String,
    /// Release web URL
    pub html_url: String,
    /// Asset upload URL template
    pub upload_url: String,
    /// Whether this is a draft
    pub draft: bool,
    /// Whether this is a prerelease
    pub prerelease: bool,
    /// Creation timestamp
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// An uploaded release asset
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssetRecord {
    /// Asset file name
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Download URL
    pub browser_download_url: String,
}
