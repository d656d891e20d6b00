//! # Automatic Releases
//!
//! Release automation for GitHub repositories.
//!
//! This crate resolves a release tag, collects the commits since the previous
//! semantic-version tag, renders a Conventional Commits changelog, checksums
//! release artifacts and publishes a GitHub release with the artifacts attached.
//!
//! ## Features
//!
//! - **Tag Resolution**: Nearest older semantic-version tag, or a static tag
//! - **Changelog**: Commits grouped by type with pull request links
//! - **Checksums**: SHA-256 digest block for every uploaded artifact
//! - **Rolling Tags**: Re-point and re-release a fixed tag such as `latest`
//!
//! ## Usage
//!
//! ```bash
//! automatic_releases --files 'dist/*'                     # release the pushed tag
//! automatic_releases --automatic-release-tag latest \
//!     --is-tag-static --prerelease --title "Development Build"
//! automatic_releases --dry-run                           # print the release body only
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Core modules
pub mod artifacts;
pub mod changelog;
pub mod cli;
pub mod error;
pub mod github;
pub mod publish;

// Re-export main types for public API
pub use cli::Args;
pub use error::{ReleaseError, Result};
pub use github::{GitHubClient, HostingApi};
#[cfg(any(test, feature = "testing"))]
pub use github::MockHost;
pub use publish::{PreparedRelease, Publisher};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Default web server for comparison links
pub const DEFAULT_SERVER_URL: &str = "https://github.com";

/// Snapshot of the process environment
///
/// Read once at startup so the rest of the crate never touches global state.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    vars: HashMap<String, String>,
}

impl EnvConfig {
    /// Capture the current process environment
    pub fn from_env() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Build from explicit key/value pairs
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Get a variable; empty values count as unset
    pub fn get(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .filter(|v| !v.trim().is_empty())
            .cloned()
    }
}

/// Repository identifier (`owner/repo`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoSlug {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
}

impl RepoSlug {
    /// Create a slug from its parts
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Configuration for a release run
#[derive(Debug, Clone)]
pub struct ReleaseConfig {
    /// Target repository
    pub repository: RepoSlug,
    /// Commit the release points at
    pub sha: String,
    /// Triggering ref (`refs/tags/v1.2.3`), if any
    pub git_ref: Option<String>,
    /// Explicit release tag; enables tag create/update and prior release deletion
    pub automatic_release_tag: Option<String>,
    /// Use the explicit tag itself as the previous release tag
    pub is_tag_static: bool,
    /// Create the release as a draft
    pub draft: bool,
    /// Mark the release as a prerelease
    pub prerelease: bool,
    /// Release title (defaults to the tag)
    pub title: Option<String>,
    /// Message for an annotated tag object
    pub tag_annotation: Option<String>,
    /// Artifact glob patterns
    pub files: Vec<String>,
    /// Web server used for changelog links
    pub server_url: String,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            repository: RepoSlug::new("", ""),
            sha: String::new(),
            git_ref: None,
            automatic_release_tag: None,
            is_tag_static: false,
            draft: false,
            prerelease: false,
            title: None,
            tag_annotation: None,
            files: Vec::new(),
            server_url: DEFAULT_SERVER_URL.to_string(),
        }
    }
}

/// Result of a release run, handed back to the invoking harness
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseOutputs {
    /// Tag the release was published under
    pub automatic_releases_tag: String,
    /// Asset upload URL template of the release
    pub upload_url: String,
    /// Release web URL
    pub html_url: String,
    /// Previous release tag the changelog starts from
    pub previous_tag: Option<String>,
    /// Number of uploaded artifacts
    pub assets_uploaded: usize,
    /// Release creation time reported by the platform
    pub created_at: Option<DateTime<Utc>>,
}
