//! GitHub integration for release operations

mod client;
#[cfg(any(test, feature = "testing"))]
mod mock;
mod operations;

pub use client::{DEFAULT_API_URL, GitHubClient, GitHubConfig};
#[cfg(any(test, feature = "testing"))]
pub use mock::MockHost;
pub use operations::{AssetRecord, CommitRecord, HostingApi, NewRelease, PullRef, ReleaseRecord};
