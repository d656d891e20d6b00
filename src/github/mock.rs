use super::operations::{AssetRecord, CommitRecord, HostingApi, NewRelease, PullRef, ReleaseRecord};
use crate::error::{ApiError, Result};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

/// In-memory hosting platform for exercising the release pipeline without network access.
///
/// Every mutating call is appended to [`MockHost::calls`] so tests can assert
/// on the exact sequence of side effects.
#[derive(Default)]
pub struct MockHost {
    tags: Vec<String>,
    tag_refs: Mutex<HashMap<String, String>>,
    commits: Vec<CommitRecord>,
    pulls: HashMap<String, Vec<PullRef>>,
    releases: Mutex<Vec<ReleaseRecord>>,
    fail_compare: bool,
    next_id: Mutex<u64>,
    calls: Mutex<Vec<String>>,
    created: Mutex<Vec<NewRelease>>,
}

impl MockHost {
    /// Create an empty mock host
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag; `sha` makes its `refs/tags/<name>` reference resolvable
    pub fn with_tag(mut self, name: impl Into<String>, sha: Option<&str>) -> Self {
        let name = name.into();
        if let Some(sha) = sha {
            self.tag_refs
                .get_mut()
                .unwrap_or_else(|e| e.into_inner())
                .insert(name.clone(), sha.to_string());
        }
        self.tags.push(name);
        self
    }

    /// Set the commits every comparison returns
    pub fn with_commits(mut self, commits: Vec<CommitRecord>) -> Self {
        self.commits = commits;
        self
    }

    /// Associate pull requests with a commit sha
    pub fn with_pulls(mut self, sha: impl Into<String>, pulls: Vec<PullRef>) -> Self {
        self.pulls.insert(sha.into(), pulls);
        self
    }

    /// Seed an existing release attached to `tag`
    pub fn with_release(self, id: u64, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        self.releases
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(release_record(id, &tag, false, false));
        self
    }

    /// Make every comparison fail
    pub fn failing_compare(mut self) -> Self {
        self.fail_compare = true;
        self
    }

    /// Calls recorded so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Releases created so far, in order
    pub fn created_releases(&self) -> Vec<NewRelease> {
        self.created.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).push(call);
    }
}

fn release_record(id: u64, tag: &str, draft: bool, prerelease: bool) -> ReleaseRecord {
    ReleaseRecord {
        id,
        tag_name: tag.to_string(),
        html_url: format!("https://github.com/octo/hello/releases/tag/{}", tag),
        upload_url: format!(
            "https://uploads.github.com/repos/octo/hello/releases/{}/assets{{?name,label}}",
            id
        ),
        draft,
        prerelease,
        created_at: None,
    }
}

impl HostingApi for MockHost {
    async fn list_tags(&self) -> Result<Vec<String>> {
        Ok(self.tags.clone())
    }

    async fn tag_ref_sha(&self, tag: &str) -> Result<String> {
        self.tag_refs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(tag)
            .cloned()
            .ok_or_else(|| {
                ApiError::NotFound {
                    resource: format!("reference 'tags/{}'", tag),
                }
                .into()
            })
    }

    async fn compare_commits(&self, base: &str, head: &str) -> Result<Vec<CommitRecord>> {
        self.record(format!("compare {}...{}", base, head));
        if self.fail_compare {
            return Err(ApiError::Status {
                method: "GET".to_string(),
                url: format!("/compare/{}...{}", base, head),
                status: 500,
                message: "Server Error".to_string(),
            }
            .into());
        }
        Ok(self.commits.clone())
    }

    async fn pulls_for_commit(&self, sha: &str) -> Result<Vec<PullRef>> {
        Ok(self.pulls.get(sha).cloned().unwrap_or_default())
    }

    async fn create_tag_object(&self, tag: &str, message: &str, sha: &str) -> Result<String> {
        self.record(format!("create_tag_object {} {:?} {}", tag, message, sha));
        Ok(format!("tagobj-{}", sha))
    }

    async fn create_ref(&self, git_ref: &str, sha: &str) -> Result<()> {
        self.record(format!("create_ref {} {}", git_ref, sha));
        let tag = git_ref.trim_start_matches("refs/tags/");
        let mut refs = self.tag_refs.lock().unwrap_or_else(|e| e.into_inner());
        if refs.contains_key(tag) {
            return Err(ApiError::Conflict {
                resource: format!("reference '{}'", git_ref),
                message: "Reference already exists".to_string(),
            }
            .into());
        }
        refs.insert(tag.to_string(), sha.to_string());
        Ok(())
    }

    async fn update_ref(&self, git_ref: &str, sha: &str, force: bool) -> Result<()> {
        self.record(format!("update_ref {} {} force={}", git_ref, sha, force));
        let tag = git_ref.trim_start_matches("tags/");
        self.tag_refs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(tag.to_string(), sha.to_string());
        Ok(())
    }

    async fn release_by_tag(&self, tag: &str) -> Result<ReleaseRecord> {
        self.releases
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|r| r.tag_name == tag)
            .cloned()
            .ok_or_else(|| {
                ApiError::NotFound {
                    resource: format!("release for tag '{}'", tag),
                }
                .into()
            })
    }

    async fn delete_release(&self, release_id: u64) -> Result<()> {
        self.record(format!("delete_release {}", release_id));
        self.releases
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|r| r.id != release_id);
        Ok(())
    }

    async fn create_release(&self, release: &NewRelease) -> Result<ReleaseRecord> {
        self.record(format!("create_release {}", release.tag_name));
        let id = {
            let mut next = self.next_id.lock().unwrap_or_else(|e| e.into_inner());
            *next += 1;
            1000 + *next
        };
        let record = release_record(id, &release.tag_name, release.draft, release.prerelease);
        self.releases
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(record.clone());
        self.created
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(release.clone());
        Ok(record)
    }

    async fn upload_asset(&self, upload_url: &str, path: &Path, name: &str) -> Result<AssetRecord> {
        self.record(format!("upload {}", name));
        let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        Ok(AssetRecord {
            name: name.to_string(),
            size,
            browser_download_url: format!("{}/{}", upload_url.split('{').next().unwrap_or(upload_url), name),
        })
    }
}
