//! GitHub REST API client implementing [`HostingApi`].

use super::operations::{AssetRecord, CommitRecord, HostingApi, NewRelease, PullRef, ReleaseRecord};
use crate::EnvConfig;
use crate::error::{ApiError, ArtifactError, ConfigError, Result};
use reqwest::header::{ACCEPT, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::path::Path;
use tokio_util::io::ReaderStream;
use url::Url;

/// Public GitHub API endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const API_VERSION: &str = "2022-11-28";
const PER_PAGE: usize = 100;

/// Configuration for the GitHub client
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// API base URL (GitHub Enterprise uses `https://host/api/v3`)
    pub api_url: String,
    /// GitHub token (from input or environment)
    pub token: Option<String>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            owner: String::new(),
            repo: String::new(),
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
        }
    }
}

/// GitHub API client scoped to one repository
pub struct GitHubClient {
    http: reqwest::Client,
    token: String,
    repo_base: Url,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: Option<String>,
}

#[derive(Deserialize)]
struct TagBody {
    name: String,
}

#[derive(Deserialize)]
struct RefBody {
    object: RefObject,
}

#[derive(Deserialize)]
struct RefObject {
    sha: String,
}

#[derive(Deserialize)]
struct ShaBody {
    sha: String,
}

#[derive(Deserialize)]
struct CompareBody {
    #[serde(default)]
    commits: Vec<CompareCommit>,
    #[serde(default)]
    total_commits: Option<usize>,
}

#[derive(Deserialize)]
struct CompareCommit {
    sha: String,
    #[serde(default)]
    html_url: Option<String>,
    commit: CommitDetail,
}

#[derive(Deserialize)]
struct CommitDetail {
    message: String,
}

#[derive(Deserialize)]
struct PullBody {
    number: u64,
    html_url: String,
}

impl GitHubClient {
    /// Create a new client
    ///
    /// The token comes from the config, falling back to `GITHUB_TOKEN` then
    /// `GH_TOKEN` in the environment snapshot.
    pub fn new(config: GitHubConfig, env_config: &EnvConfig) -> Result<Self> {
        let token = config
            .token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| env_config.get("GITHUB_TOKEN"))
            .or_else(|| env_config.get("GH_TOKEN"))
            .ok_or_else(|| ConfigError::MissingInput {
                input: "repo_token".to_string(),
            })?;

        let invalid_url = |reason: String| ConfigError::InvalidUrl {
            value: config.api_url.clone(),
            reason,
        };
        let mut repo_base = Url::parse(&config.api_url).map_err(|e| invalid_url(e.to_string()))?;
        repo_base
            .path_segments_mut()
            .map_err(|_| invalid_url("not a base URL".to_string()))?
            .pop_if_empty()
            .extend(["repos", config.owner.as_str(), config.repo.as_str()]);

        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::Transport)?;

        Ok(Self {
            http,
            token,
            repo_base,
        })
    }

    /// Repository endpoint; each component is split on `/` and percent-encoded
    /// segment by segment, so tag names cannot escape their path position.
    fn endpoint(&self, components: &[&str]) -> Url {
        let mut url = self.repo_base.clone();
        // repo_base is checked to be a base URL in `new`
        if let Ok(mut segments) = url.path_segments_mut() {
            for component in components {
                segments.extend(component.split('/'));
            }
        }
        url
    }

    fn paged(&self, components: &[&str], page: usize) -> Url {
        let mut url = self.endpoint(components);
        url.query_pairs_mut()
            .append_pair("per_page", &PER_PAGE.to_string())
            .append_pair("page", &page.to_string());
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        log::debug!("{} {}", method, url);
        self.http
            .request(method, url)
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    /// Turn a non-success response into the matching [`ApiError`]
    async fn check(&self, method: &Method, resource: &str, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let body = response.json::<ErrorBody>().await.ok();
        let already_exists = body.as_ref().is_some_and(|b| {
            b.message.contains("already exists")
                || b.errors
                    .iter()
                    .any(|e| e.code.as_deref() == Some("already_exists"))
        });
        let message = body
            .map(|b| b.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());

        let error = match status {
            StatusCode::NOT_FOUND => ApiError::NotFound {
                resource: resource.to_string(),
            },
            StatusCode::UNPROCESSABLE_ENTITY if already_exists => ApiError::Conflict {
                resource: resource.to_string(),
                message,
            },
            _ => ApiError::Status {
                method: method.to_string(),
                url,
                status: status.as_u16(),
                message,
            },
        };
        Err(error.into())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, resource: &str) -> Result<T> {
        let response = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(ApiError::Transport)?;
        let response = self.check(&Method::GET, resource, response).await?;
        Ok(response.json().await.map_err(ApiError::Transport)?)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: &serde_json::Value,
        resource: &str,
    ) -> Result<T> {
        let response = self
            .request(method.clone(), url)
            .json(body)
            .send()
            .await
            .map_err(ApiError::Transport)?;
        let response = self.check(&method, resource, response).await?;
        Ok(response.json().await.map_err(ApiError::Transport)?)
    }

    async fn send_empty(&self, method: Method, url: Url, body: Option<&serde_json::Value>, resource: &str) -> Result<()> {
        let mut builder = self.request(method.clone(), url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = builder.send().await.map_err(ApiError::Transport)?;
        self.check(&method, resource, response).await?;
        Ok(())
    }
}

impl HostingApi for GitHubClient {
    async fn list_tags(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut page = 1;

        loop {
            let batch: Vec<TagBody> = self
                .get_json(self.paged(&["tags"], page), "repository tags")
                .await?;
            let count = batch.len();
            names.extend(batch.into_iter().map(|t| t.name));

            if !has_next_page(count, names.len(), None) {
                break;
            }
            page += 1;
        }

        log::debug!("Listed {} tag(s) over {} page(s)", names.len(), page);
        Ok(names)
    }

    async fn tag_ref_sha(&self, tag: &str) -> Result<String> {
        let body: RefBody = self
            .get_json(
                self.endpoint(&["git", "ref", "tags", tag]),
                &format!("reference 'tags/{}'", tag),
            )
            .await?;
        Ok(body.object.sha)
    }

    async fn compare_commits(&self, base: &str, head: &str) -> Result<Vec<CommitRecord>> {
        let range = format!("{}...{}", base, head);
        let mut commits = Vec::new();
        let mut page = 1;

        loop {
            let body: CompareBody = self
                .get_json(
                    self.paged(&["compare", range.as_str()], page),
                    &format!("comparison {}", range),
                )
                .await?;
            let count = body.commits.len();
            commits.extend(body.commits.into_iter().map(|c| CommitRecord {
                sha: c.sha,
                message: c.commit.message,
                html_url: c.html_url,
            }));

            if !has_next_page(count, commits.len(), body.total_commits) {
                break;
            }
            page += 1;
        }

        log::debug!("Compared {} over {} page(s): {} commit(s)", range, page, commits.len());
        Ok(commits)
    }

    async fn pulls_for_commit(&self, sha: &str) -> Result<Vec<PullRef>> {
        let pulls: Vec<PullBody> = self
            .get_json(
                self.endpoint(&["commits", sha, "pulls"]),
                &format!("pull requests for commit {}", sha),
            )
            .await?;

        Ok(pulls
            .into_iter()
            .map(|p| PullRef {
                number: p.number,
                url: p.html_url,
            })
            .collect())
    }

    async fn create_tag_object(&self, tag: &str, message: &str, sha: &str) -> Result<String> {
        let body = json!({
            "tag": tag,
            "message": message,
            "object": sha,
            "type": "commit",
        });
        let created: ShaBody = self
            .send_json(
                Method::POST,
                self.endpoint(&["git", "tags"]),
                &body,
                &format!("tag object '{}'", tag),
            )
            .await?;
        Ok(created.sha)
    }

    async fn create_ref(&self, git_ref: &str, sha: &str) -> Result<()> {
        let body = json!({ "ref": git_ref, "sha": sha });
        self.send_empty(
            Method::POST,
            self.endpoint(&["git", "refs"]),
            Some(&body),
            &format!("reference '{}'", git_ref),
        )
        .await
    }

    async fn update_ref(&self, git_ref: &str, sha: &str, force: bool) -> Result<()> {
        let body = json!({ "sha": sha, "force": force });
        self.send_empty(
            Method::PATCH,
            self.endpoint(&["git", "refs", git_ref]),
            Some(&body),
            &format!("reference '{}'", git_ref),
        )
        .await
    }

    async fn release_by_tag(&self, tag: &str) -> Result<ReleaseRecord> {
        self.get_json(
            self.endpoint(&["releases", "tags", tag]),
            &format!("release for tag '{}'", tag),
        )
        .await
    }

    async fn delete_release(&self, release_id: u64) -> Result<()> {
        self.send_empty(
            Method::DELETE,
            self.endpoint(&["releases", release_id.to_string().as_str()]),
            None,
            &format!("release {}", release_id),
        )
        .await
    }

    async fn create_release(&self, release: &NewRelease) -> Result<ReleaseRecord> {
        let body = serde_json::to_value(release)?;
        self.send_json(
            Method::POST,
            self.endpoint(&["releases"]),
            &body,
            &format!("release for tag '{}'", release.tag_name),
        )
        .await
    }

    async fn upload_asset(&self, upload_url: &str, path: &Path, name: &str) -> Result<AssetRecord> {
        let mut url = asset_upload_url(upload_url)?;
        url.query_pairs_mut().append_pair("name", name);

        let file = tokio::fs::File::open(path)
            .await
            .map_err(|source| ArtifactError::FileRead {
                path: path.to_path_buf(),
                source,
            })?;
        let size = file
            .metadata()
            .await
            .map_err(|source| ArtifactError::FileRead {
                path: path.to_path_buf(),
                source,
            })?
            .len();

        let response = self
            .request(Method::POST, url)
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(CONTENT_LENGTH, size)
            .body(reqwest::Body::wrap_stream(ReaderStream::new(file)))
            .send()
            .await
            .map_err(ApiError::Transport)?;
        let response = self
            .check(&Method::POST, &format!("asset '{}'", name), response)
            .await?;

        Ok(response.json().await.map_err(ApiError::Transport)?)
    }
}

/// Whether another page may follow a page of `batch_len` items.
///
/// A short page ends the listing; so does reaching `total` when the
/// endpoint reports one.
fn has_next_page(batch_len: usize, fetched: usize, total: Option<usize>) -> bool {
    batch_len >= PER_PAGE && total.is_none_or(|total| fetched < total)
}

/// Strip the RFC 6570 template suffix (`{?name,label}`) from an upload URL
pub(crate) fn asset_upload_url(template: &str) -> Result<Url> {
    let base = template.split('{').next().unwrap_or(template);
    Url::parse(base).map_err(|e| {
        ApiError::InvalidUrl {
            url: template.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_url_template_is_stripped() {
        let mut url = asset_upload_url(
            "https://uploads.github.com/repos/octo/hello/releases/1/assets{?name,label}",
        )
        .unwrap();
        url.query_pairs_mut().append_pair("name", "app v1.tar.gz");
        assert_eq!(
            url.as_str(),
            "https://uploads.github.com/repos/octo/hello/releases/1/assets?name=app+v1.tar.gz"
        );
    }

    #[test]
    fn upload_url_rejects_garbage() {
        assert!(asset_upload_url("not a url{?name}").is_err());
    }

    #[test]
    fn token_falls_back_to_environment() {
        let env = EnvConfig::from_vars([("GH_TOKEN", "secret")]);
        let config = GitHubConfig {
            owner: "octo".to_string(),
            repo: "hello".to_string(),
            ..GitHubConfig::default()
        };
        let client = GitHubClient::new(config, &env).unwrap();
        assert_eq!(client.token, "secret");
        assert_eq!(client.repo_base.as_str(), "https://api.github.com/repos/octo/hello");
    }

    fn client(api_url: &str) -> GitHubClient {
        let config = GitHubConfig {
            owner: "octo".to_string(),
            repo: "hello".to_string(),
            api_url: api_url.to_string(),
            token: Some("secret".to_string()),
        };
        GitHubClient::new(config, &EnvConfig::default()).unwrap()
    }

    #[test]
    fn tag_names_are_percent_encoded() {
        let client = client(DEFAULT_API_URL);
        assert_eq!(
            client.endpoint(&["git", "ref", "tags", "v1#2?x%"]).as_str(),
            "https://api.github.com/repos/octo/hello/git/ref/tags/v1%232%3Fx%25"
        );
        assert_eq!(
            client.endpoint(&["releases", "tags", "release/1.0"]).as_str(),
            "https://api.github.com/repos/octo/hello/releases/tags/release/1.0"
        );
    }

    #[test]
    fn enterprise_base_path_is_kept() {
        let client = client("https://ghe.example.com/api/v3/");
        assert_eq!(
            client.paged(&["compare", "v1.0.0...abc"], 2).as_str(),
            "https://ghe.example.com/api/v3/repos/octo/hello/compare/v1.0.0...abc?per_page=100&page=2"
        );
    }

    #[test]
    fn paging_stops_on_short_page() {
        assert!(has_next_page(PER_PAGE, PER_PAGE, None));
        assert!(!has_next_page(PER_PAGE - 1, 2 * PER_PAGE - 1, None));
        assert!(!has_next_page(0, 0, None));
    }

    #[test]
    fn paging_stops_at_reported_total() {
        // 300-commit comparison: pages of 100, 100, 100
        assert!(has_next_page(PER_PAGE, 100, Some(300)));
        assert!(has_next_page(PER_PAGE, 200, Some(300)));
        assert!(!has_next_page(PER_PAGE, 300, Some(300)));
    }

    #[test]
    fn non_base_api_url_is_rejected() {
        let config = GitHubConfig {
            api_url: "mailto:octo@example.com".to_string(),
            token: Some("secret".to_string()),
            ..GitHubConfig::default()
        };
        let err = GitHubClient::new(config, &EnvConfig::default()).err().unwrap();
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[test]
    fn missing_token_is_a_configuration_error() {
        let env = EnvConfig::default();
        let err = GitHubClient::new(GitHubConfig::default(), &env)
            .err()
            .unwrap();
        assert!(err.to_string().contains("repo_token"));
    }
}
