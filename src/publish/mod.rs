//! Release publishing orchestration.
//!
//! Runs the release pipeline against a [`HostingApi`]:
//!
//! 1. resolve the release tag and the previous release tag
//! 2. generate the changelog and checksum the artifacts concurrently
//! 3. create or re-point the tag (explicit tag only)
//! 4. delete the release previously attached to the tag (explicit tag only)
//! 5. create the release and upload the artifacts

use crate::artifacts::{self, Checksum, ResolvedArtifacts};
use crate::changelog;
use crate::cli::RuntimeConfig;
use crate::error::{ConfigError, Result};
use crate::github::{HostingApi, NewRelease, ReleaseRecord};
use crate::{ReleaseConfig, ReleaseOutputs};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static GIT_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(refs/)?tags/(.+)$").expect("tag ref regex is valid"));

/// Extract the tag name from a triggering ref such as `refs/tags/v1.2.3`.
pub fn parse_git_tag(git_ref: &str) -> Option<String> {
    GIT_TAG_RE
        .captures(git_ref)
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str().to_string())
}

/// Pick the release tag: the explicit tag if set, else the tag in the triggering ref.
pub fn resolve_release_tag(explicit: Option<&str>, git_ref: Option<&str>) -> Result<String> {
    if let Some(tag) = explicit.filter(|t| !t.trim().is_empty()) {
        return Ok(tag.trim().to_string());
    }

    let git_ref = git_ref.unwrap_or_default();
    parse_git_tag(git_ref).ok_or_else(|| {
        ConfigError::NoTag {
            git_ref: git_ref.to_string(),
        }
        .into()
    })
}

/// Assemble the release body from its non-empty parts.
pub fn compose_body(changelog: &str, full_changelog: &str, checksums: &str) -> String {
    [changelog, full_changelog, checksums]
        .iter()
        .map(|part| part.trim_end())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Everything computed before the first mutating API call
#[derive(Debug, Clone)]
pub struct PreparedRelease {
    /// Tag the release is published under
    pub tag: String,
    /// Previous release tag, if one was found
    pub previous_tag: Option<String>,
    /// Rendered release body
    pub body: String,
    /// Resolved artifact files
    pub artifacts: ResolvedArtifacts,
    /// Artifact digests, in upload order
    pub checksums: Vec<Checksum>,
}

/// Drives one release run against a hosting platform
pub struct Publisher<'a, H: HostingApi> {
    host: &'a H,
    settings: &'a ReleaseConfig,
    config: &'a RuntimeConfig,
}

impl<'a, H: HostingApi> Publisher<'a, H> {
    /// Create a publisher
    pub fn new(host: &'a H, settings: &'a ReleaseConfig, config: &'a RuntimeConfig) -> Self {
        Self {
            host,
            settings,
            config,
        }
    }

    /// Prepare and publish the release
    pub async fn run(&self) -> Result<ReleaseOutputs> {
        let prepared = self.prepare().await?;
        self.publish(&prepared).await
    }

    /// Resolve tags, render the changelog and checksum artifacts.
    ///
    /// Makes read-only API calls only.
    pub async fn prepare(&self) -> Result<PreparedRelease> {
        // ===== PHASE 1: TAG RESOLUTION =====
        self.config.section("Determining release tags");
        let tag = resolve_release_tag(
            self.settings.automatic_release_tag.as_deref(),
            self.settings.git_ref.as_deref(),
        )?;
        self.config.indent(&format!("Release tag: {}", tag));

        let previous_tag = self.resolve_previous_tag(&tag).await?;
        match &previous_tag {
            Some(prev) => self.config.indent(&format!("Previous tag: {}", prev)),
            None => self.config.indent("Previous tag: none (first release)"),
        }

        // ===== PHASE 2: CHANGELOG + ARTIFACTS (concurrent) =====
        self.config.section("Generating changelog and checksums");
        let changelog_task = changelog::generate(self.host, previous_tag.as_deref(), &self.settings.sha);
        let artifacts_task = async {
            let resolved = artifacts::resolve_paths(&self.settings.files)?;
            for pattern in &resolved.unmatched {
                self.config.warning_println(&format!("{} doesn't match any files", pattern));
            }
            let checksums = artifacts::checksum(&resolved.paths).await?;
            Ok::<_, crate::ReleaseError>((resolved, checksums))
        };
        let (changelog, (artifacts, checksums)) = tokio::try_join!(changelog_task, artifacts_task)?;

        let full_changelog = changelog::full_changelog_link(
            &self.settings.server_url,
            &self.settings.repository,
            previous_tag.as_deref(),
            &tag,
        );
        let body = compose_body(
            &changelog,
            &full_changelog,
            &artifacts::render_checksums(&checksums),
        );
        self.config
            .success_println(&format!("Changelog ready, {} artifact(s) checksummed", checksums.len()));

        Ok(PreparedRelease {
            tag,
            previous_tag,
            body,
            artifacts,
            checksums,
        })
    }

    /// Apply the prepared release to the hosting platform.
    pub async fn publish(&self, prepared: &PreparedRelease) -> Result<ReleaseOutputs> {
        let explicit = self
            .settings
            .automatic_release_tag
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty());

        if explicit {
            // ===== PHASE 3: TAG CREATE/UPDATE =====
            self.config.section("Updating tag");
            self.create_or_update_tag(&prepared.tag).await?;

            // ===== PHASE 4: PRIOR RELEASE CLEANUP =====
            self.delete_previous_release(&prepared.tag).await?;
        }

        // ===== PHASE 5: CREATE RELEASE =====
        self.config.section("Creating release");
        let request = NewRelease {
            tag_name: prepared.tag.clone(),
            name: self
                .settings
                .title
                .clone()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| prepared.tag.clone()),
            body: prepared.body.clone(),
            draft: self.settings.draft,
            prerelease: self.settings.prerelease,
        };
        let release = self.host.create_release(&request).await?;
        self.config
            .success_println(&format!("Created release {} ({})", release.tag_name, release.html_url));

        // ===== PHASE 6: UPLOAD ARTIFACTS =====
        let uploaded = self.upload_artifacts(&release, &prepared.artifacts.paths).await?;

        Ok(ReleaseOutputs {
            automatic_releases_tag: prepared.tag.clone(),
            upload_url: release.upload_url,
            html_url: release.html_url,
            previous_tag: prepared.previous_tag.clone(),
            assets_uploaded: uploaded,
            created_at: release.created_at,
        })
    }

    /// Previous tag: the explicit tag itself in static mode, else the nearest
    /// older semantic-version tag.
    async fn resolve_previous_tag(&self, tag: &str) -> Result<Option<String>> {
        if self.settings.is_tag_static
            && let Some(explicit) = self.settings.automatic_release_tag.as_deref()
            && !explicit.trim().is_empty()
        {
            log::info!("Static tag mode, using '{}' as previous release tag", explicit);
            return Ok(Some(explicit.trim().to_string()));
        }

        let tags = self.host.list_tags().await?;
        log::debug!("Repository has {} tag(s)", tags.len());
        changelog::resolve_previous_tag(tag, &tags)
    }

    async fn create_or_update_tag(&self, tag: &str) -> Result<()> {
        let mut target = self.settings.sha.clone();
        if let Some(message) = self
            .settings
            .tag_annotation
            .as_deref()
            .filter(|m| !m.trim().is_empty())
        {
            target = self.host.create_tag_object(tag, message, &target).await?;
            self.config.indent(&format!("Created annotated tag object {}", target));
        }

        match self.host.create_ref(&format!("refs/tags/{}", tag), &target).await {
            Ok(()) => {
                self.config.success_println(&format!("Created tag {}", tag));
                Ok(())
            }
            Err(e) if e.is_conflict() => {
                log::info!("Tag {} already exists, moving it to {}", tag, target);
                self.host.update_ref(&format!("tags/{}", tag), &target, true).await?;
                self.config.success_println(&format!("Updated tag {} to {}", tag, target));
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn delete_previous_release(&self, tag: &str) -> Result<()> {
        let release = match self.host.release_by_tag(tag).await {
            Ok(release) => release,
            Err(e) if e.is_not_found() => {
                log::info!("Could not find release associated with tag \"{}\"", tag);
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        match self.host.delete_release(release.id).await {
            Ok(()) => {
                self.config
                    .indent(&format!("Deleted previous release {} for tag {}", release.id, tag));
                Ok(())
            }
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn upload_artifacts(&self, release: &ReleaseRecord, paths: &[std::path::PathBuf]) -> Result<usize> {
        if paths.is_empty() {
            return Ok(0);
        }

        self.config.section("Uploading artifacts");
        for path in paths {
            let name = asset_name(path)?;
            let asset = self.host.upload_asset(&release.upload_url, path, &name).await?;
            self.config
                .indent(&format!("✓ {} ({} bytes)", asset.name, asset.size));
        }
        Ok(paths.len())
    }
}

fn asset_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            crate::error::ArtifactError::NoFileName {
                path: path.to_path_buf(),
            }
            .into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RepoSlug;
    use crate::github::{CommitRecord, MockHost};

    fn settings() -> ReleaseConfig {
        ReleaseConfig {
            repository: RepoSlug::new("octo", "hello"),
            sha: "abc123".to_string(),
            ..Default::default()
        }
    }

    fn quiet() -> RuntimeConfig {
        RuntimeConfig::new(false, true)
    }

    #[test]
    fn tag_refs_are_parsed() {
        assert_eq!(parse_git_tag("refs/tags/v1.2.3").as_deref(), Some("v1.2.3"));
        assert_eq!(parse_git_tag("tags/nightly").as_deref(), Some("nightly"));
        assert_eq!(parse_git_tag("refs/heads/main"), None);
    }

    #[test]
    fn explicit_tag_wins_over_ref() {
        assert_eq!(
            resolve_release_tag(Some("latest"), Some("refs/tags/v1.0.0")).unwrap(),
            "latest"
        );
        assert_eq!(
            resolve_release_tag(Some(""), Some("refs/tags/v1.0.0")).unwrap(),
            "v1.0.0"
        );
    }

    #[test]
    fn branch_ref_without_tag_is_rejected() {
        let err = resolve_release_tag(None, Some("refs/heads/main")).unwrap_err();
        assert!(err.to_string().contains("refs/heads/main"));
        assert!(resolve_release_tag(None, None).is_err());
    }

    #[test]
    fn body_skips_empty_parts() {
        assert_eq!(compose_body("", "**Full Changelog**: x", ""), "**Full Changelog**: x");
        assert_eq!(compose_body("## Features\n- a", "link", "sums"), "## Features\n- a\n\nlink\n\nsums");
    }

    #[tokio::test]
    async fn ref_tagged_release_skips_tag_mutation() {
        let host = MockHost::new()
            .with_tag("v1.0.0", Some("000"))
            .with_tag("v1.1.0", Some("abc123"))
            .with_commits(vec![CommitRecord::new("1111111aaaa", "feat: shiny")]);
        let settings = ReleaseConfig {
            git_ref: Some("refs/tags/v1.1.0".to_string()),
            ..settings()
        };
        let config = quiet();

        let outputs = Publisher::new(&host, &settings, &config).run().await.unwrap();
        assert_eq!(outputs.automatic_releases_tag, "v1.1.0");
        assert_eq!(outputs.previous_tag.as_deref(), Some("v1.0.0"));
        assert_eq!(host.calls(), vec!["compare v1.0.0...abc123", "create_release v1.1.0"]);

        let created = host.created_releases();
        assert_eq!(created[0].name, "v1.1.0");
        assert!(created[0].body.contains("## Features"));
        assert!(created[0]
            .body
            .ends_with("**Full Changelog**: https://github.com/octo/hello/compare/v1.0.0...v1.1.0"));
    }

    #[tokio::test]
    async fn annotation_creates_tag_object_first() {
        let host = MockHost::new();
        let settings = ReleaseConfig {
            automatic_release_tag: Some("latest".to_string()),
            is_tag_static: true,
            tag_annotation: Some("Rolling build".to_string()),
            ..settings()
        };
        let config = quiet();

        Publisher::new(&host, &settings, &config).run().await.unwrap();
        let calls = host.calls();
        assert_eq!(calls[1], "create_tag_object latest \"Rolling build\" abc123");
        assert_eq!(calls[2], "create_ref refs/tags/latest tagobj-abc123");
    }

    #[tokio::test]
    async fn non_semver_dynamic_tag_is_an_error() {
        let host = MockHost::new().with_tag("v1.0.0", Some("000"));
        let settings = ReleaseConfig {
            automatic_release_tag: Some("latest".to_string()),
            ..settings()
        };
        let config = quiet();

        let err = Publisher::new(&host, &settings, &config).prepare().await.unwrap_err();
        assert!(matches!(err, crate::ReleaseError::Version(_)));
        assert!(host.calls().is_empty());
    }
}
