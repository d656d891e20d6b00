//! Release command execution.

use super::helpers::{export_outputs, parse_github_repo};
use crate::cli::args::non_empty;
use crate::cli::{Args, RuntimeConfig};
use crate::error::Result;
use crate::github::{GitHubClient, GitHubConfig, HostingApi};
use crate::publish::{PreparedRelease, Publisher};
use crate::{EnvConfig, ReleaseConfig, ReleaseOutputs};

/// What a run produced
#[derive(Debug)]
pub(super) enum RunOutcome {
    /// Dry run: the release that would have been published
    Preview(PreparedRelease),
    /// The published release
    Published(ReleaseOutputs),
}

/// Build the release settings from parsed arguments
pub(super) fn release_config(args: &Args) -> Result<ReleaseConfig> {
    Ok(ReleaseConfig {
        repository: parse_github_repo(args.repository.as_deref())?,
        sha: non_empty(&args.sha).unwrap_or_default(),
        git_ref: non_empty(&args.git_ref),
        automatic_release_tag: non_empty(&args.automatic_release_tag),
        is_tag_static: args.is_tag_static,
        draft: args.draft,
        prerelease: args.prerelease,
        title: non_empty(&args.title),
        tag_annotation: non_empty(&args.tag_annotation),
        files: args
            .files
            .iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect(),
        server_url: args.server_url.clone(),
    })
}

fn describe_settings(settings: &ReleaseConfig, config: &RuntimeConfig) {
    config.verbose_println(&format!(
        "Tag: {}",
        settings
            .automatic_release_tag
            .as_deref()
            .unwrap_or("(from triggering ref)")
    ));
    config.verbose_println(&format!(
        "Static tag: {}, draft: {}, prerelease: {}",
        settings.is_tag_static, settings.draft, settings.prerelease
    ));
    for pattern in &settings.files {
        config.verbose_println(&format!("Files: {}", pattern));
    }
}

/// Publish, or with `dry_run` stop after preparing the release body.
pub(super) async fn run_release<H: HostingApi>(
    publisher: &Publisher<'_, H>,
    config: &RuntimeConfig,
    dry_run: bool,
) -> Result<RunOutcome> {
    if dry_run {
        let prepared = publisher.prepare().await?;
        config.section("Release body (dry run)");
        config.output().emit(&prepared.body)?;
        config.println("");
        config.success_println(&format!(
            "Dry run complete for {}: nothing was published",
            prepared.tag
        ));
        return Ok(RunOutcome::Preview(prepared));
    }

    Ok(RunOutcome::Published(publisher.run().await?))
}

/// Execute the release
pub(super) async fn execute_release(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let env_config = EnvConfig::from_env();
    let settings = release_config(args)?;

    config.println(&format!("🚀 Releasing {} at {}", settings.repository, settings.sha));
    describe_settings(&settings, config);

    let client = GitHubClient::new(
        GitHubConfig {
            owner: settings.repository.owner.clone(),
            repo: settings.repository.repo.clone(),
            api_url: args.api_url.clone(),
            token: non_empty(&args.repo_token),
        },
        &env_config,
    )?;
    let publisher = Publisher::new(&client, &settings, config);

    let outputs = match run_release(&publisher, config, args.dry_run).await? {
        RunOutcome::Preview(prepared) => {
            log::debug!(
                "Dry run for {} prepared {} artifact(s)",
                prepared.tag,
                prepared.checksums.len()
            );
            return Ok(0);
        }
        RunOutcome::Published(outputs) => outputs,
    };
    export_outputs(&outputs, &env_config)?;

    config.println("");
    config.success_println(&format!(
        "Released {} ({} asset(s))",
        outputs.automatic_releases_tag, outputs.assets_uploaded
    ));
    config.indent(&outputs.html_url);
    config.verbose_println(&format!("Upload URL: {}", outputs.upload_url));

    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RepoSlug;
    use crate::github::{CommitRecord, MockHost};
    use clap::Parser;

    #[test]
    fn blank_inputs_become_unset() {
        let args = Args::try_parse_from([
            "automatic_releases",
            "--repository",
            "octo/hello",
            "--sha",
            "abc",
            "--title",
            "",
            "--automatic-release-tag",
            " latest ",
            "--files",
            "",
        ])
        .unwrap();

        let settings = release_config(&args).unwrap();
        assert_eq!(settings.title, None);
        assert_eq!(settings.automatic_release_tag.as_deref(), Some("latest"));
        assert!(settings.files.is_empty());
        assert_eq!(settings.server_url, "https://github.com");
    }

    #[tokio::test]
    async fn dry_run_renders_body_without_mutating() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.zip"), "x").unwrap();

        let host = MockHost::new()
            .with_tag("latest", Some("old-sha"))
            .with_release(7, "latest")
            .with_commits(vec![CommitRecord::new("1234567890", "fix: tidy up")]);
        let settings = ReleaseConfig {
            repository: RepoSlug::new("octo", "hello"),
            sha: "abc123".to_string(),
            automatic_release_tag: Some("latest".to_string()),
            is_tag_static: true,
            files: vec![format!("{}/*.zip", dir.path().display())],
            ..Default::default()
        };
        let config = RuntimeConfig::new(false, true);
        let publisher = Publisher::new(&host, &settings, &config);

        let prepared = match run_release(&publisher, &config, true).await.unwrap() {
            RunOutcome::Preview(prepared) => prepared,
            RunOutcome::Published(outputs) => panic!("published {}", outputs.html_url),
        };

        assert_eq!(prepared.tag, "latest");
        assert!(prepared.body.starts_with("## Bug Fixes\n- tidy up (1234567)"));
        assert!(prepared.body.contains("  app.zip\n```"));
        assert_eq!(host.calls(), vec!["compare latest...abc123"]);
        assert!(host.created_releases().is_empty());
    }

    #[tokio::test]
    async fn full_run_publishes() {
        let host = MockHost::new();
        let settings = ReleaseConfig {
            repository: RepoSlug::new("octo", "hello"),
            sha: "abc123".to_string(),
            git_ref: Some("refs/tags/v1.0.0".to_string()),
            ..Default::default()
        };
        let config = RuntimeConfig::new(false, true);
        let publisher = Publisher::new(&host, &settings, &config);

        let outcome = run_release(&publisher, &config, false).await.unwrap();
        assert!(matches!(outcome, RunOutcome::Published(ref o) if o.automatic_releases_tag == "v1.0.0"));
        assert_eq!(host.created_releases().len(), 1);
    }
}
