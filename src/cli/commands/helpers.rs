//! Shared helper functions for command execution.

use crate::error::{ConfigError, Result};
use crate::{EnvConfig, ReleaseOutputs, RepoSlug};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Parse a repository given as `owner/repo` or as a GitHub URL
pub(super) fn parse_github_repo(repo_str: Option<&str>) -> Result<RepoSlug> {
    let repo = repo_str
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or_else(|| ConfigError::MissingInput {
            input: "repository".to_string(),
        })?;

    if repo.contains("://") || repo.contains('@') {
        return parse_github_url(repo);
    }

    match repo.split('/').collect::<Vec<_>>().as_slice() {
        [owner, name] if !owner.is_empty() && !name.is_empty() => Ok(RepoSlug::new(*owner, *name)),
        _ => Err(ConfigError::InvalidRepository {
            value: repo.to_string(),
        }
        .into()),
    }
}

/// Parse GitHub owner/repo from a remote URL
///
/// Supports Git URL formats:
/// - SSH SCP-like: git@github.com:owner/repo.git
/// - HTTPS: https://github.com/owner/repo.git
fn parse_github_url(url: &str) -> Result<RepoSlug> {
    // SSH SCP-like format: git@github.com:owner/repo.git
    if url.contains('@') && url.contains(':') && !url.contains("://") {
        let parts: Vec<&str> = url.split(':').collect();
        if parts.len() == 2 {
            let path = parts[1].trim_end_matches(".git");
            let path_parts: Vec<&str> = path.split('/').collect();
            if path_parts.len() == 2 {
                return Ok(RepoSlug::new(path_parts[0], path_parts[1]));
            }
        }
    }

    if let Some(path_start) = url.find("github.com/") {
        let path = url[path_start + 11..].trim_end_matches('/').trim_end_matches(".git");
        let parts: Vec<&str> = path.split('/').collect();
        if parts.len() >= 2 && !parts[0].is_empty() && !parts[1].is_empty() {
            return Ok(RepoSlug::new(parts[0], parts[1]));
        }
    }

    Err(ConfigError::InvalidRepository {
        value: url.to_string(),
    }
    .into())
}

/// Hand the run outputs to the CI runner.
///
/// Appends `key=value` lines to the files named by `GITHUB_OUTPUT` and
/// `GITHUB_ENV`; unset variables are skipped.
pub(super) fn export_outputs(outputs: &ReleaseOutputs, env_config: &EnvConfig) -> Result<()> {
    if let Some(path) = env_config.get("GITHUB_OUTPUT") {
        append_lines(
            Path::new(&path),
            &[
                format!("automatic_releases_tag={}", outputs.automatic_releases_tag),
                format!("upload_url={}", outputs.upload_url),
            ],
        )?;
        log::debug!("Wrote step outputs to {}", path);
    }

    if let Some(path) = env_config.get("GITHUB_ENV") {
        append_lines(
            Path::new(&path),
            &[format!("AUTOMATIC_RELEASES_TAG={}", outputs.automatic_releases_tag)],
        )?;
        log::debug!("Exported AUTOMATIC_RELEASES_TAG to {}", path);
    }

    Ok(())
}

fn append_lines(path: &Path, lines: &[String]) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    for line in lines {
        writeln!(file, "{}", line)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_forms_are_accepted() {
        let expected = RepoSlug::new("octo", "hello");
        assert_eq!(parse_github_repo(Some("octo/hello")).unwrap(), expected);
        assert_eq!(parse_github_repo(Some("https://github.com/octo/hello.git")).unwrap(), expected);
        assert_eq!(parse_github_repo(Some("git@github.com:octo/hello.git")).unwrap(), expected);
    }

    #[test]
    fn malformed_slugs_are_rejected() {
        for bad in ["octo", "octo/hello/extra", "/hello", "https://example.com/x"] {
            assert!(parse_github_repo(Some(bad)).is_err(), "{bad} should be rejected");
        }
        assert!(parse_github_repo(None).is_err());
    }

    #[test]
    fn outputs_are_appended_to_runner_files() {
        let dir = tempfile::tempdir().unwrap();
        let output_file = dir.path().join("output");
        let env_file = dir.path().join("env");
        std::fs::write(&output_file, "existing=1\n").unwrap();

        let env_config = EnvConfig::from_vars([
            ("GITHUB_OUTPUT", output_file.display().to_string()),
            ("GITHUB_ENV", env_file.display().to_string()),
        ]);
        let outputs = ReleaseOutputs {
            automatic_releases_tag: "latest".to_string(),
            upload_url: "https://uploads.example/assets{?name,label}".to_string(),
            html_url: "https://github.com/octo/hello/releases/tag/latest".to_string(),
            previous_tag: Some("latest".to_string()),
            assets_uploaded: 0,
            created_at: None,
        };

        export_outputs(&outputs, &env_config).unwrap();

        assert_eq!(
            std::fs::read_to_string(&output_file).unwrap(),
            "existing=1\nautomatic_releases_tag=latest\nupload_url=https://uploads.example/assets{?name,label}\n"
        );
        assert_eq!(
            std::fs::read_to_string(&env_file).unwrap(),
            "AUTOMATIC_RELEASES_TAG=latest\n"
        );
    }

    #[test]
    fn unset_runner_files_are_skipped() {
        let outputs = ReleaseOutputs {
            automatic_releases_tag: "v1.0.0".to_string(),
            upload_url: String::new(),
            html_url: String::new(),
            previous_tag: None,
            assets_uploaded: 0,
            created_at: None,
        };
        assert!(export_outputs(&outputs, &EnvConfig::default()).is_ok());
    }
}
