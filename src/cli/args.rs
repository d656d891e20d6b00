//! Command line argument parsing and validation.
//!
//! Every input can come from a flag or from the environment variable a CI
//! runner sets for it (`INPUT_*` for action inputs, `GITHUB_*` for context).
//! Boolean inputs read `false`, `no`, `off`, `0` and the empty string as false.

use crate::DEFAULT_SERVER_URL;
use crate::error::ConfigError;
use crate::github::DEFAULT_API_URL;
use clap::Parser;
use clap::builder::FalseyValueParser;

/// Publish a GitHub release with a generated changelog
#[derive(Parser, Debug, Clone)]
#[command(
    name = "automatic_releases",
    version,
    about = "Publish a GitHub release with a generated changelog",
    long_about = "Create a GitHub release for a commit, with a Conventional Commits changelog,
SHA-256 checksums and uploaded artifacts.

Usage:
  automatic_releases --files 'dist/*'
  automatic_releases --automatic-release-tag latest --is-tag-static --prerelease
  automatic_releases --dry-run"
)]
pub struct Args {
    /// Token used to authenticate against the GitHub API
    #[arg(long, env = "INPUT_REPO_TOKEN", hide_env_values = true)]
    pub repo_token: Option<String>,

    /// Release tag to create or move (enables rolling releases)
    #[arg(long, env = "INPUT_AUTOMATIC_RELEASE_TAG")]
    pub automatic_release_tag: Option<String>,

    /// Use the release tag itself as the previous tag for the changelog
    #[arg(long, env = "INPUT_IS_TAG_STATIC", value_parser = FalseyValueParser::new())]
    pub is_tag_static: bool,

    /// Create the release as a draft
    #[arg(long, env = "INPUT_DRAFT", value_parser = FalseyValueParser::new())]
    pub draft: bool,

    /// Mark the release as a prerelease
    #[arg(long, env = "INPUT_PRERELEASE", value_parser = FalseyValueParser::new())]
    pub prerelease: bool,

    /// Release title (defaults to the tag)
    #[arg(long, env = "INPUT_TITLE")]
    pub title: Option<String>,

    /// Message for an annotated tag
    #[arg(long, env = "INPUT_TAG_ANNOTATION")]
    pub tag_annotation: Option<String>,

    /// Artifact glob pattern (repeatable; newline-separated in the environment)
    #[arg(long = "files", env = "INPUT_FILES", value_delimiter = '\n', value_name = "GLOB")]
    pub files: Vec<String>,

    /// Repository as owner/repo
    #[arg(long, env = "GITHUB_REPOSITORY", value_name = "OWNER/REPO")]
    pub repository: Option<String>,

    /// Commit the release points at
    #[arg(long, env = "GITHUB_SHA")]
    pub sha: Option<String>,

    /// Triggering ref, e.g. refs/tags/v1.2.3
    #[arg(long, env = "GITHUB_REF")]
    pub git_ref: Option<String>,

    /// GitHub API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// GitHub web server URL used in changelog links
    #[arg(long, env = "GITHUB_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    pub server_url: String,

    /// Print the release body without touching the repository
    #[arg(long)]
    pub dry_run: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Show detailed output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if non_empty(&self.repository).is_none() {
            return Err(ConfigError::MissingInput {
                input: "repository".to_string(),
            });
        }
        if non_empty(&self.sha).is_none() {
            return Err(ConfigError::MissingInput {
                input: "sha".to_string(),
            });
        }
        Ok(())
    }
}

/// Treat blank strings as unset
pub(crate) fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Create runtime configuration
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            output: super::OutputManager::new(verbose, quiet),
        }
    }

    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Print message
    pub fn println(&self, message: &str) {
        let _ = self.output.println(message);
    }

    /// Print message only in verbose mode
    pub fn verbose_println(&self, message: &str) {
        let _ = self.output.verbose(message);
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print warning message
    pub fn warning_println(&self, message: &str) {
        let _ = self.output.warn(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        let _ = self.output.success(message);
    }

    /// Print section header
    pub fn section(&self, title: &str) {
        let _ = self.output.section(title);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        let _ = self.output.indent(message);
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new(false, false)
    }
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self::new(args.verbose, args.quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("automatic_releases").chain(argv.iter().copied()))
            .unwrap()
    }

    #[test]
    fn files_flag_is_repeatable() {
        let args = parse(&[
            "--repository",
            "octo/hello",
            "--sha",
            "abc",
            "--files",
            "dist/*.tar.gz",
            "--files",
            "LICENSE",
        ]);
        assert_eq!(args.files, vec!["dist/*.tar.gz", "LICENSE"]);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn boolean_flags_stay_plain_switches() {
        let args = parse(&["--draft", "--is-tag-static"]);
        assert!(args.draft);
        assert!(args.is_tag_static);
        assert!(!args.dry_run);
    }

    #[test]
    fn missing_sha_is_reported() {
        let args = parse(&["--repository", "octo/hello", "--sha", " "]);
        let err = args.validate().unwrap_err();
        assert!(err.to_string().contains("sha"));
    }

    #[test]
    fn blank_values_are_unset() {
        assert_eq!(non_empty(&Some("  ".to_string())), None);
        assert_eq!(non_empty(&Some(" x ".to_string())).as_deref(), Some("x"));
        assert_eq!(non_empty(&None), None);
    }
}
