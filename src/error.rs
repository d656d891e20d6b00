//! Error types for automatic release operations.
//!
//! This module defines all error types with actionable error messages and recovery suggestions.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for automatic release operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Run configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Version parsing errors
    #[error("Version error: {0}")]
    Version(#[from] VersionError),

    /// Hosting platform API errors
    #[error("GitHub error: {0}")]
    Api(#[from] ApiError),

    /// Artifact processing errors
    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration errors (missing or malformed run inputs)
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required input was not supplied
    #[error("Missing required input: {input}")]
    MissingInput {
        /// Input name
        input: String,
    },

    /// Repository slug is not `owner/repo`
    #[error("Invalid repository '{value}'. Expected: owner/repo")]
    InvalidRepository {
        /// Value that was supplied
        value: String,
    },

    /// No explicit tag and the triggering ref is not a tag
    #[error(
        "The parameter \"automatic_release_tag\" was not set and the triggering ref '{git_ref}' does not appear to be a tag"
    )]
    NoTag {
        /// Triggering ref
        git_ref: String,
    },

    /// A file pattern could not be compiled
    #[error("Invalid file pattern '{pattern}': {reason}")]
    InvalidGlob {
        /// Pattern text
        pattern: String,
        /// Reason for the error
        reason: String,
    },

    /// A URL input could not be parsed
    #[error("Invalid URL '{value}': {reason}")]
    InvalidUrl {
        /// Value that was supplied
        value: String,
        /// Reason for the error
        reason: String,
    },
}

/// Version errors
#[derive(Error, Debug)]
pub enum VersionError {
    /// Candidate tag is not semantic-version text
    #[error(
        "The release tag '{tag}' does not appear to conform to semantic versioning: {source}"
    )]
    InvalidVersion {
        /// Tag text
        tag: String,
        /// Parsing error
        #[source]
        source: semver::Error,
    },
}

/// Hosting platform API errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// Resource does not exist
    #[error("{resource} not found")]
    NotFound {
        /// Resource description
        resource: String,
    },

    /// Resource already exists
    #[error("{resource} already exists: {message}")]
    Conflict {
        /// Resource description
        resource: String,
        /// Message returned by the API
        message: String,
    },

    /// Unexpected HTTP status
    #[error("{method} {url} failed with status {status}: {message}")]
    Status {
        /// HTTP method
        method: String,
        /// Request URL
        url: String,
        /// HTTP status code
        status: u16,
        /// Message returned by the API
        message: String,
    },

    /// Network or protocol failure
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL returned by the API could not be used
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// URL text
        url: String,
        /// Reason for the error
        reason: String,
    },
}

/// Artifact processing errors
#[derive(Error, Debug)]
pub enum ArtifactError {
    /// An artifact could not be read
    #[error("Failed to read artifact {path}: {source}")]
    FileRead {
        /// Artifact path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// A hashing task panicked or was cancelled
    #[error("Checksum task for {path} failed: {reason}")]
    HashTask {
        /// Artifact path
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },

    /// Artifact path has no usable file name
    #[error("Artifact path has no file name: {path}")]
    NoFileName {
        /// Artifact path
        path: PathBuf,
    },

    /// Two artifacts would be uploaded under the same asset name
    #[error("Artifacts {first} and {second} share the asset name '{name}'")]
    DuplicateName {
        /// Shared file name
        name: String,
        /// First matched path
        first: PathBuf,
        /// Colliding path
        second: PathBuf,
    },
}

impl ReleaseError {
    /// Whether this error means the requested resource does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, ReleaseError::Api(ApiError::NotFound { .. }))
    }

    /// Whether this error means the resource being created already exists
    pub fn is_conflict(&self) -> bool {
        matches!(self, ReleaseError::Api(ApiError::Conflict { .. }))
    }

    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::Config(ConfigError::MissingInput { input }) => vec![
                format!("Pass --{} or set the matching INPUT_ environment variable", input.replace('_', "-")),
                "Run with --help to list every input and its environment variable".to_string(),
            ],
            ReleaseError::Config(ConfigError::NoTag { .. }) => vec![
                "Set automatic_release_tag (e.g. \"latest\") for branch builds".to_string(),
                "Or trigger the run from a tag push (refs/tags/v1.2.3)".to_string(),
            ],
            ReleaseError::Version(VersionError::InvalidVersion { .. }) => vec![
                "Name release tags after semantic versions, e.g. v1.2.3".to_string(),
                "Use automatic_release_tag with is_tag_static for non-semver tags".to_string(),
            ],
            ReleaseError::Api(ApiError::Status { status: 401, .. })
            | ReleaseError::Api(ApiError::Status { status: 403, .. }) => vec![
                "Check that repo_token is valid and has contents: write permission".to_string(),
            ],
            ReleaseError::Artifact(ArtifactError::FileRead { path, .. }) => vec![
                format!("Verify {} exists and is readable", path.display()),
                "Make sure build steps finish before the release step".to_string(),
            ],
            ReleaseError::Artifact(ArtifactError::DuplicateName { name, .. }) => vec![
                format!("Narrow the file patterns so only one '{}' matches", name),
                "Rename build outputs so every asset has a unique file name".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_detected() {
        let err = ReleaseError::from(ApiError::NotFound {
            resource: "release for tag 'latest'".to_string(),
        });
        assert!(err.is_not_found());
        assert!(!err.is_conflict());
        assert_eq!(err.to_string(), "GitHub error: release for tag 'latest' not found");
    }

    #[test]
    fn missing_input_suggests_flag() {
        let err = ReleaseError::from(ConfigError::MissingInput {
            input: "repo_token".to_string(),
        });
        let suggestions = err.recovery_suggestions();
        assert!(suggestions[0].contains("--repo-token"));
    }
}
