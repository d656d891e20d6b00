//! Release artifact resolution and checksums.
//!
//! Glob patterns are expanded into a deduplicated file list; each file gets a
//! SHA-256 digest rendered as a fenced markdown block for the release body.

mod checksum;

pub use checksum::{Checksum, checksum, render_checksums, sha256_file};

use crate::error::{ArtifactError, ConfigError, Result};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// Files matched by the configured patterns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedArtifacts {
    /// Matched files, deduplicated, in first-seen order
    pub paths: Vec<PathBuf>,
    /// Patterns that matched nothing
    pub unmatched: Vec<String>,
}

/// Expand each glob pattern independently and merge the matches.
///
/// Directories are skipped. A pattern matching no files is reported in
/// [`ResolvedArtifacts::unmatched`] rather than failing the run. Distinct
/// files sharing a file name fail with [`ArtifactError::DuplicateName`],
/// since assets are uploaded by file name.
pub fn resolve_paths<S: AsRef<str>>(patterns: &[S]) -> Result<ResolvedArtifacts> {
    let mut resolved = ResolvedArtifacts::default();
    let mut seen = HashSet::new();

    for pattern in patterns.iter().map(|p| p.as_ref().trim()).filter(|p| !p.is_empty()) {
        let entries = glob::glob(pattern).map_err(|e| ConfigError::InvalidGlob {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        let mut matched = 0usize;
        for entry in entries {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    log::warn!("Skipping unreadable match for '{}': {}", pattern, e);
                    continue;
                }
            };
            if !path.is_file() {
                continue;
            }
            matched += 1;
            if seen.insert(path.clone()) {
                resolved.paths.push(path);
            }
        }

        if matched == 0 {
            log::warn!("{} doesn't match any files", pattern);
            resolved.unmatched.push(pattern.to_string());
        } else {
            log::debug!("{} matched {} file(s)", pattern, matched);
        }
    }

    ensure_unique_names(&resolved.paths)?;
    Ok(resolved)
}

fn ensure_unique_names(paths: &[PathBuf]) -> Result<()> {
    let mut names: HashMap<String, &PathBuf> = HashMap::new();
    for path in paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| ArtifactError::NoFileName { path: path.clone() })?;

        if let Some(first) = names.get(&name) {
            return Err(ArtifactError::DuplicateName {
                name,
                first: (*first).clone(),
                second: path.clone(),
            }
            .into());
        }
        names.insert(name, path);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn pattern(dir: &tempfile::TempDir, glob: &str) -> String {
        format!("{}/{}", dir.path().display(), glob)
    }

    #[test]
    fn overlapping_patterns_are_deduplicated() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "x").unwrap();
        fs::write(dir.path().join("b.txt"), "x").unwrap();
        fs::write(dir.path().join("c.bin"), "y").unwrap();

        let resolved = resolve_paths(&[
            pattern(&dir, "a.txt"),
            pattern(&dir, "*.txt"),
            pattern(&dir, "*"),
        ])
        .unwrap();

        let names: Vec<_> = resolved
            .paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "c.bin"]);
        assert!(resolved.unmatched.is_empty());
    }

    #[test]
    fn unmatched_pattern_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "x").unwrap();

        let missing = pattern(&dir, "*.zip");
        let resolved = resolve_paths(&[missing.clone(), pattern(&dir, "a.txt")]).unwrap();
        assert_eq!(resolved.paths.len(), 1);
        assert_eq!(resolved.unmatched, vec![missing]);
    }

    #[test]
    fn directories_and_blank_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("inner.txt"), "x").unwrap();

        let resolved = resolve_paths(&["  ".to_string(), pattern(&dir, "**/*")]).unwrap();
        assert_eq!(resolved.paths, vec![dir.path().join("sub").join("inner.txt")]);
    }

    #[test]
    fn same_file_name_in_two_directories_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        for sub in ["a", "b"] {
            fs::create_dir(dir.path().join(sub)).unwrap();
            fs::write(dir.path().join(sub).join("app.zip"), sub).unwrap();
        }

        let err = resolve_paths(&[pattern(&dir, "*/app.zip")]).unwrap_err();
        match err {
            crate::error::ReleaseError::Artifact(ArtifactError::DuplicateName { name, first, second }) => {
                assert_eq!(name, "app.zip");
                assert_eq!(first, dir.path().join("a").join("app.zip"));
                assert_eq!(second, dir.path().join("b").join("app.zip"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_pattern_is_a_configuration_error() {
        let err = resolve_paths(&["dist/[".to_string()]).unwrap_err();
        assert!(err.to_string().contains("Invalid file pattern"));
    }
}
