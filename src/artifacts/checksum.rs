//! SHA-256 checksums for release artifacts.

use crate::error::{ArtifactError, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// Digest of one artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checksum {
    /// Artifact path
    pub path: PathBuf,
    /// File name shown in the release body
    pub basename: String,
    /// Lowercase hex SHA-256 digest
    pub sha256: String,
}

/// Hash a file's full contents with SHA-256 (blocking).
pub fn sha256_file(path: &Path) -> Result<String> {
    let read_error = |source| ArtifactError::FileRead {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(read_error)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).map_err(read_error)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Hash every artifact concurrently on the blocking pool.
///
/// Results come back in the order of `paths`. Any unreadable file fails the
/// whole call.
pub async fn checksum(paths: &[PathBuf]) -> Result<Vec<Checksum>> {
    let tasks: Vec<_> = paths
        .iter()
        .cloned()
        .map(|path| {
            let task_path = path.clone();
            (path, tokio::task::spawn_blocking(move || sha256_file(&task_path)))
        })
        .collect();

    let mut checksums = Vec::with_capacity(tasks.len());
    for (path, task) in tasks {
        let sha256 = task.await.map_err(|e| ArtifactError::HashTask {
            path: path.clone(),
            reason: e.to_string(),
        })??;

        let basename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| ArtifactError::NoFileName { path: path.clone() })?;

        log::debug!("sha256 {}  {}", sha256, basename);
        checksums.push(Checksum {
            path,
            basename,
            sha256,
        });
    }

    Ok(checksums)
}

/// Render checksums as a markdown section; empty input renders nothing.
pub fn render_checksums(checksums: &[Checksum]) -> String {
    if checksums.is_empty() {
        return String::new();
    }

    let lines: Vec<String> = checksums
        .iter()
        .map(|c| format!("{}  {}", c.sha256, c.basename))
        .collect();

    format!("## Checksums\n\n```sha256\n{}\n```", lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const SHA256_X: &str = "2d711642b726b04401627ca9fbac32f5c8530fb1903cc4db02258717921a4881";

    #[tokio::test]
    async fn identical_content_identical_digest() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, "x").unwrap();
        fs::write(&b, "x").unwrap();

        let sums = checksum(&[a, b]).await.unwrap();
        assert_eq!(sums[0].sha256, SHA256_X);
        assert_eq!(sums[1].sha256, SHA256_X);
        assert_eq!(
            render_checksums(&sums),
            format!("## Checksums\n\n```sha256\n{SHA256_X}  a.txt\n{SHA256_X}  b.txt\n```")
        );
    }

    #[tokio::test]
    async fn digest_is_stable_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.tar.gz");
        fs::write(&path, vec![7u8; 64 * 1024 + 3]).unwrap();

        let first = sha256_file(&path).unwrap();
        let second = checksum(&[path]).await.unwrap();
        assert_eq!(first, second[0].sha256);
        assert_eq!(first.len(), 64);
    }

    #[tokio::test]
    async fn missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = checksum(&[dir.path().join("gone.bin")]).await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::ReleaseError::Artifact(ArtifactError::FileRead { .. })
        ));
    }

    #[test]
    fn no_artifacts_no_section() {
        assert_eq!(render_checksums(&[]), "");
    }
}
