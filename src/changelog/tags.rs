//! Previous release tag resolution by semantic-version ordering.

use crate::error::{Result, VersionError};
use semver::Version;

/// Parse a tag as a semantic version, tolerating one leading `v`, `V` or `=`.
pub fn parse_tag_version(tag: &str) -> std::result::Result<Version, semver::Error> {
    let trimmed = tag.trim();
    let bare = trimmed.strip_prefix(['v', 'V', '=']).unwrap_or(trimmed);
    Version::parse(bare)
}

/// Find the nearest tag in `all_tags` whose version is strictly lower than `candidate`.
///
/// Tags that are not semantic versions are ignored. Returns `Ok(None)` for a
/// first release.
pub fn resolve_previous_tag<S: AsRef<str>>(candidate: &str, all_tags: &[S]) -> Result<Option<String>> {
    let current = parse_tag_version(candidate).map_err(|source| VersionError::InvalidVersion {
        tag: candidate.to_string(),
        source,
    })?;

    let mut versioned: Vec<(Version, &str)> = all_tags
        .iter()
        .map(|tag| tag.as_ref())
        .filter_map(|tag| match parse_tag_version(tag) {
            Ok(version) => Some((version, tag)),
            Err(e) => {
                log::trace!("Ignoring non-semver tag '{}': {}", tag, e);
                None
            }
        })
        .collect();

    // Descending; tag text breaks ties so the scan is deterministic.
    versioned.sort_by(|(a, a_tag), (b, b_tag)| b.cmp(a).then_with(|| a_tag.cmp(b_tag)));

    let previous = versioned
        .into_iter()
        .find(|(version, _)| cmp_precedence(version, &current).is_lt())
        .map(|(_, tag)| tag.to_string());

    match &previous {
        Some(tag) => log::info!("Previous release tag for '{}' is '{}'", candidate, tag),
        None => log::info!("No release tag precedes '{}'; treating as first release", candidate),
    }

    Ok(previous)
}

/// Semantic-version precedence: build metadata does not take part.
fn cmp_precedence(a: &Version, b: &Version) -> std::cmp::Ordering {
    (a.major, a.minor, a.patch, &a.pre).cmp(&(b.major, b.minor, b.patch, &b.pre))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_nearest_lower_tag() {
        let tags = ["v1.0.0", "v1.0.1", "v1.1.0"];
        assert_eq!(
            resolve_previous_tag("v1.1.0", &tags).unwrap(),
            Some("v1.0.1".to_string())
        );
    }

    #[test]
    fn order_of_listing_does_not_matter() {
        let tags = ["v0.9.0", "v2.0.0", "v1.2.0", "v1.10.0", "v1.9.3"];
        assert_eq!(
            resolve_previous_tag("v1.10.0", &tags).unwrap(),
            Some("v1.9.3".to_string())
        );
    }

    #[test]
    fn non_semver_tags_are_excluded() {
        let tags = ["latest", "v1.0", "1.0.0.1", "nightly-1.4.0", "v0.1.0"];
        assert_eq!(
            resolve_previous_tag("v1.0.0", &tags).unwrap(),
            Some("v0.1.0".to_string())
        );
    }

    #[test]
    fn only_one_prefix_character_is_stripped() {
        assert!(parse_tag_version("v1.2.3").is_ok());
        assert!(parse_tag_version("V1.2.3").is_ok());
        assert!(parse_tag_version("=1.2.3").is_ok());
        for tag in ["vv1.2.3", "vV1.0.0", "=v1.2.3", "v=1.2.3"] {
            assert!(parse_tag_version(tag).is_err(), "{tag} should not parse");
        }

        let tags = ["vv1.5.0", "v1.1.0"];
        assert_eq!(
            resolve_previous_tag("v2.0.0", &tags).unwrap(),
            Some("v1.1.0".to_string())
        );
    }

    #[test]
    fn first_release_has_no_previous_tag() {
        let tags = ["v2.0.0", "latest"];
        assert_eq!(resolve_previous_tag("v1.0.0", &tags).unwrap(), None);
        assert_eq!(resolve_previous_tag::<&str>("v1.0.0", &[]).unwrap(), None);
    }

    #[test]
    fn equal_version_is_not_previous() {
        let tags = ["v1.0.0", "1.0.0", "v0.5.0"];
        assert_eq!(
            resolve_previous_tag("v1.0.0", &tags).unwrap(),
            Some("v0.5.0".to_string())
        );
    }

    #[test]
    fn prerelease_orders_below_release() {
        let tags = ["v1.0.0-rc.1", "v1.0.0-beta.2", "v0.9.0"];
        assert_eq!(
            resolve_previous_tag("v1.0.0", &tags).unwrap(),
            Some("v1.0.0-rc.1".to_string())
        );
        assert_eq!(
            resolve_previous_tag("v1.0.0-rc.1", &tags).unwrap(),
            Some("v1.0.0-beta.2".to_string())
        );
    }

    #[test]
    fn build_metadata_does_not_count_as_newer() {
        let tags = ["v1.0.0+build.7", "v0.9.0"];
        assert_eq!(
            resolve_previous_tag("v1.0.0", &tags).unwrap(),
            Some("v0.9.0".to_string())
        );
    }

    #[test]
    fn invalid_candidate_is_rejected() {
        let err = resolve_previous_tag("latest", &["v1.0.0"]).unwrap_err();
        assert!(matches!(
            err,
            crate::error::ReleaseError::Version(VersionError::InvalidVersion { .. })
        ));
    }

    #[test]
    fn lenient_prefixes() {
        assert_eq!(parse_tag_version(" v1.2.3 ").unwrap(), Version::new(1, 2, 3));
        assert_eq!(parse_tag_version("=1.2.3").unwrap(), Version::new(1, 2, 3));
        assert_eq!(parse_tag_version("V1.2.3").unwrap(), Version::new(1, 2, 3));
        assert!(parse_tag_version("release-1.2.3").is_err());
    }
}
