//! Markdown changelog rendering

use super::conventional::ParsedCommit;
use crate::RepoSlug;

/// Changelog sections, in rendering order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChangelogSection {
    /// Commits flagged as breaking, whatever their type
    BreakingChanges,
    /// `feat`
    Features,
    /// `fix`
    BugFixes,
    /// `docs`
    Documentation,
    /// `style`
    Styles,
    /// `refactor`
    CodeRefactoring,
    /// `perf`
    PerformanceImprovements,
    /// `test`
    Tests,
    /// `build`
    Builds,
    /// `ci`
    ContinuousIntegration,
    /// `chore`
    Chores,
    /// `revert`
    Reverts,
    /// Unknown or missing type
    Miscellaneous,
}

impl ChangelogSection {
    /// Every section in rendering order
    pub const ALL: [ChangelogSection; 13] = [
        Self::BreakingChanges,
        Self::Features,
        Self::BugFixes,
        Self::Documentation,
        Self::Styles,
        Self::CodeRefactoring,
        Self::PerformanceImprovements,
        Self::Tests,
        Self::Builds,
        Self::ContinuousIntegration,
        Self::Chores,
        Self::Reverts,
        Self::Miscellaneous,
    ];

    /// Section heading text
    pub fn title(self) -> &'static str {
        match self {
            Self::BreakingChanges => "Breaking Changes",
            Self::Features => "Features",
            Self::BugFixes => "Bug Fixes",
            Self::Documentation => "Documentation",
            Self::Styles => "Styles",
            Self::CodeRefactoring => "Code Refactoring",
            Self::PerformanceImprovements => "Performance Improvements",
            Self::Tests => "Tests",
            Self::Builds => "Builds",
            Self::ContinuousIntegration => "Continuous Integration",
            Self::Chores => "Chores",
            Self::Reverts => "Reverts",
            Self::Miscellaneous => "Miscellaneous",
        }
    }

    /// Section for a conventional commit type
    pub fn for_type(commit_type: Option<&str>) -> Self {
        match commit_type {
            Some("feat") => Self::Features,
            Some("fix") => Self::BugFixes,
            Some("docs") => Self::Documentation,
            Some("style") => Self::Styles,
            Some("refactor") => Self::CodeRefactoring,
            Some("perf") => Self::PerformanceImprovements,
            Some("test") => Self::Tests,
            Some("build") => Self::Builds,
            Some("ci") => Self::ContinuousIntegration,
            Some("chore") => Self::Chores,
            Some("revert") => Self::Reverts,
            _ => Self::Miscellaneous,
        }
    }

    /// Section a commit belongs to
    pub fn of(commit: &ParsedCommit) -> Self {
        if commit.breaking {
            Self::BreakingChanges
        } else {
            Self::for_type(commit.commit_type.as_deref())
        }
    }
}

/// Render one changelog line for a commit
pub fn format_entry(commit: &ParsedCommit) -> String {
    let mut entry = String::from("- ");

    if let Some(scope) = &commit.scope {
        entry.push_str(&format!("**{}**: ", scope));
    }
    entry.push_str(&commit.subject);

    match &commit.html_url {
        Some(url) => entry.push_str(&format!(" ([{}]({}))", commit.short_sha(), url)),
        None => entry.push_str(&format!(" ({})", commit.short_sha())),
    }

    if !commit.pull_requests.is_empty() {
        let links: Vec<String> = commit
            .pull_requests
            .iter()
            .map(|pr| format!("[#{}]({})", pr.number, pr.url))
            .collect();
        entry.push(' ');
        entry.push_str(&links.join(", "));
    }

    entry
}

/// Render classified commits as grouped markdown.
///
/// Empty sections are omitted and commits keep their input order within a
/// section. No commits renders as an empty string.
pub fn render(commits: &[ParsedCommit]) -> String {
    let blocks: Vec<String> = ChangelogSection::ALL
        .iter()
        .filter_map(|&section| {
            let lines: Vec<String> = commits
                .iter()
                .filter(|c| ChangelogSection::of(c) == section)
                .map(format_entry)
                .collect();

            (!lines.is_empty()).then(|| format!("## {}\n{}", section.title(), lines.join("\n")))
        })
        .collect();

    blocks.join("\n\n")
}

/// "Full Changelog" link for the release body.
///
/// Without a distinct previous tag the link points at the tag's history
/// instead of a comparison range.
pub fn full_changelog_link(server_url: &str, repo: &RepoSlug, previous_tag: Option<&str>, tag: &str) -> String {
    let base = format!("{}/{}/{}", server_url.trim_end_matches('/'), repo.owner, repo.repo);
    match previous_tag.filter(|prev| !prev.is_empty() && *prev != tag) {
        Some(prev) => format!("**Full Changelog**: {}/compare/{}...{}", base, prev, tag),
        None => format!("**Full Changelog**: {}/commits/{}", base, tag),
    }
}
