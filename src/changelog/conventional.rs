//! Conventional Commits classification
//!
//! Parses commit messages following <https://www.conventionalcommits.org/> into
//! immutable [`ParsedCommit`] values.

use crate::github::{CommitRecord, PullRef};
use regex::Regex;
use std::sync::LazyLock;

/// Length of the abbreviated commit hash shown in the changelog
pub const SHORT_SHA_LEN: usize = 7;

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<type>\w+)(?:\((?P<scope>[^()\r\n]*)\))?(?P<breaking>!)?: (?P<subject>.+)$")
        .expect("header regex is valid")
});

static MERGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Merge (?:pull request #\d+ from \S+|branch '[^']+'|remote-tracking branch '[^']+')")
        .expect("merge regex is valid")
});

static TRAILER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:BREAKING CHANGE|[A-Za-z][\w-]*)(?:: | #)").expect("trailer regex is valid")
});

static BREAKING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^BREAKING[ -]CHANGE:\s").expect("breaking regex is valid")
});

/// A commit message split into its conventional parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConventionalMessage {
    /// First line of the message
    pub header: String,
    /// Conventional type (`feat`, `fix`, ...), lowercased; `None` for free-form headers
    pub commit_type: Option<String>,
    /// Scope inside the parentheses
    pub scope: Option<String>,
    /// Description after `: `, or the whole header when unparsed
    pub subject: String,
    /// `!` before the colon
    pub bang: bool,
    /// Paragraphs between header and footer
    pub body: Option<String>,
    /// Trailing paragraph of `Token: value` lines
    pub footer: Option<String>,
    /// Merge description when the header has a merge shape
    pub merge: Option<String>,
}

impl ConventionalMessage {
    /// Parse a full commit message
    pub fn parse(message: &str) -> Self {
        let message = message.replace("\r\n", "\n");
        let mut parts = message.trim().splitn(2, '\n');
        let header = parts.next().unwrap_or_default().trim().to_string();
        let rest = parts.next().unwrap_or_default().trim();

        let (body, footer) = split_footer(rest);
        let merge = MERGE_RE.find(&header).map(|m| m.as_str().to_string());

        match HEADER_RE.captures(&header) {
            Some(caps) => Self {
                commit_type: Some(caps["type"].to_lowercase()),
                scope: caps
                    .name("scope")
                    .map(|m| m.as_str().trim().to_string())
                    .filter(|s| !s.is_empty()),
                subject: caps["subject"].trim().to_string(),
                bang: caps.name("breaking").is_some(),
                header,
                body,
                footer,
                merge,
            },
            None => Self {
                commit_type: None,
                scope: None,
                subject: header.clone(),
                bang: false,
                header,
                body,
                footer,
                merge,
            },
        }
    }
}

/// Split the text after the header into body and footer paragraphs.
fn split_footer(rest: &str) -> (Option<String>, Option<String>) {
    if rest.is_empty() {
        return (None, None);
    }

    let paragraphs: Vec<&str> = rest.split("\n\n").map(str::trim).filter(|p| !p.is_empty()).collect();
    let Some((last, leading)) = paragraphs.split_last() else {
        return (None, None);
    };

    // Continuation lines of a multi-line trailer start with whitespace.
    let is_footer = last
        .lines()
        .next()
        .is_some_and(|first| TRAILER_RE.is_match(first))
        && last
            .lines()
            .all(|line| TRAILER_RE.is_match(line) || line.starts_with([' ', '\t']));

    if is_footer {
        let body = (!leading.is_empty()).then(|| leading.join("\n\n"));
        (body, Some(last.to_string()))
    } else {
        (Some(paragraphs.join("\n\n")), None)
    }
}

/// Whether the body or footer carries a `BREAKING CHANGE:` / `BREAKING-CHANGE:` marker.
///
/// Matching is case-sensitive and anchored to the start of a line.
pub fn is_breaking(body: Option<&str>, footer: Option<&str>) -> bool {
    [body, footer]
        .into_iter()
        .flatten()
        .any(|text| BREAKING_RE.is_match(text))
}

/// Whether a commit message has a merge-commit header
pub fn is_merge_commit(message: &str) -> bool {
    let header = message.trim_start().lines().next().unwrap_or_default();
    MERGE_RE.is_match(header.trim())
}

/// A commit enriched with its classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommit {
    /// Full commit sha
    pub sha: String,
    /// Commit web URL
    pub html_url: Option<String>,
    /// First line of the message
    pub header: String,
    /// Conventional type, if any
    pub commit_type: Option<String>,
    /// Scope, if any
    pub scope: Option<String>,
    /// Subject line text
    pub subject: String,
    /// Body text
    pub body: Option<String>,
    /// Footer text
    pub footer: Option<String>,
    /// Breaking change flag
    pub breaking: bool,
    /// Associated pull requests
    pub pull_requests: Vec<PullRef>,
}

impl ParsedCommit {
    /// Abbreviated commit hash
    pub fn short_sha(&self) -> &str {
        let end = self
            .sha
            .char_indices()
            .nth(SHORT_SHA_LEN)
            .map_or(self.sha.len(), |(i, _)| i);
        &self.sha[..end]
    }
}

/// Classify a commit together with its associated pull requests.
///
/// Returns `None` for merge commits, which never appear in the changelog.
pub fn classify(commit: &CommitRecord, pull_requests: Vec<PullRef>) -> Option<ParsedCommit> {
    let message = ConventionalMessage::parse(&commit.message);

    if let Some(merge) = &message.merge {
        log::debug!("Ignoring merge commit {}: {}", commit.sha, merge);
        return None;
    }

    let breaking = message.bang || is_breaking(message.body.as_deref(), message.footer.as_deref());

    Some(ParsedCommit {
        sha: commit.sha.clone(),
        html_url: commit.html_url.clone(),
        header: message.header,
        commit_type: message.commit_type,
        scope: message.scope,
        subject: message.subject,
        body: message.body,
        footer: message.footer,
        breaking,
        pull_requests,
    })
}
