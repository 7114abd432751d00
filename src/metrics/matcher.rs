use crate::records::{Commit, Issue, PullRequest};

/// Set of issue keys used to scope commit and pull request retrieval.
///
/// A title is in scope when it contains any of the keys as a plain,
/// case-sensitive substring. Keys are never interpreted as patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueKeyScope {
    keys: Vec<String>,
}

impl IssueKeyScope {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_issues(issues: &[Issue]) -> Self {
        Self::new(issues.iter().map(|issue| issue.key.as_str()))
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn matches(&self, title: &str) -> bool {
        self.keys.iter().any(|key| title.contains(key.as_str()))
    }
}

/// Commits referencing `key`, newest first.
///
/// Keys overlapping textually (e.g. "PROJ-1" and "PROJ-12") both match the
/// same commit.
pub fn matching_commits<'a>(key: &str, commits: &'a [Commit]) -> Vec<&'a Commit> {
    let mut matched: Vec<_> = commits.iter().filter(|c| c.title.contains(key)).collect();
    matched.sort_by(|a, b| b.date.cmp(&a.date));
    matched
}

/// Commit whose date becomes the issue's commit reference point.
///
/// This is the tail of the newest-first list, i.e. the oldest matching
/// commit. Dashboards already report against this reference.
pub fn reference_commit<'a>(key: &str, commits: &'a [Commit]) -> Option<&'a Commit> {
    matching_commits(key, commits).last().copied()
}

/// Closed pull requests referencing `key`, earliest created first.
pub fn matching_closed_pulls<'a>(key: &str, pulls: &'a [PullRequest]) -> Vec<&'a PullRequest> {
    let mut matched: Vec<_> = pulls
        .iter()
        .filter(|p| p.title.contains(key) && p.closed_at.is_some())
        .collect();
    matched.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    matched
}
