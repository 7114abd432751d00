use log::info;

use super::matcher::{matching_closed_pulls, reference_commit};
use super::time::hours_between;
use crate::records::{Commit, Issue, PullRequest, StageTiming, COMMITS_STAGE, PULL_REQUEST_STAGE};

/// Records the "commits" stage on every issue.
///
/// The stage time is the hours from issue creation to the reference commit
/// (see [`reference_commit`]); idle time is always zero. The reference date is
/// kept in `commit_date` for the pull request stage. Issues with no matching
/// commit get a zero timing and no `commit_date`.
pub fn calculate_time_for_commits(issues: Vec<Issue>, commits: &[Commit]) -> Vec<Issue> {
    info!("Calculating commit time for {} issues", issues.len());

    issues
        .into_iter()
        .map(|mut issue| {
            issue.commit_date = reference_commit(&issue.key, commits).map(|c| c.date);
            let time = issue
                .commit_date
                .map_or(0.0, |commit_date| hours_between(commit_date, issue.date));
            issue.with_transition(StageTiming::new(COMMITS_STAGE, time, 0.0))
        })
        .collect()
}

/// Records the "pull request" stage on every issue.
///
/// Only closed pull requests count. The stage time is the sum of each pull
/// request's open duration; idle time is the gap between the issue's
/// `commit_date` and the earliest pull request being opened. Must run after
/// [`calculate_time_for_commits`].
pub fn calculate_time_for_pulls(issues: Vec<Issue>, pulls: &[PullRequest]) -> Vec<Issue> {
    info!("Calculating pull request time for {} issues", issues.len());

    issues
        .into_iter()
        .map(|issue| {
            let timing = pull_request_timing(&issue, pulls);
            issue.with_transition(timing)
        })
        .collect()
}

fn pull_request_timing(issue: &Issue, pulls: &[PullRequest]) -> StageTiming {
    let matched = matching_closed_pulls(&issue.key, pulls);
    let Some(first) = matched.first() else {
        return StageTiming::new(PULL_REQUEST_STAGE, 0.0, 0.0);
    };

    let idle_time = issue
        .commit_date
        .map_or(0.0, |commit_date| hours_between(first.created_at, commit_date));

    let time = matched
        .iter()
        .filter_map(|p| p.closed_at.map(|closed| hours_between(closed, p.created_at)))
        .sum();

    StageTiming::new(PULL_REQUEST_STAGE, time, idle_time)
}
