use chrono::{DateTime, Utc};
use log::{error, info, warn};
use serde_json::Value;

use crate::error::{CycleLensError, Result};
use crate::insights::{ClosedTimeCard, StageAverage, StatusDetail, ThroughputCard};
use crate::metrics::{
    calculate_average_closed_time, calculate_avg_time_for_transitions, calculate_status_breakdown,
    calculate_throughput, calculate_time_for_commits, calculate_time_for_pulls,
    collect_in_progress_stages, resolve_transition_order, IssueKeyScope,
};
use crate::records::{
    CardOptions, Issue, IssueTimeSummary, IssueTypeCount, StatusCategory, COMMITS_STAGE,
};
use crate::sources::DataSource;

/// Computes dashboard card data on top of a [`DataSource`].
///
/// Failures are logged with the card operation that raised them and returned
/// unchanged; a card never returns partial results.
pub struct Dashboard<S> {
    source: S,
    categories: Vec<StatusCategory>,
}

impl<S: DataSource> Dashboard<S> {
    /// # Arguments
    ///
    /// * `source` - Data layer serving projects, boards, issues and activity
    /// * `categories` - Status categories, in the order workflows are resolved
    pub fn new(source: S, categories: Vec<StatusCategory>) -> Self {
        Self { source, categories }
    }

    /// Average time and idle time per board stage across the scoped issues.
    ///
    /// Stages come from the board's explicit transition order or, failing
    /// that, its flattened column configuration. When the order includes the
    /// "commits" stage, commits and pull requests referencing the issues are
    /// fetched and their timings computed before averaging.
    ///
    /// Returns an empty list when the project, board, workflows or issues
    /// are missing.
    ///
    /// # Errors
    ///
    /// Returns any data source error unchanged.
    pub async fn get_development_progress(&self, opts: &CardOptions) -> Result<Vec<StageAverage>> {
        self.development_progress(opts)
            .await
            .inspect_err(|e| error!("Error in get_development_progress: {e}"))
    }

    async fn development_progress(&self, opts: &CardOptions) -> Result<Vec<StageAverage>> {
        info!("Getting development progress for project: {}", opts.project);

        let Some(project) = self.source.project(opts).await? else {
            warn!("No project found: {}", opts.project);
            return Ok(vec![]);
        };

        let Some(board) = self.source.board(opts).await? else {
            warn!("No board found for project: {}", opts.project);
            return Ok(vec![]);
        };
        let trans_order = resolve_transition_order(&board);

        let workflows = self.source.workflows(opts).await?;
        if workflows.is_empty() {
            warn!("No workflows found for project: {}", opts.project);
            return Ok(vec![]);
        }
        let in_progress_stages = collect_in_progress_stages(&workflows, &self.categories);

        let mut issues = self
            .source
            .development_issues(opts, &in_progress_stages)
            .await?;
        if issues.is_empty() {
            warn!("No issues found for project: {}", opts.project);
            return Ok(vec![]);
        }

        if trans_order.iter().any(|stage| stage == COMMITS_STAGE) {
            let scope = IssueKeyScope::from_issues(&issues);

            info!(
                "Fetching commits and pull requests for {} issues in {}",
                scope.keys().len(),
                project.git_org_name
            );

            let (commits, pulls) = futures::try_join!(
                self.source.commits(opts, &scope, &project.git_org_name),
                self.source.pull_requests(opts, &scope, &project.git_org_name),
            )?;

            issues = calculate_time_for_commits(issues, &commits);
            issues = calculate_time_for_pulls(issues, &pulls);
        }

        Ok(calculate_avg_time_for_transitions(&trans_order, &issues))
    }

    /// Pre-aggregated issue timing summary, served as-is by the data source.
    ///
    /// # Errors
    ///
    /// Returns any data source error unchanged.
    pub async fn get_avg_issue_time(&self, opts: &CardOptions) -> Result<IssueTimeSummary> {
        info!("Getting average issue time for project: {}", opts.project);
        self.source
            .issue_time_summary(opts)
            .await
            .inspect_err(|e| error!("Error in get_avg_issue_time: {e}"))
    }

    /// Development issues with their upstream stage timings, without any
    /// in-progress stage filter or commit and pull request stages.
    ///
    /// # Errors
    ///
    /// Returns any data source error unchanged.
    pub async fn get_avg_time(&self, opts: &CardOptions) -> Result<Vec<Issue>> {
        info!("Getting development issue times for project: {}", opts.project);
        self.source
            .development_issues(opts, &[])
            .await
            .inspect_err(|e| error!("Error in get_avg_time: {e}"))
    }

    /// # Errors
    ///
    /// Returns any data source error unchanged.
    pub async fn get_project(&self, opts: &CardOptions) -> Result<Value> {
        info!("Getting project info for project: {}", opts.project);
        self.source
            .project_info(opts)
            .await
            .inspect_err(|e| error!("Error in get_project: {e}"))
    }

    /// # Errors
    ///
    /// Returns any data source error unchanged.
    pub async fn get_issue_heat_map(&self, opts: &CardOptions) -> Result<Value> {
        info!("Getting issue heat map for project: {}", opts.project);
        self.source
            .issue_heat_map(opts)
            .await
            .inspect_err(|e| error!("Error in get_issue_heat_map: {e}"))
    }

    /// # Errors
    ///
    /// Returns any data source error unchanged.
    pub async fn get_sprint_activity(&self, opts: &CardOptions) -> Result<Value> {
        info!("Getting sprint activity for project: {}", opts.project);
        self.source
            .sprint_activity(opts)
            .await
            .inspect_err(|e| error!("Error in get_sprint_activity: {e}"))
    }

    /// # Errors
    ///
    /// Returns any data source error unchanged.
    pub async fn get_issue_types_count(&self, opts: &CardOptions) -> Result<Vec<IssueTypeCount>> {
        info!("Getting issue type counts for project: {}", opts.project);
        self.source
            .issue_type_counts(opts)
            .await
            .inspect_err(|e| error!("Error in get_issue_types_count: {e}"))
    }

    /// Issues closed per day in the `since`..`until` range, with per-period counts.
    ///
    /// # Errors
    ///
    /// Returns an error if either bound is missing or the data source fails.
    pub async fn get_throughput(&self, opts: &CardOptions) -> Result<ThroughputCard> {
        self.throughput(opts)
            .await
            .inspect_err(|e| error!("Error in get_throughput: {e}"))
    }

    async fn throughput(&self, opts: &CardOptions) -> Result<ThroughputCard> {
        info!("Getting throughput for project: {}", opts.project);
        let (since, until) = required_range(opts)?;
        let issues = self.source.issues(opts).await?;
        Ok(calculate_throughput(&issues, since, until))
    }

    /// Mean hours from creation to close for issues closed in range, per period.
    ///
    /// # Errors
    ///
    /// Returns an error if either bound is missing or the data source fails.
    pub async fn get_average_closed_time(&self, opts: &CardOptions) -> Result<ClosedTimeCard> {
        self.average_closed_time(opts)
            .await
            .inspect_err(|e| error!("Error in get_average_closed_time: {e}"))
    }

    async fn average_closed_time(&self, opts: &CardOptions) -> Result<ClosedTimeCard> {
        info!("Getting average closed time for project: {}", opts.project);
        let (since, until) = required_range(opts)?;
        let issues = self.source.issues(opts).await?;
        Ok(calculate_average_closed_time(&issues, since, until))
    }

    /// Issue distribution over current statuses.
    ///
    /// # Errors
    ///
    /// Returns any data source error unchanged.
    pub async fn get_transition_details(&self, opts: &CardOptions) -> Result<Vec<StatusDetail>> {
        info!("Getting transition details for project: {}", opts.project);
        let issues = self
            .source
            .issues(opts)
            .await
            .inspect_err(|e| error!("Error in get_transition_details: {e}"))?;

        let scoped: Vec<_> = issues
            .into_iter()
            .filter(|issue| opts.contains(issue.date))
            .collect();
        Ok(calculate_status_breakdown(&scoped))
    }
}

fn required_range(opts: &CardOptions) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let since = opts.since.ok_or(CycleLensError::MissingOption("since"))?;
    let until = opts.until.ok_or(CycleLensError::MissingOption("until"))?;
    Ok((since, until))
}
