mod rest;
mod snapshot;

pub use rest::RestSource;
pub use snapshot::{Snapshot, SnapshotSource};

use serde_json::Value;

use crate::error::Result;
use crate::metrics::IssueKeyScope;
use crate::records::{
    Board, CardOptions, Commit, Issue, IssueTimeSummary, IssueTypeCount, Project, PullRequest,
    WorkflowCategory,
};

/// Data layer feeding the dashboard cards.
///
/// Implementations only fetch and scope records; all aggregation happens in
/// [`crate::dashboard::Dashboard`].
#[allow(async_fn_in_trait)]
pub trait DataSource {
    async fn project(&self, opts: &CardOptions) -> Result<Option<Project>>;

    async fn board(&self, opts: &CardOptions) -> Result<Option<Board>>;

    async fn workflows(&self, opts: &CardOptions) -> Result<Vec<WorkflowCategory>>;

    /// Issues for the development progress card, with their upstream stage
    /// transitions populated.
    async fn development_issues(
        &self,
        opts: &CardOptions,
        in_progress_stages: &[String],
    ) -> Result<Vec<Issue>>;

    async fn commits(
        &self,
        opts: &CardOptions,
        scope: &IssueKeyScope,
        git_org_name: &str,
    ) -> Result<Vec<Commit>>;

    async fn pull_requests(
        &self,
        opts: &CardOptions,
        scope: &IssueKeyScope,
        git_org_name: &str,
    ) -> Result<Vec<PullRequest>>;

    async fn issues(&self, opts: &CardOptions) -> Result<Vec<Issue>>;

    async fn issue_time_summary(&self, opts: &CardOptions) -> Result<IssueTimeSummary>;

    async fn issue_type_counts(&self, opts: &CardOptions) -> Result<Vec<IssueTypeCount>>;

    /// Project information card, in whatever shape the dashboard stores it.
    async fn project_info(&self, opts: &CardOptions) -> Result<Value>;

    async fn issue_heat_map(&self, opts: &CardOptions) -> Result<Value>;

    async fn sprint_activity(&self, opts: &CardOptions) -> Result<Value>;
}
