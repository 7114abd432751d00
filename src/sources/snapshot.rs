use std::path::Path;

use indexmap::IndexMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::DataSource;
use crate::error::{CycleLensError, Result};
use crate::metrics::IssueKeyScope;
use crate::records::{
    Board, CardOptions, Commit, Issue, IssueTimeSummary, IssueTypeCount, Project, PullRequest,
    WorkflowCategory,
};

/// Exported dashboard data, keyed by project identifier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub projects: IndexMap<String, ProjectSnapshot>,
}

/// Everything exported for a single project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub git_org_name: String,
    /// Boards keyed by board identifier
    #[serde(default)]
    pub boards: IndexMap<String, Board>,
    #[serde(default)]
    pub workflows: Vec<WorkflowCategory>,
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(default)]
    pub commits: Vec<Commit>,
    #[serde(default)]
    pub pull_requests: Vec<PullRequest>,
    #[serde(default)]
    pub issue_time_summary: Option<IssueTimeSummary>,
    #[serde(default)]
    pub issue_type_counts: Option<Vec<IssueTypeCount>>,
    /// Card payloads exported verbatim from the dashboard
    #[serde(default)]
    pub project_info: Option<Value>,
    #[serde(default)]
    pub issue_heat_map: Option<Value>,
    #[serde(default)]
    pub sprint_activity: Option<Value>,
}

impl Snapshot {
    /// Reads a snapshot file; the format follows the extension (`json`,
    /// `yaml`/`yml` or `toml`).
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;

        let snapshot = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => serde_yaml::from_str(&contents)?,
            Some("toml") => toml::from_str(&contents)?,
            _ => serde_json::from_str(&contents)?,
        };

        debug!("Loaded snapshot from: {}", path.display());
        Ok(snapshot)
    }
}

/// Serves dashboard records from an in-memory [`Snapshot`].
pub struct SnapshotSource {
    snapshot: Snapshot,
}

impl SnapshotSource {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let snapshot = Snapshot::load(path)?;
        info!(
            "Snapshot source ready with {} projects",
            snapshot.projects.len()
        );
        Ok(Self::new(snapshot))
    }

    fn project_data(&self, opts: &CardOptions) -> Option<&ProjectSnapshot> {
        self.snapshot.projects.get(&opts.project)
    }

    fn project_data_or_err(&self, opts: &CardOptions) -> Result<&ProjectSnapshot> {
        self.project_data(opts)
            .ok_or_else(|| CycleLensError::Source(format!("Unknown project: {}", opts.project)))
    }

    fn issues_in_range(&self, opts: &CardOptions) -> Vec<Issue> {
        self.project_data(opts)
            .map(|data| {
                data.issues
                    .iter()
                    .filter(|issue| in_scope(opts, issue))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn exported_card(
        &self,
        opts: &CardOptions,
        card: &str,
        select: fn(&ProjectSnapshot) -> Option<&Value>,
    ) -> Result<Value> {
        let data = self.project_data_or_err(opts)?;
        Ok(select(data).cloned().unwrap_or_else(|| {
            debug!("No {card} exported for project: {}", opts.project);
            Value::Null
        }))
    }
}

/// Creation date within `since`/`until` and planned in the selected sprint.
fn in_scope(opts: &CardOptions, issue: &Issue) -> bool {
    opts.contains(issue.date) && opts.in_sprint(issue.sprint.as_deref())
}

fn in_org(record_org: Option<&str>, git_org_name: &str) -> bool {
    record_org.map_or(true, |org| org == git_org_name)
}

impl DataSource for SnapshotSource {
    async fn project(&self, opts: &CardOptions) -> Result<Option<Project>> {
        Ok(self.project_data(opts).map(|data| Project {
            git_org_name: data.git_org_name.clone(),
        }))
    }

    async fn board(&self, opts: &CardOptions) -> Result<Option<Board>> {
        let Some(data) = self.project_data(opts) else {
            return Ok(None);
        };

        let board = match &opts.board {
            Some(id) => data.boards.get(id),
            None => data.boards.values().next(),
        };
        Ok(board.cloned())
    }

    async fn workflows(&self, opts: &CardOptions) -> Result<Vec<WorkflowCategory>> {
        Ok(self
            .project_data(opts)
            .map(|data| data.workflows.clone())
            .unwrap_or_default())
    }

    async fn development_issues(
        &self,
        opts: &CardOptions,
        in_progress_stages: &[String],
    ) -> Result<Vec<Issue>> {
        debug!(
            "Snapshot issues are exported with transitions; ignoring {} in-progress stages",
            in_progress_stages.len()
        );
        Ok(self.issues_in_range(opts))
    }

    async fn commits(
        &self,
        opts: &CardOptions,
        scope: &IssueKeyScope,
        git_org_name: &str,
    ) -> Result<Vec<Commit>> {
        let data = self.project_data_or_err(opts)?;
        Ok(data
            .commits
            .iter()
            .filter(|c| scope.matches(&c.title))
            .filter(|c| in_org(c.org.as_deref(), git_org_name))
            .filter(|c| opts.contains(c.date))
            .cloned()
            .collect())
    }

    async fn pull_requests(
        &self,
        opts: &CardOptions,
        scope: &IssueKeyScope,
        git_org_name: &str,
    ) -> Result<Vec<PullRequest>> {
        let data = self.project_data_or_err(opts)?;
        Ok(data
            .pull_requests
            .iter()
            .filter(|p| scope.matches(&p.title))
            .filter(|p| in_org(p.org.as_deref(), git_org_name))
            .filter(|p| opts.contains(p.created_at))
            .cloned()
            .collect())
    }

    async fn issues(&self, opts: &CardOptions) -> Result<Vec<Issue>> {
        let data = self.project_data_or_err(opts)?;
        Ok(data
            .issues
            .iter()
            .filter(|issue| opts.in_sprint(issue.sprint.as_deref()))
            .cloned()
            .collect())
    }

    async fn issue_time_summary(&self, opts: &CardOptions) -> Result<IssueTimeSummary> {
        let data = self.project_data_or_err(opts)?;
        Ok(data.issue_time_summary.clone().unwrap_or_default())
    }

    async fn issue_type_counts(&self, opts: &CardOptions) -> Result<Vec<IssueTypeCount>> {
        let data = self.project_data_or_err(opts)?;
        if let Some(counts) = &data.issue_type_counts {
            return Ok(counts.clone());
        }

        let mut counts: IndexMap<&str, usize> = IndexMap::new();
        for issue_type in data
            .issues
            .iter()
            .filter(|issue| in_scope(opts, issue))
            .filter_map(|issue| issue.issue_type.as_deref())
        {
            *counts.entry(issue_type).or_insert(0) += 1;
        }

        Ok(counts
            .into_iter()
            .map(|(issue_type, count)| IssueTypeCount {
                issue_type: issue_type.to_string(),
                count,
            })
            .collect())
    }

    async fn project_info(&self, opts: &CardOptions) -> Result<Value> {
        self.exported_card(opts, "project info", |data| data.project_info.as_ref())
    }

    async fn issue_heat_map(&self, opts: &CardOptions) -> Result<Value> {
        self.exported_card(opts, "issue heat map", |data| data.issue_heat_map.as_ref())
    }

    async fn sprint_activity(&self, opts: &CardOptions) -> Result<Value> {
        self.exported_card(opts, "sprint activity", |data| data.sprint_activity.as_ref())
    }
}
