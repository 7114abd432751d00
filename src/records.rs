use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Synthetic stage appended for commit activity.
pub const COMMITS_STAGE: &str = "commits";
/// Synthetic stage appended for pull request activity.
pub const PULL_REQUEST_STAGE: &str = "pull request";

/// An issue tracked on the dashboard.
///
/// `transitions` holds the per-stage timings supplied upstream; the commit and
/// pull request calculators append the synthetic stages to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Issue key (e.g. "PROJ-123"), unique within a run
    pub key: String,
    /// Creation timestamp
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub transitions: Vec<StageTiming>,
    /// Date of the commit matched to this issue, set by the commit calculator
    #[serde(default)]
    pub commit_date: Option<DateTime<Utc>>,
    /// Current workflow status
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub issue_type: Option<String>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    /// Sprint the issue is planned in
    #[serde(default)]
    pub sprint: Option<String>,
}

impl Issue {
    pub fn new(key: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            date,
            transitions: vec![],
            commit_date: None,
            status: None,
            issue_type: None,
            closed_at: None,
            sprint: None,
        }
    }

    /// Returns the first timing recorded for `status`.
    pub fn transition(&self, status: &str) -> Option<&StageTiming> {
        self.transitions.iter().find(|t| t.status == status)
    }

    /// Returns this issue with `timing` recorded, replacing an existing entry
    /// for the same stage so that each stage appears at most once.
    #[must_use]
    pub fn with_transition(mut self, timing: StageTiming) -> Self {
        match self
            .transitions
            .iter_mut()
            .find(|t| t.status == timing.status)
        {
            Some(existing) => *existing = timing,
            None => self.transitions.push(timing),
        }
        self
    }
}

/// Time spent by an issue in one workflow stage, in hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageTiming {
    pub status: String,
    pub time: f64,
    #[serde(default)]
    pub idle_time: f64,
}

impl StageTiming {
    pub fn new(status: impl Into<String>, time: f64, idle_time: f64) -> Self {
        Self {
            status: status.into(),
            time,
            idle_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    /// Commit message title, expected to mention an issue key
    pub title: String,
    pub date: DateTime<Utc>,
    /// Source-control organization owning the repository
    #[serde(default)]
    pub org: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Pull request title, expected to mention an issue key
    pub title: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub org: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub git_org_name: String,
}

/// Board configuration for a project.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Board {
    /// Explicit stage order; takes precedence over `board_config`
    #[serde(default, rename = "transitionOrder")]
    pub transition_order: Option<Vec<String>>,
    /// Board columns mapped to the stages they contain, in column order
    #[serde(default, rename = "boardConfig")]
    pub board_config: IndexMap<String, Vec<String>>,
}

/// Workflow statuses grouped under one status category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowCategory {
    pub key: String,
    #[serde(default)]
    pub workflows: Vec<WorkflowStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStatus {
    #[serde(rename = "untranslatedName")]
    pub untranslated_name: String,
}

/// Jira-style status categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusCategory {
    New,
    Indeterminate,
    Done,
}

impl StatusCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Indeterminate => "indeterminate",
            Self::Done => "done",
        }
    }

    pub fn all() -> Vec<Self> {
        vec![Self::New, Self::Indeterminate, Self::Done]
    }
}

/// Scope shared by every dashboard card request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardOptions {
    pub project: String,
    #[serde(default)]
    pub board: Option<String>,
    #[serde(default)]
    pub since: Option<DateTime<Utc>>,
    #[serde(default)]
    pub until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sprint: Option<String>,
}

impl CardOptions {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            ..Self::default()
        }
    }

    /// Whether `at` falls inside the `since`/`until` bounds (inclusive).
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.since.map_or(true, |since| at >= since) && self.until.map_or(true, |until| at <= until)
    }

    /// Whether an issue planned in `sprint` belongs to the selected sprint.
    /// Always true when no sprint is selected.
    pub fn in_sprint(&self, sprint: Option<&str>) -> bool {
        self.sprint
            .as_deref()
            .map_or(true, |selected| sprint == Some(selected))
    }
}

/// Pre-aggregated issue timing summary served by the data layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueTimeSummary {
    #[serde(default)]
    pub average_hours: f64,
    #[serde(default)]
    pub issue_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueTypeCount {
    pub issue_type: String,
    pub count: usize,
}
