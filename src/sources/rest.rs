use log::{debug, warn};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use super::DataSource;
use crate::error::{CycleLensError, Result};
use crate::metrics::IssueKeyScope;
use crate::records::{
    Board, CardOptions, Commit, Issue, IssueTimeSummary, IssueTypeCount, Project, PullRequest,
    WorkflowCategory,
};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Reads dashboard records from the dashboard backend's REST API.
///
/// Every call is a single GET; failures are returned as-is without retrying.
pub struct RestSource {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl RestSource {
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be built.
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("CycleLens/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CycleLensError::Config(format!("Failed to create HTTP client: {e}")))?;

        let base_url = Url::parse(base_url)
            .map_err(|e| CycleLensError::Config(format!("Invalid base URL: {e}")))?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| CycleLensError::Config(format!("Base URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    /// GETs `url`, mapping 404 to `None`.
    async fn get_optional<T>(&self, url: Url, query: &[(&str, String)]) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        debug!("GET {url}");
        let mut request = self.client.get(url.clone()).query(query);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            warn!("Resource not found: {url}");
            return Ok(None);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CycleLensError::Source(format!("HTTP {status} from {url}: {body}")));
        }

        Ok(Some(response.json().await?))
    }

    async fn get<T>(&self, url: Url, query: &[(&str, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let description = url.to_string();
        self.get_optional(url, query)
            .await?
            .ok_or_else(|| CycleLensError::Source(format!("Resource not found: {description}")))
    }
}

fn scope_query(opts: &CardOptions) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(since) = opts.since {
        query.push(("since", since.format(TIMESTAMP_FORMAT).to_string()));
    }
    if let Some(until) = opts.until {
        query.push(("until", until.format(TIMESTAMP_FORMAT).to_string()));
    }
    if let Some(sprint) = &opts.sprint {
        query.push(("sprint", sprint.clone()));
    }
    query
}

fn activity_query(opts: &CardOptions, scope: &IssueKeyScope) -> Vec<(&'static str, String)> {
    let mut query = scope_query(opts);
    query.extend(scope.keys().iter().map(|key| ("key", key.clone())));
    query
}

impl DataSource for RestSource {
    async fn project(&self, opts: &CardOptions) -> Result<Option<Project>> {
        let url = self.endpoint(&["projects", &opts.project])?;
        self.get_optional(url, &[]).await
    }

    async fn board(&self, opts: &CardOptions) -> Result<Option<Board>> {
        let url = match &opts.board {
            Some(board) => self.endpoint(&["projects", &opts.project, "boards", board])?,
            None => self.endpoint(&["projects", &opts.project, "board"])?,
        };
        self.get_optional(url, &[]).await
    }

    async fn workflows(&self, opts: &CardOptions) -> Result<Vec<WorkflowCategory>> {
        let url = self.endpoint(&["projects", &opts.project, "workflows"])?;
        Ok(self.get_optional(url, &[]).await?.unwrap_or_default())
    }

    async fn development_issues(
        &self,
        opts: &CardOptions,
        in_progress_stages: &[String],
    ) -> Result<Vec<Issue>> {
        let url = self.endpoint(&["projects", &opts.project, "issues", "development"])?;
        let mut query = scope_query(opts);
        query.extend(
            in_progress_stages
                .iter()
                .map(|stage| ("in_progress", stage.clone())),
        );
        self.get(url, &query).await
    }

    async fn commits(
        &self,
        opts: &CardOptions,
        scope: &IssueKeyScope,
        git_org_name: &str,
    ) -> Result<Vec<Commit>> {
        let url = self.endpoint(&["orgs", git_org_name, "commits"])?;
        self.get(url, &activity_query(opts, scope)).await
    }

    async fn pull_requests(
        &self,
        opts: &CardOptions,
        scope: &IssueKeyScope,
        git_org_name: &str,
    ) -> Result<Vec<PullRequest>> {
        let url = self.endpoint(&["orgs", git_org_name, "pulls"])?;
        self.get(url, &activity_query(opts, scope)).await
    }

    async fn issues(&self, opts: &CardOptions) -> Result<Vec<Issue>> {
        let url = self.endpoint(&["projects", &opts.project, "issues"])?;
        self.get(url, &scope_query(opts)).await
    }

    async fn issue_time_summary(&self, opts: &CardOptions) -> Result<IssueTimeSummary> {
        let url = self.endpoint(&["projects", &opts.project, "issues", "time-summary"])?;
        self.get(url, &scope_query(opts)).await
    }

    async fn issue_type_counts(&self, opts: &CardOptions) -> Result<Vec<IssueTypeCount>> {
        let url = self.endpoint(&["projects", &opts.project, "issues", "type-counts"])?;
        self.get(url, &scope_query(opts)).await
    }

    async fn project_info(&self, opts: &CardOptions) -> Result<Value> {
        let url = self.endpoint(&["projects", &opts.project, "info"])?;
        self.get(url, &[]).await
    }

    async fn issue_heat_map(&self, opts: &CardOptions) -> Result<Value> {
        let url = self.endpoint(&["projects", &opts.project, "issues", "heat-map"])?;
        self.get(url, &scope_query(opts)).await
    }

    async fn sprint_activity(&self, opts: &CardOptions) -> Result<Value> {
        let url = self.endpoint(&["projects", &opts.project, "sprint-activity"])?;
        self.get(url, &scope_query(opts)).await
    }
}
