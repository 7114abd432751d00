use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use log::info;
use std::path::PathBuf;

use crate::config::{Config, OutputFormat, SourceKind};
use crate::dashboard::Dashboard;
use crate::output::{render_report, CardReport, PhaseProgress};
use crate::records::CardOptions;
use crate::sources::{DataSource, RestSource, SnapshotSource};

#[derive(Parser)]
#[command(name = "cyclelens")]
#[command(author, version, about = "Issue Cycle-Time Insights Tool", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./cyclelens.{toml,json,yaml,yml})
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Read records from an exported snapshot file
    #[arg(short, long, global = true, conflicts_with = "url")]
    snapshot: Option<PathBuf>,

    /// Read records from a dashboard backend
    #[arg(short, long, global = true)]
    url: Option<String>,

    #[arg(short, long, global = true, env = "CYCLELENS_TOKEN")]
    token: Option<String>,

    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[arg(short, long, global = true, value_enum)]
    format: Option<OutputFormat>,

    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Average time per board stage, including commit and pull request stages
    Progress(ScopeArgs),
    /// Issues closed per day over a date range
    Throughput(ScopeArgs),
    /// Average creation-to-close time over a date range
    ClosedTime(ScopeArgs),
    /// Issue distribution over current statuses
    Transitions(ScopeArgs),
    /// Issue counts per issue type
    IssueTypes(ScopeArgs),
    /// Average issue time summary
    IssueTime(ScopeArgs),
    /// Per-issue stage times for development issues
    IssueTimes(ScopeArgs),
    /// Project information card
    ProjectInfo(ScopeArgs),
    /// Issue heat map card
    HeatMap(ScopeArgs),
    /// Sprint activity card
    SprintActivity(ScopeArgs),
}

#[derive(Args)]
struct ScopeArgs {
    #[arg(short = 'P', long)]
    project: String,

    #[arg(short, long)]
    board: Option<String>,

    /// Start of the range (RFC 3339 or YYYY-MM-DD)
    #[arg(long, value_parser = parse_timestamp)]
    since: Option<DateTime<Utc>>,

    /// End of the range (RFC 3339 or YYYY-MM-DD)
    #[arg(long, value_parser = parse_timestamp)]
    until: Option<DateTime<Utc>>,

    #[arg(long)]
    sprint: Option<String>,
}

impl ScopeArgs {
    fn to_options(&self) -> CardOptions {
        CardOptions {
            board: self.board.clone(),
            since: self.since,
            until: self.until,
            sprint: self.sprint.clone(),
            ..CardOptions::new(self.project.as_str())
        }
    }
}

/// Accepts RFC 3339 timestamps or plain dates (midnight UTC).
fn parse_timestamp(value: &str) -> std::result::Result<DateTime<Utc>, String> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("invalid timestamp '{value}', expected RFC 3339 or YYYY-MM-DD"))
}

impl Commands {
    fn scope(&self) -> &ScopeArgs {
        match self {
            Self::Progress(scope)
            | Self::Throughput(scope)
            | Self::ClosedTime(scope)
            | Self::Transitions(scope)
            | Self::IssueTypes(scope)
            | Self::IssueTime(scope)
            | Self::IssueTimes(scope)
            | Self::ProjectInfo(scope)
            | Self::HeatMap(scope)
            | Self::SprintActivity(scope) => scope,
        }
    }

    fn card_name(&self) -> &'static str {
        match self {
            Self::Progress(_) => "development progress",
            Self::Throughput(_) => "throughput",
            Self::ClosedTime(_) => "average closed time",
            Self::Transitions(_) => "transition details",
            Self::IssueTypes(_) => "issue type counts",
            Self::IssueTime(_) => "average issue time",
            Self::IssueTimes(_) => "issue stage times",
            Self::ProjectInfo(_) => "project info",
            Self::HeatMap(_) => "issue heat map",
            Self::SprintActivity(_) => "sprint activity",
        }
    }
}

impl Cli {
    pub async fn execute(&self) -> Result<()> {
        let mut config = Config::load(self.config.as_deref())?;
        self.apply_overrides(&mut config);

        let opts = self.command.scope().to_options();
        info!("Collecting {} for project: {}", self.command.card_name(), opts.project);

        let progress = PhaseProgress::start_phase_1();

        let report = match config.source.kind {
            SourceKind::Snapshot => {
                let path = config
                    .source
                    .path
                    .clone()
                    .context("No snapshot path configured; pass --snapshot or set source.path")?;
                let source = SnapshotSource::from_path(&path)
                    .with_context(|| format!("Failed to load snapshot: {}", path.display()));
                self.run_card(source, &config, &opts, progress).await?
            }
            SourceKind::Rest => {
                let source = RestSource::new(&config.source.base_url, config.source.token.clone());
                self.run_card(source.map_err(Into::into), &config, &opts, progress)
                    .await?
            }
        };

        self.write_report(&config, &opts.project, &report)
    }

    fn apply_overrides(&self, config: &mut Config) {
        if let Some(path) = &self.snapshot {
            config.source.kind = SourceKind::Snapshot;
            config.source.path = Some(path.clone());
        }
        if let Some(url) = &self.url {
            config.source.kind = SourceKind::Rest;
            config.source.base_url.clone_from(url);
        }
        if self.token.is_some() {
            config.source.token.clone_from(&self.token);
        }
        if let Some(format) = self.format {
            config.output.format = format;
        }
        if self.pretty {
            config.output.pretty = true;
        }
    }

    async fn run_card<S: DataSource>(
        &self,
        source: Result<S>,
        config: &Config,
        opts: &CardOptions,
        progress: PhaseProgress,
    ) -> Result<CardReport> {
        let source = match source {
            Ok(source) => source,
            Err(e) => {
                progress.abandon();
                return Err(e);
            }
        };

        let progress = progress.finish_phase_1_start_phase_2(self.command.card_name());
        let dashboard = Dashboard::new(source, config.categories.clone());

        let report = match &self.command {
            Commands::Progress(_) => dashboard
                .get_development_progress(opts)
                .await
                .map(CardReport::DevelopmentProgress),
            Commands::Throughput(_) => dashboard.get_throughput(opts).await.map(CardReport::Throughput),
            Commands::ClosedTime(_) => dashboard
                .get_average_closed_time(opts)
                .await
                .map(CardReport::ClosedTime),
            Commands::Transitions(_) => dashboard
                .get_transition_details(opts)
                .await
                .map(CardReport::TransitionDetails),
            Commands::IssueTypes(_) => dashboard
                .get_issue_types_count(opts)
                .await
                .map(CardReport::IssueTypes),
            Commands::IssueTime(_) => dashboard.get_avg_issue_time(opts).await.map(CardReport::IssueTime),
            Commands::IssueTimes(_) => dashboard.get_avg_time(opts).await.map(CardReport::IssueTimes),
            Commands::ProjectInfo(_) => dashboard.get_project(opts).await.map(CardReport::ProjectInfo),
            Commands::HeatMap(_) => dashboard
                .get_issue_heat_map(opts)
                .await
                .map(CardReport::IssueHeatMap),
            Commands::SprintActivity(_) => dashboard
                .get_sprint_activity(opts)
                .await
                .map(CardReport::SprintActivity),
        };

        match report {
            Ok(report) => {
                progress.finish_phase_2();
                Ok(report)
            }
            Err(e) => {
                progress.abandon();
                Err(e.into())
            }
        }
    }

    fn write_report(&self, config: &Config, project: &str, report: &CardReport) -> Result<()> {
        let rendered = match config.output.format {
            OutputFormat::Json if config.output.pretty => serde_json::to_string_pretty(report)?,
            OutputFormat::Json => serde_json::to_string(report)?,
            OutputFormat::Summary => render_report(project, report),
        };

        if let Some(output_path) = &self.output {
            std::fs::write(output_path, rendered)
                .with_context(|| format!("Failed to write output: {}", output_path.display()))?;
            info!("Report written to: {}", output_path.display());
        } else {
            println!("{rendered}");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_timestamp_accepts_rfc3339_and_dates() {
        assert_eq!(
            parse_timestamp("2024-03-01T12:00:00+02:00").unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
        );
        assert_eq!(
            parse_timestamp("2024-03-01").unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
        );
        assert!(parse_timestamp("last week").is_err());
    }

    #[test]
    fn test_cli_parses_progress_command() {
        let cli = Cli::try_parse_from([
            "cyclelens",
            "--snapshot",
            "data.json",
            "progress",
            "-P",
            "web",
            "--board",
            "main",
            "--since",
            "2024-01-01",
        ])
        .unwrap();

        let opts = cli.command.scope().to_options();
        assert_eq!(opts.project, "web");
        assert_eq!(opts.board.as_deref(), Some("main"));
        assert!(opts.since.is_some());
        assert!(opts.until.is_none());
        assert_eq!(cli.command.card_name(), "development progress");
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::try_parse_from([
            "cyclelens",
            "--url",
            "https://dash.example.com",
            "--format",
            "json",
            "throughput",
            "-P",
            "web",
        ])
        .unwrap();

        let mut config = Config::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.source.kind, SourceKind::Rest);
        assert_eq!(config.source.base_url, "https://dash.example.com");
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_cli_parses_passthrough_card_commands() {
        let cli = Cli::try_parse_from([
            "cyclelens",
            "sprint-activity",
            "-P",
            "web",
            "--sprint",
            "Sprint 7",
        ])
        .unwrap();

        let opts = cli.command.scope().to_options();
        assert_eq!(opts.sprint.as_deref(), Some("Sprint 7"));
        assert_eq!(cli.command.card_name(), "sprint activity");

        for (command, card) in [
            ("issue-times", "issue stage times"),
            ("project-info", "project info"),
            ("heat-map", "issue heat map"),
        ] {
            let cli = Cli::try_parse_from(["cyclelens", command, "-P", "web"]).unwrap();
            assert_eq!(cli.command.card_name(), card);
        }
    }

    #[test]
    fn test_snapshot_and_url_conflict() {
        let result = Cli::try_parse_from([
            "cyclelens",
            "--snapshot",
            "data.json",
            "--url",
            "https://dash.example.com",
            "progress",
            "-P",
            "web",
        ]);

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_execute_writes_json_report_from_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = dir.path().join("snapshot.json");
        let output = dir.path().join("report.json");
        std::fs::write(
            &snapshot,
            r#"{"projects": {"web": {
                "git_org_name": "acme",
                "boards": {"main": {"boardConfig": {"todo": ["open"], "done": ["closed"]}}},
                "workflows": [{"key": "done", "workflows": [{"untranslatedName": "closed"}]}],
                "issues": [{"key": "WEB-1", "date": "2024-01-01T00:00:00Z",
                            "transitions": [{"status": "open", "time": 10}]}]
            }}}"#,
        )
        .unwrap();

        let snapshot_arg = snapshot.to_string_lossy().into_owned();
        let output_arg = output.to_string_lossy().into_owned();
        let cli = Cli::try_parse_from([
            "cyclelens",
            "--snapshot",
            snapshot_arg.as_str(),
            "--format",
            "json",
            "--output",
            output_arg.as_str(),
            "progress",
            "-P",
            "web",
        ])
        .unwrap();

        cli.execute().await.unwrap();

        let written = std::fs::read_to_string(&output).unwrap();
        assert_eq!(
            written,
            r#"[{"status":"open","time":10,"idle_time":0},{"status":"closed","time":0,"idle_time":0}]"#
        );
    }

    #[tokio::test]
    async fn test_execute_writes_exported_heat_map() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = dir.path().join("snapshot.yaml");
        let output = dir.path().join("heat-map.json");
        std::fs::write(
            &snapshot,
            "projects:\n  web:\n    git_org_name: acme\n    issue_heat_map:\n      - day: Mon\n        count: 3\n",
        )
        .unwrap();

        let snapshot_arg = snapshot.to_string_lossy().into_owned();
        let output_arg = output.to_string_lossy().into_owned();
        let cli = Cli::try_parse_from([
            "cyclelens",
            "--snapshot",
            snapshot_arg.as_str(),
            "--format",
            "json",
            "--output",
            output_arg.as_str(),
            "heat-map",
            "-P",
            "web",
        ])
        .unwrap();

        cli.execute().await.unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written, serde_json::json!([{"day": "Mon", "count": 3}]));
    }
}
