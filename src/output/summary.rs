use std::fmt::Write;

use serde::Serialize;
use serde_json::Value;

use crate::insights::{ClosedTimeCard, StageAverage, StatusDetail, ThroughputCard};
use crate::metrics::round_half_up;
use crate::records::{Issue, IssueTimeSummary, IssueTypeCount};

use super::styling::{bright, dim};
use super::tables::{color_coded_hours_cell, color_coded_idle_cell, create_table, cyan_header};

/// Result of one dashboard card, ready for rendering.
///
/// Serializes as the bare card payload.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CardReport {
    DevelopmentProgress(Vec<StageAverage>),
    Throughput(ThroughputCard),
    ClosedTime(ClosedTimeCard),
    TransitionDetails(Vec<StatusDetail>),
    IssueTypes(Vec<IssueTypeCount>),
    IssueTime(IssueTimeSummary),
    IssueTimes(Vec<Issue>),
    ProjectInfo(Value),
    IssueHeatMap(Value),
    SprintActivity(Value),
}

impl CardReport {
    pub fn title(&self) -> &'static str {
        match self {
            Self::DevelopmentProgress(_) => "Development Progress",
            Self::Throughput(_) => "Throughput",
            Self::ClosedTime(_) => "Average Closed Time",
            Self::TransitionDetails(_) => "Transition Details",
            Self::IssueTypes(_) => "Issue Types",
            Self::IssueTime(_) => "Average Issue Time",
            Self::IssueTimes(_) => "Issue Stage Times",
            Self::ProjectInfo(_) => "Project Info",
            Self::IssueHeatMap(_) => "Issue Heat Map",
            Self::SprintActivity(_) => "Sprint Activity",
        }
    }
}

/// Renders a human-readable summary of a card.
///
/// Hour cells are color coded: green up to a day, yellow up to a week, red
/// beyond.
pub fn render_report(project: &str, report: &CardReport) -> String {
    let mut output = String::new();

    let _ = writeln!(
        output,
        "{} {}\n",
        bright(format!("📊 {}", report.title())).underlined(),
        dim(format!("({project})"))
    );

    match report {
        CardReport::DevelopmentProgress(stages) => render_stages(&mut output, stages),
        CardReport::Throughput(card) => render_throughput(&mut output, card),
        CardReport::ClosedTime(card) => render_closed_time(&mut output, card),
        CardReport::TransitionDetails(details) => render_details(&mut output, details),
        CardReport::IssueTypes(counts) => render_issue_types(&mut output, counts),
        CardReport::IssueTime(summary) => {
            let _ = writeln!(
                output,
                "  Issues: {}\n  Average time: {:.1}h",
                summary.issue_count, summary.average_hours
            );
        }
        CardReport::IssueTimes(issues) => render_issue_times(&mut output, issues),
        CardReport::ProjectInfo(value) => render_value(&mut output, value, "project info"),
        CardReport::IssueHeatMap(value) => render_value(&mut output, value, "heat map data"),
        CardReport::SprintActivity(value) => render_value(&mut output, value, "sprint activity"),
    }

    output
}

fn render_empty(output: &mut String, what: &str) {
    let _ = writeln!(output, "  {}", dim(format!("No {what} found")));
}

fn render_stages(output: &mut String, stages: &[StageAverage]) {
    if stages.is_empty() {
        render_empty(output, "development progress data");
        return;
    }

    let mut table = create_table();
    table.set_header(cyan_header(&["Stage", "Avg Time", "Avg Idle"]));
    for stage in stages {
        table.add_row(vec![
            stage.status.clone().into(),
            color_coded_hours_cell(stage.time),
            color_coded_idle_cell(stage.idle_time),
        ]);
    }
    let _ = writeln!(output, "{table}");
}

fn render_throughput(output: &mut String, card: &ThroughputCard) {
    let _ = writeln!(output, "  Throughput: {:.1} issues/day", card.throughput);
    if card.graphs.is_empty() {
        render_empty(output, "closed issues");
        return;
    }

    let mut table = create_table();
    table.set_header(cyan_header(&[card.period.as_str(), "Closed"]));
    for point in &card.graphs {
        table.add_row(vec![point.period.clone(), point.count.to_string()]);
    }
    let _ = writeln!(output, "{table}");
}

fn render_closed_time(output: &mut String, card: &ClosedTimeCard) {
    if card.graphs.is_empty() {
        render_empty(output, "closed issues");
        return;
    }

    let mut table = create_table();
    table.set_header(cyan_header(&[card.period.as_str(), "Avg Time", "Closed"]));
    for point in &card.graphs {
        table.add_row(vec![
            point.period.clone().into(),
            color_coded_hours_cell(point.average_hours),
            point.count.to_string().into(),
        ]);
    }
    let _ = writeln!(output, "{table}");
}

fn render_details(output: &mut String, details: &[StatusDetail]) {
    if details.is_empty() {
        render_empty(output, "issues");
        return;
    }

    let mut table = create_table();
    table.set_header(cyan_header(&["Status", "Issues", "Share", "Avg Time"]));
    for detail in details {
        table.add_row(vec![
            detail.status.clone().into(),
            detail.count.to_string().into(),
            detail.progress.clone().into(),
            color_coded_hours_cell(detail.time),
        ]);
    }
    let _ = writeln!(output, "{table}");
}

fn render_issue_types(output: &mut String, counts: &[IssueTypeCount]) {
    if counts.is_empty() {
        render_empty(output, "issue types");
        return;
    }

    let mut table = create_table();
    table.set_header(cyan_header(&["Type", "Issues"]));
    for count in counts {
        table.add_row(vec![count.issue_type.clone(), count.count.to_string()]);
    }
    let _ = writeln!(output, "{table}");
}

fn render_issue_times(output: &mut String, issues: &[Issue]) {
    if issues.is_empty() {
        render_empty(output, "issues");
        return;
    }

    let mut table = create_table();
    table.set_header(cyan_header(&["Issue", "Stage", "Time", "Idle"]));
    for issue in issues {
        for timing in &issue.transitions {
            table.add_row(vec![
                issue.key.clone().into(),
                timing.status.clone().into(),
                color_coded_hours_cell(round_half_up(timing.time)),
                color_coded_idle_cell(round_half_up(timing.idle_time)),
            ]);
        }
    }
    let _ = writeln!(output, "{table}");
}

/// Cards served verbatim by the data source are shown as indented JSON.
fn render_value(output: &mut String, value: &Value, what: &str) {
    if value.is_null() {
        render_empty(output, what);
        return;
    }

    for line in format!("{value:#}").lines() {
        let _ = writeln!(output, "  {line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::PeriodCount;

    #[test]
    fn test_render_development_progress() {
        let report = CardReport::DevelopmentProgress(vec![
            StageAverage {
                status: "In Progress".into(),
                time: 30,
                idle_time: 0,
            },
            StageAverage {
                status: "pull request".into(),
                time: 200,
                idle_time: 4,
            },
        ]);

        let output = render_report("web", &report);

        assert!(output.contains("Development Progress"));
        assert!(output.contains("(web)"));
        assert!(output.contains("In Progress"));
        assert!(output.contains("pull request"));
        assert!(output.contains("200h"));
    }

    #[test]
    fn test_render_empty_development_progress() {
        let output = render_report("web", &CardReport::DevelopmentProgress(vec![]));

        assert!(output.contains("No development progress data found"));
    }

    #[test]
    fn test_render_throughput() {
        let report = CardReport::Throughput(ThroughputCard {
            throughput: 1.5,
            period: "week".into(),
            graphs: vec![PeriodCount {
                period: "2024-W10".into(),
                count: 7,
            }],
        });

        let output = render_report("web", &report);

        assert!(output.contains("1.5 issues/day"));
        assert!(output.contains("2024-W10"));
    }

    #[test]
    fn test_render_issue_times_lists_each_stage() {
        use crate::records::StageTiming;
        use chrono::{TimeZone, Utc};

        let issue = Issue::new("WEB-4", Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
            .with_transition(StageTiming::new("open", 5.5, 0.0))
            .with_transition(StageTiming::new("review", 30.0, 2.0));

        let output = render_report("web", &CardReport::IssueTimes(vec![issue]));

        assert!(output.contains("Issue Stage Times"));
        assert!(output.contains("WEB-4"));
        assert!(output.contains("review"));
        assert!(output.contains("30h"));
    }

    #[test]
    fn test_render_passthrough_cards() {
        let heat_map = CardReport::IssueHeatMap(serde_json::json!([{"day": "Mon", "count": 4}]));
        let output = render_report("web", &heat_map);
        assert!(output.contains("\"day\": \"Mon\""));

        let empty = render_report("web", &CardReport::SprintActivity(Value::Null));
        assert!(empty.contains("No sprint activity found"));
        assert_eq!(
            serde_json::to_string(&CardReport::ProjectInfo(Value::Null)).unwrap(),
            "null"
        );
    }

    #[test]
    fn test_report_serializes_bare_payload() {
        let report = CardReport::DevelopmentProgress(vec![StageAverage {
            status: "commits".into(),
            time: 3,
            idle_time: 0,
        }]);

        let json = serde_json::to_string(&report).unwrap();

        assert_eq!(json, r#"[{"status":"commits","time":3,"idle_time":0}]"#);
    }

    #[test]
    fn test_throughput_serializes_type_field() {
        let report = CardReport::Throughput(ThroughputCard {
            throughput: 0.0,
            period: String::new(),
            graphs: vec![],
        });

        let json = serde_json::to_string(&report).unwrap();

        assert_eq!(json, r#"{"throughput":0.0,"type":"","graphs":[]}"#);
    }
}
