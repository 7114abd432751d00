use indexmap::IndexMap;

use super::time::round_half_up;
use crate::insights::StatusDetail;
use crate::records::Issue;

/// Groups issues by their current status, in first-seen order.
///
/// `progress` is the group's share of all issues, including issues without a
/// status. `time` is the mean hours the group's issues spent in that status.
#[allow(clippy::cast_precision_loss)]
pub fn calculate_status_breakdown(issues: &[Issue]) -> Vec<StatusDetail> {
    let mut groups: IndexMap<&str, Vec<&Issue>> = IndexMap::new();
    for issue in issues {
        if let Some(status) = issue.status.as_deref() {
            groups.entry(status).or_default().push(issue);
        }
    }

    let total = issues.len();

    groups
        .into_iter()
        .map(|(status, members)| {
            let hours: f64 = members
                .iter()
                .filter_map(|issue| issue.transition(status))
                .map(|t| t.time)
                .sum();

            StatusDetail {
                status: status.to_string(),
                time: round_half_up(hours / members.len() as f64),
                count: members.len(),
                progress: format_percentage(members.len() as f64 / total as f64 * 100.0),
            }
        })
        .collect()
}

/// Two-decimal percentage without trailing zeros, e.g. "33.33%" or "50%".
fn format_percentage(value: f64) -> String {
    let fixed = format!("{value:.2}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed}%")
}
