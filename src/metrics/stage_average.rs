use super::time::round_half_up;
use crate::insights::StageAverage;
use crate::records::Issue;

/// Averages stage time and idle time across all issues, one entry per stage in
/// `trans_order`.
///
/// Issues without a timing for a stage still count in the denominator, so
/// sparse stages pull the average down. Output order always follows
/// `trans_order`.
#[allow(clippy::cast_precision_loss)]
pub fn calculate_avg_time_for_transitions(trans_order: &[String], issues: &[Issue]) -> Vec<StageAverage> {
    let issue_count = issues.len() as f64;

    trans_order
        .iter()
        .map(|status| {
            let (time, idle_time) = issues
                .iter()
                .filter_map(|issue| issue.transition(status))
                .fold((0.0, 0.0), |(time, idle), t| (time + t.time, idle + t.idle_time));

            StageAverage {
                status: status.clone(),
                time: average(time, issue_count),
                idle_time: average(idle_time, issue_count),
            }
        })
        .collect()
}

#[allow(clippy::float_cmp)]
fn average(total: f64, count: f64) -> i64 {
    if total == 0.0 || count == 0.0 {
        return 0;
    }
    round_half_up(total / count)
}
