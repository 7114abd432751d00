use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::time::Period;
use crate::insights::{PeriodCount, ThroughputCard};
use crate::records::Issue;

/// Issues whose `closed_at` falls within `since..=until`.
pub fn closed_within<'a>(issues: &'a [Issue], since: DateTime<Utc>, until: DateTime<Utc>) -> Vec<&'a Issue> {
    issues
        .iter()
        .filter(|issue| issue.closed_at.is_some_and(|closed| closed >= since && closed <= until))
        .collect()
}

/// Closed issues per day over the range, split into graph periods.
pub fn calculate_throughput(issues: &[Issue], since: DateTime<Utc>, until: DateTime<Utc>) -> ThroughputCard {
    let closed = closed_within(issues, since, until);
    if closed.is_empty() {
        return ThroughputCard {
            throughput: 0.0,
            period: String::new(),
            graphs: vec![],
        };
    }

    let period = Period::for_range(since, until);
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for closed_at in closed.iter().filter_map(|issue| issue.closed_at) {
        *counts.entry(period.label(closed_at)).or_insert(0) += 1;
    }

    ThroughputCard {
        throughput: per_day(closed.len(), since, until),
        period: period.as_str().to_string(),
        graphs: counts
            .into_iter()
            .map(|(period, count)| PeriodCount { period, count })
            .collect(),
    }
}

#[allow(clippy::cast_precision_loss)]
fn per_day(count: usize, since: DateTime<Utc>, until: DateTime<Utc>) -> f64 {
    let days = until.signed_duration_since(since).num_days();
    if days <= 0 {
        return 0.0;
    }
    (count as f64 / days as f64 * 10.0).round() / 10.0
}
