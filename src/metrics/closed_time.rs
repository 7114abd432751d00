use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::throughput::closed_within;
use super::time::{hours_between, round_half_up, Period};
use crate::insights::{ClosedTimeCard, PeriodAverage};
use crate::records::Issue;

/// Mean creation-to-close time of issues closed in the range, per period.
#[allow(clippy::cast_precision_loss)]
pub fn calculate_average_closed_time(
    issues: &[Issue],
    since: DateTime<Utc>,
    until: DateTime<Utc>,
) -> ClosedTimeCard {
    let closed = closed_within(issues, since, until);
    if closed.is_empty() {
        return ClosedTimeCard {
            period: String::new(),
            graphs: vec![],
        };
    }

    let period = Period::for_range(since, until);
    let mut buckets: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for issue in closed {
        let Some(closed_at) = issue.closed_at else {
            continue;
        };
        let entry = buckets.entry(period.label(closed_at)).or_insert((0.0, 0));
        entry.0 += hours_between(closed_at, issue.date);
        entry.1 += 1;
    }

    ClosedTimeCard {
        period: period.as_str().to_string(),
        graphs: buckets
            .into_iter()
            .map(|(period, (hours, count))| PeriodAverage {
                period,
                average_hours: round_half_up(hours / count as f64),
                count,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, m, d, h, 0, 0).unwrap()
    }

    fn issue(created: DateTime<Utc>, closed: Option<DateTime<Utc>>) -> Issue {
        Issue {
            closed_at: closed,
            ..Issue::new("PROJ-1", created)
        }
    }

    #[test]
    fn test_average_closed_time_per_week() {
        let issues = vec![
            issue(at(1, 1, 0), Some(at(1, 2, 0))),
            issue(at(1, 1, 0), Some(at(1, 3, 0))),
            issue(at(1, 10, 0), Some(at(1, 16, 12))),
            issue(at(1, 10, 0), None),
        ];

        let card = calculate_average_closed_time(&issues, at(1, 1, 0), at(2, 28, 0));

        assert_eq!(card.period, "week");
        assert_eq!(
            card.graphs,
            vec![
                PeriodAverage { period: "2024-W01".into(), average_hours: 36, count: 2 },
                PeriodAverage { period: "2024-W03".into(), average_hours: 156, count: 1 },
            ]
        );
    }

    #[test]
    fn test_average_closed_time_empty_outside_range() {
        let issues = vec![issue(at(1, 1, 0), Some(at(5, 1, 0)))];

        let card = calculate_average_closed_time(&issues, at(1, 1, 0), at(1, 31, 0));

        assert!(card.period.is_empty());
        assert!(card.graphs.is_empty());
    }
}
