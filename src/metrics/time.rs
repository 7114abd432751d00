use chrono::{DateTime, Datelike, Utc};

const MILLIS_PER_HOUR: f64 = 3_600_000.0;
const DAILY_RANGE_DAYS: i64 = 14;
const WEEKLY_RANGE_DAYS: i64 = 90;

/// Signed hours elapsed from `from` to `to`.
#[allow(clippy::cast_precision_loss)]
pub fn hours_between(to: DateTime<Utc>, from: DateTime<Utc>) -> f64 {
    to.signed_duration_since(from).num_milliseconds() as f64 / MILLIS_PER_HOUR
}

/// Rounds to the nearest integer with halves going up, so `-2.5` becomes `-2`.
#[allow(clippy::cast_possible_truncation)]
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Bucket size used when splitting a date range into graph points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Day,
    Week,
    Month,
}

impl Period {
    /// Picks the granularity for a `since`..`until` range.
    pub fn for_range(since: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        let days = until.signed_duration_since(since).num_days();
        if days <= DAILY_RANGE_DAYS {
            Self::Day
        } else if days <= WEEKLY_RANGE_DAYS {
            Self::Week
        } else {
            Self::Month
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }

    /// Label of the bucket containing `at`. Labels sort chronologically.
    pub fn label(self, at: DateTime<Utc>) -> String {
        match self {
            Self::Day => at.format("%Y-%m-%d").to_string(),
            Self::Week => {
                let week = at.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
            Self::Month => at.format("%Y-%m").to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_hours_between_is_signed() {
        let a = date(2024, 1, 1);
        let b = Utc.with_ymd_and_hms(2024, 1, 1, 6, 30, 0).unwrap();
        assert_eq!(hours_between(b, a), 6.5);
        assert_eq!(hours_between(a, b), -6.5);
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(2.49), 2);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(0.0), 0);
    }

    #[test]
    fn test_period_for_range() {
        let since = date(2024, 1, 1);
        assert_eq!(Period::for_range(since, date(2024, 1, 15)), Period::Day);
        assert_eq!(Period::for_range(since, date(2024, 3, 1)), Period::Week);
        assert_eq!(Period::for_range(since, date(2024, 12, 31)), Period::Month);
    }

    #[test]
    fn test_period_labels() {
        let at = date(2024, 1, 3);
        assert_eq!(Period::Day.label(at), "2024-01-03");
        assert_eq!(Period::Week.label(at), "2024-W01");
        assert_eq!(Period::Month.label(at), "2024-01");
        // ISO week of Dec 30, 2024 belongs to 2025
        assert_eq!(Period::Week.label(date(2024, 12, 30)), "2025-W01");
    }
}
