use serde::{Deserialize, Serialize};

/// Mean time spent in one stage across an issue set, rounded to whole hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageAverage {
    pub status: String,
    pub time: i64,
    pub idle_time: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThroughputCard {
    /// Closed issues per day over the requested range
    pub throughput: f64,
    /// Period granularity of `graphs` ("day", "week" or "month"), empty when nothing closed
    #[serde(rename = "type")]
    pub period: String,
    pub graphs: Vec<PeriodCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodCount {
    pub period: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedTimeCard {
    #[serde(rename = "type")]
    pub period: String,
    pub graphs: Vec<PeriodAverage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodAverage {
    pub period: String,
    /// Mean hours from creation to close for issues closed in this period
    pub average_hours: i64,
    pub count: usize,
}

/// Share of issues currently sitting in one status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDetail {
    pub status: String,
    /// Mean hours spent in the status
    pub time: i64,
    pub count: usize,
    /// Percentage of all issues, e.g. "33.33%"
    pub progress: String,
}
