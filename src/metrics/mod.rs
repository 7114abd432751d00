mod closed_time;
mod matcher;
mod stage_average;
mod stage_order;
mod status_breakdown;
mod throughput;
mod time;
mod transition_time;

pub use closed_time::calculate_average_closed_time;
pub use matcher::IssueKeyScope;
pub use stage_average::calculate_avg_time_for_transitions;
pub use stage_order::{collect_in_progress_stages, resolve_transition_order};
pub use status_breakdown::calculate_status_breakdown;
pub use throughput::calculate_throughput;
pub use time::round_half_up;
pub use transition_time::{calculate_time_for_commits, calculate_time_for_pulls};
