mod progress;
mod styling;
mod summary;
mod tables;

pub use progress::PhaseProgress;
pub use styling::{dim, magenta_bold};
pub use summary::{CardReport, render_report};

/// Prints the `CycleLens` banner to stderr.
///
/// Displays the tool name, version, and description at the start of execution.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("⏱ CycleLens"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("Issue Cycle-Time Insights Tool")
    );
}
