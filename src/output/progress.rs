use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::styling::{bright, bright_green, bright_yellow};

/// Progress tracking for the load-then-compute phases of a card
pub struct PhaseProgress {
    pb: ProgressBar,
}

impl PhaseProgress {
    pub fn start_phase_1() -> Self {
        eprintln!("{}  {}", bright("⚙️"), bright("Phases").underlined());
        let pb = create_spinner(bright_yellow("Phase 1/2: Connecting to data source").to_string());
        Self { pb }
    }

    pub fn finish_phase_1_start_phase_2(self, card: &str) -> Self {
        self.pb
            .finish_with_message(bright_green("Phase 1/2: Data source ready ✓").to_string());
        let pb = create_spinner(bright_yellow(format!("Phase 2/2: Computing {card}")).to_string());
        Self { pb }
    }

    pub fn finish_phase_2(self) {
        self.pb
            .finish_with_message(bright_green("Phase 2/2: Card computed successfully ✓").to_string());
        eprintln!();
    }

    /// Clears the spinner without a success message.
    pub fn abandon(self) {
        self.pb.abandon();
    }
}

fn create_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    if let Ok(style) = ProgressStyle::default_spinner().template("  {msg} {spinner}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
