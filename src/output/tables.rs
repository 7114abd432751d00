use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

const HOURS_PER_DAY: i64 = 24;
const HOURS_PER_WEEK: i64 = 24 * 7;

/// Table and cell creation helpers
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn cyan_header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(*label).fg(TableColor::Cyan))
        .collect()
}

/// Whole hours, green within a day, yellow within a week, red beyond.
pub fn color_coded_hours_cell(hours: i64) -> Cell {
    let text = format!("{hours}h");
    if hours <= HOURS_PER_DAY {
        Cell::new(text).fg(TableColor::Green)
    } else if hours <= HOURS_PER_WEEK {
        Cell::new(text).fg(TableColor::Yellow)
    } else {
        Cell::new(text).fg(TableColor::Red)
    }
}

/// Idle hours share the thresholds of active hours, but zero idle time is dimmed.
pub fn color_coded_idle_cell(hours: i64) -> Cell {
    if hours == 0 {
        return Cell::new("0h").fg(TableColor::DarkGrey);
    }
    color_coded_hours_cell(hours)
}
