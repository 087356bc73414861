use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

use ontrack_bridge::{PromotionFilter, TriggerDefinition};

use super::styling::{bright_green, bright_red};

/// Table and cell creation helpers
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn promotion_cell(trigger: &TriggerDefinition) -> Cell {
    match trigger.promotion_filter() {
        PromotionFilter::Latest => Cell::new("last build").fg(TableColor::DarkGrey),
        PromotionFilter::AnyPromotion => Cell::new("any promotion").fg(TableColor::Cyan),
        PromotionFilter::Level(level) => Cell::new(level).fg(TableColor::Cyan),
    }
}

fn candidate_cell(candidate: Option<&str>) -> Cell {
    match candidate {
        Some(name) => Cell::new(name).fg(TableColor::Green),
        None => Cell::new("none").fg(TableColor::Red),
    }
}

/// Prints the latest candidate build of each trigger.
pub fn print_candidates(candidates: &[(TriggerDefinition, Option<String>)]) {
    let mut table = create_table();
    table.set_header(vec!["Parameter", "Branch", "Promotion", "Candidate"]);

    for (trigger, candidate) in candidates {
        table.add_row(vec![
            Cell::new(&trigger.parameter_name),
            Cell::new(format!("{}/{}", trigger.project, trigger.branch)),
            promotion_cell(trigger),
            candidate_cell(candidate.as_deref()),
        ]);
    }

    println!("{table}");

    let complete = candidates.iter().all(|(_, candidate)| candidate.is_some());
    if complete {
        eprintln!("{}", bright_green("All triggers have a candidate build"));
    } else {
        eprintln!(
            "{}",
            bright_red("Some triggers have no candidate build, nothing would be scheduled")
        );
    }
}
