//! Tables rendered with comfy-table.

use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use owo_colors::OwoColorize;
use rollkit_core::{BuildOutcome, SizeReport};

use super::Status;

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(*h).add_attribute(Attribute::Bold))
                .collect::<Vec<_>>(),
        )
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Prints one row per build outcome.
pub fn print_build_table(outcomes: &[BuildOutcome]) {
    let mut table = new_table(&["Status", "Package", "Details"]);

    for outcome in outcomes {
        let row = match outcome {
            BuildOutcome::Skipped { target } => vec![
                Cell::new(Status::Info.symbol()).fg(Color::DarkGrey),
                Cell::new(target).fg(Color::DarkGrey),
                Cell::new("private, skipped").fg(Color::DarkGrey),
            ],
            BuildOutcome::Built {
                target,
                types: Some(report),
            } if !report.succeeded => vec![
                Cell::new(Status::Error.symbol()).fg(Color::Red),
                Cell::new(target).fg(Color::Red),
                Cell::new(format!(
                    "declarations: {} errors, {} warnings",
                    report.error_count, report.warning_count
                ))
                .fg(Color::Red),
            ],
            BuildOutcome::Built { target, types } => vec![
                Cell::new(Status::Success.symbol()).fg(Color::Green),
                Cell::new(target).fg(Color::White),
                Cell::new(if types.is_some() { "bundled, declarations" } else { "bundled" }),
            ],
        };
        table.add_row(row);
    }

    println!("{}", table);
}

/// Prints minified and gzipped sizes of production bundles.
pub fn print_size_table(reports: &[SizeReport]) {
    if reports.is_empty() {
        println!("  {} {}", "→".cyan(), "(no production bundles)".bright_black());
        return;
    }

    let mut table = new_table(&["File", "Min", "Gzip"]);
    for report in reports {
        table.add_row(vec![
            Cell::new(report.file_name()).fg(Color::White),
            Cell::new(report.min_size()),
            Cell::new(report.gzip_size()).fg(Color::Green),
        ]);
    }

    println!("{}", table);
}

/// One line of `rollkit list`.
pub struct TargetRow {
    pub name: String,
    pub version: String,
    pub formats: String,
    pub private: bool,
    pub types: bool,
}

pub fn print_target_table(rows: &[TargetRow]) {
    let mut table = new_table(&["Package", "Version", "Formats", "Types"]);

    for row in rows {
        let name = if row.private {
            Cell::new(format!("{} (private)", row.name)).fg(Color::DarkGrey)
        } else {
            Cell::new(&row.name).fg(Color::White)
        };
        table.add_row(vec![
            name,
            Cell::new(&row.version).fg(Color::DarkGrey),
            Cell::new(&row.formats),
            Cell::new(if row.types { Status::Success.symbol() } else { "" }).fg(Color::Green),
        ]);
    }

    println!("{}", table);
}
