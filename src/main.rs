// Entry point and high-level CLI flow.
//
// - Option [1] loads a spreadsheet (CSV) for one of the three report
//   variants, validating its schema and printing load diagnostics.
// - Option [2] recomputes the full pipeline over the loaded table, writes
//   the report files, and prints table previews.
// - After generating a report, the user can go back to the menu or exit.
mod config;
mod error;
mod export;
mod insights;
mod loader;
mod output;
mod reports;
mod types;
mod util;

use std::io::{self, Write};
use std::sync::Mutex;

use once_cell::sync::Lazy;

use config::ReportVariant;
use error::ReportError;
use types::{
    CategorySummaryRow, DetailRow, MonthlyGrowthRow, Record, ScoreRow, WeekdayRow,
};

// Simple in-memory app state so we only load/validate the spreadsheet once
// but can regenerate reports multiple times in a single run. Every generate
// action recomputes the pipeline from this table; nothing downstream is
// cached.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { data: None }));

struct AppState {
    data: Option<(ReportVariant, Vec<Record>)>,
}

/// Read a single line of input after printing a prompt.
fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask the user whether to go back to the menu after generating a report.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        let resp = read_line("Back to menu (Y/N): ").to_uppercase();
        match resp.as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Handle option [1]: load and validate a spreadsheet for a report variant.
///
/// On success the records are stored in `APP_STATE`; a schema failure is
/// reported and leaves any previously loaded table untouched.
fn handle_load() {
    let path = read_line("Enter CSV path: ");
    if path.is_empty() {
        println!("No file given.\n");
        return;
    }

    println!("Report variants:");
    println!("[1] Monthly financial overview (Section/Month/Sales/Costs/...)");
    println!("[2] Category sales summary (Category/Date/Amount)");
    println!("[3] Category performance report (Category/Date/Amount)");
    let Some(variant) = ReportVariant::from_choice(&read_line("Enter variant: ")) else {
        println!("Invalid variant. Please enter 1, 2 or 3.\n");
        return;
    };

    match loader::load_table(&path, variant.config()) {
        Ok((records, load_report)) => {
            println!(
                "Processing table... ({} rows read, {} loaded)",
                util::format_int(load_report.total_rows as i64),
                util::format_int(load_report.loaded_rows as i64)
            );
            if load_report.parse_errors > 0 {
                println!(
                    "Note: {} rows skipped due to parse errors.",
                    util::format_int(load_report.parse_errors as i64)
                );
            }
            println!();
            let mut state = APP_STATE.lock().unwrap();
            state.data = Some((variant, records));
        }
        Err(ReportError::Schema(e)) => {
            eprintln!("Schema validation failed: {}\n", e);
        }
        Err(e) => {
            eprintln!("Failed to load file: {}\n", e);
        }
    }
}

/// Handle option [2]: recompute the pipeline and write all report files.
fn handle_generate_report() {
    let data = {
        let state = APP_STATE.lock().unwrap();
        state.data.clone()
    };
    let Some((variant, records)) = data else {
        println!("Error: No data loaded. Please load a spreadsheet first (option 1).\n");
        return;
    };
    let config = variant.config();

    println!("Generating {}...\n", config.title);
    let artifacts = reports::build_artifacts(&records, config);

    let detail_rows: Vec<DetailRow> = artifacts.rows.iter().map(DetailRow::from_report).collect();
    let summary_rows: Vec<CategorySummaryRow> = artifacts
        .category_stats
        .iter()
        .map(CategorySummaryRow::from_stat)
        .collect();
    let growth_rows: Vec<MonthlyGrowthRow> = artifacts
        .monthly_growth
        .iter()
        .map(MonthlyGrowthRow::from_growth)
        .collect();
    let weekday_rows: Vec<WeekdayRow> = artifacts
        .weekday_means
        .iter()
        .map(WeekdayRow::from_stat)
        .collect();
    let score_rows: Vec<ScoreRow> = artifacts.scores.iter().map(ScoreRow::from_score).collect();

    for (path, result) in [
        ("detailed_rows.csv", output::write_csv("detailed_rows.csv", &detail_rows)),
        ("category_summary.csv", output::write_csv("category_summary.csv", &summary_rows)),
        ("monthly_growth.csv", output::write_csv("monthly_growth.csv", &growth_rows)),
        ("weekday_profile.csv", output::write_csv("weekday_profile.csv", &weekday_rows)),
        ("scoreboard.csv", output::write_csv("scoreboard.csv", &score_rows)),
        ("summary.json", output::write_json("summary.json", &artifacts.summary)),
    ] {
        if let Err(e) = result {
            eprintln!("Write error for {}: {}", path, e);
        }
    }

    let today = chrono::Local::now().date_naive();
    let document = export::build_document(config.title, today, &artifacts);
    if let Err(e) = output::write_text("report.md", &document) {
        eprintln!("Write error for report.md: {}", e);
    }

    println!("Category summary:");
    output::preview_table(&summary_rows, 10);

    if !growth_rows.is_empty() {
        println!("Month-over-month growth:");
        output::preview_table(&growth_rows, 6);
    }

    if !weekday_rows.is_empty() {
        println!("Weekday profile:");
        output::preview_table(&weekday_rows, 7);
    }

    println!("Scores:");
    output::preview_table(&score_rows, 10);

    if let Some((top, bottom)) = &artifacts.top_bottom {
        println!("Top performer: {} / Bottom performer: {}", top, bottom);
    }
    println!(
        "Totals: {} records, {} categories, total amount {}\n",
        util::format_int(artifacts.summary.total_records as i64),
        util::format_int(artifacts.summary.total_categories as i64),
        util::format_number(artifacts.summary.total_amount, 2)
    );
    println!("Report document written to report.md (tables exported alongside).\n");
}

fn main() {
    loop {
        println!("Smart Report Generator");
        println!("[1] Load a spreadsheet");
        println!("[2] Generate report\n");
        match read_line("Enter choice: ").as_str() {
            "1" => {
                handle_load();
            }
            "2" => {
                println!();
                handle_generate_report();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1 or 2.\n");
            }
        }
    }
}
