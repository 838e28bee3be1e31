// Markdown document builder for the export collaborator.
//
// Renders the already-computed pipeline artifacts into a sectioned report
// with a fixed order: cover, summary, top/bottom performers, scores, then
// the detailed per-record listing. No computation happens here.
use std::fmt::Write;

use chrono::NaiveDate;
use tabled::{settings::Style, Table, Tabled};

use crate::types::{
    CategorySummaryRow, DetailRow, MonthlyGrowthRow, ReportArtifacts, ScoreRow, WeekdayRow,
};
use crate::util::format_number;

fn markdown_table<T: Tabled>(rows: Vec<T>) -> String {
    Table::new(rows).with(Style::markdown()).to_string()
}

/// Build the full report document.
///
/// The generation date is injected by the caller so the builder itself
/// stays deterministic.
pub fn build_document(
    title: &str,
    generated_on: NaiveDate,
    artifacts: &ReportArtifacts,
) -> String {
    let mut doc = String::new();

    // Cover.
    let _ = writeln!(doc, "# {}", title);
    let _ = writeln!(doc);
    let _ = writeln!(doc, "Generated on {}", generated_on.format("%B %d, %Y"));
    let _ = writeln!(doc);

    // Summary.
    let summary = &artifacts.summary;
    let _ = writeln!(doc, "## Summary");
    let _ = writeln!(doc);
    let _ = writeln!(
        doc,
        "- Records analyzed: {}",
        summary.total_records
    );
    let _ = writeln!(doc, "- Categories: {}", summary.total_categories);
    let _ = writeln!(
        doc,
        "- Total amount: {}",
        format_number(summary.total_amount, 2)
    );
    let _ = writeln!(
        doc,
        "- Average amount: {}",
        format_number(summary.average_amount, 2)
    );
    let _ = writeln!(doc);

    if !artifacts.category_stats.is_empty() {
        let rows: Vec<CategorySummaryRow> = artifacts
            .category_stats
            .iter()
            .map(CategorySummaryRow::from_stat)
            .collect();
        let _ = writeln!(doc, "{}", markdown_table(rows));
        let _ = writeln!(doc);
    }

    if !artifacts.monthly_growth.is_empty() {
        let _ = writeln!(doc, "Month-over-month growth:");
        let _ = writeln!(doc);
        let rows: Vec<MonthlyGrowthRow> = artifacts
            .monthly_growth
            .iter()
            .map(MonthlyGrowthRow::from_growth)
            .collect();
        let _ = writeln!(doc, "{}", markdown_table(rows));
        let _ = writeln!(doc);
    }

    if !artifacts.weekday_means.is_empty() {
        let _ = writeln!(doc, "Weekday profile:");
        let _ = writeln!(doc);
        let rows: Vec<WeekdayRow> = artifacts
            .weekday_means
            .iter()
            .map(WeekdayRow::from_stat)
            .collect();
        let _ = writeln!(doc, "{}", markdown_table(rows));
        let _ = writeln!(doc);
    }

    // Top and bottom performers.
    let _ = writeln!(doc, "## Top and Bottom Performers");
    let _ = writeln!(doc);
    match &artifacts.top_bottom {
        Some((top, bottom)) => {
            let total_of = |name: &str| {
                artifacts
                    .category_stats
                    .iter()
                    .find(|s| s.category == name)
                    .map(|s| format_number(s.total, 2))
                    .unwrap_or_else(|| "-".to_string())
            };
            let _ = writeln!(doc, "- Top performer: {} (total {})", top, total_of(top));
            let _ = writeln!(
                doc,
                "- Bottom performer: {} (total {})",
                bottom,
                total_of(bottom)
            );
        }
        None => {
            let _ = writeln!(doc, "No categories in this table.");
        }
    }
    let _ = writeln!(doc);

    // Scores and recommendations.
    let _ = writeln!(doc, "## Scores and Recommendations");
    let _ = writeln!(doc);
    if artifacts.scores.is_empty() {
        let _ = writeln!(doc, "No categories to score.");
    } else {
        let rows: Vec<ScoreRow> = artifacts.scores.iter().map(ScoreRow::from_score).collect();
        let _ = writeln!(doc, "{}", markdown_table(rows));
    }
    let _ = writeln!(doc);

    // Detailed per-record listing.
    let _ = writeln!(doc, "## Detailed Records");
    let _ = writeln!(doc);
    if artifacts.rows.is_empty() {
        let _ = writeln!(doc, "No records loaded.");
    } else {
        for row in &artifacts.rows {
            let detail = DetailRow::from_report(row);
            let _ = writeln!(doc, "### {} ({})", detail.category, detail.period);
            let _ = writeln!(doc, "- Amount: {}", detail.amount);
            if row.metrics.net_profit.is_some() {
                let _ = writeln!(
                    doc,
                    "- Net Profit: {} | Cost Ratio: {} | Productivity: {}",
                    detail.net_profit, detail.cost_ratio, detail.productivity
                );
            }
            let _ = writeln!(doc, "- Insights: {}", detail.insight);
            let _ = writeln!(doc);
        }
    }

    doc
}
