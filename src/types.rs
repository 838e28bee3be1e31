use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::util::{format_number, month_name, weekday_name};

/// Raw serde view of one CSV row.
///
/// Every field is optional and stringly-typed: this struct covers the union
/// of all report-variant columns, and the loader decides which ones the
/// active variant actually requires. Cleanup and typing happen in `loader`.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "Section")]
    pub section: Option<String>,
    #[serde(rename = "Category")]
    pub category: Option<String>,
    #[serde(rename = "Month")]
    pub month: Option<String>,
    #[serde(rename = "Date")]
    pub date: Option<String>,
    #[serde(rename = "Sales")]
    pub sales: Option<String>,
    #[serde(rename = "Amount")]
    pub amount: Option<String>,
    #[serde(rename = "Costs")]
    pub costs: Option<String>,
    #[serde(rename = "Employees")]
    pub employees: Option<String>,
    #[serde(rename = "Orders")]
    pub orders: Option<String>,
    #[serde(rename = "Satisfaction")]
    pub satisfaction: Option<String>,
}

/// One cleaned input row.
///
/// `amount` is the measure every aggregate reduces; for the financial
/// variant it holds the `Sales` column. Period fields are decomposed at
/// load time: date-based variants fill `date`/`year`/`month`/`weekday`,
/// the month-column variant fills only `month`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub category: String,
    pub amount: f64,
    pub costs: Option<f64>,
    pub employees: Option<f64>,
    pub orders: Option<f64>,
    pub satisfaction: Option<f64>,
    pub date: Option<NaiveDate>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub weekday: Option<Weekday>,
}

/// Derived per-record fields. `None` means the active variant has no such
/// column; NaN means the field exists but its denominator was zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowMetrics {
    pub net_profit: Option<f64>,
    pub cost_ratio: Option<f64>,
    pub productivity: Option<f64>,
}

/// A record together with its derived fields and insight annotation.
/// The source `Record` is carried unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub record: Record,
    pub metrics: RowMetrics,
    pub insight: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryStat {
    pub category: String,
    pub total: f64,
    pub mean: f64,
    pub stddev: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyGrowth {
    pub category: String,
    /// 0 for the month-column variant, which carries no year.
    pub year: i32,
    pub month: u32,
    pub total: f64,
    pub growth_pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeekdayStat {
    pub weekday: Weekday,
    pub mean: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryScore {
    pub category: String,
    pub score: f64,
    pub recommendation: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SummaryStats {
    pub total_records: usize,
    pub total_categories: usize,
    pub total_amount: f64,
    pub average_amount: f64,
    pub top_category: Option<String>,
    pub bottom_category: Option<String>,
}

/// Everything one pipeline run produces. Presentation code (console
/// previews, file writers, the document builder) consumes this and computes
/// nothing of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportArtifacts {
    pub rows: Vec<ReportRow>,
    pub category_stats: Vec<CategoryStat>,
    pub monthly_growth: Vec<MonthlyGrowth>,
    pub weekday_means: Vec<WeekdayStat>,
    pub top_bottom: Option<(String, String)>,
    pub scores: Vec<CategoryScore>,
    pub summary: SummaryStats,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DetailRow {
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "Period")]
    #[tabled(rename = "Period")]
    pub period: String,
    #[serde(rename = "Amount")]
    #[tabled(rename = "Amount")]
    pub amount: String,
    #[serde(rename = "NetProfit")]
    #[tabled(rename = "NetProfit")]
    pub net_profit: String,
    #[serde(rename = "CostRatio")]
    #[tabled(rename = "CostRatio")]
    pub cost_ratio: String,
    #[serde(rename = "Productivity")]
    #[tabled(rename = "Productivity")]
    pub productivity: String,
    #[serde(rename = "Insights")]
    #[tabled(rename = "Insights")]
    pub insight: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CategorySummaryRow {
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "TotalAmount")]
    #[tabled(rename = "TotalAmount")]
    pub total_amount: String,
    #[serde(rename = "MeanAmount")]
    #[tabled(rename = "MeanAmount")]
    pub mean_amount: String,
    #[serde(rename = "Records")]
    #[tabled(rename = "Records")]
    pub records: usize,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct MonthlyGrowthRow {
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "Period")]
    #[tabled(rename = "Period")]
    pub period: String,
    #[serde(rename = "TotalAmount")]
    #[tabled(rename = "TotalAmount")]
    pub total_amount: String,
    #[serde(rename = "GrowthPct")]
    #[tabled(rename = "GrowthPct")]
    pub growth_pct: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct WeekdayRow {
    #[serde(rename = "Weekday")]
    #[tabled(rename = "Weekday")]
    pub weekday: String,
    #[serde(rename = "MeanAmount")]
    #[tabled(rename = "MeanAmount")]
    pub mean_amount: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ScoreRow {
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "Score")]
    #[tabled(rename = "Score")]
    pub score: String,
    #[serde(rename = "Recommendation")]
    #[tabled(rename = "Recommendation")]
    pub recommendation: String,
}

impl DetailRow {
    pub fn from_report(row: &ReportRow) -> Self {
        let r = &row.record;
        let period = if let Some(date) = r.date {
            date.to_string()
        } else if let Some(m) = r.month {
            month_name(m).to_string()
        } else {
            "-".to_string()
        };
        let opt = |v: Option<f64>| match v {
            Some(v) => format_number(v, 2),
            None => "-".to_string(),
        };
        DetailRow {
            category: r.category.clone(),
            period,
            amount: format_number(r.amount, 2),
            net_profit: opt(row.metrics.net_profit),
            cost_ratio: opt(row.metrics.cost_ratio),
            productivity: opt(row.metrics.productivity),
            insight: row.insight.clone(),
        }
    }
}

impl CategorySummaryRow {
    pub fn from_stat(stat: &CategoryStat) -> Self {
        CategorySummaryRow {
            category: stat.category.clone(),
            total_amount: format_number(stat.total, 2),
            mean_amount: format_number(stat.mean, 2),
            records: stat.count,
        }
    }
}

impl MonthlyGrowthRow {
    pub fn from_growth(g: &MonthlyGrowth) -> Self {
        let period = if g.year > 0 {
            format!("{}-{:02}", g.year, g.month)
        } else {
            month_name(g.month).to_string()
        };
        MonthlyGrowthRow {
            category: g.category.clone(),
            period,
            total_amount: format_number(g.total, 2),
            growth_pct: format_number(g.growth_pct, 2),
        }
    }
}

impl WeekdayRow {
    pub fn from_stat(stat: &WeekdayStat) -> Self {
        WeekdayRow {
            weekday: weekday_name(stat.weekday).to_string(),
            mean_amount: format_number(stat.mean, 2),
        }
    }
}

impl ScoreRow {
    pub fn from_score(score: &CategoryScore) -> Self {
        ScoreRow {
            category: score.category.clone(),
            score: format_number(score.score, 2),
            recommendation: score.recommendation.to_string(),
        }
    }
}
