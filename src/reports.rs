// Aggregate derivation: category stats, month-over-month growth, weekday
// profile, top/bottom performers, composite scores, and headline summary.
//
// Every function is a stateless transform over the loaded table with a
// deterministic output order; `build_artifacts` recomputes the whole set
// fresh on every generate action.
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::config::VariantConfig;
use crate::insights::derive_rows;
use crate::types::{
    CategoryScore, CategoryStat, MonthlyGrowth, Record, ReportArtifacts, SummaryStats, WeekdayStat,
};
use crate::util::{average, round2, stddev};

const SCORE_MEAN_WEIGHT: f64 = 0.6;
const SCORE_STABILITY_WEIGHT: f64 = 0.3;
const SCORE_VOLUME_WEIGHT: f64 = 0.1;
const SCORE_REVIEW_BELOW: f64 = 5.0;
const SCORE_STRONG_ABOVE: f64 = 8.0;

/// Group records by category and reduce `amount` to sum, mean, population
/// standard deviation, and count. Output is sorted by total descending,
/// ties by category name.
pub fn category_stats(records: &[Record]) -> Vec<CategoryStat> {
    let mut groups: HashMap<&str, Vec<f64>> = HashMap::new();
    for r in records {
        groups.entry(r.category.as_str()).or_default().push(r.amount);
    }

    let mut stats: Vec<CategoryStat> = groups
        .into_iter()
        .map(|(category, amounts)| CategoryStat {
            category: category.to_string(),
            total: amounts.iter().sum(),
            mean: average(&amounts),
            stddev: stddev(&amounts),
            count: amounts.len(),
        })
        .collect();

    stats.sort_by(|a, b| {
        b.total
            .partial_cmp(&a.total)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.category.cmp(&b.category))
    });
    stats
}

/// The categories with the maximum and minimum summed amount.
///
/// Ties resolve to the lexicographically smaller category name at both
/// ends, so the result never depends on grouping order.
pub fn top_bottom(stats: &[CategoryStat]) -> Option<(String, String)> {
    let top = stats.iter().max_by(|a, b| {
        a.total
            .partial_cmp(&b.total)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.category.cmp(&a.category))
    })?;
    let bottom = stats.iter().min_by(|a, b| {
        a.total
            .partial_cmp(&b.total)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.category.cmp(&b.category))
    })?;
    Some((top.category.clone(), bottom.category.clone()))
}

/// Month-over-month growth of summed amounts per category.
///
/// Rows are keyed by (category, year, month) and ordered chronologically
/// within each category; the first month of a category is defined as 0
/// growth (missing prior means no change), and a zero prior total yields
/// the NaN sentinel. Records without a month are skipped.
pub fn monthly_growth(records: &[Record]) -> Vec<MonthlyGrowth> {
    let mut totals: HashMap<(String, i32, u32), f64> = HashMap::new();
    for r in records {
        let Some(month) = r.month else { continue };
        let key = (r.category.clone(), r.year.unwrap_or(0), month);
        *totals.entry(key).or_insert(0.0) += r.amount;
    }

    let mut keyed: Vec<((String, i32, u32), f64)> = totals.into_iter().collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));

    let mut rows: Vec<MonthlyGrowth> = Vec::with_capacity(keyed.len());
    let mut prev: Option<(&str, f64)> = None;
    for ((category, year, month), total) in &keyed {
        let growth_pct = match prev {
            Some((prev_category, prev_total)) if prev_category == category.as_str() => {
                if prev_total == 0.0 {
                    f64::NAN
                } else {
                    (total - prev_total) / prev_total * 100.0
                }
            }
            _ => 0.0,
        };
        rows.push(MonthlyGrowth {
            category: category.clone(),
            year: *year,
            month: *month,
            total: *total,
            growth_pct,
        });
        prev = Some((category.as_str(), *total));
    }
    rows
}

/// Mean amount per weekday, in fixed Sunday→Saturday order regardless of
/// input order. Only weekdays that actually occur are emitted; records
/// without a date contribute nothing.
pub fn weekday_means(records: &[Record]) -> Vec<WeekdayStat> {
    let mut sums = [0.0f64; 7];
    let mut counts = [0usize; 7];
    for r in records {
        let Some(weekday) = r.weekday else { continue };
        let idx = weekday.num_days_from_sunday() as usize;
        sums[idx] += r.amount;
        counts[idx] += 1;
    }

    let mut day = chrono::Weekday::Sun;
    let mut rows = Vec::new();
    for idx in 0..7 {
        if counts[idx] > 0 {
            rows.push(WeekdayStat {
                weekday: day,
                mean: sums[idx] / counts[idx] as f64,
            });
        }
        day = day.succ();
    }
    rows
}

/// Composite score per category: a weighted blend of normalized mean
/// amount, stability (inverted relative spread), and sample count, scaled
/// to 0..=10 and rounded to 2 decimals.
///
/// Each normalizing maximum is taken across all categories; a zero maximum
/// is replaced by 1 so degenerate inputs (e.g. every category a single
/// record, all deviations zero) stay defined.
pub fn scoreboard(stats: &[CategoryStat]) -> Vec<CategoryScore> {
    if stats.is_empty() {
        return Vec::new();
    }

    let zero_safe = |max: f64| if max == 0.0 { 1.0 } else { max };
    let max_mean = zero_safe(stats.iter().map(|s| s.mean).fold(0.0, f64::max));
    let max_stddev = zero_safe(stats.iter().map(|s| s.stddev).fold(0.0, f64::max));
    let max_count = zero_safe(stats.iter().map(|s| s.count as f64).fold(0.0, f64::max));

    let mut scores: Vec<CategoryScore> = stats
        .iter()
        .map(|s| {
            let raw = (s.mean / max_mean) * SCORE_MEAN_WEIGHT
                + (1.0 - s.stddev / max_stddev) * SCORE_STABILITY_WEIGHT
                + (s.count as f64 / max_count) * SCORE_VOLUME_WEIGHT;
            let score = round2(raw * 10.0);
            CategoryScore {
                category: s.category.clone(),
                score,
                recommendation: classify_score(score),
            }
        })
        .collect();

    scores.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.category.cmp(&b.category))
    });
    scores
}

/// Recommendation text for a composite score. Shared by the console view
/// and the exported document.
pub fn classify_score(score: f64) -> &'static str {
    if score < SCORE_REVIEW_BELOW {
        "Review recommended"
    } else if score > SCORE_STRONG_ABOVE {
        "Strong performer, consider promotion"
    } else {
        "Stable"
    }
}

pub fn summarize(records: &[Record], stats: &[CategoryStat]) -> SummaryStats {
    let amounts: Vec<f64> = records.iter().map(|r| r.amount).collect();
    let pair = top_bottom(stats);
    SummaryStats {
        total_records: records.len(),
        total_categories: stats.len(),
        total_amount: amounts.iter().sum(),
        average_amount: average(&amounts),
        top_category: pair.as_ref().map(|(top, _)| top.clone()),
        bottom_category: pair.map(|(_, bottom)| bottom),
    }
}

/// Run the whole pipeline over a validated table. Pure and stateless:
/// repeated calls over the same table produce identical artifacts.
pub fn build_artifacts(records: &[Record], config: &VariantConfig) -> ReportArtifacts {
    let rows = derive_rows(records, config);
    let stats = category_stats(records);
    let growth = monthly_growth(records);
    let weekdays = weekday_means(records);
    let pair = top_bottom(&stats);
    let scores = scoreboard(&stats);
    let summary = summarize(records, &stats);
    ReportArtifacts {
        rows,
        category_stats: stats,
        monthly_growth: growth,
        weekday_means: weekdays,
        top_bottom: pair,
        scores,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, NaiveDate};

    use super::*;
    use crate::config;

    fn monthly_record(category: &str, amount: f64, month: u32) -> Record {
        Record {
            category: category.to_string(),
            amount,
            costs: None,
            employees: None,
            orders: None,
            satisfaction: None,
            date: None,
            year: None,
            month: Some(month),
            weekday: None,
        }
    }

    fn dated_record(category: &str, amount: f64, date: &str) -> Record {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        Record {
            category: category.to_string(),
            amount,
            costs: None,
            employees: None,
            orders: None,
            satisfaction: None,
            date: Some(date),
            year: Some(date.year()),
            month: Some(date.month()),
            weekday: Some(date.weekday()),
        }
    }

    // The worked example: category sums, top/bottom, and the high/low
    // insight messages on the expected rows.
    #[test]
    fn category_sums_and_top_bottom_match_the_worked_example() {
        let records = vec![
            monthly_record("A", 12000.0, 1),
            monthly_record("A", 1500.0, 2),
            monthly_record("B", 5000.0, 1),
        ];

        let stats = category_stats(&records);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].category, "A");
        assert_eq!(stats[0].total, 13500.0);
        assert_eq!(stats[1].category, "B");
        assert_eq!(stats[1].total, 5000.0);

        let (top, bottom) = top_bottom(&stats).unwrap();
        assert_eq!(top, "A");
        assert_eq!(bottom, "B");

        let rows = derive_rows(&records, &config::SALES);
        assert!(rows[0].insight.contains("High activity"));
        assert!(rows[1].insight.contains("Low activity"));
    }

    #[test]
    fn top_bottom_ties_resolve_lexicographically() {
        let records = vec![
            monthly_record("Delta", 100.0, 1),
            monthly_record("Alpha", 100.0, 1),
            monthly_record("Echo", 40.0, 1),
            monthly_record("Bravo", 40.0, 1),
        ];
        let stats = category_stats(&records);
        let (top, bottom) = top_bottom(&stats).unwrap();
        assert_eq!(top, "Alpha");
        assert_eq!(bottom, "Bravo");
    }

    #[test]
    fn first_month_growth_is_exactly_zero() {
        let records = vec![
            monthly_record("A", 1000.0, 1),
            monthly_record("A", 1500.0, 2),
            monthly_record("B", 700.0, 3),
        ];
        let growth = monthly_growth(&records);
        assert_eq!(growth.len(), 3);
        assert_eq!(growth[0].growth_pct, 0.0);
        assert!((growth[1].growth_pct - 50.0).abs() < 1e-9);
        // B's only month is also a first month.
        assert_eq!(growth[2].category, "B");
        assert_eq!(growth[2].growth_pct, 0.0);
    }

    #[test]
    fn growth_orders_months_chronologically_across_years() {
        let records = vec![
            dated_record("A", 800.0, "2024-01-15"),
            dated_record("A", 500.0, "2023-12-10"),
            dated_record("A", 1000.0, "2023-11-02"),
        ];
        let growth = monthly_growth(&records);
        let periods: Vec<(i32, u32)> = growth.iter().map(|g| (g.year, g.month)).collect();
        assert_eq!(periods, vec![(2023, 11), (2023, 12), (2024, 1)]);
        assert_eq!(growth[0].growth_pct, 0.0);
        assert!((growth[1].growth_pct - -50.0).abs() < 1e-9);
        assert!((growth[2].growth_pct - 60.0).abs() < 1e-9);
    }

    #[test]
    fn zero_prior_month_yields_nan_growth() {
        let records = vec![
            monthly_record("A", 0.0, 1),
            monthly_record("A", 500.0, 2),
        ];
        let growth = monthly_growth(&records);
        assert_eq!(growth[0].growth_pct, 0.0);
        assert!(growth[1].growth_pct.is_nan());
    }

    #[test]
    fn weekday_means_are_sunday_to_saturday_regardless_of_input_order() {
        // Deliberately shuffled: Sat, Mon, Sun, Fri.
        let records = vec![
            dated_record("A", 400.0, "2024-03-09"),
            dated_record("A", 100.0, "2024-03-04"),
            dated_record("A", 200.0, "2024-03-03"),
            dated_record("A", 300.0, "2024-03-08"),
            dated_record("A", 500.0, "2024-03-10"),
        ];
        let means = weekday_means(&records);
        let names: Vec<&str> = means
            .iter()
            .map(|w| crate::util::weekday_name(w.weekday))
            .collect();
        assert_eq!(names, vec!["Sunday", "Monday", "Friday", "Saturday"]);
        // Two Sundays average out.
        assert_eq!(means[0].mean, 350.0);
    }

    #[test]
    fn records_without_dates_produce_no_weekday_rows() {
        let records = vec![monthly_record("A", 100.0, 1)];
        assert!(weekday_means(&records).is_empty());
    }

    #[test]
    fn scores_stay_in_range_with_positive_maxima() {
        let records = vec![
            monthly_record("A", 12000.0, 1),
            monthly_record("A", 1500.0, 2),
            monthly_record("B", 5000.0, 1),
            monthly_record("B", 5200.0, 2),
            monthly_record("C", 300.0, 1),
        ];
        let scores = scoreboard(&category_stats(&records));
        assert_eq!(scores.len(), 3);
        for s in &scores {
            assert!((0.0..=10.0).contains(&s.score), "score {} out of range", s.score);
        }
        // Sorted descending.
        assert!(scores[0].score >= scores[1].score);
        assert!(scores[1].score >= scores[2].score);
    }

    #[test]
    fn all_singleton_categories_still_score() {
        // Every stddev is zero, so that normalizing maximum collapses; the
        // zero-safe denominator keeps scores defined and the stability
        // term contributes its full weight.
        let records = vec![
            monthly_record("A", 1000.0, 1),
            monthly_record("B", 500.0, 1),
        ];
        let scores = scoreboard(&category_stats(&records));
        let a = scores.iter().find(|s| s.category == "A").unwrap();
        let b = scores.iter().find(|s| s.category == "B").unwrap();
        // A: mean term 0.6, stability 0.3, volume 0.1 -> 10.0.
        assert_eq!(a.score, 10.0);
        // B: mean term 0.3, stability 0.3, volume 0.1 -> 7.0.
        assert_eq!(b.score, 7.0);
        assert_eq!(a.recommendation, "Strong performer, consider promotion");
        assert_eq!(b.recommendation, "Stable");
    }

    #[test]
    fn classification_thresholds() {
        assert_eq!(classify_score(4.99), "Review recommended");
        assert_eq!(classify_score(5.0), "Stable");
        assert_eq!(classify_score(8.0), "Stable");
        assert_eq!(classify_score(8.01), "Strong performer, consider promotion");
    }

    #[test]
    fn pipeline_is_idempotent() {
        let records = vec![
            dated_record("Deli", 12000.0, "2024-01-05"),
            dated_record("Deli", 1500.0, "2024-02-10"),
            dated_record("Bakery", 5000.0, "2024-01-20"),
            dated_record("Bakery", 5200.0, "2024-02-14"),
        ];
        let first = build_artifacts(&records, &config::PERFORMANCE);
        let second = build_artifacts(&records, &config::PERFORMANCE);
        assert_eq!(first, second);
    }

    #[test]
    fn summary_headline_totals() {
        let records = vec![
            monthly_record("A", 12000.0, 1),
            monthly_record("A", 1500.0, 2),
            monthly_record("B", 5000.0, 1),
        ];
        let stats = category_stats(&records);
        let summary = summarize(&records, &stats);
        assert_eq!(summary.total_records, 3);
        assert_eq!(summary.total_categories, 2);
        assert_eq!(summary.total_amount, 18500.0);
        assert!((summary.average_amount - 18500.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.top_category.as_deref(), Some("A"));
        assert_eq!(summary.bottom_category.as_deref(), Some("B"));
    }
}
