// Per-variant report configuration.
//
// Required columns, the period source, and the insight rule set all live in
// a `VariantConfig` value that is passed into the loader and the pipeline,
// so variants can coexist and be tested independently.
use chrono::Weekday;

use crate::types::{Record, RowMetrics};

/// Delimiter between triggered insight messages.
pub const INSIGHT_DELIMITER: &str = " • ";

/// Fallback insight when no rule fires. A row's insight text is never empty.
pub const NORMAL_MESSAGE: &str = "Performance is within expected range.";

/// One threshold rule: a plain predicate over the record and its derived
/// fields, and the message emitted when it holds. Rules are independent and
/// evaluated in declaration order; several may fire on the same record.
pub struct InsightRule {
    pub message: &'static str,
    pub triggers: fn(&Record, &RowMetrics) -> bool,
}

/// Where a record's calendar period comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodSource {
    /// A `Month` column holding a month number or English month name.
    MonthColumn,
    /// A `Date` column in `YYYY-MM-DD` form, decomposed into
    /// year/month/weekday at load time.
    DateColumn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportVariant {
    Financial,
    Sales,
    Performance,
}

pub struct VariantConfig {
    pub variant: ReportVariant,
    pub title: &'static str,
    pub required_columns: &'static [&'static str],
    pub period: PeriodSource,
    /// Whether the Costs/Employees/Orders/Satisfaction columns apply and
    /// the financial derived fields should be computed.
    pub financial_fields: bool,
    pub rules: &'static [InsightRule],
}

impl ReportVariant {
    /// Map a menu choice to a variant.
    pub fn from_choice(choice: &str) -> Option<Self> {
        match choice.trim() {
            "1" => Some(ReportVariant::Financial),
            "2" => Some(ReportVariant::Sales),
            "3" => Some(ReportVariant::Performance),
            _ => None,
        }
    }

    pub fn config(self) -> &'static VariantConfig {
        match self {
            ReportVariant::Financial => &FINANCIAL,
            ReportVariant::Sales => &SALES,
            ReportVariant::Performance => &PERFORMANCE,
        }
    }
}

const HIGH_COST_RATIO_PCT: f64 = 60.0;
const LOW_PRODUCTIVITY: f64 = 100.0;
const LOW_SATISFACTION: f64 = 4.0;
const HIGH_AMOUNT: f64 = 10_000.0;
const LOW_AMOUNT: f64 = 2_000.0;

fn high_cost_ratio(_r: &Record, m: &RowMetrics) -> bool {
    // NaN sentinels never satisfy a threshold comparison.
    matches!(m.cost_ratio, Some(v) if v > HIGH_COST_RATIO_PCT)
}

fn low_productivity(_r: &Record, m: &RowMetrics) -> bool {
    matches!(m.productivity, Some(v) if v < LOW_PRODUCTIVITY)
}

fn low_satisfaction(r: &Record, _m: &RowMetrics) -> bool {
    matches!(r.satisfaction, Some(v) if v < LOW_SATISFACTION)
}

fn high_amount(r: &Record, _m: &RowMetrics) -> bool {
    r.amount > HIGH_AMOUNT
}

fn low_amount(r: &Record, _m: &RowMetrics) -> bool {
    r.amount < LOW_AMOUNT
}

fn weekend_activity(r: &Record, _m: &RowMetrics) -> bool {
    matches!(r.weekday, Some(Weekday::Fri | Weekday::Sat))
}

fn holiday_month(r: &Record, _m: &RowMetrics) -> bool {
    matches!(r.month, Some(1 | 8 | 12))
}

static FINANCIAL_RULES: &[InsightRule] = &[
    InsightRule {
        message: "High cost ratio. Consider reviewing suppliers or pricing strategy.",
        triggers: high_cost_ratio,
    },
    InsightRule {
        message: "Low productivity. Consider optimizing staff shifts.",
        triggers: low_productivity,
    },
    InsightRule {
        message: "Customer satisfaction is below average. Consider improving service quality.",
        triggers: low_satisfaction,
    },
];

static SALES_RULES: &[InsightRule] = &[
    InsightRule {
        message: "High activity volume. Consider reviewing capacity planning.",
        triggers: high_amount,
    },
    InsightRule {
        message: "Low activity volume. Consider running a promotion.",
        triggers: low_amount,
    },
];

static PERFORMANCE_RULES: &[InsightRule] = &[
    InsightRule {
        message: "High activity volume. Consider reviewing capacity planning.",
        triggers: high_amount,
    },
    InsightRule {
        message: "Low activity volume. Consider running a promotion.",
        triggers: low_amount,
    },
    InsightRule {
        message: "Weekend activity. Staffing levels may need adjustment.",
        triggers: weekend_activity,
    },
    InsightRule {
        message: "Holiday-season activity. Expect seasonal demand shifts.",
        triggers: holiday_month,
    },
];

pub static FINANCIAL: VariantConfig = VariantConfig {
    variant: ReportVariant::Financial,
    title: "Monthly Financial Overview",
    required_columns: &[
        "Section",
        "Month",
        "Sales",
        "Costs",
        "Employees",
        "Orders",
        "Satisfaction",
    ],
    period: PeriodSource::MonthColumn,
    financial_fields: true,
    rules: FINANCIAL_RULES,
};

pub static SALES: VariantConfig = VariantConfig {
    variant: ReportVariant::Sales,
    title: "Category Sales Summary",
    required_columns: &["Category", "Date", "Amount"],
    period: PeriodSource::DateColumn,
    financial_fields: false,
    rules: SALES_RULES,
};

pub static PERFORMANCE: VariantConfig = VariantConfig {
    variant: ReportVariant::Performance,
    title: "Category Performance Report",
    required_columns: &["Category", "Date", "Amount"],
    period: PeriodSource::DateColumn,
    financial_fields: false,
    rules: PERFORMANCE_RULES,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_choices_map_to_variants() {
        assert_eq!(ReportVariant::from_choice("1"), Some(ReportVariant::Financial));
        assert_eq!(ReportVariant::from_choice(" 2 "), Some(ReportVariant::Sales));
        assert_eq!(ReportVariant::from_choice("3"), Some(ReportVariant::Performance));
        assert_eq!(ReportVariant::from_choice("4"), None);
        assert_eq!(ReportVariant::from_choice(""), None);
    }

    #[test]
    fn variant_configs_are_consistent() {
        for variant in [
            ReportVariant::Financial,
            ReportVariant::Sales,
            ReportVariant::Performance,
        ] {
            let config = variant.config();
            assert_eq!(config.variant, variant);
            assert!(!config.required_columns.is_empty());
            assert!(!config.rules.is_empty());
        }
        assert_eq!(FINANCIAL.rules.len(), 3);
        assert_eq!(SALES.rules.len(), 2);
        assert_eq!(PERFORMANCE.rules.len(), 4);
    }
}
