// Row-level derivation: numeric derived fields plus rule-based insight
// text. Everything here is a pure function of the record and the active
// variant config; source records are never mutated.
use crate::config::{InsightRule, VariantConfig, INSIGHT_DELIMITER, NORMAL_MESSAGE};
use crate::types::{Record, ReportRow, RowMetrics};

// Zero denominators yield a NaN sentinel rather than an error: derived
// fields feed report cells, not control decisions.
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        f64::NAN
    } else {
        numerator / denominator
    }
}

/// Compute the financial derived fields for one record. Variants without
/// the financial columns get all-`None` metrics.
pub fn derive_metrics(record: &Record, config: &VariantConfig) -> RowMetrics {
    if !config.financial_fields {
        return RowMetrics::default();
    }
    let net_profit = record.costs.map(|costs| record.amount - costs);
    let cost_ratio = record.costs.map(|costs| ratio(costs, record.amount) * 100.0);
    let productivity = match (record.orders, record.employees) {
        (Some(orders), Some(employees)) => Some(ratio(orders, employees)),
        _ => None,
    };
    RowMetrics {
        net_profit,
        cost_ratio,
        productivity,
    }
}

/// Evaluate the ordered rule list and join every triggered message.
///
/// Falls back to the fixed normal-range message when nothing fires, so the
/// result is never empty.
pub fn insight_text(record: &Record, metrics: &RowMetrics, rules: &[InsightRule]) -> String {
    let messages: Vec<&str> = rules
        .iter()
        .filter(|rule| (rule.triggers)(record, metrics))
        .map(|rule| rule.message)
        .collect();
    if messages.is_empty() {
        NORMAL_MESSAGE.to_string()
    } else {
        messages.join(INSIGHT_DELIMITER)
    }
}

/// Derive the full row-level table for one variant.
pub fn derive_rows(records: &[Record], config: &VariantConfig) -> Vec<ReportRow> {
    records
        .iter()
        .map(|record| {
            let metrics = derive_metrics(record, config);
            let insight = insight_text(record, &metrics, config.rules);
            ReportRow {
                record: record.clone(),
                metrics,
                insight,
            }
        })
        .collect()
}
