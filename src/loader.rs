use std::collections::HashSet;

use chrono::Datelike;
use csv::ReaderBuilder;

use crate::config::{PeriodSource, VariantConfig};
use crate::error::{Result, SchemaError};
use crate::types::{RawRow, Record};
use crate::util::{parse_date_safe, parse_f64_safe, parse_month_safe};

/// Diagnostics from one load, printed to the console afterwards.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub parse_errors: usize,
}

/// Check that every required column is present among the table's headers.
///
/// Validation is table-wide: all missing columns are reported at once and a
/// failure halts the run before any row is processed. Row contents are not
/// inspected here.
pub fn validate_columns<'a, I>(present: I, required: &[&str]) -> std::result::Result<(), SchemaError>
where
    I: IntoIterator<Item = &'a str>,
{
    let present: HashSet<&str> = present.into_iter().collect();
    let missing: Vec<String> = required
        .iter()
        .filter(|col| !present.contains(**col))
        .map(|col| col.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(SchemaError { missing })
    }
}

/// Load a CSV file into typed records for the given report variant.
///
/// The header row is schema-validated first; rows whose variant-required
/// cells cannot be parsed are skipped and counted in the `LoadReport`
/// rather than aborting the load.
pub fn load_table(path: &str, config: &VariantConfig) -> Result<(Vec<Record>, LoadReport)> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers = rdr.headers()?.clone();
    validate_columns(headers.iter(), config.required_columns)?;

    let mut total_rows = 0usize;
    let mut parse_errors = 0usize;
    let mut records: Vec<Record> = Vec::new();

    for result in rdr.deserialize::<RawRow>() {
        total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(_) => {
                parse_errors += 1;
                continue;
            }
        };

        // The financial variant labels its grouping column `Section`; the
        // date-based variants call it `Category`. Same role either way.
        let category = match row.section.or(row.category) {
            Some(c) if !c.trim().is_empty() => c.trim().to_string(),
            _ => {
                parse_errors += 1;
                continue;
            }
        };

        let amount = match parse_f64_safe(row.sales.as_deref().or(row.amount.as_deref())) {
            Some(v) => v,
            None => {
                parse_errors += 1;
                continue;
            }
        };

        let (date, year, month, weekday) = match config.period {
            PeriodSource::DateColumn => match parse_date_safe(row.date.as_deref()) {
                Some(d) => (Some(d), Some(d.year()), Some(d.month()), Some(d.weekday())),
                None => {
                    parse_errors += 1;
                    continue;
                }
            },
            PeriodSource::MonthColumn => match parse_month_safe(row.month.as_deref()) {
                Some(m) => (None, None, Some(m), None),
                None => {
                    parse_errors += 1;
                    continue;
                }
            },
        };

        let (costs, employees, orders, satisfaction) = if config.financial_fields {
            let costs = parse_f64_safe(row.costs.as_deref());
            let employees = parse_f64_safe(row.employees.as_deref());
            let orders = parse_f64_safe(row.orders.as_deref());
            let satisfaction = parse_f64_safe(row.satisfaction.as_deref());
            match (costs, employees, orders, satisfaction) {
                (Some(c), Some(e), Some(o), Some(s)) => (Some(c), Some(e), Some(o), Some(s)),
                _ => {
                    parse_errors += 1;
                    continue;
                }
            }
        } else {
            (None, None, None, None)
        };

        records.push(Record {
            category,
            amount,
            costs,
            employees,
            orders,
            satisfaction,
            date,
            year,
            month,
            weekday,
        });
    }

    let loaded_rows = records.len();
    let report = LoadReport {
        total_rows,
        loaded_rows,
        parse_errors,
    };
    Ok((records, report))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use chrono::Weekday;
    use tempfile::NamedTempFile;

    use super::*;
    use crate::config;
    use crate::error::ReportError;

    fn write_csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write csv");
        file
    }

    #[test]
    fn reports_all_missing_columns_at_once() {
        let err = validate_columns(
            ["Category", "Amount"].into_iter(),
            config::FINANCIAL.required_columns,
        )
        .unwrap_err();
        assert_eq!(
            err.missing,
            vec![
                "Section".to_string(),
                "Month".to_string(),
                "Sales".to_string(),
                "Costs".to_string(),
                "Employees".to_string(),
                "Orders".to_string(),
                "Satisfaction".to_string(),
            ]
        );
    }

    #[test]
    fn accepts_tables_with_extra_columns() {
        let present = ["Category", "Date", "Amount", "Notes"];
        assert!(validate_columns(present.into_iter(), config::SALES.required_columns).is_ok());
    }

    #[test]
    fn missing_column_fails_before_any_row_is_loaded() {
        let file = write_csv("Category,Amount\nDeli,120\n");
        let err = load_table(file.path().to_str().unwrap(), &config::SALES).unwrap_err();
        match err {
            ReportError::Schema(schema) => {
                assert_eq!(schema.missing, vec!["Date".to_string()]);
            }
            other => panic!("expected SchemaError, got {other}"),
        }
    }

    #[test]
    fn loads_date_based_rows_with_period_decomposition() {
        let file = write_csv(
            "Category,Date,Amount\n\
             Deli,2024-01-05,12000\n\
             Bakery,2024-02-10,\"1,500\"\n",
        );
        let (records, report) = load_table(file.path().to_str().unwrap(), &config::SALES).unwrap();
        assert_eq!(report.total_rows, 2);
        assert_eq!(report.parse_errors, 0);
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.category, "Deli");
        assert_eq!(first.amount, 12000.0);
        assert_eq!(first.year, Some(2024));
        assert_eq!(first.month, Some(1));
        // 2024-01-05 was a Friday.
        assert_eq!(first.weekday, Some(Weekday::Fri));
        assert!(first.costs.is_none());

        // Thousands separators inside quoted cells are tolerated.
        assert_eq!(records[1].amount, 1500.0);
    }

    #[test]
    fn skips_and_counts_unparseable_rows() {
        let file = write_csv(
            "Category,Date,Amount\n\
             Deli,2024-01-05,12000\n\
             Deli,not-a-date,500\n\
             ,2024-01-06,500\n\
             Bakery,2024-01-07,oops\n",
        );
        let (records, report) = load_table(file.path().to_str().unwrap(), &config::SALES).unwrap();
        assert_eq!(report.total_rows, 4);
        assert_eq!(report.loaded_rows, 1);
        assert_eq!(report.parse_errors, 3);
        assert_eq!(records[0].category, "Deli");
    }

    #[test]
    fn loads_financial_rows_with_month_names() {
        let file = write_csv(
            "Section,Month,Sales,Costs,Employees,Orders,Satisfaction\n\
             Kitchen,January,20000,15000,8,900,4.5\n\
             Bar,February,8000,6000,3,250,3.2\n",
        );
        let (records, report) =
            load_table(file.path().to_str().unwrap(), &config::FINANCIAL).unwrap();
        assert_eq!(report.loaded_rows, 2);
        let kitchen = &records[0];
        assert_eq!(kitchen.category, "Kitchen");
        assert_eq!(kitchen.amount, 20000.0);
        assert_eq!(kitchen.month, Some(1));
        assert_eq!(kitchen.costs, Some(15000.0));
        assert_eq!(kitchen.satisfaction, Some(4.5));
        assert!(kitchen.date.is_none());
        assert!(kitchen.weekday.is_none());
    }
}
