use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use restock_core::{DemandTable, TransformError, UsageRecord};
use rust_decimal::Decimal;
use tracing::debug;

use crate::normalize::CodeNormalizer;

const DATE_TIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DemandAggregation {
    pub table: DemandTable,
    /// Rows whose date the source reported as missing.
    pub skipped_undated: usize,
    pub skipped_before_start: usize,
    pub skipped_without_code: usize,
}

/// Calendar year of a usage date as the source renders it.
pub fn parse_usage_year(raw: &str) -> Option<i32> {
    let value = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date.year());
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.year());
    }
    // postgres text form of timestamptz, e.g. "2023-04-01 08:30:00+00"
    if let Ok(timestamp) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(timestamp.year());
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|timestamp| timestamp.year())
}

/// Sums usage per (canonical code, year) and pivots to one row per code.
///
/// Year columns cover `start_year..=current_year` plus any later year that
/// shows up in the data. Any dated record whose date does not parse aborts
/// the aggregation.
pub fn aggregate_demand(
    records: &[UsageRecord],
    normalizer: &CodeNormalizer,
    start_year: i32,
    current_year: i32,
) -> Result<DemandAggregation, TransformError> {
    let mut aggregation = DemandAggregation::default();
    let mut totals: BTreeMap<(String, i32), Decimal> = BTreeMap::new();
    let mut years: BTreeSet<i32> = (start_year..=current_year).collect();

    for record in records {
        let code = normalizer.normalize_optional(record.product_code.as_deref());

        let Some(raw_date) = record.called_at.as_deref() else {
            aggregation.skipped_undated += 1;
            continue;
        };
        let year = parse_usage_year(raw_date).ok_or_else(|| TransformError::UnparsableDate {
            code: code.clone().unwrap_or_default(),
            value: raw_date.to_string(),
        })?;

        if year < start_year {
            aggregation.skipped_before_start += 1;
            continue;
        }
        let Some(code) = code else {
            aggregation.skipped_without_code += 1;
            continue;
        };

        years.insert(year);
        let total = totals.entry((code.clone(), year)).or_insert(Decimal::ZERO);
        *total = total
            .checked_add(record.quantity)
            .ok_or(TransformError::QuantityOverflow { code })?;
    }

    let years: Vec<i32> = years.into_iter().collect();
    let mut rows: BTreeMap<String, Vec<Decimal>> = BTreeMap::new();
    for ((code, year), quantity) in totals {
        let row = rows
            .entry(code)
            .or_insert_with(|| vec![Decimal::ZERO; years.len()]);
        if let Ok(index) = years.binary_search(&year) {
            row[index] = quantity;
        }
    }

    debug!(
        codes = rows.len(),
        years = years.len(),
        undated = aggregation.skipped_undated,
        before_start = aggregation.skipped_before_start,
        "aggregated usage history"
    );

    aggregation.table = DemandTable { years, rows };
    Ok(aggregation)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage(code: &str, date: &str, quantity: i64) -> UsageRecord {
        UsageRecord {
            product_code: Some(code.to_string()),
            called_at: Some(date.to_string()),
            quantity: Decimal::from(quantity),
        }
    }

    #[test]
    fn parses_the_date_shapes_sources_emit() {
        assert_eq!(parse_usage_year("2021-03-04"), Some(2021));
        assert_eq!(parse_usage_year("2021-03-04 10:11:12"), Some(2021));
        assert_eq!(parse_usage_year("2021-03-04 10:11:12.123"), Some(2021));
        assert_eq!(parse_usage_year("2021-03-04T10:11:12"), Some(2021));
        assert_eq!(parse_usage_year("2021-12-31T23:00:00-05:00"), Some(2021));
        assert_eq!(parse_usage_year("2022-01-01 00:00:00+00"), Some(2022));
        assert_eq!(parse_usage_year(" 2020-06-30 "), Some(2020));
        assert_eq!(parse_usage_year("30/06/2020"), None);
        assert_eq!(parse_usage_year(""), None);
    }

    #[test]
    fn fills_missing_years_with_zero() {
        let records = vec![usage("A", "2021-05-01", 4)];
        let result = aggregate_demand(&records, &CodeNormalizer::default(), 2020, 2022).unwrap();

        assert_eq!(result.table.years, vec![2020, 2021, 2022]);
        assert_eq!(
            result.table.rows["A"],
            vec![Decimal::ZERO, Decimal::from(4), Decimal::ZERO]
        );
    }

    #[test]
    fn future_years_extend_the_columns() {
        let records = vec![usage("A", "2026-01-01", 1)];
        let result = aggregate_demand(&records, &CodeNormalizer::default(), 2024, 2025).unwrap();
        assert_eq!(result.table.years, vec![2024, 2025, 2026]);
    }

    #[test]
    fn undated_rows_are_skipped_and_counted() {
        let mut undated = usage("A", "2021-01-01", 9);
        undated.called_at = None;
        let records = vec![undated, usage("A", "2021-01-01", 1)];

        let result = aggregate_demand(&records, &CodeNormalizer::default(), 2020, 2022).unwrap();
        assert_eq!(result.skipped_undated, 1);
        assert_eq!(result.table.quantity("A", 2021), Some(Decimal::ONE));
    }

    #[test]
    fn rows_without_code_do_not_form_a_group() {
        let mut anonymous = usage("A", "2021-01-01", 9);
        anonymous.product_code = None;

        let result =
            aggregate_demand(&[anonymous], &CodeNormalizer::default(), 2020, 2022).unwrap();
        assert_eq!(result.skipped_without_code, 1);
        assert!(result.table.is_empty());
    }
}
