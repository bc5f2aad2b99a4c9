use std::collections::HashMap;

use restock_core::{DemandTable, ModelRow, ModelTable, StockLine, TransformError};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::warn;

const MONTHS_PER_YEAR: i64 = 12;

/// Positions and values of the purely numeric column labels.
pub fn year_columns(labels: &[String]) -> Vec<(usize, i32)> {
    labels
        .iter()
        .enumerate()
        .filter(|(_, label)| !label.is_empty() && label.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|(index, label)| label.parse().ok().map(|year| (index, year)))
        .collect()
}

/// Column positions of complete years, `start_year..current_year`.
pub fn averaging_window(labels: &[String], start_year: i32, current_year: i32) -> Vec<usize> {
    year_columns(labels)
        .into_iter()
        .filter(|(_, year)| start_year <= *year && *year < current_year)
        .map(|(index, _)| index)
        .collect()
}

/// Mean of the selected yearly totals.
///
/// `None` for an empty window, a position outside `yearly`, or a sum that
/// does not fit a `Decimal`.
pub fn trailing_average(yearly: &[Decimal], window: &[usize]) -> Option<Decimal> {
    if window.is_empty() {
        return None;
    }
    let sum = window.iter().try_fold(Decimal::ZERO, |total, &index| {
        total.checked_add(*yearly.get(index)?)
    })?;
    sum.checked_div(Decimal::from(window.len()))
}

/// Monthly need, rounded up.
pub fn monthly_projection(annual_forecast: Decimal) -> Option<i64> {
    (annual_forecast / Decimal::from(MONTHS_PER_YEAR))
        .ceil()
        .to_i64()
}

/// Half a month of cover, rounded up.
pub fn safety_stock(monthly_projection: i64) -> i64 {
    (Decimal::from(monthly_projection) / Decimal::TWO)
        .ceil()
        .to_i64()
        .unwrap_or(i64::MAX)
}

/// Shortfall between required stock and what is on hand, never negative.
/// A fractional shortfall is truncated. `None` when the shortfall does not
/// fit an `i64`.
pub fn recommended_purchase(required_stock: i64, on_hand: Decimal) -> Option<i64> {
    let shortfall = Decimal::from(required_stock).checked_sub(on_hand)?;
    if shortfall <= Decimal::ZERO {
        return Some(0);
    }
    shortfall.trunc().to_i64()
}

/// Inner-joins demand with filtered stock and derives the purchase columns.
///
/// Codes missing from either side are dropped. Stock lines sharing a code
/// resolve to the first one.
pub fn build_model(
    demand: &DemandTable,
    stock: &[StockLine],
    start_year: i32,
    current_year: i32,
) -> Result<ModelTable, TransformError> {
    let year_labels = demand.year_labels();
    let window = averaging_window(&year_labels, start_year, current_year);
    if window.is_empty() {
        return Err(TransformError::EmptyAverageWindow {
            start_year,
            current_year,
        });
    }

    let mut by_code: HashMap<&str, &StockLine> = HashMap::with_capacity(stock.len());
    let mut residual_duplicates = 0usize;
    for line in stock {
        if by_code.contains_key(line.code.as_str()) {
            residual_duplicates += 1;
        } else {
            by_code.insert(line.code.as_str(), line);
        }
    }
    if residual_duplicates > 0 {
        warn!(
            duplicates = residual_duplicates,
            "stock lines shared a code at join time, first occurrence kept"
        );
    }

    let mut rows = Vec::new();
    for (code, yearly) in &demand.rows {
        let Some(line) = by_code.get(code.as_str()) else {
            continue;
        };
        rows.push(model_row(code, yearly, line, &window)?);
    }

    Ok(ModelTable { year_labels, rows })
}

fn model_row(
    code: &str,
    yearly: &[Decimal],
    line: &StockLine,
    window: &[usize],
) -> Result<ModelRow, TransformError> {
    let overflow = || TransformError::QuantityOverflow {
        code: code.to_string(),
    };

    let annual_forecast = trailing_average(yearly, window).ok_or_else(overflow)?;
    let monthly_forecast = monthly_projection(annual_forecast).ok_or_else(overflow)?;
    let safety_stock = safety_stock(monthly_forecast);
    let required_stock = monthly_forecast
        .checked_add(safety_stock)
        .ok_or_else(overflow)?;
    let recommended_purchase =
        recommended_purchase(required_stock, line.quantity_on_hand).ok_or_else(overflow)?;

    Ok(ModelRow {
        code: code.to_string(),
        yearly_quantities: yearly.to_vec(),
        description: line.description.clone(),
        on_hand: line.quantity_on_hand,
        annual_forecast,
        monthly_forecast,
        safety_stock,
        required_stock,
        recommended_purchase,
    })
}
