//! Parts-procurement forecast: normalize codes, bucket usage by year, join
//! with warehouse stock and derive a purchase recommendation per part.

pub mod demand;
pub mod export;
pub mod model;
pub mod normalize;
pub mod stock;

use restock_core::{ForecastPolicy, ModelTable, SourceSnapshot, TransformError};
use tracing::info;

pub use demand::{DemandAggregation, aggregate_demand, parse_usage_year};
pub use export::to_csv;
pub use model::{
    averaging_window, build_model, monthly_projection, recommended_purchase, safety_stock,
    trailing_average, year_columns,
};
pub use normalize::{CodeNormalizer, normalize_code};
pub use stock::{FilteredStock, filter_inventory};

/// Bookkeeping of a transform pass, for the run log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForecastStats {
    pub usage_records: usize,
    pub inventory_records: usize,
    pub demand_codes: usize,
    pub stock_codes: usize,
    pub undated_usage: usize,
    pub duplicate_stock: usize,
    pub model_rows: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub table: ModelTable,
    pub stats: ForecastStats,
}

/// Runs the full transform over one source snapshot.
pub fn forecast(
    snapshot: &SourceSnapshot,
    policy: &ForecastPolicy,
) -> Result<Forecast, TransformError> {
    let current_year = policy.resolved_current_year();
    let normalizer = CodeNormalizer::from_policy(policy);

    let demand = aggregate_demand(&snapshot.usage, &normalizer, policy.start_year, current_year)?;
    let stock = filter_inventory(&snapshot.inventory, &normalizer, &policy.target_warehouse);
    let table = build_model(&demand.table, &stock.lines, policy.start_year, current_year)?;

    let stats = ForecastStats {
        usage_records: snapshot.usage.len(),
        inventory_records: snapshot.inventory.len(),
        demand_codes: demand.table.len(),
        stock_codes: stock.lines.len(),
        undated_usage: demand.skipped_undated,
        duplicate_stock: stock.duplicates,
        model_rows: table.rows.len(),
    };
    info!(
        current_year,
        start_year = policy.start_year,
        warehouse = %policy.target_warehouse,
        demand_codes = stats.demand_codes,
        stock_codes = stats.stock_codes,
        model_rows = stats.model_rows,
        "forecast model built"
    );

    Ok(Forecast { table, stats })
}
