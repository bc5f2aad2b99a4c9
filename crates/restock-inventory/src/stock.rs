use std::collections::HashSet;

use restock_core::{InventoryRecord, StockLine};
use tracing::warn;

use crate::normalize::CodeNormalizer;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredStock {
    pub lines: Vec<StockLine>,
    /// Rows dropped because an earlier row already claimed the canonical code.
    pub duplicates: usize,
    pub other_warehouses: usize,
}

/// Keeps the target warehouse's rows, keyed by canonical code.
///
/// The first row for each canonical code wins; later ones are counted in
/// `duplicates`.
pub fn filter_inventory(
    records: &[InventoryRecord],
    normalizer: &CodeNormalizer,
    target_warehouse: &str,
) -> FilteredStock {
    let mut filtered = FilteredStock::default();
    let mut seen: HashSet<String> = HashSet::new();

    for record in records {
        if record.warehouse_code != target_warehouse {
            filtered.other_warehouses += 1;
            continue;
        }
        let Some(code) = normalizer.normalize_optional(record.product_code.as_deref()) else {
            continue;
        };
        if !seen.insert(code.clone()) {
            filtered.duplicates += 1;
            continue;
        }
        filtered.lines.push(StockLine {
            code,
            description: record.description.clone(),
            quantity_on_hand: record.quantity_on_hand,
        });
    }

    if filtered.duplicates > 0 {
        warn!(
            warehouse = target_warehouse,
            duplicates = filtered.duplicates,
            "collapsed inventory rows sharing a canonical code, first occurrence kept"
        );
    }

    filtered
}
