use std::collections::BTreeMap;

use rust_decimal::Decimal;

/// Header labels of the published model table.
pub mod columns {
    pub const CODE: &str = "CODIGO PRODUCTO NORM";
    pub const DESCRIPTION: &str = "DesProd";
    pub const ON_HAND: &str = "disponible_en_bodega";
    pub const ANNUAL_FORECAST: &str = "PREDICCION_ANUAL";
    pub const MONTHLY_FORECAST: &str = "PREDICCION_MENSUAL";
    pub const SAFETY_STOCK: &str = "STOCK_DE_SEGURIDAD";
    pub const REQUIRED_STOCK: &str = "STOCK_NECESARIO_TOTAL";
    pub const RECOMMENDED_PURCHASE: &str = "COMPRA_RECOMENDADA";

    pub const DERIVED: [&str; 5] = [
        ANNUAL_FORECAST,
        MONTHLY_FORECAST,
        SAFETY_STOCK,
        REQUIRED_STOCK,
        RECOMMENDED_PURCHASE,
    ];
}

/// One historical parts-usage line as read from the source.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageRecord {
    pub product_code: Option<String>,
    /// Raw date text. `None` means the source marked the date as missing.
    pub called_at: Option<String>,
    pub quantity: Decimal,
}

/// Current stock of one product in one warehouse.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryRecord {
    pub product_code: Option<String>,
    pub warehouse_code: String,
    pub description: String,
    pub quantity_on_hand: Decimal,
}

/// Both read-only result sets of a single source round trip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceSnapshot {
    pub usage: Vec<UsageRecord>,
    pub inventory: Vec<InventoryRecord>,
}

/// Inventory projected to the join key, after warehouse filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct StockLine {
    pub code: String,
    pub description: String,
    pub quantity_on_hand: Decimal,
}

/// Yearly usage per canonical code.
///
/// Every row carries a value for every year in `years`; absent
/// combinations are stored as zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DemandTable {
    pub years: Vec<i32>,
    pub rows: BTreeMap<String, Vec<Decimal>>,
}

impl DemandTable {
    /// Year labels as plain strings, ascending.
    pub fn year_labels(&self) -> Vec<String> {
        self.years.iter().map(|year| year.to_string()).collect()
    }

    pub fn quantity(&self, code: &str, year: i32) -> Option<Decimal> {
        let index = self.years.iter().position(|candidate| *candidate == year)?;
        self.rows
            .get(code)
            .and_then(|values| values.get(index).copied())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelRow {
    pub code: String,
    /// Aligned with `ModelTable::year_labels`.
    pub yearly_quantities: Vec<Decimal>,
    pub description: String,
    pub on_hand: Decimal,
    pub annual_forecast: Decimal,
    pub monthly_forecast: i64,
    pub safety_stock: i64,
    pub required_stock: i64,
    pub recommended_purchase: i64,
}

/// Final recommendation table, one row per canonical code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelTable {
    pub year_labels: Vec<String>,
    pub rows: Vec<ModelRow>,
}

impl ModelTable {
    /// Column labels in publish order.
    pub fn header(&self) -> Vec<String> {
        let mut header = Vec::with_capacity(self.year_labels.len() + 8);
        header.push(columns::CODE.to_string());
        header.extend(self.year_labels.iter().cloned());
        header.push(columns::DESCRIPTION.to_string());
        header.push(columns::ON_HAND.to_string());
        header.extend(columns::DERIVED.iter().map(|label| label.to_string()));
        header
    }

    pub fn row(&self, code: &str) -> Option<&ModelRow> {
        self.rows.iter().find(|row| row.code == code)
    }

    pub fn parts_to_purchase(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| row.recommended_purchase > 0)
            .count()
    }

    pub fn total_recommended_units(&self) -> i64 {
        self.rows.iter().map(|row| row.recommended_purchase).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_places_years_between_code_and_description() {
        let table = ModelTable {
            year_labels: vec!["2023".to_string(), "2024".to_string()],
            rows: Vec::new(),
        };

        assert_eq!(
            table.header(),
            vec![
                "CODIGO PRODUCTO NORM",
                "2023",
                "2024",
                "DesProd",
                "disponible_en_bodega",
                "PREDICCION_ANUAL",
                "PREDICCION_MENSUAL",
                "STOCK_DE_SEGURIDAD",
                "STOCK_NECESARIO_TOTAL",
                "COMPRA_RECOMENDADA",
            ]
        );
    }

    #[test]
    fn demand_lookup_by_code_and_year() {
        let mut rows = BTreeMap::new();
        rows.insert("X".to_string(), vec![Decimal::from(3), Decimal::ZERO]);
        let table = DemandTable {
            years: vec![2022, 2023],
            rows,
        };

        assert_eq!(table.quantity("X", 2022), Some(Decimal::from(3)));
        assert_eq!(table.quantity("X", 2023), Some(Decimal::ZERO));
        assert_eq!(table.quantity("X", 2021), None);
        assert_eq!(table.quantity("Y", 2022), None);
        assert_eq!(table.year_labels(), vec!["2022", "2023"]);
    }

    #[test]
    fn short_demand_row_yields_none() {
        let mut rows = BTreeMap::new();
        rows.insert("X".to_string(), vec![Decimal::from(3)]);
        let table = DemandTable {
            years: vec![2022, 2023],
            rows,
        };

        assert_eq!(table.quantity("X", 2022), Some(Decimal::from(3)));
        assert_eq!(table.quantity("X", 2023), None);
    }
}
