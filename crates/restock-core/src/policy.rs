use chrono::{Datelike, Local};

pub const DEFAULT_SUFFIXES: [&str; 5] = ["-REC", "-R", "REC", "-1", "-A"];
pub const DEFAULT_START_YEAR: i32 = 2020;
pub const DEFAULT_WAREHOUSE: &str = "8";

/// Knobs of the forecasting transform, passed explicitly to each component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastPolicy {
    /// Product-code suffix variants collapsed onto the base code.
    pub suffix_set: Vec<String>,
    /// First calendar year that counts as history.
    pub start_year: i32,
    /// Warehouse whose on-hand stock is compared against the forecast.
    pub target_warehouse: String,
    /// Fixes the "current" year; the local calendar year is used when unset.
    pub current_year: Option<i32>,
}

impl Default for ForecastPolicy {
    fn default() -> Self {
        Self {
            suffix_set: DEFAULT_SUFFIXES.iter().map(|s| s.to_string()).collect(),
            start_year: DEFAULT_START_YEAR,
            target_warehouse: DEFAULT_WAREHOUSE.to_string(),
            current_year: None,
        }
    }
}

impl ForecastPolicy {
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = Some(year);
        self
    }

    pub fn with_start_year(mut self, year: i32) -> Self {
        self.start_year = year;
        self
    }

    pub fn with_target_warehouse(mut self, warehouse: impl Into<String>) -> Self {
        self.target_warehouse = warehouse.into();
        self
    }

    pub fn resolved_current_year(&self) -> i32 {
        self.current_year.unwrap_or_else(|| Local::now().year())
    }
}
