use restock_core::{ModelRow, ModelTable, PublishError};
use rust_decimal::Decimal;

const FORECAST_DECIMALS: u32 = 4;

/// Renders the model as CSV with a single header row.
pub fn to_csv(table: &ModelTable) -> Result<Vec<u8>, PublishError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.header()).map_err(serialize_error)?;
    for row in &table.rows {
        writer.write_record(record(row)).map_err(serialize_error)?;
    }
    writer.into_inner().map_err(|err| PublishError::Serialize {
        reason: err.error().to_string(),
    })
}

fn record(row: &ModelRow) -> Vec<String> {
    let mut fields = Vec::with_capacity(row.yearly_quantities.len() + 8);
    fields.push(row.code.clone());
    fields.extend(row.yearly_quantities.iter().map(|value| decimal(*value)));
    fields.push(row.description.clone());
    fields.push(decimal(row.on_hand));
    fields.push(decimal(row.annual_forecast.round_dp(FORECAST_DECIMALS)));
    fields.push(row.monthly_forecast.to_string());
    fields.push(row.safety_stock.to_string());
    fields.push(row.required_stock.to_string());
    fields.push(row.recommended_purchase.to_string());
    fields
}

fn decimal(value: Decimal) -> String {
    value.normalize().to_string()
}

fn serialize_error(err: csv::Error) -> PublishError {
    PublishError::Serialize {
        reason: err.to_string(),
    }
}
