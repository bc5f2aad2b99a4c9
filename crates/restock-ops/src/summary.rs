use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use restock_core::ModelTable;
use restock_platform::RunReport;
use rust_decimal::Decimal;

const PREVIEW_ROWS: usize = 20;

pub fn print_report(report: &RunReport) {
    println!("Model published to {}", report.receipt.location);
    println!("Run: {}", report.run_id);
    println!("{}", preview_table(&report.table, PREVIEW_ROWS));
    if report.table.rows.len() > PREVIEW_ROWS {
        println!(
            "... {} more rows in the published document",
            report.table.rows.len() - PREVIEW_ROWS
        );
    }
    println!(
        "Parts: {}  Needing purchase: {}  Units to buy: {}",
        report.table.rows.len(),
        report.table.parts_to_purchase(),
        report.table.total_recommended_units()
    );
}

pub fn failure_line(stage: &str, message: &str) -> String {
    format!("error: {stage} stage failed: {message}")
}

pub fn preview_table(model: &ModelTable, limit: usize) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            model
                .header()
                .into_iter()
                .map(|label| Cell::new(label).add_attribute(Attribute::Bold)),
        );

    for row in model.rows.iter().take(limit) {
        let mut cells = Vec::with_capacity(row.yearly_quantities.len() + 8);
        cells.push(Cell::new(&row.code));
        cells.extend(
            row.yearly_quantities
                .iter()
                .map(|value| number_cell(decimal(*value))),
        );
        cells.push(Cell::new(&row.description));
        cells.push(number_cell(decimal(row.on_hand)));
        cells.push(number_cell(decimal(row.annual_forecast.round_dp(2))));
        cells.push(number_cell(row.monthly_forecast.to_string()));
        cells.push(number_cell(row.safety_stock.to_string()));
        cells.push(number_cell(row.required_stock.to_string()));
        let purchase = number_cell(row.recommended_purchase.to_string());
        cells.push(if row.recommended_purchase > 0 {
            purchase.fg(Color::Yellow).add_attribute(Attribute::Bold)
        } else {
            purchase
        });
        table.add_row(cells);
    }
    table
}

fn number_cell(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

fn decimal(value: Decimal) -> String {
    value.normalize().to_string()
}
