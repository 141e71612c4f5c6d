use eframe::egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};
use flight_dash::data::model::{CellValue, FlightTable};

const ROW_HEIGHT: f32 = 18.0;

// ---------------------------------------------------------------------------
// Raw data view of the filtered flights
// ---------------------------------------------------------------------------

pub fn flight_table(ui: &mut Ui, table: &FlightTable) {
    ui.label(RichText::new("Flight Data").size(20.0).strong());
    ui.separator();

    if table.columns().is_empty() {
        ui.label("No columns to show");
        return;
    }

    let columns = table.columns();
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .vscroll(true)
        .max_scroll_height(400.0)
        .columns(Column::auto().at_least(60.0).clip(true), columns.len())
        .header(ROW_HEIGHT + 4.0, |mut header| {
            for col in columns {
                header.col(|ui| {
                    ui.strong(&col.name);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, table.len(), |mut row| {
                let i = row.index();
                for col in columns {
                    row.col(|ui| {
                        ui.label(cell_text(&col.cells[i]));
                    });
                }
            });
        });
}

fn cell_text(cell: &CellValue) -> String {
    match cell {
        CellValue::Null => String::new(),
        other => other.to_string(),
    }
}
