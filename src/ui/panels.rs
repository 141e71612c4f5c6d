use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;
use flight_dash::data::export::EXPORT_FILE_NAME;
use flight_dash::data::filter::DateRange;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    ScrollArea::vertical()
        .id_salt("filter_scroll")
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            airline_filter(ui, state);
            ui.separator();
            date_filter(ui, state);

            if let Some(report) = &state.report {
                for w in &report.warnings {
                    ui.label(RichText::new(w).color(Color32::from_rgb(230, 160, 40)));
                }
            }
        });
}

fn airline_filter(ui: &mut Ui, state: &mut AppState) {
    let n_selected = state.filter.airlines.len();
    let n_total = state.airlines.len();
    ui.strong(format!("Airlines  ({n_selected}/{n_total})"));

    if n_total == 0 {
        ui.label("Airline data not available");
        return;
    }

    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            state.select_all_airlines();
        }
        if ui.small_button("None").clicked() {
            state.select_no_airlines();
        }
    });

    // Clone so the checkbox loop can mutate state.
    let airlines = state.airlines.clone();
    for airline in &airlines {
        let mut checked = state.filter.airlines.contains(airline);
        let text = RichText::new(airline).color(state.airline_colors.color_for(airline));
        if ui.checkbox(&mut checked, text).changed() {
            state.toggle_airline(airline);
        }
    }
}

fn date_filter(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Scheduled departure");

    let (Some(bounds), Some(current)) = (state.date_bounds, state.filter.date_range) else {
        let msg = state
            .date_warning
            .clone()
            .unwrap_or_else(|| "Date data not available for filtering".to_string());
        ui.label(RichText::new(msg).color(Color32::from_rgb(230, 160, 40)));
        return;
    };

    let mut start = current.start;
    let mut end = current.end;
    egui::Grid::new("date_range").num_columns(2).show(ui, |ui: &mut Ui| {
        ui.label("From");
        ui.add(DatePickerButton::new(&mut start).id_salt("date_from"));
        ui.end_row();
        ui.label("To");
        ui.add(DatePickerButton::new(&mut end).id_salt("date_to"));
        ui.end_row();
    });

    if start != current.start || end != current.end {
        state.set_date_range(DateRange::new(start, end));
    }
    if ui.small_button("Full range").clicked() {
        state.set_date_range(bounds);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
            if ui
                .add_enabled(state.report.is_some(), egui::Button::new("Export filtered CSV…"))
                .clicked()
            {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(report)) = (&state.dataset, &state.report) {
            ui.label(format!(
                "{} flights loaded, {} shown  ({})",
                ds.len(),
                report.table.len(),
                state.store.path().display()
            ));
        }

        if let Some(msg) = &state.status_message {
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                Color32::GRAY
            };
            ui.separator();
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn export_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export filtered flights")
        .set_file_name(EXPORT_FILE_NAME)
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        if let Err(e) = state.export(&path) {
            log::error!("Failed to export: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
