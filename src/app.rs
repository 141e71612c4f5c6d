use eframe::egui;
use flight_dash::data::store::FlightStore;

use crate::state::AppState;
use crate::ui::{charts, panels, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct FlightDashApp {
    pub state: AppState,
}

impl FlightDashApp {
    pub fn new(store: FlightStore) -> anyhow::Result<Self> {
        Ok(Self {
            state: AppState::new(store)?,
        })
    }
}

impl eframe::App for FlightDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: KPIs, charts, raw data ----
        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(report) = &self.state.report else {
                ui.centered_and_justified(|ui| {
                    ui.heading("No flight data loaded  (File → Reload)");
                });
                return;
            };
            egui::ScrollArea::vertical()
                .id_salt("dashboard_scroll")
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    charts::kpi_row(ui, &report.kpis);
                    ui.add_space(8.0);
                    charts::performance_section(ui, report, &self.state.airline_colors);
                    ui.add_space(8.0);
                    charts::route_section(ui, report);
                    ui.add_space(8.0);
                    charts::aircraft_section(ui, report);
                    ui.add_space(8.0);
                    table::flight_table(ui, &report.table);
                });
        });
    }
}
