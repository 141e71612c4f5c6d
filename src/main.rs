mod app;
mod cli;
mod color;
mod state;
mod ui;

use app::FlightDashApp;
use clap::Parser;
use eframe::egui;
use flight_dash::config::Cli;
use flight_dash::data::store::FlightStore;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Cli::parse();
    // A missing or unreadable data file ends the process.
    let store = FlightStore::open(&args.data, args.load_options())?;

    if let Some(command) = args.command {
        return cli::run(store, command);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Flight Data Analytics Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(FlightDashApp::new(store)?))),
    )
    .map_err(|e| anyhow::anyhow!("running dashboard: {e}"))
}
