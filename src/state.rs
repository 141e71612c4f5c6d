use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use flight_dash::analytics::report::DashboardReport;
use flight_dash::data::export::export_to_path;
use flight_dash::data::filter::{airline_options, date_bounds, DateRange, FlightFilter};
use flight_dash::data::model::FlightTable;
use flight_dash::data::store::FlightStore;

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Owner of the base table.
    pub store: FlightStore,

    /// Base table (None until a load succeeds).
    pub dataset: Option<Arc<FlightTable>>,

    /// Distinct airlines, first-seen order.
    pub airlines: Vec<String>,

    /// Current airline / date selection.
    pub filter: FlightFilter,

    /// Observed departure date range; `None` disables the date pickers.
    pub date_bounds: Option<DateRange>,

    /// Why the date pickers are disabled.
    pub date_warning: Option<String>,

    /// Report for the current selection (recomputed on every change).
    pub report: Option<DashboardReport>,

    /// Stable airline colours across charts.
    pub airline_colors: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Take the store's table (loading it if needed) and select everything.
    pub fn new(store: FlightStore) -> Result<Self> {
        let mut state = AppState {
            store,
            dataset: None,
            airlines: Vec::new(),
            filter: FlightFilter::default(),
            date_bounds: None,
            date_warning: None,
            report: None,
            airline_colors: ColorMap::default(),
            status_message: None,
        };
        let table = state.store.table()?;
        state.set_dataset(table);
        Ok(state)
    }

    /// Ingest a newly loaded table and reset the selection to everything.
    pub fn set_dataset(&mut self, dataset: Arc<FlightTable>) {
        self.airlines = airline_options(&dataset);
        self.airline_colors = ColorMap::new(self.airlines.iter().map(String::as_str));

        match date_bounds(&dataset) {
            Ok(bounds) => {
                self.date_bounds = Some(bounds);
                self.date_warning = None;
            }
            Err(e) => {
                log::warn!("Date filtering unavailable: {e}");
                self.date_bounds = None;
                self.date_warning = Some(format!("Date filtering unavailable: {e}"));
            }
        }

        self.filter = FlightFilter {
            airlines: self.airlines.iter().cloned().collect(),
            date_range: self.date_bounds,
        };
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refresh();
    }

    /// Recompute the report from the base table and the current selection.
    pub fn refresh(&mut self) {
        self.report = self
            .dataset
            .as_ref()
            .map(|base| DashboardReport::build(base, &self.filter));
    }

    /// Re-read the file from disk.
    pub fn reload(&mut self) {
        match self.store.reload() {
            Ok(table) => self.set_dataset(table),
            Err(e) => self.fail("Reload failed", &e),
        }
    }

    /// Toggle one airline in the selection.
    pub fn toggle_airline(&mut self, airline: &str) {
        if !self.filter.airlines.remove(airline) {
            self.filter.airlines.insert(airline.to_string());
        }
        self.refresh();
    }

    pub fn select_all_airlines(&mut self) {
        self.filter.airlines = self.airlines.iter().cloned().collect();
        self.refresh();
    }

    pub fn select_no_airlines(&mut self) {
        self.filter.airlines.clear();
        self.refresh();
    }

    /// Set the date range, clamped to the observed bounds.
    pub fn set_date_range(&mut self, range: DateRange) {
        let Some(bounds) = self.date_bounds else {
            return;
        };
        let start = range.start.clamp(bounds.start, bounds.end);
        let end = range.end.clamp(bounds.start, bounds.end);
        self.filter.date_range = Some(DateRange::new(start, end.max(start)));
        self.refresh();
    }

    /// Write the currently filtered flights to `path`.
    pub fn export(&mut self, path: &Path) -> Result<()> {
        let Some(report) = &self.report else {
            anyhow::bail!("No data loaded");
        };
        export_to_path(&report.table, path)?;
        self.status_message = Some(format!(
            "Exported {} flights to {}",
            report.table.len(),
            path.display()
        ));
        Ok(())
    }

    fn fail(&mut self, what: &str, e: &anyhow::Error) {
        log::error!("{what}: {e:#}");
        self.status_message = Some(format!("Error: {e:#}"));
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use chrono::NaiveDate;
    use flight_dash::data::loader::LoadOptions;

    use super::*;

    const CSV: &str = "\
FlightID,Airline,ScheduledDeparture,DelayMinutes,Cancelled
1,AA,01-03-2024 08:00,5,0
2,DL,05-03-2024 08:00,-1,1
3,AA,09-03-2024 08:00,0,0
";

    fn state_for(body: &str) -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flights.csv");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(body.as_bytes())
            .unwrap();
        let state = AppState::new(FlightStore::new(path, LoadOptions::default())).unwrap();
        (dir, state)
    }

    fn total(state: &AppState) -> usize {
        state.report.as_ref().map(|r| r.kpis.total_flights).unwrap_or(0)
    }

    #[test]
    fn starts_with_everything_selected() {
        let (_dir, state) = state_for(CSV);
        assert_eq!(state.airlines, vec!["AA", "DL"]);
        assert_eq!(total(&state), 3);
        assert!(state.date_warning.is_none());
    }

    #[test]
    fn interactions_recompute_report() {
        let (_dir, mut state) = state_for(CSV);
        state.toggle_airline("DL");
        assert_eq!(total(&state), 2);
        state.select_no_airlines();
        assert_eq!(total(&state), 0);
        state.select_all_airlines();

        let d = |day| NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
        state.set_date_range(DateRange::new(d(4), d(30)));
        assert_eq!(state.filter.date_range, Some(DateRange::new(d(4), d(9))));
        assert_eq!(total(&state), 2);
    }

    #[test]
    fn missing_dates_disable_pickers() {
        let (_dir, state) = state_for("FlightID,Airline\n1,AA\n");
        assert!(state.date_bounds.is_none());
        assert!(state.date_warning.is_some());
        assert_eq!(total(&state), 1);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(FlightStore::new(
            dir.path().join("missing.csv"),
            LoadOptions::default(),
        ));
        assert!(state.is_err());
    }

    #[test]
    fn export_writes_filtered_rows() {
        let (dir, mut state) = state_for(CSV);
        state.toggle_airline("AA");
        let out = dir.path().join("out.csv");
        state.export(&out).unwrap();
        let text = std::fs::read_to_string(out).unwrap();
        assert_eq!(text.lines().count(), 2);
    }
}
