use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::data::export::EXPORT_FILE_NAME;
use crate::data::filter::{self, DateRange, FlightFilter};
use crate::data::loader::LoadOptions;
use crate::data::model::FlightTable;
use crate::data::timestamp::TimestampPolicy;

/// Input file used when nothing else is configured.
pub const DEFAULT_DATA_PATH: &str = "cleaned_Merged_flight_data.csv";

/// Flight operations analytics dashboard.
///
/// Without a subcommand the desktop dashboard opens.
#[derive(Debug, Parser)]
#[command(name = "flight-dash", version, about)]
pub struct Cli {
    /// Flight data file (.csv, .json or .parquet)
    #[arg(long, short, env = "FLIGHT_DASH_DATA", default_value = DEFAULT_DATA_PATH)]
    pub data: PathBuf,

    /// How timestamp columns are parsed
    #[arg(
        long,
        value_enum,
        env = "FLIGHT_DASH_TIMESTAMP_FORMAT",
        default_value_t = TimestampPolicy::Auto
    )]
    pub timestamp_format: TimestampPolicy,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            timestamp_policy: self.timestamp_format,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print KPIs and group summaries for a selection
    Summary(SelectionArgs),
    /// Write the selected flights to CSV
    Export {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Destination file
        #[arg(long, short, default_value = EXPORT_FILE_NAME)]
        output: PathBuf,
    },
}

/// Headless equivalent of the dashboard's filter controls.
#[derive(Debug, Clone, Default, Args)]
pub struct SelectionArgs {
    /// Airline to include (repeatable); all airlines when omitted
    #[arg(long = "airline")]
    pub airlines: Vec<String>,

    /// First departure date to include (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last departure date to include (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

impl SelectionArgs {
    /// Resolve against the loaded table: missing airlines mean all, a
    /// missing bound falls back to the observed min/max.
    pub fn to_filter(&self, table: &FlightTable) -> FlightFilter {
        let airlines: BTreeSet<String> = if self.airlines.is_empty() {
            filter::airline_options(table).into_iter().collect()
        } else {
            self.airlines.iter().cloned().collect()
        };

        let date_range = match (self.from, self.to, filter::date_bounds(table)) {
            (None, None, _) => None,
            (_, _, Err(e)) => {
                log::warn!("Date filtering unavailable: {e}");
                None
            }
            (start, end, Ok(bounds)) => Some(DateRange::new(
                start.unwrap_or(bounds.start),
                end.unwrap_or(bounds.end),
            )),
        };

        FlightFilter {
            airlines,
            date_range,
        }
    }
}
