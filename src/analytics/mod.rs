/// Analytics over a filtered flight table: KPIs, group summaries and the
/// report that ties them together for one interaction.

pub mod aggregate;
pub mod metrics;
pub mod report;

use crate::data::model::{fields, FlightTable};

/// Result of a feature whose input columns may be missing.
#[derive(Debug, Clone, PartialEq)]
pub enum Availability<T> {
    Available(T),
    Unavailable { missing: Vec<String> },
}

impl<T> Availability<T> {
    /// The missing columns, if unavailable.
    pub fn missing(&self) -> Option<&[String]> {
        match self {
            Availability::Available(_) => None,
            Availability::Unavailable { missing } => Some(missing),
        }
    }

    pub fn available(self) -> Option<T> {
        match self {
            Availability::Available(v) => Some(v),
            Availability::Unavailable { .. } => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available(_))
    }
}

/// Dashboard features that depend on specific columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    DelayReasons,
    AirlinePerformance,
    RouteAnalysis,
    DistanceVsDelay,
    AircraftPerformance,
}

impl Feature {
    pub const ALL: [Feature; 5] = [
        Feature::DelayReasons,
        Feature::AirlinePerformance,
        Feature::RouteAnalysis,
        Feature::DistanceVsDelay,
        Feature::AircraftPerformance,
    ];

    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            Feature::DelayReasons => &[fields::DELAY_REASON],
            Feature::AirlinePerformance => &[fields::AIRLINE, fields::DELAY_MINUTES],
            Feature::RouteAnalysis => &[fields::ORIGIN, fields::DESTINATION],
            Feature::DistanceVsDelay => &[
                fields::ORIGIN,
                fields::DESTINATION,
                fields::DISTANCE,
                fields::DELAY_MINUTES,
            ],
            Feature::AircraftPerformance => &[fields::AIRCRAFT_TYPE, fields::DELAY_MINUTES],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Feature::DelayReasons => "Delay reasons",
            Feature::AirlinePerformance => "Airline performance",
            Feature::RouteAnalysis => "Route analysis",
            Feature::DistanceVsDelay => "Delay vs distance",
            Feature::AircraftPerformance => "Aircraft performance",
        }
    }

    /// Run `compute` only if the table has every required field.
    pub fn guard<T>(self, table: &FlightTable, compute: impl FnOnce() -> T) -> Availability<T> {
        let missing = table.missing_fields(self.required_fields());
        if missing.is_empty() {
            Availability::Available(compute())
        } else {
            log::debug!("{} unavailable, missing {missing:?}", self.label());
            Availability::Unavailable { missing }
        }
    }
}
