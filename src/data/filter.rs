use std::collections::BTreeSet;

use chrono::NaiveDate;
use thiserror::Error;

use super::model::{fields, CellValue, FlightTable};

// ---------------------------------------------------------------------------
// Filter predicate: selected airlines plus an optional date range
// ---------------------------------------------------------------------------

/// Inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// What the user has selected.
///
/// An empty `airlines` set selects nothing.  `date_range == None` means no
/// date constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlightFilter {
    pub airlines: BTreeSet<String>,
    pub date_range: Option<DateRange>,
}

impl FlightFilter {
    /// Every airline selected, full date range when one can be computed.
    pub fn select_all(table: &FlightTable) -> Self {
        FlightFilter {
            airlines: airline_options(table).into_iter().collect(),
            date_range: date_bounds(table).ok(),
        }
    }
}

/// Why the date bounds of a table are unknown.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateBoundsError {
    #[error("column '{0}' is not present")]
    ColumnMissing(&'static str),
    #[error("column '{0}' has no parsed dates")]
    NoDates(&'static str),
}

/// A filtered copy of the base table plus anything the user should be told.
#[derive(Debug, Clone)]
pub struct Filtered {
    pub table: FlightTable,
    pub warnings: Vec<String>,
}

/// Distinct non-null airlines in order of first appearance.
pub fn airline_options(table: &FlightTable) -> Vec<String> {
    let Some(cells) = table.cells(fields::AIRLINE) else {
        return Vec::new();
    };
    let mut seen = BTreeSet::new();
    cells
        .iter()
        .filter_map(CellValue::to_field)
        .filter(|airline| seen.insert(airline.clone()))
        .collect()
}

/// Earliest and latest scheduled departure date.
pub fn date_bounds(table: &FlightTable) -> Result<DateRange, DateBoundsError> {
    let cells = table
        .cells(fields::SCHEDULED_DEPARTURE)
        .ok_or(DateBoundsError::ColumnMissing(fields::SCHEDULED_DEPARTURE))?;
    let mut dates = cells.iter().filter_map(|c| c.as_timestamp()).map(|ts| ts.date());
    let first = dates
        .next()
        .ok_or(DateBoundsError::NoDates(fields::SCHEDULED_DEPARTURE))?;
    let (start, end) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
    Ok(DateRange::new(start, end))
}

/// Return indices of flights that pass the filter, plus warnings for the
/// parts of the filter that could not be applied.
///
/// The airline filter runs first over the whole table; the date filter then
/// narrows its result.
pub fn filtered_indices(table: &FlightTable, filter: &FlightFilter) -> (Vec<usize>, Vec<String>) {
    let mut warnings = Vec::new();

    let mut indices: Vec<usize> = match table.cells(fields::AIRLINE) {
        Some(airlines) => airlines
            .iter()
            .enumerate()
            .filter(|(_, cell)| {
                cell.to_field()
                    .is_some_and(|airline| filter.airlines.contains(&airline))
            })
            .map(|(i, _)| i)
            .collect(),
        None => {
            warnings.push(format!(
                "Airline filter unavailable: column '{}' is not present",
                fields::AIRLINE
            ));
            (0..table.len()).collect()
        }
    };

    // The date filter needs a departure column with at least one parsed value.
    if let Some(range) = filter.date_range.filter(|_| !table.is_empty()) {
        match date_bounds(table) {
            Ok(_) => {
                if let Some(departures) = table.cells(fields::SCHEDULED_DEPARTURE) {
                    indices.retain(|&i| {
                        departures[i]
                            .as_timestamp()
                            .is_some_and(|ts| range.contains(ts.date()))
                    });
                }
            }
            Err(e) => warnings.push(format!("Could not filter by date range: {e}")),
        }
    }

    for w in &warnings {
        log::warn!("{w}");
    }
    (indices, warnings)
}

/// Apply the filter, producing a new table.  The source is never modified.
pub fn apply(table: &FlightTable, filter: &FlightFilter) -> Filtered {
    let (indices, warnings) = filtered_indices(table, filter);
    Filtered {
        table: table.select_rows(&indices),
        warnings,
    }
}
