use std::collections::BTreeSet;
use std::fmt;

use anyhow::{bail, Result};
use chrono::NaiveDateTime;

// ---------------------------------------------------------------------------
// Field names
// ---------------------------------------------------------------------------

/// Column names the dashboard knows about.  None of them is guaranteed to be
/// present in a loaded table.
pub mod fields {
    pub const FLIGHT_ID: &str = "FlightID";
    pub const AIRLINE: &str = "Airline";
    pub const ORIGIN: &str = "Origin";
    pub const DESTINATION: &str = "Destination";
    pub const SCHEDULED_DEPARTURE: &str = "ScheduledDeparture";
    pub const ACTUAL_DEPARTURE: &str = "ActualDeparture";
    pub const SCHEDULED_ARRIVAL: &str = "ScheduledArrival";
    pub const ACTUAL_ARRIVAL: &str = "ActualArrival";
    pub const DELAY_MINUTES: &str = "DelayMinutes";
    pub const DELAY_REASON: &str = "DelayReason";
    pub const CANCELLED: &str = "Cancelled";
    pub const AIRCRAFT_TYPE: &str = "AircraftType";
    pub const DISTANCE: &str = "Distance";
    /// Derived: `Origin - Destination`.
    pub const ROUTE: &str = "Route";

    /// Columns parsed as timestamps at load time.
    pub const TIMESTAMPS: [&str; 4] = [
        SCHEDULED_DEPARTURE,
        ACTUAL_DEPARTURE,
        SCHEDULED_ARRIVAL,
        ACTUAL_ARRIVAL,
    ];
}

/// Rendering used for timestamps in exports and grouping keys.
pub const TIMESTAMP_OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ---------------------------------------------------------------------------
// CellValue – a single cell of the flight table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring common dataframe dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Timestamp(NaiveDateTime),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:.2}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M")),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Guess the type of a raw text field.
    pub fn guess(raw: &str) -> CellValue {
        let s = raw.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("nan") {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
        if s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false") {
            return CellValue::Bool(s.eq_ignore_ascii_case("true"));
        }
        CellValue::String(s.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Interpret the value as an `f64`; booleans count as 0/1 like a flag
    /// column summed by a dataframe library.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if v.is_nan() => None,
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// Lossless text form, used for CSV export and as a grouping key.
    /// `None` for nulls.
    pub fn to_field(&self) -> Option<String> {
        match self {
            CellValue::String(s) => Some(s.clone()),
            CellValue::Integer(i) => Some(i.to_string()),
            CellValue::Float(v) if v.is_nan() => None,
            CellValue::Float(v) => Some(v.to_string()),
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::Timestamp(ts) => Some(ts.format(TIMESTAMP_OUTPUT_FORMAT).to_string()),
            CellValue::Null => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Column / FlightTable
// ---------------------------------------------------------------------------

/// One named column of the table.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub cells: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, cells: Vec<CellValue>) -> Self {
        Column {
            name: name.into(),
            cells,
        }
    }
}

/// The loaded flight records, stored column by column.
///
/// Only the derived [`fields::ROUTE`] column is ever added after load; every
/// other operation produces a new table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlightTable {
    columns: Vec<Column>,
    n_rows: usize,
}

impl FlightTable {
    /// Build a table, checking that all columns have the same length.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let n_rows = columns.first().map(|c| c.cells.len()).unwrap_or(0);
        for col in &columns {
            if col.cells.len() != n_rows {
                bail!(
                    "Column '{}' has {} values, expected {n_rows}",
                    col.name,
                    col.cells.len()
                );
            }
        }
        let mut seen = BTreeSet::new();
        for col in &columns {
            if !seen.insert(col.name.as_str()) {
                bail!("Duplicate column '{}'", col.name);
            }
        }
        Ok(FlightTable { columns, n_rows })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.n_rows
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in file order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Which of `required` are absent, in the order given.
    pub fn missing_fields(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|name| !self.has_column(name))
            .map(|name| name.to_string())
            .collect()
    }

    /// Cells of a column, if present.
    pub fn cells(&self, name: &str) -> Option<&[CellValue]> {
        self.column(name).map(|c| c.cells.as_slice())
    }

    /// A new table holding only the given rows, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> FlightTable {
        let columns = self
            .columns
            .iter()
            .map(|col| Column {
                name: col.name.clone(),
                cells: indices.iter().map(|&i| col.cells[i].clone()).collect(),
            })
            .collect();
        FlightTable {
            columns,
            n_rows: indices.len(),
        }
    }

    /// Add a column, replacing one of the same name in place.
    pub fn set_column(&mut self, column: Column) -> Result<()> {
        if column.cells.len() != self.n_rows && !self.columns.is_empty() {
            bail!(
                "Column '{}' has {} values, table has {} rows",
                column.name,
                column.cells.len(),
                self.n_rows
            );
        }
        if self.columns.is_empty() {
            self.n_rows = column.cells.len();
        }
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
        Ok(())
    }
}
