use chrono::{DateTime, NaiveDate, NaiveDateTime};
use clap::ValueEnum;

use super::model::CellValue;

/// Day-first pattern tried first for every timestamp column.
pub const DAY_FIRST: &str = "%d-%m-%Y %H:%M";
/// Month-first fallback.
pub const MONTH_FIRST: &str = "%m-%d-%Y %H:%M";

/// Formats tried, in order, when neither explicit pattern fits a column.
/// Values are tried one at a time, so day-first and month-first rows can mix.
const INFERRED_DATETIME_FORMATS: &[&str] = &[
    DAY_FIRST,
    MONTH_FIRST,
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%m-%d-%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

const INFERRED_DATE_FORMATS: &[&str] =
    &["%Y-%m-%d", "%d-%m-%Y", "%m-%d-%Y", "%d/%m/%Y", "%m/%d/%Y"];

/// How timestamp columns are interpreted at load time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum TimestampPolicy {
    /// Day-first, then month-first (each validated against the whole
    /// column), then per-value inference.
    #[default]
    Auto,
    /// Every value must match `%d-%m-%Y %H:%M`.
    DayFirst,
    /// Every value must match `%m-%d-%Y %H:%M`.
    MonthFirst,
}

/// Which reading a column ended up with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedFormat {
    DayFirst,
    MonthFirst,
    Inferred,
}

/// Outcome of parsing one timestamp column.
#[derive(Debug, Clone)]
pub struct ParsedColumn {
    pub cells: Vec<CellValue>,
    pub format: ResolvedFormat,
    /// Both explicit patterns fit every value but disagree on at least one.
    pub ambiguous: bool,
    /// Non-null inputs that became null.
    pub failures: usize,
}

/// Parse a raw column under the given policy.  Failures become nulls.
pub fn parse_column(raw: &[CellValue], policy: TimestampPolicy) -> ParsedColumn {
    match policy {
        TimestampPolicy::DayFirst => parse_with(raw, DAY_FIRST, ResolvedFormat::DayFirst),
        TimestampPolicy::MonthFirst => parse_with(raw, MONTH_FIRST, ResolvedFormat::MonthFirst),
        TimestampPolicy::Auto => parse_auto(raw),
    }
}

fn parse_auto(raw: &[CellValue]) -> ParsedColumn {
    let day_first = parse_with(raw, DAY_FIRST, ResolvedFormat::DayFirst);
    let month_first = parse_with(raw, MONTH_FIRST, ResolvedFormat::MonthFirst);

    match (day_first.failures, month_first.failures) {
        (0, 0) => {
            let ambiguous = day_first.cells != month_first.cells;
            ParsedColumn {
                ambiguous,
                ..day_first
            }
        }
        (0, _) => day_first,
        (_, 0) => month_first,
        _ => {
            let mut failures = 0;
            let cells = raw
                .iter()
                .map(|cell| {
                    if cell.is_null() {
                        return CellValue::Null;
                    }
                    match infer(cell) {
                        Some(ts) => CellValue::Timestamp(ts),
                        None => {
                            failures += 1;
                            CellValue::Null
                        }
                    }
                })
                .collect();
            ParsedColumn {
                cells,
                format: ResolvedFormat::Inferred,
                ambiguous: false,
                failures,
            }
        }
    }
}

fn parse_with(raw: &[CellValue], pattern: &str, format: ResolvedFormat) -> ParsedColumn {
    let mut failures = 0;
    let cells = raw
        .iter()
        .map(|cell| match cell {
            CellValue::Null => CellValue::Null,
            CellValue::Timestamp(ts) => CellValue::Timestamp(*ts),
            CellValue::String(s) => match NaiveDateTime::parse_from_str(s.trim(), pattern) {
                Ok(ts) => CellValue::Timestamp(ts),
                Err(_) => {
                    failures += 1;
                    CellValue::Null
                }
            },
            _ => {
                failures += 1;
                CellValue::Null
            }
        })
        .collect();
    ParsedColumn {
        cells,
        format,
        ambiguous: false,
        failures,
    }
}

/// Best-effort parse of a single value.
pub fn infer(cell: &CellValue) -> Option<NaiveDateTime> {
    match cell {
        CellValue::Timestamp(ts) => Some(*ts),
        // Integer timestamps are epoch milliseconds, as written by
        // records-oriented JSON exports.
        CellValue::Integer(ms) => DateTime::from_timestamp_millis(*ms).map(|dt| dt.naive_utc()),
        CellValue::String(s) => infer_str(s.trim()),
        _ => None,
    }
}

fn infer_str(s: &str) -> Option<NaiveDateTime> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Some(ts) = INFERRED_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(ts);
    }
    INFERRED_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
