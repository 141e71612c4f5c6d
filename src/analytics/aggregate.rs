use std::collections::BTreeMap;

use anyhow::Result;

use crate::data::model::{fields, CellValue, Column, FlightTable};

/// How many routes the "busiest routes" view keeps.
pub const BUSIEST_ROUTES: usize = 5;

/// One group of an airline or aircraft-type breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    pub key: String,
    /// `None` when no flight in the group has a delay value.
    pub mean_delay: Option<f64>,
    pub cancelled: u64,
    pub total_flights: usize,
}

/// One route with its representative distance.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSummary {
    pub route: String,
    pub mean_delay: Option<f64>,
    pub cancelled: u64,
    pub total_flights: usize,
    /// First non-null distance seen for the route.
    pub distance: Option<f64>,
}

/// A point of the distance-vs-delay scatter, sized by flight count.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub route: String,
    pub distance: f64,
    pub mean_delay: f64,
    pub total_flights: usize,
}

/// Count of flights per delay reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasonCount {
    pub reason: String,
    pub count: usize,
}

// ---------------------------------------------------------------------------
// Group accumulation
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Accumulator {
    delay_sum: f64,
    delay_count: usize,
    cancelled: f64,
    rows: usize,
    distance: Option<f64>,
}

impl Accumulator {
    fn mean_delay(&self) -> Option<f64> {
        (self.delay_count > 0).then(|| self.delay_sum / self.delay_count as f64)
    }
}

/// Fold every row into its group.  Rows whose key is null belong to no
/// group.  Groups come back sorted by key.
fn accumulate(table: &FlightTable, keys: &[CellValue]) -> BTreeMap<String, Accumulator> {
    let delays = table.cells(fields::DELAY_MINUTES);
    let cancelled = table.cells(fields::CANCELLED);
    let distances = table.cells(fields::DISTANCE);

    let mut groups: BTreeMap<String, Accumulator> = BTreeMap::new();
    for (row, key) in keys.iter().enumerate() {
        let Some(key) = key.to_field() else {
            continue;
        };
        let acc = groups.entry(key).or_default();
        acc.rows += 1;
        if let Some(d) = delays.and_then(|c| c[row].as_f64()) {
            acc.delay_sum += d;
            acc.delay_count += 1;
        }
        if let Some(c) = cancelled.and_then(|c| c[row].as_f64()) {
            acc.cancelled += c;
        }
        if acc.distance.is_none() {
            acc.distance = distances.and_then(|c| c[row].as_f64());
        }
    }
    groups
}

/// Mean delay, cancellations and flight count per value of `key_column`.
/// Empty when the column is absent.
pub fn group_by(table: &FlightTable, key_column: &str) -> Vec<GroupSummary> {
    let Some(keys) = table.cells(key_column) else {
        return Vec::new();
    };
    accumulate(table, keys)
        .into_iter()
        .map(|(key, acc)| GroupSummary {
            key,
            mean_delay: acc.mean_delay(),
            cancelled: acc.cancelled.round() as u64,
            total_flights: acc.rows,
        })
        .collect()
}

pub fn by_airline(table: &FlightTable) -> Vec<GroupSummary> {
    group_by(table, fields::AIRLINE)
}

pub fn by_aircraft_type(table: &FlightTable) -> Vec<GroupSummary> {
    group_by(table, fields::AIRCRAFT_TYPE)
}

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

/// `Origin - Destination` per row; null when either end is null.  `None` if
/// either column is missing.
pub fn route_column(table: &FlightTable) -> Option<Column> {
    let origins = table.cells(fields::ORIGIN)?;
    let destinations = table.cells(fields::DESTINATION)?;
    let cells = origins
        .iter()
        .zip(destinations)
        .map(|(o, d)| match (o.to_field(), d.to_field()) {
            (Some(o), Some(d)) => CellValue::String(format!("{o} - {d}")),
            _ => CellValue::Null,
        })
        .collect();
    Some(Column::new(fields::ROUTE, cells))
}

/// Add (or refresh) the derived `Route` column.  Returns `false` and leaves
/// the table alone when origin or destination is missing.
pub fn derive_routes(table: &mut FlightTable) -> Result<bool> {
    match route_column(table) {
        Some(column) => {
            table.set_column(column)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Per-route summary; expects the `Route` column (see [`derive_routes`]).
pub fn by_route(table: &FlightTable) -> Vec<RouteSummary> {
    let Some(keys) = table.cells(fields::ROUTE) else {
        return Vec::new();
    };
    accumulate(table, keys)
        .into_iter()
        .map(|(route, acc)| RouteSummary {
            route,
            mean_delay: acc.mean_delay(),
            cancelled: acc.cancelled.round() as u64,
            total_flights: acc.rows,
            distance: acc.distance,
        })
        .collect()
}

/// The `n` routes with most flights.  Ties keep their order in `routes`.
pub fn busiest_routes(routes: &[RouteSummary], n: usize) -> Vec<RouteSummary> {
    let mut sorted = routes.to_vec();
    sorted.sort_by(|a, b| b.total_flights.cmp(&a.total_flights));
    sorted.truncate(n);
    sorted
}

/// Routes that have both a distance and a mean delay.
pub fn distance_vs_delay(routes: &[RouteSummary]) -> Vec<ScatterPoint> {
    routes
        .iter()
        .filter_map(|r| {
            Some(ScatterPoint {
                route: r.route.clone(),
                distance: r.distance?,
                mean_delay: r.mean_delay?,
                total_flights: r.total_flights,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Delay reasons
// ---------------------------------------------------------------------------

/// Flights per non-null delay reason, most frequent first.
pub fn delay_reasons(table: &FlightTable) -> Vec<ReasonCount> {
    let Some(cells) = table.cells(fields::DELAY_REASON) else {
        return Vec::new();
    };
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for reason in cells.iter().filter_map(CellValue::to_field) {
        *counts.entry(reason).or_default() += 1;
    }
    let mut out: Vec<ReasonCount> = counts
        .into_iter()
        .map(|(reason, count)| ReasonCount { reason, count })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> CellValue {
        CellValue::String(v.to_string())
    }

    fn i(v: i64) -> CellValue {
        CellValue::Integer(v)
    }

    fn flights() -> FlightTable {
        FlightTable::from_columns(vec![
            Column::new(fields::AIRLINE, vec![s("AA"), s("DL"), s("AA"), CellValue::Null, s("DL")]),
            Column::new(fields::ORIGIN, vec![s("JFK"), s("ATL"), s("JFK"), s("SFO"), s("ATL")]),
            Column::new(
                fields::DESTINATION,
                vec![s("LAX"), s("ORD"), s("LAX"), CellValue::Null, s("ORD")],
            ),
            Column::new(fields::DELAY_MINUTES, vec![i(10), i(-5), i(20), i(0), CellValue::Null]),
            Column::new(fields::CANCELLED, vec![i(0), i(1), CellValue::Bool(true), i(0), i(0)]),
            Column::new(
                fields::DISTANCE,
                vec![CellValue::Null, i(606), CellValue::Float(2475.0), i(1), i(700)],
            ),
            Column::new(
                fields::DELAY_REASON,
                vec![s("Weather"), CellValue::Null, s("Crew"), s("Weather"), s("Crew")],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn airline_groups_are_sorted_and_skip_nulls() {
        let groups = by_airline(&flights());
        assert_eq!(
            groups,
            vec![
                GroupSummary {
                    key: "AA".into(),
                    mean_delay: Some(15.0),
                    cancelled: 1,
                    total_flights: 2,
                },
                GroupSummary {
                    key: "DL".into(),
                    mean_delay: Some(-5.0),
                    cancelled: 1,
                    total_flights: 2,
                },
            ]
        );
    }

    #[test]
    fn group_counts_partition_non_null_keys() {
        let table = flights();
        let total: usize = by_airline(&table).iter().map(|g| g.total_flights).sum();
        let non_null = table
            .cells(fields::AIRLINE)
            .unwrap()
            .iter()
            .filter(|c| !c.is_null())
            .count();
        assert_eq!(total, non_null);
    }

    #[test]
    fn routes_use_first_non_null_distance() {
        let mut table = flights();
        assert!(derive_routes(&mut table).unwrap());
        let routes = by_route(&table);
        assert_eq!(routes.len(), 2);

        let atl = &routes[0];
        assert_eq!(atl.route, "ATL - ORD");
        assert_eq!(atl.total_flights, 2);
        assert_eq!(atl.distance, Some(606.0));
        assert_eq!(atl.mean_delay, Some(-5.0));

        let jfk = &routes[1];
        assert_eq!(jfk.route, "JFK - LAX");
        assert_eq!(jfk.distance, Some(2475.0));
        assert_eq!(jfk.cancelled, 1);
    }

    #[test]
    fn derive_routes_needs_both_ends() {
        let mut table =
            FlightTable::from_columns(vec![Column::new(fields::ORIGIN, vec![s("JFK")])]).unwrap();
        assert!(!derive_routes(&mut table).unwrap());
        assert!(!table.has_column(fields::ROUTE));
    }

    #[test]
    fn derive_routes_refreshes_existing_column() {
        let mut table = flights();
        derive_routes(&mut table).unwrap();
        derive_routes(&mut table).unwrap();
        assert_eq!(
            table.column_names().iter().filter(|n| **n == fields::ROUTE).count(),
            1
        );
    }

    #[test]
    fn busiest_routes_are_stable_on_ties() {
        let route = |name: &str, total_flights| RouteSummary {
            route: name.into(),
            mean_delay: None,
            cancelled: 0,
            total_flights,
            distance: None,
        };
        let routes = vec![route("A", 1), route("B", 3), route("C", 1), route("D", 3)];
        let top: Vec<String> = busiest_routes(&routes, 3).into_iter().map(|r| r.route).collect();
        assert_eq!(top, vec!["B", "D", "A"]);
    }

    #[test]
    fn scatter_skips_routes_without_distance_or_delay() {
        let routes = vec![
            RouteSummary {
                route: "A".into(),
                mean_delay: Some(3.0),
                cancelled: 0,
                total_flights: 2,
                distance: Some(100.0),
            },
            RouteSummary {
                route: "B".into(),
                mean_delay: None,
                cancelled: 0,
                total_flights: 1,
                distance: Some(100.0),
            },
        ];
        let points = distance_vs_delay(&routes);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].route, "A");
    }

    #[test]
    fn delay_reasons_most_frequent_first() {
        let reasons = delay_reasons(&flights());
        assert_eq!(
            reasons,
            vec![
                ReasonCount {
                    reason: "Crew".into(),
                    count: 2
                },
                ReasonCount {
                    reason: "Weather".into(),
                    count: 2
                },
            ]
        );
    }
}
