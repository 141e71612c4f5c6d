use std::collections::BTreeSet;

use chrono::NaiveDate;
use flight_dash::analytics::report::DashboardReport;
use flight_dash::analytics::Feature;
use flight_dash::data::export::{export_to_path, to_csv_bytes, EXPORT_FILE_NAME};
use flight_dash::data::filter::{self, DateRange, FlightFilter};
use flight_dash::data::loader::{load_file, read_csv, LoadOptions};
use flight_dash::data::model::{fields, CellValue, FlightTable};

const FLIGHTS: &str = "\
FlightID,Airline,Origin,Destination,ScheduledDeparture,ActualDeparture,ScheduledArrival,ActualArrival,DelayMinutes,DelayReason,Cancelled,AircraftType,Distance
1,A,JFK,LAX,01-03-2024 08:00,01-03-2024 08:10,01-03-2024 11:00,01-03-2024 11:10,10,Weather,0,A320,2475
2,B,ATL,ORD,02-03-2024 09:00,02-03-2024 08:55,02-03-2024 11:00,02-03-2024 10:55,-5,,0,B737,606
3,A,JFK,LAX,03-03-2024 08:00,,03-03-2024 11:00,,0,,1,A320,2475
4,C,SFO,SEA,04-03-2024 07:30,04-03-2024 08:30,04-03-2024 09:30,04-03-2024 10:30,60,Crew,0,E190,679
5,A,ATL,ORD,05-03-2024 12:00,05-03-2024 12:20,05-03-2024 14:00,05-03-2024 14:20,20,Technical,0,B737,606
6,B,JFK,LAX,06-03-2024 08:00,06-03-2024 08:00,06-03-2024 11:00,06-03-2024 11:00,0,,0,A320,2475
7,C,BOS,DCA,07-03-2024 18:00,,07-03-2024 19:30,,0,,1,E190,399
8,A,SFO,SEA,08-03-2024 06:00,08-03-2024 06:45,08-03-2024 08:00,08-03-2024 08:45,45,Weather,0,E190,679
9,B,BOS,DCA,09-03-2024 10:00,09-03-2024 09:58,09-03-2024 11:30,09-03-2024 11:28,-2,,0,B737,399
10,A,JFK,LAX,10-03-2024 08:00,10-03-2024 08:05,10-03-2024 11:00,10-03-2024 11:05,5,Air Traffic,1,A320,2475
";

fn base() -> FlightTable {
    read_csv(FLIGHTS.as_bytes(), &LoadOptions::default()).unwrap()
}

fn airlines(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn strings(table: &FlightTable, column: &str) -> Vec<Option<String>> {
    table
        .cells(column)
        .unwrap()
        .iter()
        .map(CellValue::to_field)
        .collect()
}

#[test]
fn selecting_one_airline_over_all_dates() {
    let base = base();
    assert_eq!(base.len(), 10);
    assert_eq!(filter::airline_options(&base), vec!["A", "B", "C"]);

    let selection = FlightFilter {
        airlines: airlines(&["A"]),
        date_range: filter::date_bounds(&base).ok(),
    };
    let report = DashboardReport::build(&base, &selection);

    assert_eq!(report.kpis.total_flights, 5);
    // flights 3 and 10 are the cancelled A flights
    assert_eq!(report.kpis.cancelled_flights, 2);
    assert_eq!(report.kpis.on_time_percentage, 20.0);
    assert_eq!(report.kpis.avg_delay_label(), "16.0");
    assert!(report
        .table
        .cells(fields::AIRLINE)
        .unwrap()
        .iter()
        .all(|c| c.to_field().as_deref() == Some("A")));
}

#[test]
fn empty_airline_selection_shows_nothing() {
    let base = base();
    let report = DashboardReport::build(&base, &FlightFilter::default());
    assert_eq!(report.kpis.total_flights, 0);
    assert_eq!(report.kpis.on_time_percentage, 0.0);
    assert_eq!(report.kpis.avg_delay, 0.0);
}

#[test]
fn date_range_narrows_after_airlines() {
    let base = base();
    let d = |day| NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
    let selection = FlightFilter {
        airlines: airlines(&["A", "B"]),
        date_range: Some(DateRange::new(d(2), d(6))),
    };
    let report = DashboardReport::build(&base, &selection);
    let ids: Vec<Option<String>> = strings(&report.table, fields::FLIGHT_ID);
    assert_eq!(
        ids,
        vec![Some("2".into()), Some("3".into()), Some("5".into()), Some("6".into())]
    );

    // same range again changes nothing
    let again = filter::apply(&report.table, &selection).table;
    assert_eq!(again, report.table);
}

#[test]
fn group_totals_partition_the_selection() {
    let base = base();
    let report = DashboardReport::build(&base, &FlightFilter::select_all(&base));
    let total = report.kpis.total_flights;

    let by_airline: usize = report
        .airlines
        .clone()
        .available()
        .unwrap()
        .iter()
        .map(|g| g.total_flights)
        .sum();
    let by_aircraft: usize = report
        .aircraft
        .clone()
        .available()
        .unwrap()
        .iter()
        .map(|g| g.total_flights)
        .sum();
    let routes = report.routes.clone().available().unwrap();
    let by_route: usize = routes.routes.iter().map(|r| r.total_flights).sum();

    assert_eq!(by_airline, total);
    assert_eq!(by_aircraft, total);
    assert_eq!(by_route, total);

    assert_eq!(routes.busiest.len(), 4);
    assert_eq!(routes.busiest[0].route, "JFK - LAX");
    assert_eq!(routes.busiest[0].total_flights, 4);
    assert_eq!(routes.scatter.clone().available().unwrap().len(), 4);
}

#[test]
fn delay_reasons_are_counted() {
    let base = base();
    let report = DashboardReport::build(&base, &FlightFilter::select_all(&base));
    let reasons = report.delay_reasons.available().unwrap();
    assert_eq!(reasons[0].reason, "Weather");
    assert_eq!(reasons[0].count, 2);
    assert_eq!(reasons.iter().map(|r| r.count).sum::<usize>(), 5);
}

#[test]
fn missing_delay_reason_only_affects_its_chart() {
    let without_reason: String = FLIGHTS
        .lines()
        .map(|line| {
            let mut cols: Vec<&str> = line.split(',').collect();
            cols.remove(9);
            cols.join(",") + "\n"
        })
        .collect();
    let base = read_csv(without_reason.as_bytes(), &LoadOptions::default()).unwrap();
    assert!(!base.has_column(fields::DELAY_REASON));

    let report = DashboardReport::build(&base, &FlightFilter::select_all(&base));
    let unavailable: Vec<Feature> = report.unavailable().into_iter().map(|(f, _)| f).collect();
    assert_eq!(unavailable, vec![Feature::DelayReasons]);
    assert_eq!(report.kpis.total_flights, 10);
    assert!(report.airlines.is_available());
    assert!(report.routes.is_available());
    assert!(report.aircraft.is_available());
}

#[test]
fn export_then_reload_preserves_rows() {
    let base = base();
    let selection = FlightFilter {
        airlines: airlines(&["A", "C"]),
        date_range: None,
    };
    let report = DashboardReport::build(&base, &selection);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(EXPORT_FILE_NAME);
    export_to_path(&report.table, &path).unwrap();

    let reloaded = load_file(&path, &LoadOptions::default()).unwrap();
    assert_eq!(reloaded.len(), report.table.len());
    assert_eq!(strings(&reloaded, fields::AIRLINE), strings(&report.table, fields::AIRLINE));
    assert_eq!(strings(&reloaded, fields::ROUTE), strings(&report.table, fields::ROUTE));
    assert_eq!(
        strings(&reloaded, fields::SCHEDULED_DEPARTURE),
        strings(&report.table, fields::SCHEDULED_DEPARTURE)
    );

    // the reloaded file goes through the dashboard the same way
    let again = DashboardReport::build(&reloaded, &FlightFilter::select_all(&reloaded));
    assert_eq!(again.kpis, report.kpis);
    assert_eq!(to_csv_bytes(&again.table).unwrap(), to_csv_bytes(&report.table).unwrap());
}
