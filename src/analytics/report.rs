use crate::data::filter::{self, FlightFilter};
use crate::data::model::FlightTable;

use super::aggregate::{self, GroupSummary, ReasonCount, RouteSummary, ScatterPoint, BUSIEST_ROUTES};
use super::metrics::Kpis;
use super::{Availability, Feature};

/// Route views derived from one filtered table.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteAnalysis {
    pub routes: Vec<RouteSummary>,
    pub busiest: Vec<RouteSummary>,
    pub scatter: Availability<Vec<ScatterPoint>>,
}

/// Everything the dashboard shows for one filter selection.
#[derive(Debug, Clone)]
pub struct DashboardReport {
    /// The filtered flights, with `Route` added when it can be derived.
    pub table: FlightTable,
    pub kpis: Kpis,
    pub delay_reasons: Availability<Vec<ReasonCount>>,
    pub airlines: Availability<Vec<GroupSummary>>,
    pub routes: Availability<RouteAnalysis>,
    pub aircraft: Availability<Vec<GroupSummary>>,
    pub warnings: Vec<String>,
}

impl DashboardReport {
    /// Filter the base table and compute every view.  Features whose
    /// columns are missing come back unavailable; nothing here fails.
    pub fn build(base: &FlightTable, selection: &FlightFilter) -> Self {
        let filter::Filtered {
            mut table,
            mut warnings,
        } = filter::apply(base, selection);

        let kpis = Kpis::compute(&table);

        let delay_reasons =
            Feature::DelayReasons.guard(&table, || aggregate::delay_reasons(&table));
        let airlines = Feature::AirlinePerformance.guard(&table, || aggregate::by_airline(&table));
        let aircraft =
            Feature::AircraftPerformance.guard(&table, || aggregate::by_aircraft_type(&table));

        let derived = match aggregate::derive_routes(&mut table) {
            Ok(derived) => derived,
            Err(e) => {
                log::warn!("Could not derive routes: {e:#}");
                warnings.push(format!("Route analysis unavailable: {e:#}"));
                false
            }
        };
        let routes = if derived {
            Feature::RouteAnalysis.guard(&table, || {
                let routes = aggregate::by_route(&table);
                RouteAnalysis {
                    busiest: aggregate::busiest_routes(&routes, BUSIEST_ROUTES),
                    scatter: Feature::DistanceVsDelay
                        .guard(&table, || aggregate::distance_vs_delay(&routes)),
                    routes,
                }
            })
        } else {
            Availability::Unavailable {
                missing: table.missing_fields(Feature::RouteAnalysis.required_fields()),
            }
        };

        DashboardReport {
            table,
            kpis,
            delay_reasons,
            airlines,
            routes,
            aircraft,
            warnings,
        }
    }

    /// Which features could not be computed, with their missing columns.
    pub fn unavailable(&self) -> Vec<(Feature, Vec<String>)> {
        let scatter = match &self.routes {
            Availability::Available(r) => r.scatter.missing().map(<[String]>::to_vec),
            Availability::Unavailable { missing } => Some(missing.clone()),
        };
        [
            (Feature::DelayReasons, self.delay_reasons.missing().map(<[String]>::to_vec)),
            (Feature::AirlinePerformance, self.airlines.missing().map(<[String]>::to_vec)),
            (Feature::RouteAnalysis, self.routes.missing().map(<[String]>::to_vec)),
            (Feature::DistanceVsDelay, scatter),
            (Feature::AircraftPerformance, self.aircraft.missing().map(<[String]>::to_vec)),
        ]
        .into_iter()
        .filter_map(|(feature, missing)| missing.map(|m| (feature, m)))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{read_csv, LoadOptions};
    use crate::data::model::fields;

    const CSV: &str = "\
FlightID,Airline,Origin,Destination,ScheduledDeparture,DelayMinutes,Cancelled,AircraftType,Distance
1,AA,JFK,LAX,01-03-2024 08:00,10,0,A320,2475
2,AA,JFK,LAX,02-03-2024 08:00,0,0,A320,2475
3,DL,ATL,ORD,02-03-2024 09:00,25,1,B737,606
";

    #[test]
    fn missing_delay_reason_only_disables_pie() {
        let base = read_csv(CSV.as_bytes(), &LoadOptions::default()).unwrap();
        let report = DashboardReport::build(&base, &FlightFilter::select_all(&base));

        assert_eq!(report.kpis.total_flights, 3);
        assert!(report.airlines.is_available());
        assert!(report.aircraft.is_available());
        let routes = report.routes.clone().available().unwrap();
        assert_eq!(routes.busiest[0].route, "JFK - LAX");
        assert!(routes.scatter.is_available());

        let unavailable = report.unavailable();
        assert_eq!(unavailable.len(), 1);
        assert_eq!(unavailable[0].0, Feature::DelayReasons);
        assert_eq!(unavailable[0].1, vec![fields::DELAY_REASON.to_string()]);
    }

    #[test]
    fn filtered_table_carries_route_column() {
        let base = read_csv(CSV.as_bytes(), &LoadOptions::default()).unwrap();
        let report = DashboardReport::build(&base, &FlightFilter::select_all(&base));
        assert!(report.table.has_column(fields::ROUTE));
        assert!(!base.has_column(fields::ROUTE));
    }

    #[test]
    fn route_views_unavailable_without_destination() {
        let csv = "FlightID,Airline,Origin,DelayMinutes\n1,AA,JFK,3\n";
        let base = read_csv(csv.as_bytes(), &LoadOptions::default()).unwrap();
        let report = DashboardReport::build(&base, &FlightFilter::select_all(&base));

        assert_eq!(
            report.routes,
            Availability::Unavailable {
                missing: vec![fields::DESTINATION.to_string()]
            }
        );
        assert!(report.airlines.is_available());
        // date filter has no column to work with, but the selection had no range either
        assert!(report.warnings.is_empty());
    }
}
