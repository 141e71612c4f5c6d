use anyhow::Result;

use flight_dash::analytics::aggregate::GroupSummary;
use flight_dash::analytics::metrics::one_decimal;
use flight_dash::analytics::report::DashboardReport;
use flight_dash::analytics::Availability;
use flight_dash::config::Command;
use flight_dash::data::export::export_to_path;
use flight_dash::data::store::FlightStore;

// ---------------------------------------------------------------------------
// Headless subcommands
// ---------------------------------------------------------------------------

pub fn run(mut store: FlightStore, command: Command) -> Result<()> {
    let base = store.table()?;

    match command {
        Command::Summary(selection) => {
            let report = DashboardReport::build(&base, &selection.to_filter(&base));
            print_summary(&report);
        }
        Command::Export { selection, output } => {
            let report = DashboardReport::build(&base, &selection.to_filter(&base));
            for w in &report.warnings {
                eprintln!("warning: {w}");
            }
            export_to_path(&report.table, &output)?;
            println!("Wrote {} flights to {}", report.table.len(), output.display());
        }
    }
    Ok(())
}

fn print_summary(report: &DashboardReport) {
    for w in &report.warnings {
        eprintln!("warning: {w}");
    }

    let k = &report.kpis;
    println!("Total flights        {}", k.total_flights);
    println!("Cancelled flights    {}", k.cancelled_flights);
    println!("On-time performance  {}", k.on_time_label());
    println!("Average delay (min)  {}", k.avg_delay_label());

    println!();
    println!("Delay reasons");
    match &report.delay_reasons {
        Availability::Available(reasons) => {
            for r in reasons {
                println!("  {:<24} {}", r.reason, r.count);
            }
        }
        Availability::Unavailable { missing } => not_available(missing),
    }

    print_groups("Airlines", &report.airlines);

    println!();
    println!("Top routes");
    match &report.routes {
        Availability::Available(routes) => {
            for r in &routes.busiest {
                println!(
                    "  {:<24} {:>6} flights  {:>8} min  {:>8} dist",
                    r.route,
                    r.total_flights,
                    fmt_opt(r.mean_delay),
                    fmt_opt(r.distance)
                );
            }
        }
        Availability::Unavailable { missing } => not_available(missing),
    }

    print_groups("Aircraft types", &report.aircraft);
}

fn print_groups(title: &str, groups: &Availability<Vec<GroupSummary>>) {
    println!();
    println!("{title}");
    match groups {
        Availability::Available(groups) => {
            for g in groups {
                println!(
                    "  {:<24} {:>6} flights  {:>8} min  {:>4} cancelled",
                    g.key,
                    g.total_flights,
                    fmt_opt(g.mean_delay),
                    g.cancelled
                );
            }
        }
        Availability::Unavailable { missing } => not_available(missing),
    }
}

fn not_available(missing: &[String]) {
    println!("  data not available (missing {})", missing.join(", "));
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(one_decimal).unwrap_or_else(|| "-".to_string())
}
