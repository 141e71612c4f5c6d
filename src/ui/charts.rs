use std::f64::consts::TAU;

use eframe::egui::{self, Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot, PlotPoints, Points, Polygon};
use flight_dash::analytics::aggregate::ReasonCount;
use flight_dash::analytics::metrics::Kpis;
use flight_dash::analytics::report::DashboardReport;
use flight_dash::analytics::Availability;

use crate::color::ColorMap;

const CHART_HEIGHT: f32 = 280.0;

// ---------------------------------------------------------------------------
// KPI row
// ---------------------------------------------------------------------------

pub fn kpi_row(ui: &mut Ui, kpis: &Kpis) {
    section_header(ui, "Key Performance Indicators");
    ui.columns(4, |cols| {
        kpi(&mut cols[0], "Total Flights", kpis.total_flights.to_string());
        kpi(&mut cols[1], "Cancelled Flights", kpis.cancelled_flights.to_string());
        kpi(&mut cols[2], "On-Time Performance", kpis.on_time_label());
        kpi(&mut cols[3], "Average Delay (min)", kpis.avg_delay_label());
    });
}

fn kpi(ui: &mut Ui, label: &str, value: String) {
    ui.label(RichText::new(label).color(Color32::GRAY));
    ui.label(RichText::new(value).size(24.0).strong());
}

fn section_header(ui: &mut Ui, title: &str) {
    ui.label(
        RichText::new(title)
            .size(20.0)
            .strong()
            .color(Color32::from_rgb(31, 119, 180)),
    );
    ui.separator();
}

fn not_available(ui: &mut Ui, what: &str, missing: &[String]) {
    ui.label(
        RichText::new(format!("{what} not available (missing {})", missing.join(", ")))
            .italics()
            .color(Color32::GRAY),
    );
}

// ---------------------------------------------------------------------------
// Flight performance: delay reasons pie + delay per airline
// ---------------------------------------------------------------------------

pub fn performance_section(ui: &mut Ui, report: &DashboardReport, airline_colors: &ColorMap) {
    section_header(ui, "Flight Performance Analysis");
    ui.columns(2, |cols| {
        cols[0].strong("Delay Reasons Distribution");
        match &report.delay_reasons {
            Availability::Available(reasons) => delay_reason_pie(&mut cols[0], reasons),
            Availability::Unavailable { missing } => {
                not_available(&mut cols[0], "DelayReason data", missing)
            }
        }

        cols[1].strong("Average Delay by Airline (minutes)");
        match &report.airlines {
            Availability::Available(groups) => {
                Plot::new("airline_delay")
                    .legend(Legend::default())
                    .height(CHART_HEIGHT)
                    .y_axis_label("Average delay (min)")
                    .show_x(false)
                    .allow_scroll(false)
                    .show(&mut cols[1], |plot_ui| {
                        for (i, g) in groups.iter().enumerate() {
                            let color = airline_colors.color_for(&g.key);
                            let bar = Bar::new(i as f64, g.mean_delay.unwrap_or(0.0))
                                .name(&g.key)
                                .fill(color)
                                .width(0.7);
                            plot_ui.bar_chart(BarChart::new(vec![bar]).name(&g.key).color(color));
                        }
                    });
            }
            Availability::Unavailable { missing } => {
                not_available(&mut cols[1], "Delay data for airline comparison", missing)
            }
        }
    });
}

/// Pie drawn as filled wedges, one legend entry per reason.
fn delay_reason_pie(ui: &mut Ui, reasons: &[ReasonCount]) {
    let total: usize = reasons.iter().map(|r| r.count).sum();
    if total == 0 {
        ui.label("No delay reasons in the current selection");
        return;
    }
    let colors = ColorMap::new(reasons.iter().map(|r| r.reason.as_str()));

    Plot::new("delay_reasons")
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            let mut start = 0.0;
            for r in reasons {
                let share = r.count as f64 / total as f64;
                let end = start + share * TAU;
                let pct = share * 100.0;
                let wedge = Polygon::new(PlotPoints::from(wedge_points(start, end)))
                    .fill_color(colors.color_for(&r.reason))
                    .stroke(egui::Stroke::new(1.0, Color32::WHITE))
                    .name(format!("{} ({pct:.1}%)", r.reason));
                plot_ui.polygon(wedge);
                start = end;
            }
        });
}

fn wedge_points(start: f64, end: f64) -> Vec<[f64; 2]> {
    let steps = (((end - start) / TAU) * 90.0).ceil().max(2.0) as usize;
    let mut points = vec![[0.0, 0.0]];
    for i in 0..=steps {
        let a = start + (end - start) * i as f64 / steps as f64;
        // clockwise from twelve o'clock
        points.push([a.sin(), a.cos()]);
    }
    points
}

// ---------------------------------------------------------------------------
// Route analysis: busiest routes + delay vs distance
// ---------------------------------------------------------------------------

pub fn route_section(ui: &mut Ui, report: &DashboardReport) {
    section_header(ui, "Route Analysis");
    let analysis = match &report.routes {
        Availability::Available(analysis) => analysis,
        Availability::Unavailable { missing } => {
            not_available(ui, "Origin/Destination data for route analysis", missing);
            return;
        }
    };
    let colors = ColorMap::new(analysis.routes.iter().map(|r| r.route.as_str()));

    ui.columns(2, |cols| {
        cols[0].strong("Top 5 Busiest Routes");
        Plot::new("busiest_routes")
            .legend(Legend::default())
            .height(CHART_HEIGHT)
            .y_axis_label("Total flights")
            .show_x(false)
            .allow_scroll(false)
            .show(&mut cols[0], |plot_ui| {
                for (i, r) in analysis.busiest.iter().enumerate() {
                    let color = colors.color_for(&r.route);
                    let bar = Bar::new(i as f64, r.total_flights as f64)
                        .name(&r.route)
                        .fill(color)
                        .width(0.7);
                    plot_ui.bar_chart(BarChart::new(vec![bar]).name(&r.route).color(color));
                }
            });

        cols[1].strong("Delay vs Distance by Route");
        match &analysis.scatter {
            Availability::Available(points) => {
                let max_flights = points.iter().map(|p| p.total_flights).max().unwrap_or(1).max(1);
                Plot::new("distance_vs_delay")
                    .legend(Legend::default())
                    .height(CHART_HEIGHT)
                    .x_axis_label("Distance")
                    .y_axis_label("Average delay (min)")
                    .allow_scroll(false)
                    .show(&mut cols[1], |plot_ui| {
                        for p in points {
                            let share = p.total_flights as f32 / max_flights as f32;
                            let radius = 3.0 + 12.0 * share.sqrt();
                            plot_ui.points(
                                Points::new(PlotPoints::from(vec![[p.distance, p.mean_delay]]))
                                    .radius(radius)
                                    .color(colors.color_for(&p.route))
                                    .name(&p.route),
                            );
                        }
                    });
            }
            Availability::Unavailable { missing } => {
                not_available(&mut cols[1], "Distance or delay data for the scatter plot", missing)
            }
        }
    });
}

// ---------------------------------------------------------------------------
// Aircraft performance
// ---------------------------------------------------------------------------

pub fn aircraft_section(ui: &mut Ui, report: &DashboardReport) {
    section_header(ui, "Aircraft Performance");
    let groups = match &report.aircraft {
        Availability::Available(groups) => groups,
        Availability::Unavailable { missing } => {
            not_available(ui, "AircraftType or delay data", missing);
            return;
        }
    };

    ui.strong("Performance by Aircraft Type");
    let bars: Vec<Bar> = groups
        .iter()
        .enumerate()
        .map(|(i, g)| Bar::new(i as f64, g.mean_delay.unwrap_or(0.0)).name(&g.key).width(0.6))
        .collect();
    let labels: Vec<String> = groups.iter().map(|g| g.key.clone()).collect();

    Plot::new("aircraft_delay")
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .y_axis_label("Average Delay (minutes)")
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > f64::EPSILON || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(bars)
                    .name("DelayMinutes")
                    .color(Color32::from_rgb(31, 119, 180)),
            );
        });
}
