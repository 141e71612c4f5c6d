use std::sync::Arc;

use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use flight_dash::config::DEFAULT_DATA_PATH;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

const N_FLIGHTS: i64 = 600;

const AIRLINES: [&str; 4] = ["SkyJet", "AeroNorth", "BlueWing", "CoastAir"];
const AIRCRAFT: [&str; 4] = ["A320", "B737", "E190", "A321"];
const REASONS: [&str; 5] = ["Weather", "Technical", "Crew", "Air Traffic", "Security"];

/// Origin, destination, distance.
const ROUTES: [(&str, &str, i64); 6] = [
    ("JFK", "LAX", 2475),
    ("ATL", "ORD", 606),
    ("SFO", "SEA", 679),
    ("DFW", "MIA", 1121),
    ("BOS", "DCA", 399),
    ("LAX", "HNL", 2556),
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct FlightRow {
    #[serde(rename = "FlightID")]
    flight_id: i64,
    airline: String,
    origin: String,
    destination: String,
    scheduled_departure: String,
    actual_departure: String,
    scheduled_arrival: String,
    actual_arrival: String,
    delay_minutes: i64,
    delay_reason: String,
    cancelled: i64,
    aircraft_type: String,
    distance: i64,
}

fn fmt(ts: NaiveDateTime) -> String {
    ts.format("%d-%m-%Y %H:%M").to_string()
}

fn generate(rng: &mut SimpleRng) -> Vec<FlightRow> {
    let first_day = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid start date");

    (1..=N_FLIGHTS)
        .map(|flight_id| {
            let (origin, destination, distance) = ROUTES[rng.below(ROUTES.len())];
            let cancelled = rng.next_f64() < 0.04;
            let delay = if cancelled {
                0
            } else {
                rng.gauss(8.0, 22.0).round() as i64
            };

            let scheduled_departure = first_day
                + Duration::days(rng.below(90) as i64)
                + Duration::minutes(5 * rng.below(12 * 24) as i64);
            let block = Duration::minutes(45 + distance / 8);
            let actual_departure = scheduled_departure + Duration::minutes(delay);

            FlightRow {
                flight_id,
                airline: AIRLINES[rng.below(AIRLINES.len())].to_string(),
                origin: origin.to_string(),
                destination: destination.to_string(),
                scheduled_departure: fmt(scheduled_departure),
                actual_departure: if cancelled { String::new() } else { fmt(actual_departure) },
                scheduled_arrival: fmt(scheduled_departure + block),
                actual_arrival: if cancelled {
                    String::new()
                } else {
                    fmt(actual_departure + block)
                },
                delay_minutes: delay,
                delay_reason: if delay > 0 {
                    REASONS[rng.below(REASONS.len())].to_string()
                } else {
                    String::new()
                },
                cancelled: cancelled as i64,
                aircraft_type: AIRCRAFT[rng.below(AIRCRAFT.len())].to_string(),
                distance,
            }
        })
        .collect()
}

fn write_parquet(rows: &[FlightRow], output_path: &str) {
    // empty text is written as null
    let text = |f: fn(&FlightRow) -> &str| -> ArrayRef {
        Arc::new(StringArray::from(
            rows.iter()
                .map(|r| Some(f(r)).filter(|s| !s.is_empty()))
                .collect::<Vec<_>>(),
        ))
    };
    let int = |f: fn(&FlightRow) -> i64| -> ArrayRef {
        Arc::new(Int64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new("FlightID", DataType::Int64, false),
        Field::new("Airline", DataType::Utf8, false),
        Field::new("Origin", DataType::Utf8, false),
        Field::new("Destination", DataType::Utf8, false),
        Field::new("ScheduledDeparture", DataType::Utf8, false),
        Field::new("ActualDeparture", DataType::Utf8, true),
        Field::new("ScheduledArrival", DataType::Utf8, false),
        Field::new("ActualArrival", DataType::Utf8, true),
        Field::new("DelayMinutes", DataType::Int64, false),
        Field::new("DelayReason", DataType::Utf8, true),
        Field::new("Cancelled", DataType::Int64, false),
        Field::new("AircraftType", DataType::Utf8, false),
        Field::new("Distance", DataType::Int64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            int(|r| r.flight_id),
            text(|r| r.airline.as_str()),
            text(|r| r.origin.as_str()),
            text(|r| r.destination.as_str()),
            text(|r| r.scheduled_departure.as_str()),
            text(|r| r.actual_departure.as_str()),
            text(|r| r.scheduled_arrival.as_str()),
            text(|r| r.actual_arrival.as_str()),
            int(|r| r.delay_minutes),
            text(|r| r.delay_reason.as_str()),
            int(|r| r.cancelled),
            text(|r| r.aircraft_type.as_str()),
            int(|r| r.distance),
        ],
    )
    .expect("Failed to create RecordBatch");

    let file = std::fs::File::create(output_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");
}

fn main() {
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng);

    let mut wtr = csv::Writer::from_path(DEFAULT_DATA_PATH).expect("Failed to create CSV file");
    for row in &rows {
        wtr.serialize(row).expect("Failed to write CSV row");
    }
    wtr.flush().expect("Failed to flush CSV");

    let parquet_path = "sample_flights.parquet";
    write_parquet(&rows, parquet_path);

    println!(
        "Wrote {} flights to {DEFAULT_DATA_PATH} and {parquet_path}",
        rows.len()
    );
}
