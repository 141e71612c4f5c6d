use crate::data::model::{fields, FlightTable};

/// The four headline numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Kpis {
    pub total_flights: usize,
    pub cancelled_flights: u64,
    pub on_time_percentage: f64,
    pub avg_delay: f64,
}

impl Kpis {
    /// Each metric falls back to zero when its column is missing.
    pub fn compute(table: &FlightTable) -> Self {
        let total_flights = table.len();

        let cancelled_flights = table
            .cells(fields::CANCELLED)
            .map(|cells| {
                cells
                    .iter()
                    .filter_map(|c| c.as_f64())
                    .sum::<f64>()
                    .round() as u64
            })
            .unwrap_or(0);

        let delays: Option<Vec<f64>> = table
            .cells(fields::DELAY_MINUTES)
            .map(|cells| cells.iter().filter_map(|c| c.as_f64()).collect());

        let (on_time_percentage, avg_delay) = match delays {
            Some(delays) if total_flights > 0 => {
                let on_time = delays.iter().filter(|&&d| d <= 0.0).count();
                (on_time as f64 / total_flights as f64 * 100.0, mean(&delays).unwrap_or(0.0))
            }
            _ => (0.0, 0.0),
        };

        Kpis {
            total_flights,
            cancelled_flights,
            on_time_percentage,
            avg_delay,
        }
    }

    /// `87.5%`
    pub fn on_time_label(&self) -> String {
        format!("{}%", one_decimal(self.on_time_percentage))
    }

    pub fn avg_delay_label(&self) -> String {
        one_decimal(self.avg_delay)
    }
}

/// Format with exactly one decimal place.
pub fn one_decimal(value: f64) -> String {
    format!("{value:.1}")
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Column};

    fn table(delays: Vec<CellValue>, cancelled: Vec<CellValue>) -> FlightTable {
        FlightTable::from_columns(vec![
            Column::new(fields::DELAY_MINUTES, delays),
            Column::new(fields::CANCELLED, cancelled),
        ])
        .unwrap()
    }

    #[test]
    fn computes_all_four() {
        let t = table(
            vec![
                CellValue::Integer(-5),
                CellValue::Integer(0),
                CellValue::Integer(30),
                CellValue::Null,
            ],
            vec![
                CellValue::Integer(0),
                CellValue::Bool(true),
                CellValue::Integer(1),
                CellValue::Null,
            ],
        );
        let kpis = Kpis::compute(&t);
        assert_eq!(kpis.total_flights, 4);
        assert_eq!(kpis.cancelled_flights, 2);
        assert_eq!(kpis.on_time_percentage, 50.0);
        // null delays are skipped by the mean
        assert!((kpis.avg_delay - 25.0 / 3.0).abs() < 1e-9);
        assert_eq!(kpis.on_time_label(), "50.0%");
        assert_eq!(kpis.avg_delay_label(), "8.3");
    }

    #[test]
    fn empty_table_is_all_zero() {
        let kpis = Kpis::compute(&table(vec![], vec![]));
        assert_eq!(kpis, Kpis::default());
        assert!(!kpis.avg_delay.is_nan());
    }

    #[test]
    fn missing_columns_are_zero() {
        let t = FlightTable::from_columns(vec![Column::new(
            fields::AIRLINE,
            vec![CellValue::String("AA".into())],
        )])
        .unwrap();
        let kpis = Kpis::compute(&t);
        assert_eq!(kpis.total_flights, 1);
        assert_eq!(kpis.cancelled_flights, 0);
        assert_eq!(kpis.on_time_percentage, 0.0);
        assert_eq!(kpis.avg_delay, 0.0);
    }

    #[test]
    fn all_null_delays_average_to_zero() {
        let kpis = Kpis::compute(&table(vec![CellValue::Null], vec![CellValue::Null]));
        assert_eq!(kpis.avg_delay, 0.0);
        assert_eq!(kpis.on_time_percentage, 0.0);
    }

    #[test]
    fn on_time_stays_in_bounds() {
        let t = table(vec![CellValue::Float(-1.0); 3], vec![CellValue::Integer(0); 3]);
        let kpis = Kpis::compute(&t);
        assert_eq!(kpis.on_time_percentage, 100.0);
    }

    #[test]
    fn one_decimal_rounds() {
        assert_eq!(one_decimal(0.0), "0.0");
        assert_eq!(one_decimal(12.345), "12.3");
        assert_eq!(one_decimal(-0.26), "-0.3");
    }
}
