use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::model::FlightTable;

/// File name offered for the filtered download.
pub const EXPORT_FILE_NAME: &str = "filtered_flight_data.csv";

/// Write the table as comma-separated UTF-8 with a header row.  Nulls become
/// empty fields.
pub fn write_csv<W: Write>(table: &FlightTable, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(table.column_names())
        .context("writing CSV header")?;

    let columns = table.columns();
    for row in 0..table.len() {
        let record = columns
            .iter()
            .map(|col| col.cells[row].to_field().unwrap_or_default());
        wtr.write_record(record)
            .with_context(|| format!("writing CSV row {row}"))?;
    }
    wtr.flush().context("flushing CSV output")?;
    Ok(())
}

/// The CSV bytes for an in-memory download.
pub fn to_csv_bytes(table: &FlightTable) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_csv(table, &mut buf)?;
    Ok(buf)
}

/// Write the table to `path`, replacing any existing file.
pub fn export_to_path(table: &FlightTable, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_csv(table, std::io::BufWriter::new(file))?;
    log::info!("Exported {} flights to {}", table.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::data::model::{CellValue, Column};

    #[test]
    fn writes_header_and_natural_forms() {
        let departure = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        let table = FlightTable::from_columns(vec![
            Column::new("Airline", vec![CellValue::String("AA".into()), CellValue::Null]),
            Column::new(
                "ScheduledDeparture",
                vec![CellValue::Timestamp(departure), CellValue::Null],
            ),
            Column::new("Cancelled", vec![CellValue::Bool(true), CellValue::Integer(0)]),
            Column::new("Distance", vec![CellValue::Float(2475.5), CellValue::Float(12.0)]),
        ])
        .unwrap();

        let text = String::from_utf8(to_csv_bytes(&table).unwrap()).unwrap();
        assert_eq!(
            text,
            "Airline,ScheduledDeparture,Cancelled,Distance\n\
             AA,2024-03-01 08:30:00,true,2475.5\n\
             ,,0,12\n"
        );
    }

    #[test]
    fn empty_table_still_has_header() {
        let table = FlightTable::from_columns(vec![Column::new("Route", vec![])]).unwrap();
        assert_eq!(to_csv_bytes(&table).unwrap(), b"Route\n");
    }

    #[test]
    fn quotes_fields_with_commas() {
        let table = FlightTable::from_columns(vec![Column::new(
            "Route",
            vec![CellValue::String("Paris, CDG - JFK".into())],
        )])
        .unwrap();
        let text = String::from_utf8(to_csv_bytes(&table).unwrap()).unwrap();
        assert_eq!(text, "Route\n\"Paris, CDG - JFK\"\n");
    }
}
