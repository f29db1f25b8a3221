//! Output formatting and persistence for station traffic.
//!
//! Supports pretty-printing, JSON documents, and CSV write/append.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::model::StationTraffic;
use crate::time::TimeFilter;
use csv::WriterBuilder;
use std::fs::{File, OpenOptions};
use std::path::Path;

/// One station's traffic within one sweep window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepRow {
    pub minute: i32,
    pub label: String,
    pub short_name: String,
    pub departures: usize,
    pub arrivals: usize,
    pub total_traffic: usize,
}

impl SweepRow {
    pub fn new(filter: TimeFilter, traffic: &StationTraffic) -> Self {
        SweepRow {
            minute: filter.slider_value(),
            label: filter.label(),
            short_name: traffic.short_name.clone(),
            departures: traffic.departures,
            arrivals: traffic.arrivals,
            total_traffic: traffic.total_traffic,
        }
    }
}

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty(value: &impl std::fmt::Debug) {
    debug!("{:#?}", value);
}

/// Logs a value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes a value as pretty-printed JSON, replacing any existing file.
pub fn write_json(path: &str, value: &impl Serialize) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create '{path}'"))?;
    serde_json::to_writer_pretty(file, value)?;
    debug!(path, "JSON written");
    Ok(())
}

/// Writes station traffic rows to a fresh CSV file with headers.
pub fn write_traffic_csv(path: &str, traffic: &[StationTraffic]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create '{path}'"))?;
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);

    for row in traffic {
        writer.serialize(row)?;
    }
    writer.flush()?;

    debug!(path, rows = traffic.len(), "Traffic CSV written");
    Ok(())
}

/// Appends rows to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_records<T: Serialize>(path: &str, rows: &[T]) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, rows = rows.len(), "Appending CSV records");

    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .with_context(|| format!("failed to open '{path}'"))?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&sample());
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&sample()).unwrap();
    }

    #[test]
    fn test_write_traffic_csv() {
        let path = temp_path("station_traffic_test_write.csv");
        let _ = fs::remove_file(&path);

        write_traffic_csv(&path, &sample()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(
            lines[0],
            "short_name,name,lat,lon,departures,arrivals,total_traffic"
        );
        assert_eq!(lines[1], "A32000,Kendall T,42.3625,-71.0843,3,1,4");
        assert_eq!(lines[2], "B32001,,42.35,-71.1,0,0,0");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_append_records_writes_header_once() {
        let path = temp_path("station_traffic_test_header.csv");
        let _ = fs::remove_file(&path);

        let rows: Vec<SweepRow> = sample()
            .iter()
            .map(|t| SweepRow::new(TimeFilter::At(485), t))
            .collect();
        append_records(&path, &rows).unwrap();
        append_records(&path, &rows).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let header_count = content.lines().filter(|l| l.starts_with("minute")).count();
        assert_eq!(header_count, 1);
        // 1 header + 2 batches of 2 rows
        assert_eq!(content.lines().count(), 5);
        assert!(content.contains("485,8:05 AM,A32000,3,1,4"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_json() {
        let path = temp_path("station_traffic_test.json");
        write_json(&path, &sample()).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed[0]["total_traffic"], 4);

        fs::remove_file(&path).unwrap();
    }

    fn sample() -> Vec<StationTraffic> {
        vec![
            StationTraffic {
                short_name: "A32000".to_string(),
                name: Some("Kendall T".to_string()),
                lat: 42.3625,
                lon: -71.0843,
                departures: 3,
                arrivals: 1,
                total_traffic: 4,
            },
            StationTraffic {
                short_name: "B32001".to_string(),
                name: None,
                lat: 42.35,
                lon: -71.1,
                departures: 0,
                arrivals: 0,
                total_traffic: 0,
            },
        ]
    }
}
