//! Decoders for the station information document and the trip CSV.

use anyhow::{Context, Result, anyhow};
use flate2::read::GzDecoder;
use serde::Deserialize;
use std::io::Read;
use tracing::{debug, warn};

use crate::model::{Station, Trip};
use crate::time::parse_timestamp;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Deserialize)]
struct StationDocument {
    data: StationData,
}

#[derive(Deserialize)]
struct StationData {
    stations: Vec<Station>,
}

/// A trip row as written in the CSV; extra columns are ignored.
#[derive(Deserialize)]
struct TripRow {
    started_at: String,
    ended_at: String,
    start_station_id: String,
    end_station_id: String,
}

impl TryFrom<TripRow> for Trip {
    type Error = anyhow::Error;

    fn try_from(row: TripRow) -> Result<Self> {
        Ok(Trip {
            started_at: parse_timestamp(&row.started_at).context("bad started_at")?,
            ended_at: parse_timestamp(&row.ended_at).context("bad ended_at")?,
            start_station_id: row.start_station_id,
            end_station_id: row.end_station_id,
        })
    }
}

/// Trips decoded from one CSV, plus the number of rows left out.
#[derive(Debug, Default)]
pub struct TripLoad {
    pub trips: Vec<Trip>,
    pub skipped: usize,
}

/// Decodes a `{ "data": { "stations": [...] } }` station document.
///
/// # Errors
///
/// Returns an error if the bytes are not JSON of that shape or a station
/// lacks `short_name`, `lat` or `lon`.
pub fn parse_stations(bytes: &[u8]) -> Result<Vec<Station>> {
    let doc: StationDocument =
        serde_json::from_slice(bytes).context("malformed station document")?;
    debug!(stations = doc.data.stations.len(), "Stations parsed");
    Ok(doc.data.stations)
}

/// Decodes trip rows from CSV bytes, gunzipping first when compressed.
///
/// A malformed row aborts the load unless `skip_malformed` is set, in
/// which case it is logged and counted in [`TripLoad::skipped`].
pub fn parse_trips(bytes: &[u8], skip_malformed: bool) -> Result<TripLoad> {
    let csv_bytes = if bytes.starts_with(&GZIP_MAGIC) {
        let mut decoded = Vec::new();
        GzDecoder::new(bytes)
            .read_to_end(&mut decoded)
            .context("failed to decompress trip data")?;
        decoded
    } else {
        bytes.to_vec()
    };

    let mut rdr = csv::Reader::from_reader(csv_bytes.as_slice());
    let mut load = TripLoad::default();

    for (idx, result) in rdr.deserialize::<TripRow>().enumerate() {
        let row_number = idx + 1;
        let parsed = result
            .map_err(|e| anyhow!(e))
            .and_then(Trip::try_from);

        match parsed {
            Ok(trip) => load.trips.push(trip),
            Err(e) if skip_malformed => {
                warn!(row = row_number, error = %e, "Skipping malformed trip row");
                load.skipped += 1;
            }
            Err(e) => return Err(e.context(format!("malformed trip at row {row_number}"))),
        }
    }

    debug!(trips = load.trips.len(), skipped = load.skipped, "Trips parsed");
    Ok(load)
}
