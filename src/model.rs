//! Record types for stations, trips and per-station traffic.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A bike-share dock as listed in the station information document.
///
/// `short_name` is the identifier trips refer to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub short_name: String,
    #[serde(default)]
    pub station_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub capacity: Option<u32>,
}

/// A single ride, immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    pub start_station_id: String,
    pub end_station_id: String,
    pub started_at: NaiveDateTime,
    pub ended_at: NaiveDateTime,
}

/// A station with its departure and arrival counts for one time filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationTraffic {
    pub short_name: String,
    pub name: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub departures: usize,
    pub arrivals: usize,
    pub total_traffic: usize,
}

impl StationTraffic {
    pub fn new(station: &Station, departures: usize, arrivals: usize) -> Self {
        StationTraffic {
            short_name: station.short_name.clone(),
            name: station.name.clone(),
            lat: station.lat,
            lon: station.lon,
            departures,
            arrivals,
            total_traffic: departures + arrivals,
        }
    }

    /// Share of this station's traffic that are departures, `None` when idle.
    pub fn departure_ratio(&self) -> Option<f64> {
        if self.total_traffic == 0 {
            None
        } else {
            Some(self.departures as f64 / self.total_traffic as f64)
        }
    }
}
