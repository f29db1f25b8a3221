//! Time-windowed station traffic aggregation.

use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use crate::buckets::{MinuteBuckets, Window};
use crate::model::{Station, StationTraffic, Trip};
use crate::time::{TimeFilter, minute_of_day};

/// Owns the loaded trips and their departure/arrival minute indexes.
///
/// Built once per dataset load; every query reads the tables without
/// modifying them.
#[derive(Debug)]
pub struct TrafficAggregator {
    trips: Vec<Trip>,
    departures: MinuteBuckets<usize>,
    arrivals: MinuteBuckets<usize>,
    window: Window,
}

impl TrafficAggregator {
    pub fn new(trips: Vec<Trip>) -> Self {
        Self::with_window(trips, Window::default())
    }

    /// Buckets every trip by its start minute and by its end minute.
    pub fn with_window(trips: Vec<Trip>, window: Window) -> Self {
        let mut departures = MinuteBuckets::new();
        let mut arrivals = MinuteBuckets::new();

        for (idx, trip) in trips.iter().enumerate() {
            departures.push(minute_of_day(&trip.started_at), idx);
            arrivals.push(minute_of_day(&trip.ended_at), idx);
        }

        debug!(trips = trips.len(), "Trips bucketed by minute");

        TrafficAggregator {
            trips,
            departures,
            arrivals,
            window,
        }
    }

    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn departures_by_minute(&self) -> &MinuteBuckets<usize> {
        &self.departures
    }

    pub fn arrivals_by_minute(&self) -> &MinuteBuckets<usize> {
        &self.arrivals
    }

    /// Trips starting inside the window, in minute order.
    pub fn departing_trips(&self, filter: TimeFilter) -> impl Iterator<Item = &Trip> {
        self.departures
            .select(filter, self.window)
            .map(move |&idx| &self.trips[idx])
    }

    /// Trips ending inside the window, in minute order.
    pub fn arriving_trips(&self, filter: TimeFilter) -> impl Iterator<Item = &Trip> {
        self.arrivals
            .select(filter, self.window)
            .map(move |&idx| &self.trips[idx])
    }

    /// Departures per start station id inside the window.
    ///
    /// Ids are counted as written, including ids no station carries.
    pub fn departure_counts(&self, filter: TimeFilter) -> HashMap<&str, usize> {
        count_by(self.departing_trips(filter), |t| &t.start_station_id)
    }

    /// Arrivals per end station id inside the window.
    pub fn arrival_counts(&self, filter: TimeFilter) -> HashMap<&str, usize> {
        count_by(self.arriving_trips(filter), |t| &t.end_station_id)
    }

    /// Departures, arrivals and total traffic for each station, in input order.
    ///
    /// Stations without trips in the window get zero counts. Trips naming
    /// an unknown station contribute to no station.
    pub fn compute_station_traffic(
        &self,
        stations: &[Station],
        filter: TimeFilter,
    ) -> Vec<StationTraffic> {
        let departures = self.departure_counts(filter);
        let arrivals = self.arrival_counts(filter);

        stations
            .iter()
            .map(|station| {
                let id = station.short_name.as_str();
                StationTraffic::new(
                    station,
                    departures.get(id).copied().unwrap_or(0),
                    arrivals.get(id).copied().unwrap_or(0),
                )
            })
            .collect()
    }
}

fn count_by<'a, I, F>(trips: I, key: F) -> HashMap<&'a str, usize>
where
    I: Iterator<Item = &'a Trip>,
    F: Fn(&'a Trip) -> &'a String,
{
    let mut counts = HashMap::new();
    for trip in trips {
        *counts.entry(key(trip).as_str()).or_insert(0) += 1;
    }
    counts
}

/// Headline figures for one aggregation window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowSummary {
    pub minute: i32,
    pub label: String,
    pub stations: usize,
    pub departures: usize,
    pub arrivals: usize,
    pub busiest_station: Option<String>,
    pub busiest_traffic: usize,
    pub mean_traffic: f64,
    pub stddev_traffic: f64,
}

impl WindowSummary {
    pub fn from_traffic(filter: TimeFilter, traffic: &[StationTraffic]) -> Self {
        let totals: Vec<f64> = traffic.iter().map(|t| t.total_traffic as f64).collect();
        let avg = mean(&totals);

        // First station wins ties so the result follows input order.
        let busiest = traffic.iter().fold(None::<&StationTraffic>, |best, t| match best {
            Some(b) if b.total_traffic >= t.total_traffic => Some(b),
            _ => Some(t),
        });

        WindowSummary {
            minute: filter.slider_value(),
            label: filter.label(),
            stations: traffic.len(),
            departures: traffic.iter().map(|t| t.departures).sum(),
            arrivals: traffic.iter().map(|t| t.arrivals).sum(),
            busiest_station: busiest.map(|t| t.short_name.clone()),
            busiest_traffic: busiest.map_or(0, |t| t.total_traffic),
            mean_traffic: avg,
            stddev_traffic: stddev(&totals, avg),
        }
    }
}

/// Arithmetic mean, 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation around a pre-computed mean.
pub fn stddev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
