//! Marker styling: flow colour, square-root radius and tooltip text.

use serde::Serialize;

use crate::config::RenderConfig;
use crate::model::StationTraffic;
use crate::time::TimeFilter;

pub const DEPARTURE_COLOR: &str = "steelblue";
pub const ARRIVAL_COLOR: &str = "orange";
pub const NEUTRAL_COLOR: &str = "#999";
pub const STROKE_COLOR: &str = "white";
pub const STROKE_WIDTH: f64 = 1.0;
pub const OPACITY: f64 = 0.8;

/// Which way traffic leans at a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowCategory {
    DepartureDominant,
    ArrivalDominant,
    Neutral,
}

impl FlowCategory {
    /// Classifies by the departures share of total traffic.
    ///
    /// Idle stations and shares between the thresholds (inclusive) are
    /// neutral.
    pub fn classify(
        traffic: &StationTraffic,
        departure_threshold: f64,
        arrival_threshold: f64,
    ) -> Self {
        match traffic.departure_ratio() {
            None => FlowCategory::Neutral,
            Some(r) if r > departure_threshold => FlowCategory::DepartureDominant,
            Some(r) if r < arrival_threshold => FlowCategory::ArrivalDominant,
            Some(_) => FlowCategory::Neutral,
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            FlowCategory::DepartureDominant => DEPARTURE_COLOR,
            FlowCategory::ArrivalDominant => ARRIVAL_COLOR,
            FlowCategory::Neutral => NEUTRAL_COLOR,
        }
    }
}

/// Square-root scale from `[0, domain_max]` onto a radius range.
///
/// Values are not clamped. A zero-width domain maps everything to the
/// middle of the range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusScale {
    domain_max: f64,
    range: (f64, f64),
}

impl RadiusScale {
    pub fn new(domain_max: usize, range: (f64, f64)) -> Self {
        RadiusScale {
            domain_max: domain_max as f64,
            range,
        }
    }

    pub fn with_range(self, range: (f64, f64)) -> Self {
        RadiusScale { range, ..self }
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn radius(&self, value: usize) -> f64 {
        let span = self.domain_max.sqrt();
        let t = if span == 0.0 {
            0.5
        } else {
            (value as f64).sqrt() / span
        };
        let (lo, hi) = self.range;
        lo + t * (hi - lo)
    }
}

/// Everything a map layer needs to draw one station circle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerStyle {
    pub short_name: String,
    pub lat: f64,
    pub lon: f64,
    pub radius: f64,
    pub category: FlowCategory,
    pub fill: &'static str,
    pub stroke: &'static str,
    pub stroke_width: f64,
    pub opacity: f64,
    pub title: String,
}

/// Markers for one slider position, as handed to the map layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerLayer {
    pub minute: i32,
    pub label: String,
    pub markers: Vec<MarkerStyle>,
}

/// Tooltip text for a station circle.
pub fn title(traffic: &StationTraffic) -> String {
    format!(
        "{} trips ({} departures, {} arrivals)",
        traffic.total_traffic, traffic.departures, traffic.arrivals
    )
}

/// Styles markers against a radius domain fixed at the first unfiltered render.
///
/// Only the radius range follows the filter, so circles for a narrow
/// window are drawn larger relative to the whole-day busiest station.
#[derive(Debug, Clone)]
pub struct MarkerStyler {
    scale: RadiusScale,
    radius_unfiltered: (f64, f64),
    radius_filtered: (f64, f64),
    departure_threshold: f64,
    arrival_threshold: f64,
}

impl MarkerStyler {
    /// `unfiltered` is the traffic computed with [`TimeFilter::Any`].
    pub fn new(config: &RenderConfig, unfiltered: &[StationTraffic]) -> Self {
        let max_total = unfiltered.iter().map(|t| t.total_traffic).max().unwrap_or(0);

        MarkerStyler {
            scale: RadiusScale::new(max_total, config.radius_unfiltered),
            radius_unfiltered: config.radius_unfiltered,
            radius_filtered: config.radius_filtered,
            departure_threshold: config.departure_threshold,
            arrival_threshold: config.arrival_threshold,
        }
    }

    pub fn scale_for(&self, filter: TimeFilter) -> RadiusScale {
        if filter.is_filtered() {
            self.scale.with_range(self.radius_filtered)
        } else {
            self.scale.with_range(self.radius_unfiltered)
        }
    }

    pub fn style(&self, traffic: &StationTraffic, scale: &RadiusScale) -> MarkerStyle {
        let category =
            FlowCategory::classify(traffic, self.departure_threshold, self.arrival_threshold);

        MarkerStyle {
            short_name: traffic.short_name.clone(),
            lat: traffic.lat,
            lon: traffic.lon,
            radius: scale.radius(traffic.total_traffic),
            category,
            fill: category.color(),
            stroke: STROKE_COLOR,
            stroke_width: STROKE_WIDTH,
            opacity: OPACITY,
            title: title(traffic),
        }
    }

    pub fn markers(&self, traffic: &[StationTraffic], filter: TimeFilter) -> Vec<MarkerStyle> {
        let scale = self.scale_for(filter);
        traffic.iter().map(|t| self.style(t, &scale)).collect()
    }

    pub fn layer(&self, traffic: &[StationTraffic], filter: TimeFilter) -> MarkerLayer {
        MarkerLayer {
            minute: filter.slider_value(),
            label: filter.label(),
            markers: self.markers(traffic, filter),
        }
    }
}
