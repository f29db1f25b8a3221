//! Rendering and loading settings.
//!
//! Stored as an optional JSON file; every key may be omitted:
//! ```json
//! {
//!   "window_half_width": 60,
//!   "window_bounds": "half_open",
//!   "radius_unfiltered": [0.0, 25.0],
//!   "radius_filtered": [3.0, 50.0],
//!   "departure_threshold": 0.6,
//!   "arrival_threshold": 0.4,
//!   "skip_malformed_trips": false
//! }
//! ```

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::buckets::{DEFAULT_HALF_WIDTH, Window, WindowBounds};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    pub window_half_width: u16,
    pub window_bounds: WindowBounds,
    pub radius_unfiltered: (f64, f64),
    pub radius_filtered: (f64, f64),
    pub departure_threshold: f64,
    pub arrival_threshold: f64,
    pub skip_malformed_trips: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            window_half_width: DEFAULT_HALF_WIDTH,
            window_bounds: WindowBounds::HalfOpen,
            radius_unfiltered: (0.0, 25.0),
            radius_filtered: (3.0, 50.0),
            departure_threshold: 0.6,
            arrival_threshold: 0.4,
            skip_malformed_trips: false,
        }
    }
}

impl RenderConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{path}'"))?;
        Self::from_json(&content).with_context(|| format!("invalid config file '{path}'"))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: RenderConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` when given, otherwise returns the defaults.
    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..720).contains(&self.window_half_width) {
            bail!(
                "window_half_width must be between 1 and 719, got {}",
                self.window_half_width
            );
        }

        for (name, (lo, hi)) in [
            ("radius_unfiltered", self.radius_unfiltered),
            ("radius_filtered", self.radius_filtered),
        ] {
            if !(lo.is_finite() && hi.is_finite()) || lo < 0.0 || hi < lo {
                bail!("{name} must be a non-negative [min, max] pair, got [{lo}, {hi}]");
            }
        }

        let (arr, dep) = (self.arrival_threshold, self.departure_threshold);
        if !(0.0..=1.0).contains(&arr) || !(0.0..=1.0).contains(&dep) || arr > dep {
            bail!(
                "thresholds must satisfy 0 <= arrival_threshold ({arr}) <= departure_threshold ({dep}) <= 1"
            );
        }

        Ok(())
    }

    pub fn window(&self) -> Window {
        Window {
            half_width: self.window_half_width,
            bounds: self.window_bounds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(RenderConfig::from_json("{}").unwrap(), RenderConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config =
            RenderConfig::from_json(r#"{"window_bounds":"inclusive","radius_filtered":[2,40]}"#)
                .unwrap();
        assert_eq!(config.window().bounds, WindowBounds::Inclusive);
        assert_eq!(config.window().half_width, 60);
        assert_eq!(config.radius_filtered, (2.0, 40.0));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(RenderConfig::from_json(r#"{"window_half_width":720}"#).is_err());
        assert!(RenderConfig::from_json(r#"{"window_half_width":0}"#).is_err());
        assert!(RenderConfig::from_json(r#"{"radius_filtered":[10,5]}"#).is_err());
        assert!(RenderConfig::from_json(r#"{"arrival_threshold":0.7}"#).is_err());
        assert!(RenderConfig::from_json(r#"{"window_bounds":"closed"}"#).is_err());
        assert!(RenderConfig::from_json(r#"{"unknown":1}"#).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = RenderConfig::load("/nonexistent/station_traffic.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/station_traffic.json"));
    }

    #[test]
    fn test_load_or_default() {
        assert_eq!(
            RenderConfig::load_or_default(None).unwrap(),
            RenderConfig::default()
        );
    }
}
