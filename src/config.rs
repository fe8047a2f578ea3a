//! Tunable cost constants and sweep bounds.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Stored as a JSON object on disk; any key left out keeps its default:
/// ```json
/// {
///   "fuel_price_per_gallon": 3.5,
///   "miles_per_gallon": 6.0,
///   "fleet_summary_timeout_secs": 120
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub fuel_price_per_gallon: f64,
    pub miles_per_gallon: f64,
    pub maintenance_cost_per_mile: f64,
    pub driver_cost_per_leg: f64,
    pub fleet_summary_timeout_secs: u64,
    pub max_range_days: i64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            fuel_price_per_gallon: 3.50,
            miles_per_gallon: 6.0,
            maintenance_cost_per_mile: 0.20,
            driver_cost_per_leg: 16.50,
            fleet_summary_timeout_secs: 120,
            max_range_days: 365,
        }
    }
}

impl AnalyticsConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("reading config {path}"))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("parsing config {path}"))?;
        Ok(config)
    }

    pub fn fleet_summary_timeout(&self) -> Duration {
        Duration::from_secs(self.fleet_summary_timeout_secs)
    }
}
